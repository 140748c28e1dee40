//! Tests for PDF split operations

#[cfg(test)]
mod tests {
    use crate::document::SourceDocument;
    use crate::error::EditorError;
    use crate::operations::split::*;
    use crate::page_spec::PageSpan;
    use crate::testing::FakeEngine;
    use crate::workspace::Workspace;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let workspace =
            Workspace::new(dir.path().join("staging"), dir.path().join("output")).unwrap();
        (dir, workspace)
    }

    fn points(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn options(mode: SplitMode, values: &[&str]) -> SplitOptions {
        SplitOptions {
            mode,
            points: points(values),
            base_name: Some("doc".to_string()),
        }
    }

    #[test]
    fn test_split_mode_parsing() {
        assert_eq!("ranges".parse::<SplitMode>().unwrap(), SplitMode::Ranges);
        assert_eq!(" Pages ".parse::<SplitMode>().unwrap(), SplitMode::Pages);
        assert!(matches!(
            "chunks".parse::<SplitMode>(),
            Err(EditorError::InvalidSplitMode(mode)) if mode == "chunks"
        ));
    }

    #[test]
    fn test_plan_ranges() {
        let plan = plan_split(SplitMode::Ranges, &points(&["1-3", "4-10"]), 10).unwrap();
        assert_eq!(
            plan,
            vec![
                PlannedSegment {
                    part: 1,
                    span: PageSpan::new(1, 3)
                },
                PlannedSegment {
                    part: 2,
                    span: PageSpan::new(4, 10)
                },
            ]
        );
    }

    #[test]
    fn test_plan_ranges_rejects_whole_plan() {
        let result = plan_split(SplitMode::Ranges, &points(&["1-3", "9-15"]), 10);
        match result {
            Err(EditorError::PageRangeOutOfBounds {
                range, page, bound, ..
            }) => {
                assert_eq!(range, "9-15");
                assert_eq!(page, 15);
                assert_eq!(bound, 10);
            }
            other => panic!("expected out of bounds, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_ranges_requires_points() {
        assert!(matches!(
            plan_split(SplitMode::Ranges, &[], 10),
            Err(EditorError::MalformedPageSpec { .. })
        ));
    }

    #[test]
    fn test_plan_pages() {
        let plan = plan_split(SplitMode::Pages, &points(&["4", "7"]), 10).unwrap();
        let spans: Vec<PageSpan> = plan.iter().map(|s| s.span).collect();
        assert_eq!(
            spans,
            vec![
                PageSpan::new(1, 3),
                PageSpan::new(4, 6),
                PageSpan::new(7, 10)
            ]
        );
    }

    #[test]
    fn test_plan_pages_skips_empty_segments_and_keeps_numbering() {
        // Boundary at page 1 makes the first segment empty
        let plan = plan_split(SplitMode::Pages, &points(&["1", "5"]), 8).unwrap();
        assert_eq!(
            plan,
            vec![
                PlannedSegment {
                    part: 2,
                    span: PageSpan::new(1, 4)
                },
                PlannedSegment {
                    part: 3,
                    span: PageSpan::new(5, 8)
                },
            ]
        );
    }

    #[test]
    fn test_plan_pages_keeps_input_order() {
        // Points are taken as given; the backwards pair 7 -> 4 is dropped
        let plan = plan_split(SplitMode::Pages, &points(&["7", "4"]), 10).unwrap();
        assert_eq!(
            plan,
            vec![
                PlannedSegment {
                    part: 1,
                    span: PageSpan::new(1, 6)
                },
                PlannedSegment {
                    part: 3,
                    span: PageSpan::new(4, 10)
                },
            ]
        );
    }

    #[test]
    fn test_plan_pages_without_points_is_whole_document() {
        let plan = plan_split(SplitMode::Pages, &[], 5).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].span, PageSpan::new(1, 5));
    }

    #[test]
    fn test_plan_pages_rejects_out_of_bounds_points() {
        for point in ["0", "11"] {
            assert!(matches!(
                plan_split(SplitMode::Pages, &points(&["3", point]), 10),
                Err(EditorError::PageRangeOutOfBounds { .. })
            ));
        }
        assert!(matches!(
            plan_split(SplitMode::Pages, &points(&["3-4"]), 10),
            Err(EditorError::MalformedPageSpec { .. })
        ));
    }

    #[test]
    fn test_split_by_ranges_writes_artifacts() {
        let (_dir, workspace) = workspace();
        let engine = FakeEngine::new();
        let source =
            SourceDocument::from_bytes(&engine, &FakeEngine::numbered("p", 10), "in.pdf").unwrap();

        let artifacts =
            split_pdf(&source, &workspace, options(SplitMode::Ranges, &["1-3", "4-10"])).unwrap();

        let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["doc_part1_pages1-3.pdf", "doc_part2_pages4-10.pdf"]
        );
        let first = fs::read(&artifacts[0].file_path).unwrap();
        assert_eq!(FakeEngine::pages_of(&first), vec!["p1", "p2", "p3"]);
        let second = fs::read(&artifacts[1].file_path).unwrap();
        assert_eq!(FakeEngine::pages_of(&second).len(), 7);
    }

    #[test]
    fn test_split_by_pages_writes_three_documents() {
        let (_dir, workspace) = workspace();
        let engine = FakeEngine::new();
        let source =
            SourceDocument::from_bytes(&engine, &FakeEngine::numbered("p", 10), "in.pdf").unwrap();

        let artifacts =
            split_pdf(&source, &workspace, options(SplitMode::Pages, &["4", "7"])).unwrap();

        let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "doc_part1_pages1-3.pdf",
                "doc_part2_pages4-6.pdf",
                "doc_part3_pages7-10.pdf"
            ]
        );
    }

    #[test]
    fn test_invalid_plan_writes_nothing() {
        let (_dir, workspace) = workspace();
        let engine = FakeEngine::new();
        let source =
            SourceDocument::from_bytes(&engine, &FakeEngine::numbered("p", 10), "in.pdf").unwrap();

        let result = split_pdf(
            &source,
            &workspace,
            options(SplitMode::Ranges, &["1-3", "9-15"]),
        );
        assert!(result.is_err());
        assert_eq!(fs::read_dir(workspace.output_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_failing_segment_reports_partial_artifacts() {
        let (_dir, workspace) = workspace();
        let engine = FakeEngine::new().failing_on("p5");
        let source =
            SourceDocument::from_bytes(&engine, &FakeEngine::numbered("p", 10), "in.pdf").unwrap();

        let error = split_pdf(&source, &workspace, options(SplitMode::Pages, &["4", "7"]))
            .unwrap_err();

        match &error {
            EditorError::AssemblyFailure {
                segment, produced, ..
            } => {
                assert_eq!(segment, "pages 4-6");
                assert_eq!(produced.len(), 1);
                assert_eq!(produced[0].file_name, "doc_part1_pages1-3.pdf");
                assert!(produced[0].file_path.exists());
            }
            other => panic!("expected assembly failure, got {other:?}"),
        }
        assert_eq!(error.partial_artifacts().len(), 1);
    }

    #[test]
    fn test_default_base_name_shared_by_parts() {
        let (_dir, workspace) = workspace();
        let engine = FakeEngine::new();
        let source =
            SourceDocument::from_bytes(&engine, &FakeEngine::numbered("p", 4), "in.pdf").unwrap();

        let artifacts = split_pdf(
            &source,
            &workspace,
            SplitOptions {
                mode: SplitMode::Pages,
                points: points(&["3"]),
                base_name: None,
            },
        )
        .unwrap();

        let first = &artifacts[0].file_name;
        let second = &artifacts[1].file_name;
        assert!(first.starts_with("split_"));
        assert_eq!(
            first.trim_end_matches("_part1_pages1-2.pdf"),
            second.trim_end_matches("_part2_pages3-4.pdf")
        );
    }
}
