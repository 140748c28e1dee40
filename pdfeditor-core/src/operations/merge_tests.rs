//! Tests for PDF merge operations

#[cfg(test)]
mod tests {
    use crate::error::EditorError;
    use crate::operations::merge::*;
    use crate::testing::FakeEngine;
    use crate::workspace::Workspace;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        workspace: Workspace,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let workspace =
                Workspace::new(dir.path().join("staging"), dir.path().join("output")).unwrap();
            Self { dir, workspace }
        }

        fn input(&self, name: &str, bytes: Vec<u8>) -> MergeInput {
            let path: PathBuf = self.dir.path().join(name);
            fs::write(&path, bytes).unwrap();
            MergeInput::new(path, name)
        }
    }

    #[test]
    fn test_merge_requires_two_inputs() {
        let fixture = Fixture::new();
        let engine = FakeEngine::new();
        let only = fixture.input("a.pdf", FakeEngine::numbered("a", 2));

        let result = merge_pdfs(
            &engine,
            &fixture.workspace,
            vec![only],
            MergeOptions::default(),
        );
        assert!(matches!(
            result,
            Err(EditorError::InsufficientInputs {
                required: 2,
                provided: 1
            })
        ));
        assert_eq!(fs::read_dir(fixture.workspace.output_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_merge_preserves_input_order() {
        let fixture = Fixture::new();
        let engine = FakeEngine::new();
        let inputs = vec![
            fixture.input("a.pdf", FakeEngine::numbered("a", 2)),
            fixture.input("b.pdf", FakeEngine::numbered("b", 1)),
            fixture.input("c.pdf", FakeEngine::numbered("c", 3)),
        ];

        let artifact = merge_pdfs(
            &engine,
            &fixture.workspace,
            inputs,
            MergeOptions {
                output_name: Some("combined".to_string()),
            },
        )
        .unwrap();

        assert_eq!(artifact.file_name, "combined.pdf");
        let merged = fs::read(&artifact.file_path).unwrap();
        assert_eq!(
            FakeEngine::pages_of(&merged),
            vec!["a1", "a2", "b1", "c1", "c2", "c3"]
        );
        assert_eq!(artifact.file_size, merged.len() as u64);
    }

    #[test]
    fn test_merge_default_name() {
        let fixture = Fixture::new();
        let engine = FakeEngine::new();
        let inputs = vec![
            fixture.input("a.pdf", FakeEngine::numbered("a", 1)),
            fixture.input("b.pdf", FakeEngine::numbered("b", 1)),
        ];

        let artifact =
            merge_pdfs(&engine, &fixture.workspace, inputs, MergeOptions::default()).unwrap();
        assert!(artifact.file_name.starts_with("merged_"));
        assert!(artifact.file_name.ends_with(".pdf"));
    }

    #[test]
    fn test_merge_failure_leaves_no_output() {
        let fixture = Fixture::new();
        let engine = FakeEngine::new().failing_on("c1");
        let inputs = vec![
            fixture.input("a.pdf", FakeEngine::numbered("a", 2)),
            fixture.input("c.pdf", FakeEngine::numbered("c", 2)),
        ];

        let error = merge_pdfs(&engine, &fixture.workspace, inputs, MergeOptions::default())
            .unwrap_err();
        match error {
            EditorError::AssemblyFailure { segment, .. } => {
                assert_eq!(segment, "input 2 (c.pdf)")
            }
            other => panic!("expected assembly failure, got {other:?}"),
        }
        assert_eq!(fs::read_dir(fixture.workspace.output_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_merge_rejects_unreadable_input() {
        let fixture = Fixture::new();
        let engine = FakeEngine::new();
        let inputs = vec![
            fixture.input("a.pdf", FakeEngine::numbered("a", 1)),
            fixture.input("junk.pdf", b"not a document".to_vec()),
        ];

        assert!(matches!(
            merge_pdfs(&engine, &fixture.workspace, inputs, MergeOptions::default()),
            Err(EditorError::AssemblyFailure { .. })
        ));
    }
}
