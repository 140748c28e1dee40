//! Staging and output areas
//!
//! Uploads are staged as transient files that live for exactly one request.
//! Outputs are written atomically and are never removed here.

use crate::artifact::OutputArtifact;
use crate::error::{EditorError, Result};
use crate::naming::{sanitize_file_name, unique_token};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::Builder;
use tracing::{debug, warn};

const DEFAULT_UPLOAD_NAME: &str = "upload.pdf";

/// The two directories an editor works in
#[derive(Debug, Clone)]
pub struct Workspace {
    staging_dir: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    /// Create both directories if needed.
    pub fn new(staging_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<Self> {
        let staging_dir = prepare_dir(staging_dir.as_ref(), "staging")?;
        let output_dir = prepare_dir(output_dir.as_ref(), "output")?;
        debug!(
            "Workspace ready: staging {}, output {}",
            staging_dir.display(),
            output_dir.display()
        );
        Ok(Self {
            staging_dir,
            output_dir,
        })
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Copy an upload into the staging area.
    ///
    /// The returned file is deleted when dropped.
    pub fn stage_upload(&self, bytes: &[u8], original_name: &str) -> Result<TransientFile> {
        let name = sanitize_file_name(original_name)
            .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());
        let path = self.staging_dir.join(format!("{}_{}", unique_token(), name));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| EditorError::storage(format!("staging {name}"), e))?;
        let staged = TransientFile { path };

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| EditorError::storage(format!("staging {name}"), e))?;

        debug!("Staged {} ({} bytes)", staged.path.display(), bytes.len());
        Ok(staged)
    }

    /// Run `work` with a scope that removes everything staged through it
    /// once `work` finishes, however it finishes.
    pub fn scoped<T>(&self, work: impl FnOnce(&mut Scope<'_>) -> Result<T>) -> Result<T> {
        let mut scope = Scope {
            workspace: self,
            staged: Vec::new(),
        };
        work(&mut scope)
    }

    /// Write an artifact atomically under `name` in the output directory.
    ///
    /// An existing artifact with the same name is replaced.
    pub fn write_output(&self, name: &str, bytes: &[u8]) -> Result<OutputArtifact> {
        let context = || format!("writing {name}");

        let mut partial = Builder::new()
            .prefix(".partial-")
            .tempfile_in(&self.output_dir)
            .map_err(|e| EditorError::storage(context(), e))?;
        partial
            .write_all(bytes)
            .and_then(|_| partial.as_file().sync_all())
            .map_err(|e| EditorError::storage(context(), e))?;

        let path = self.output_dir.join(name);
        partial
            .persist(&path)
            .map_err(|e| EditorError::storage(context(), e.error))?;

        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(OutputArtifact::new(name, path, bytes.len() as u64))
    }

    /// Resolve a download request to a file inside the output directory.
    pub fn resolve_download(&self, name: &str) -> Result<PathBuf> {
        let requested = Path::new(name);
        let plain = !name.is_empty()
            && requested
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(EditorError::PathTraversal(name.to_string()));
        }

        let resolved = match self.output_dir.join(requested).canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EditorError::ArtifactNotFound(name.to_string()))
            }
            Err(e) => return Err(EditorError::storage(format!("resolving {name}"), e)),
        };

        // Symlinks may still point elsewhere
        if !resolved.starts_with(&self.output_dir) {
            return Err(EditorError::PathTraversal(name.to_string()));
        }
        if !resolved.is_file() {
            return Err(EditorError::ArtifactNotFound(name.to_string()));
        }

        Ok(resolved)
    }
}

fn prepare_dir(dir: &Path, role: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .and_then(|_| dir.canonicalize())
        .map_err(|e| EditorError::storage(format!("preparing {role} directory {}", dir.display()), e))
}

/// A staged upload, removed from disk when dropped
#[derive(Debug)]
pub struct TransientFile {
    path: PathBuf,
}

impl TransientFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed transient file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove transient file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Owner of the transient files of one unit of work
pub struct Scope<'w> {
    workspace: &'w Workspace,
    staged: Vec<TransientFile>,
}

impl Scope<'_> {
    /// Stage an upload for the lifetime of this scope.
    pub fn stage(&mut self, bytes: &[u8], original_name: &str) -> Result<PathBuf> {
        let file = self.workspace.stage_upload(bytes, original_name)?;
        let path = file.path().to_path_buf();
        self.staged.push(file);
        Ok(path)
    }

    pub fn workspace(&self) -> &Workspace {
        self.workspace
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        if !self.staged.is_empty() {
            debug!("Cleaning up {} transient files", self.staged.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let root = TempDir::new().unwrap();
        let workspace = Workspace::new(root.path().join("staging"), root.path().join("output"))
            .unwrap();
        (root, workspace)
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_new_creates_directories() {
        let (root, workspace) = workspace();
        assert!(root.path().join("staging").is_dir());
        assert!(workspace.output_dir().is_absolute());
    }

    #[test]
    fn test_stage_upload_names_and_removes_on_drop() {
        let (_root, workspace) = workspace();
        let staged = workspace
            .stage_upload(b"%PDF-1.7", "../secret/report.pdf")
            .unwrap();
        let name = staged.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_report.pdf"));
        assert_eq!(fs::read(staged.path()).unwrap(), b"%PDF-1.7");

        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_stage_upload_without_name() {
        let (_root, workspace) = workspace();
        let staged = workspace.stage_upload(b"x", "").unwrap();
        assert!(staged.path().to_string_lossy().ends_with("_upload.pdf"));
    }

    #[test]
    fn test_scoped_cleans_up_on_success_and_error() {
        let (_root, workspace) = workspace();

        let value = workspace
            .scoped(|scope| {
                scope.stage(b"a", "a.pdf")?;
                scope.stage(b"b", "b.pdf")?;
                assert_eq!(entries(workspace.staging_dir()).len(), 2);
                Ok(42)
            })
            .unwrap();
        assert_eq!(value, 42);
        assert!(entries(workspace.staging_dir()).is_empty());

        let result: Result<()> = workspace.scoped(|scope| {
            scope.stage(b"a", "a.pdf")?;
            Err(EditorError::InvalidSplitMode("bogus".to_string()))
        });
        assert!(matches!(result, Err(EditorError::InvalidSplitMode(_))));
        assert!(entries(workspace.staging_dir()).is_empty());
    }

    #[test]
    fn test_scoped_cleans_up_on_panic() {
        let (_root, workspace) = workspace();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _ = workspace.scoped(|scope| -> Result<()> {
                scope.stage(b"a", "a.pdf")?;
                panic!("engine crashed");
            });
        }));
        assert!(outcome.is_err());
        assert!(entries(workspace.staging_dir()).is_empty());
    }

    #[test]
    fn test_write_output_replaces_and_leaves_no_partials() {
        let (_root, workspace) = workspace();
        workspace.write_output("out.pdf", b"first").unwrap();
        let artifact = workspace.write_output("out.pdf", b"second!").unwrap();

        assert_eq!(artifact.file_name, "out.pdf");
        assert_eq!(artifact.file_size, 7);
        assert_eq!(fs::read(&artifact.file_path).unwrap(), b"second!");
        assert_eq!(entries(workspace.output_dir()), vec!["out.pdf".to_string()]);
    }

    #[test]
    fn test_resolve_download() {
        let (root, workspace) = workspace();
        workspace.write_output("a.pdf", b"data").unwrap();
        fs::write(root.path().join("outside.txt"), b"secret").unwrap();

        let path = workspace.resolve_download("a.pdf").unwrap();
        assert!(path.starts_with(workspace.output_dir()));

        assert!(matches!(
            workspace.resolve_download("../outside.txt"),
            Err(EditorError::PathTraversal(_))
        ));
        assert!(matches!(
            workspace.resolve_download("/etc/passwd"),
            Err(EditorError::PathTraversal(_))
        ));
        assert!(matches!(
            workspace.resolve_download(""),
            Err(EditorError::PathTraversal(_))
        ));
        assert!(matches!(
            workspace.resolve_download("missing.pdf"),
            Err(EditorError::ArtifactNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_download_rejects_symlink_escape() {
        let (root, workspace) = workspace();
        let target = root.path().join("outside.txt");
        fs::write(&target, b"secret").unwrap();
        std::os::unix::fs::symlink(&target, workspace.output_dir().join("link.txt")).unwrap();

        assert!(matches!(
            workspace.resolve_download("link.txt"),
            Err(EditorError::PathTraversal(_))
        ));
    }
}
