//! Artifact storage: uniquely named output documents and safe retrieval.
//!
//! Every rendered document gets a fresh `output_<uuid-v4>.pdf` name, so
//! concurrent jobs sharing one output directory never collide. The renderer
//! writes to a `.tmp` sibling that is renamed into place only once the
//! document is complete; a half-written artifact is never visible under its
//! final name.
//!
//! Retrieval accepts a bare file name only. Anything that could resolve
//! outside the output directory is rejected before the file system is asked.

use crate::capability::DocumentRenderer;
use crate::error::{CapabilityError, MediaDocError};
use crate::output::Artifact;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Renders documents into, and serves them from, one output directory.
#[derive(Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
    renderer: Arc<dyn DocumentRenderer>,
    timeout: Duration,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>, renderer: Arc<dyn DocumentRenderer>, timeout: Duration) -> Self {
        Self {
            output_dir: output_dir.into(),
            renderer,
            timeout,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Check the renderer can run (font present) before a job starts.
    pub fn preflight(&self) -> Result<(), MediaDocError> {
        self.renderer.preflight()
    }

    /// Render `text` into a new uniquely named artifact.
    pub async fn render(&self, text: &str) -> Result<Artifact, MediaDocError> {
        self.renderer.preflight()?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| MediaDocError::OutputWriteFailed {
                path: self.output_dir.clone(),
                source,
            })?;

        let (filename, path) = loop {
            let name = format!("output_{}.pdf", Uuid::new_v4());
            let candidate = self.output_dir.join(&name);
            if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                break (name, candidate);
            }
        };
        let tmp = self.output_dir.join(format!("{filename}.tmp"));

        let rendered = tokio::time::timeout(self.timeout, self.renderer.render(text, &tmp))
            .await
            .unwrap_or(Err(CapabilityError::Timeout {
                secs: self.timeout.as_secs(),
            }));
        if let Err(e) = rendered {
            if let Err(rm) = tokio::fs::remove_file(&tmp).await {
                debug!("No partial artifact to remove at {}: {}", tmp.display(), rm);
            }
            return Err(e.into_job_error(|detail| MediaDocError::RenderFailed {
                path: path.clone(),
                detail,
            }));
        }

        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| MediaDocError::OutputWriteFailed {
                path: path.clone(),
                source,
            })?;

        let size_bytes = tokio::fs::metadata(&path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        info!("Rendered {} ({} bytes)", filename, size_bytes);

        Ok(Artifact {
            filename,
            path,
            size_bytes,
        })
    }

    /// Read the bytes of a previously rendered artifact.
    pub async fn fetch(&self, name: &str) -> Result<Vec<u8>, MediaDocError> {
        validate_artifact_name(name)?;

        let path = self.output_dir.join(name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(MediaDocError::ArtifactNotFound {
                name: name.to_string(),
            });
        }

        // A symlink planted in the directory must not lead out of it.
        let dir = tokio::fs::canonicalize(&self.output_dir)
            .await
            .map_err(|e| MediaDocError::Internal(e.to_string()))?;
        let resolved = tokio::fs::canonicalize(&path)
            .await
            .map_err(|_| MediaDocError::ArtifactNotFound {
                name: name.to_string(),
            })?;
        if !resolved.starts_with(&dir) {
            warn!("Rejected artifact '{}' resolving outside {}", name, dir.display());
            return Err(MediaDocError::InvalidArtifactName {
                name: name.to_string(),
            });
        }
        if !resolved.is_file() {
            return Err(MediaDocError::ArtifactNotFound {
                name: name.to_string(),
            });
        }

        tokio::fs::read(&resolved)
            .await
            .map_err(|_| MediaDocError::ArtifactNotFound {
                name: name.to_string(),
            })
    }
}

/// Accept only a plain file name: no separators, no `..`, no hidden files.
pub fn validate_artifact_name(name: &str) -> Result<(), MediaDocError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..")
        || Path::new(name).is_absolute();

    if invalid {
        return Err(MediaDocError::InvalidArtifactName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;

    /// Writes the text itself as the "document".
    struct TextRenderer {
        font_present: bool,
    }

    #[async_trait]
    impl DocumentRenderer for TextRenderer {
        fn preflight(&self) -> Result<(), MediaDocError> {
            if self.font_present {
                Ok(())
            } else {
                Err(MediaDocError::FontNotFound {
                    path: PathBuf::from("missing.ttf"),
                })
            }
        }

        async fn render(&self, text: &str, output: &Path) -> Result<(), CapabilityError> {
            if text == "boom" {
                tokio::fs::write(output, b"partial").await?;
                return Err(CapabilityError::failed("layout exploded"));
            }
            tokio::fs::write(output, text.as_bytes()).await?;
            Ok(())
        }
    }

    fn store(dir: &Path) -> ArtifactStore {
        ArtifactStore::new(
            dir.join("outputs"),
            Arc::new(TextRenderer { font_present: true }),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn render_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let artifact = store.render("नमस्ते").await.unwrap();
        assert!(artifact.filename.starts_with("output_"));
        assert!(artifact.filename.ends_with(".pdf"));
        assert_eq!(artifact.size_bytes, "नमस्ते".len() as u64);

        let bytes = store.fetch(&artifact.filename).await.unwrap();
        assert_eq!(bytes, "नमस्ते".as_bytes());
    }

    #[tokio::test]
    async fn concurrent_renders_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.render(&format!("job {i}")).await.unwrap() })
            })
            .collect();

        let mut names = HashSet::new();
        for h in handles {
            names.insert(h.await.unwrap().filename);
        }
        assert_eq!(names.len(), 16);
        assert_eq!(std::fs::read_dir(store.output_dir()).unwrap().count(), 16);
    }

    #[tokio::test]
    async fn failed_render_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let err = store.render("boom").await.unwrap_err();
        assert!(matches!(err, MediaDocError::RenderFailed { .. }));
        assert_eq!(std::fs::read_dir(store.output_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_font_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(
            dir.path(),
            Arc::new(TextRenderer { font_present: false }),
            Duration::from_secs(5),
        );
        assert!(matches!(
            store.render("text").await,
            Err(MediaDocError::FontNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn traversal_is_rejected_even_when_target_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();
        let store = store(dir.path());
        store.render("anything").await.unwrap();

        for name in ["../secret.txt", "..", "", ".hidden", "a/b.pdf", "a\\b.pdf", "x\0.pdf"] {
            assert!(
                matches!(
                    store.fetch(name).await,
                    Err(MediaDocError::InvalidArtifactName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
        let absolute = dir.path().join("secret.txt");
        assert!(store.fetch(absolute.to_str().unwrap()).await.is_err());
    }

    #[tokio::test]
    async fn unknown_name_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::create_dir_all(store.output_dir()).unwrap();
        assert!(matches!(
            store.fetch("output_nope.pdf").await,
            Err(MediaDocError::ArtifactNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();
        let store = store(dir.path());
        std::fs::create_dir_all(store.output_dir()).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("secret.txt"),
            store.output_dir().join("output_link.pdf"),
        )
        .unwrap();

        assert!(matches!(
            store.fetch("output_link.pdf").await,
            Err(MediaDocError::InvalidArtifactName { .. })
        ));
    }
}
