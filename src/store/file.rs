use super::EntryTracker;
use crate::feed::types::EntryId;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Durable tracker backed by an append-only file, one entry id per line.
///
/// The whole file is read on open. Every `track` appends and syncs the line
/// before returning, so an id is only reported as tracked once it is on disk.
pub struct FileTracker {
    path: PathBuf,
    state: Mutex<TrackedFile>,
}

struct TrackedFile {
    ids: HashSet<EntryId>,
    /// The file ends in an unterminated line; the next append must start a new one.
    unterminated: bool,
}

impl FileTracker {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read tracking file: {}", path.display())
                })
            }
        };

        let unterminated = !content.is_empty() && !content.ends_with('\n');
        let ids: HashSet<EntryId> = content
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .map(EntryId::from)
            .collect();

        tracing::debug!(
            path = %path.display(),
            tracked = ids.len(),
            unterminated,
            "opened tracking file"
        );

        Ok(Self {
            path,
            state: Mutex::new(TrackedFile { ids, unterminated }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn count(&self) -> usize {
        self.state.lock().await.ids.len()
    }
}

#[async_trait]
impl EntryTracker for FileTracker {
    async fn is_tracked(&self, id: &EntryId) -> bool {
        self.state.lock().await.ids.contains(id)
    }

    async fn track(&self, id: &EntryId) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.ids.contains(id) {
            return Ok(());
        }
        if id.as_str().is_empty() || id.as_str().contains(['\n', '\r']) {
            anyhow::bail!("entry id {:?} cannot be stored one per line", id.as_str());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open tracking file: {}", self.path.display()))?;
        let line = if state.unterminated {
            format!("\n{}\n", id)
        } else {
            format!("{}\n", id)
        };
        // A run cancelled between here and the insert below leaves the id on
        // disk but not in `ids`. A later `track` then appends a duplicate line,
        // which `open` collapses.
        let written = file.write_all(line.as_bytes()).await;
        // A partial write may leave a dangling line; empty lines are skipped on open.
        state.unterminated = written.is_err();
        written.with_context(|| format!("failed to append {} to tracking file", id))?;
        file.sync_data()
            .await
            .with_context(|| format!("failed to sync tracking file after {}", id))?;

        state.ids.insert(id.clone());
        Ok(())
    }
}
