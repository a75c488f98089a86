use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::{Checkpoint, Checkpointer, GraphError, StateSchema};

/// Append-only JSONL checkpoint store, one file per thread. Loading replays
/// to the last record, so a thread's file doubles as its history.
#[derive(Clone, Debug)]
pub struct FileCheckpointer {
    base_dir: PathBuf,
}

impl FileCheckpointer {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn sanitize_thread_id(thread_id: &str) -> String {
        let mut out = String::with_capacity(thread_id.len());
        for ch in thread_id.chars() {
            match ch {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => out.push('_'),
                c if c.is_control() => {}
                c => out.push(c),
            }
        }
        let trimmed = out.trim_matches(|c: char| c == '.' || c.is_whitespace() || c == '_');
        if trimmed.is_empty() {
            let mut hasher = DefaultHasher::new();
            thread_id.hash(&mut hasher);
            return format!("thread-{:08x}", hasher.finish());
        }
        trimmed.to_string()
    }

    fn thread_path(&self, thread_id: &str) -> PathBuf {
        let filename = format!("{}.jsonl", Self::sanitize_thread_id(thread_id));
        self.base_dir.join(filename)
    }

    fn read_last<S: StateSchema>(path: &Path) -> Result<Option<Checkpoint<S>>, GraphError> {
        let file = File::open(path).map_err(|err| GraphError::Checkpoint(err.to_string()))?;
        let reader = BufReader::new(file);
        let mut last = None;
        for line in reader.lines() {
            let line = line.map_err(|err| GraphError::Checkpoint(err.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            last = Some(
                serde_json::from_str(&line)
                    .map_err(|err| GraphError::Checkpoint(err.to_string()))?,
            );
        }
        Ok(last)
    }
}

#[async_trait::async_trait]
impl<S: StateSchema> Checkpointer<S> for FileCheckpointer {
    async fn save(&self, checkpoint: &Checkpoint<S>) -> Result<(), GraphError> {
        fs::create_dir_all(&self.base_dir)
            .map_err(|err| GraphError::Checkpoint(err.to_string()))?;

        let path = self.thread_path(&checkpoint.thread_id);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| GraphError::Checkpoint(err.to_string()))?;
        let line = serde_json::to_string(checkpoint)
            .map_err(|err| GraphError::Checkpoint(err.to_string()))?;
        file.write_all(format!("{line}\n").as_bytes())
            .map_err(|err| GraphError::Checkpoint(err.to_string()))?;
        Ok(())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, GraphError> {
        let path = self.thread_path(thread_id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_last(&path)
    }
}
