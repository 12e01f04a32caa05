//! Destinations for rendered chart images.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid image name '{0}'")]
    InvalidName(String),
}

/// Accepts one encoded PNG per logical chart name and reports where it went.
pub trait ImageSink {
    fn put_image(&mut self, name: &str, png: &[u8]) -> Result<String, SinkError>;
}

fn validate_name(name: &str) -> Result<(), SinkError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SinkError::InvalidName(name.to_string()))
    }
}

/// Writes `<dir>/<name>.png`, replacing whatever is already there.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    created: bool,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            created: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.png"))
    }
}

impl ImageSink for FileSink {
    fn put_image(&mut self, name: &str, png: &[u8]) -> Result<String, SinkError> {
        validate_name(name)?;
        if !self.created {
            fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
                path: self.dir.clone(),
                source,
            })?;
            self.created = true;
        }

        let path = self.path_for(name);
        fs::write(&path, png).map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path.display().to_string())
    }
}

/// Keeps images in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    images: BTreeMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.images.get(name).map(Vec::as_slice)
    }

    /// Names in the order they were first stored.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSink for MemorySink {
    fn put_image(&mut self, name: &str, png: &[u8]) -> Result<String, SinkError> {
        validate_name(name)?;
        if self
            .images
            .insert(name.to_string(), png.to_vec())
            .is_none()
        {
            self.order.push(name.to_string());
        }
        Ok(format!("memory://{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_be_plain_stems() {
        assert!(validate_name("price_distribution").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../escape").is_err());
        assert!(validate_name("a/b").is_err());
    }

    #[test]
    fn memory_sink_overwrites_in_place() {
        let mut sink = MemorySink::new();
        assert_eq!(sink.put_image("a", b"one").unwrap(), "memory://a");
        sink.put_image("b", b"two").unwrap();
        sink.put_image("a", b"three").unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.names(), ["a".to_string(), "b".to_string()]);
        assert_eq!(sink.get("a"), Some(&b"three"[..]));
    }
}
