//! Pre-generated access keys, one ordered pool per exam/mode slot.

use std::io;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyPoolError {
    #[error("failed to read key file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse key file {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Ordered, immutable list of keys. Cloning shares the underlying list.
#[derive(Debug, Clone, Default)]
pub struct KeyPool {
    keys: Arc<[String]>,
}

impl KeyPool {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(|key| -> String { key.into() }).collect(),
        }
    }

    /// Load a pool from disk.
    ///
    /// `.csv` files are read with a header row and the first column is the key;
    /// anything else is one key per line. A missing file gives an empty pool.
    pub async fn load(path: &Path) -> Result<Self, KeyPoolError> {
        let contents = match tokio::fs::read(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Key file not found, pool is empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(KeyPoolError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        let keys = if is_csv {
            parse_csv(&contents).map_err(|source| KeyPoolError::Csv {
                path: path.display().to_string(),
                source,
            })?
        } else {
            parse_lines(&contents)
        };

        tracing::info!(path = %path.display(), keys = keys.len(), "Loaded key pool");
        Ok(Self::new(keys))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key for the registration that follows `prior_registrations` earlier ones.
    pub fn key_for(&self, prior_registrations: usize) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        Some(&self.keys[prior_registrations % self.keys.len()])
    }
}

fn parse_lines(contents: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(contents)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_csv(contents: &[u8]) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(contents);

    let mut keys = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(key) = record.get(0).map(str::trim).filter(|k| !k.is_empty()) {
            keys.push(key.to_string());
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_key_for_wraps_around() {
        let pool = KeyPool::new(["K1", "K2", "K3"]);
        assert_eq!(pool.key_for(0), Some("K1"));
        assert_eq!(pool.key_for(2), Some("K3"));
        assert_eq!(pool.key_for(3), Some("K1"));
        assert_eq!(pool.key_for(7), Some("K2"));
    }

    #[test]
    fn test_empty_pool_has_no_key() {
        let pool = KeyPool::default();
        assert!(pool.is_empty());
        assert_eq!(pool.key_for(0), None);
    }

    #[tokio::test]
    async fn test_load_text_file_skips_blank_lines() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "AAA-111\n\n  BBB-222  \r\nCCC-333\n").unwrap();

        let pool = KeyPool::load(file.path()).await.unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.key_for(1), Some("BBB-222"));
    }

    #[tokio::test]
    async fn test_load_csv_file_uses_first_column() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "Clave,Lote\nAAA-111,1\nBBB-222,1\n").unwrap();

        let pool = KeyPool::load(file.path()).await.unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.key_for(0), Some("AAA-111"));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_pool() {
        let dir = tempfile::tempdir().unwrap();
        let pool = KeyPool::load(&dir.path().join("nope.txt")).await.unwrap();
        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_key_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = KeyPool::load(dir.path()).await;
        assert!(matches!(result, Err(KeyPoolError::Io { .. })));
    }
}
