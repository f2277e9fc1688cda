use super::{RegistrationStore, StoreError};
use crate::models::{PoolSlot, Registration};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

const FILE_PREFIX: &str = "registros_";
const FILE_SUFFIX: &str = ".csv";

/// Registrations appended to `registros_<exam>_<mode>.csv` files in one directory.
///
/// The header row is written with the first registration of a slot. A missing
/// or empty file reads as an empty registry.
pub struct CsvRegistrationStore {
    directory: PathBuf,
}

impl CsvRegistrationStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn slot_path(&self, slot: &PoolSlot) -> PathBuf {
        self.directory.join(format!(
            "{}{}_{}{}",
            FILE_PREFIX,
            file_component(&slot.exam),
            file_component(&slot.mode),
            FILE_SUFFIX
        ))
    }

    async fn read_slot(&self, slot: &PoolSlot) -> Result<Vec<Registration>, StoreError> {
        let contents = match tokio::fs::read(self.slot_path(slot)).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(contents.as_slice());

        let mut registrations = Vec::new();
        for record in reader.deserialize() {
            registrations.push(record?);
        }
        Ok(registrations)
    }
}

fn file_component(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Whether a non-empty file stops mid-line, e.g. after a torn write or a hand edit.
async fn ends_without_newline(path: &Path) -> Result<bool, StoreError> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(io::SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}

fn encode_row(registration: &Registration, with_header: bool) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    writer.serialize(registration)?;
    writer
        .into_inner()
        .map_err(|e| StoreError::Buffer(e.to_string()))
}

#[async_trait]
impl RegistrationStore for CsvRegistrationStore {
    async fn count(&self, slot: &PoolSlot) -> Result<usize, StoreError> {
        Ok(self.read_slot(slot).await?.len())
    }

    async fn append(&self, registration: &Registration) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.slot_path(&registration.slot());
        let existing_len = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        let mut row = Vec::new();
        if existing_len > 0 && ends_without_newline(&path).await? {
            tracing::warn!(path = %path.display(), "Registry file did not end with a newline");
            row.push(b'\n');
        }
        row.extend(encode_row(registration, existing_len == 0)?);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&row).await?;
        file.flush().await?;

        tracing::debug!(path = %path.display(), "Appended registration row");
        Ok(())
    }

    async fn list(&self, slot: &PoolSlot) -> Result<Vec<Registration>, StoreError> {
        self.read_slot(slot).await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(())
    }
}
