use crate::diary_entry::{DiaryEntry, DiaryRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("diary {0} not found")]
    NotFound(Uuid),
    #[error("diary {0} already exists")]
    Duplicate(Uuid),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt diary file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Durable home of diary records. The feed only ever mirrors what this
/// reports as done.
pub trait EntryStore {
    fn load(&self) -> Result<Vec<DiaryRecord>, StoreError>;
    fn create(&mut self, entry: &DiaryEntry) -> Result<(), StoreError>;
    fn edit(&mut self, entry: &DiaryEntry) -> Result<(), StoreError>;
    fn delete(&mut self, id: Uuid) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DiaryFile {
    diaries: Vec<DiaryRecord>,
}

impl DiaryFile {
    fn create(&mut self, entry: &DiaryEntry) -> Result<(), StoreError> {
        if self.diaries.iter().any(|r| r.id == entry.id) {
            return Err(StoreError::Duplicate(entry.id));
        }
        self.diaries.push(DiaryRecord::from(entry));
        Ok(())
    }

    fn edit(&mut self, entry: &DiaryEntry) -> Result<(), StoreError> {
        let record = self
            .diaries
            .iter_mut()
            .find(|r| r.id == entry.id)
            .ok_or(StoreError::NotFound(entry.id))?;
        *record = DiaryRecord::from(entry);
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        let before = self.diaries.len();
        self.diaries.retain(|r| r.id != id);
        if self.diaries.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

/// All diaries in one JSON document, rewritten on every mutation.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    fn read(&self) -> Result<DiaryFile, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(serialized) => Ok(serde_json::from_str(&serialized)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("no diary file at {}, starting empty", self.path.display());
                Ok(DiaryFile::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, file: &DiaryFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate<F>(&mut self, op: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut DiaryFile) -> Result<(), StoreError>,
    {
        let mut file = self.read()?;
        op(&mut file)?;
        self.write(&file)
    }
}

impl EntryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<DiaryRecord>, StoreError> {
        Ok(self.read()?.diaries)
    }

    fn create(&mut self, entry: &DiaryEntry) -> Result<(), StoreError> {
        self.mutate(|file| file.create(entry))?;
        log::info!("created diary {} dated {}", entry.id, entry.date);
        Ok(())
    }

    fn edit(&mut self, entry: &DiaryEntry) -> Result<(), StoreError> {
        self.mutate(|file| file.edit(entry))?;
        log::info!("edited diary {}", entry.id);
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.mutate(|file| file.delete(id))?;
        log::info!("deleted diary {}", id);
        Ok(())
    }
}

/// Store kept entirely in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    file: DiaryFile,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_records(records: Vec<DiaryRecord>) -> Self {
        MemoryStore {
            file: DiaryFile { diaries: records },
        }
    }
}

#[cfg(test)]
impl EntryStore for MemoryStore {
    fn load(&self) -> Result<Vec<DiaryRecord>, StoreError> {
        Ok(self.file.diaries.clone())
    }

    fn create(&mut self, entry: &DiaryEntry) -> Result<(), StoreError> {
        self.file.create(entry)
    }

    fn edit(&mut self, entry: &DiaryEntry) -> Result<(), StoreError> {
        self.file.edit(entry)
    }

    fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.file.delete(id)
    }
}
