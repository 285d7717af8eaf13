use std::{
    collections::VecDeque,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use ::log::debug;
use routine_builder_domain as domain;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    json,
    log::{self, push_entry},
    settings::{Settings, SettingsRepository},
};

const FILE_ROUTINES: &str = "routines.json";
const FILE_EXERCISES: &str = "exercises.json";
const FILE_SETTINGS: &str = "settings.json";
const FILE_LOG: &str = "log.json";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<Error> for domain::StorageError {
    fn from(value: Error) -> Self {
        domain::StorageError::Other(Box::new(value))
    }
}

impl From<Error> for domain::ReadError {
    fn from(value: Error) -> Self {
        domain::ReadError::Storage(value.into())
    }
}

impl From<Error> for domain::CreateError {
    fn from(value: Error) -> Self {
        domain::CreateError::Storage(value.into())
    }
}

impl From<Error> for domain::UpdateError {
    fn from(value: Error) -> Self {
        domain::UpdateError::Storage(value.into())
    }
}

impl From<Error> for domain::DeleteError {
    fn from(value: Error) -> Self {
        domain::DeleteError::Storage(value.into())
    }
}

/// Storage backed by JSON files in a single directory.
///
/// A file that does not exist yet reads as the default value. Reading and writing files does not
/// log, as the log itself is stored here.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T, Error> {
        let path = self.dir.join(file);
        match fs::read(&path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| Error::Json { path, source })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(source) => Err(Error::Io { path, source }),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), Error> {
        let path = self.dir.join(file);
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| Error::Json {
            path: path.clone(),
            source,
        })?;
        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, bytes).map_err(|source| Error::Io { path, source })
    }

    fn read_json_routines(&self) -> Result<Vec<json::Routine>, Error> {
        self.read(FILE_ROUTINES)
    }

    /// Loads the exercise catalog, resolving names in the given language.
    pub fn read_catalog(&self, language_code: &str) -> Result<domain::Catalog, domain::ReadError> {
        let exercises: Vec<json::Exercise> = self.read(FILE_EXERCISES)?;
        Ok(domain::Catalog::new(
            exercises.into_iter().map(domain::CatalogExercise::from),
            language_code,
        ))
    }

    /// Adds routines shipped with the application, skipping ids that are already stored.
    pub fn import_routines(
        &self,
        routines: Vec<domain::Routine>,
    ) -> Result<usize, domain::CreateError> {
        let mut stored = self.read_json_routines()?;
        let mut imported = 0;
        for routine in routines {
            if stored.iter().any(|r| r.id == *routine.id) {
                continue;
            }
            stored.push(routine.into());
            imported += 1;
        }
        self.write(FILE_ROUTINES, &stored)?;
        debug!("imported {imported} routines");
        Ok(imported)
    }
}

impl domain::RoutineRepository for FileStorage {
    async fn read_routines(&self) -> Result<Vec<domain::Routine>, domain::ReadError> {
        Ok(self
            .read_json_routines()?
            .into_iter()
            .map(domain::Routine::from)
            .collect())
    }

    async fn create_routine(
        &self,
        routine: domain::Routine,
    ) -> Result<domain::Routine, domain::CreateError> {
        let mut routines = self.read_json_routines()?;
        if routines.iter().any(|r| r.id == *routine.id) {
            return Err(domain::CreateError::Conflict);
        }
        routines.push(routine.clone().into());
        self.write(FILE_ROUTINES, &routines)?;
        Ok(routine)
    }

    async fn replace_routine(
        &self,
        routine: domain::Routine,
    ) -> Result<domain::Routine, domain::UpdateError> {
        let mut routines = self.read_json_routines()?;
        let Some(stored) = routines.iter_mut().find(|r| r.id == *routine.id) else {
            return Err(domain::UpdateError::NotFound);
        };
        if stored.is_system_routine {
            return Err(domain::StorageError::ReadOnly.into());
        }
        *stored = routine.clone().into();
        self.write(FILE_ROUTINES, &routines)?;
        Ok(routine)
    }

    async fn delete_routine(
        &self,
        id: domain::RoutineID,
    ) -> Result<domain::RoutineID, domain::DeleteError> {
        let mut routines = self.read_json_routines()?;
        let Some(index) = routines.iter().position(|r| r.id == *id) else {
            return Err(domain::DeleteError::NotFound);
        };
        if routines[index].is_system_routine {
            return Err(domain::StorageError::ReadOnly.into());
        }
        routines.remove(index);
        self.write(FILE_ROUTINES, &routines)?;
        Ok(id)
    }
}

impl SettingsRepository for FileStorage {
    async fn read_settings(&self) -> Result<Settings, String> {
        self.read(FILE_SETTINGS).map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        self.write(FILE_SETTINGS, &settings)
            .map_err(|err| err.to_string())
    }
}

impl log::Repository for FileStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.read(FILE_LOG)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        push_entry(&mut entries, entry);
        self.write(FILE_LOG, &entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
