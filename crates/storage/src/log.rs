use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};

pub const MAX_ENTRIES: usize = 100;

pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

static LOGGER: Logger = Logger::new();

/// Routes all log records up to the given level to the repository.
///
/// Returns an error if the logger has already been initialized.
pub fn init(
    repository: Arc<Mutex<dyn Repository>>,
    level: LevelFilter,
) -> Result<(), SetLoggerError> {
    LOGGER.attach(repository);
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

struct Logger {
    repository: Mutex<Option<Arc<Mutex<dyn Repository>>>>,
}

impl Logger {
    const fn new() -> Self {
        Self {
            repository: Mutex::new(None),
        }
    }

    fn attach(&self, repository: Arc<Mutex<dyn Repository>>) {
        if let Ok(mut current) = self.repository.lock() {
            *current = Some(repository);
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(current) = self.repository.lock() {
            if let Some(ref repository) = *current {
                if let Ok(repository) = repository.lock() {
                    let _ = repository.write_entry(Entry {
                        time: Utc::now().format("%b %d %H:%M:%S").to_string(),
                        level: record.level(),
                        message: record.args().to_string(),
                    });
                }
            }
        }
    }

    fn flush(&self) {}
}

/// Prepends an entry and drops the oldest ones beyond the retention limit.
pub fn push_entry(entries: &mut VecDeque<Entry>, entry: Entry) {
    entries.push_front(entry);
    entries.truncate(MAX_ENTRIES);
}

#[cfg(test)]
mod tests {
    use log::Log;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Memory(Mutex<VecDeque<Entry>>);

    impl Repository for Memory {
        fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
            self.0
                .lock()
                .map(|entries| entries.clone())
                .map_err(|err| Error::Unknown(err.to_string()))
        }

        fn write_entry(&self, entry: Entry) -> Result<(), Error> {
            let mut entries = self
                .0
                .lock()
                .map_err(|err| Error::Unknown(err.to_string()))?;
            push_entry(&mut entries, entry);
            Ok(())
        }
    }

    fn entry(message: &str) -> Entry {
        Entry {
            time: String::from("Jan 01 00:00:00"),
            level: Level::Info,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_push_entry() {
        let mut entries = VecDeque::new();

        for i in 0..105 {
            push_entry(&mut entries, entry(&i.to_string()));
        }

        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries.front(), Some(&entry("104")));
        assert_eq!(entries.back(), Some(&entry("5")));
    }

    #[test]
    fn test_entry_serde() {
        let entry = Entry {
            level: Level::Warn,
            ..entry("drop rejected")
        };

        let serialized = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            serialized,
            serde_json::json!({
                "time": "Jan 01 00:00:00",
                "level": "Warn",
                "message": "drop rejected"
            })
        );
        assert_eq!(serde_json::from_value::<Entry>(serialized).unwrap(), entry);
    }

    #[test]
    fn test_logger() {
        let memory = Arc::new(Mutex::new(Memory::default()));
        let logger = Logger::new();
        logger.attach(memory.clone());

        logger.log(
            &Record::builder()
                .args(format_args!("unknown step #7"))
                .level(Level::Debug)
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("drop rejected"))
                .level(Level::Warn)
                .build(),
        );

        let entries = memory.lock().unwrap().read_entries().unwrap();
        assert_eq!(
            entries
                .iter()
                .map(|e| (e.level, e.message.as_str()))
                .collect::<Vec<_>>(),
            vec![(Level::Warn, "drop rejected"), (Level::Debug, "unknown step #7")]
        );
    }

    #[test]
    fn test_logger_without_repository() {
        Logger::new().log(
            &Record::builder()
                .args(format_args!("dropped"))
                .level(Level::Error)
                .build(),
        );
    }
}
