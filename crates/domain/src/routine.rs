use chrono::{DateTime, Utc};
use derive_more::{Deref, Into};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{CreateError, DeleteError, ReadError, UpdateError, aggregate};

pub const UNNAMED_ROUTINE: &str = "Unnamed Routine";

#[allow(async_fn_in_trait)]
pub trait RoutineService {
    async fn get_routines(&self) -> Result<Vec<Routine>, ReadError>;
    async fn create_routine(&self, routine: Routine) -> Result<Routine, CreateError>;
    async fn replace_routine(&self, routine: Routine) -> Result<Routine, UpdateError>;
    async fn delete_routine(&self, id: RoutineID) -> Result<RoutineID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait RoutineRepository {
    async fn read_routines(&self) -> Result<Vec<Routine>, ReadError>;
    async fn create_routine(&self, routine: Routine) -> Result<Routine, CreateError>;
    async fn replace_routine(&self, routine: Routine) -> Result<Routine, UpdateError>;
    async fn delete_routine(&self, id: RoutineID) -> Result<RoutineID, DeleteError>;
}

/// Persisted form of a routine.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub id: RoutineID,
    pub translations: Vec<Translation>,
    pub steps: Vec<RoutineStep>,
    pub metadata: RoutineMetadata,
    pub is_system_routine: bool,
}

impl Routine {
    /// Name in the given language, falling back to the first translation.
    #[must_use]
    pub fn name(&self, language_code: &str) -> &str {
        self.translation(language_code)
            .or_else(|| self.translations.first())
            .map_or(UNNAMED_ROUTINE, |t| t.name.as_str())
    }

    #[must_use]
    pub fn translation(&self, language_code: &str) -> Option<&Translation> {
        self.translations
            .iter()
            .find(|t| t.language_code == language_code)
    }

    /// Sets the name for a language, replacing an existing translation of that language.
    pub fn set_name(&mut self, language_code: &str, name: &str) {
        match self
            .translations
            .iter_mut()
            .find(|t| t.language_code == language_code)
        {
            Some(translation) => name.clone_into(&mut translation.name),
            None => self.translations.push(Translation::new(language_code, name)),
        }
    }

    #[must_use]
    pub fn total_duration(&self) -> u32 {
        aggregate::total_duration(&self.steps)
    }

    #[must_use]
    pub fn exercise_count(&self) -> u32 {
        aggregate::exercise_count(&self.steps)
    }

    #[must_use]
    pub fn step_count(&self) -> u32 {
        aggregate::step_count(&self.steps)
    }

    /// Recomputes the cached aggregates and marks the routine as updated.
    pub fn update_metadata(&mut self) {
        self.metadata.step_count = Some(self.step_count());
        self.metadata.total_duration = Some(self.total_duration());
        self.metadata.updated_at = Utc::now();
    }
}

/// Identifier of a routine.
///
/// Routines created by the user get a random UUID. Bundled routines keep the id given in the
/// catalog file, which can be any non-empty string.
#[derive(Deref, Into, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoutineID(String);

impl RoutineID {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for RoutineID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RoutineID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub language_code: String,
    pub name: String,
}

impl Translation {
    #[must_use]
    pub fn new(language_code: &str, name: &str) -> Self {
        Self {
            language_code: language_code.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum StepType {
    Exercise,
    Rest,
    Repeats,
}

/// Flat, order-indexed encoding of a step.
///
/// `order` is 1-based and restarts at every nesting level. The type does not prevent nesting a
/// repeat inside a repeat, such input is rejected when it is hydrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineStep {
    pub step_type: StepType,
    pub exercise_ref: Option<String>,
    pub duration: u32,
    pub count: Option<u32>,
    pub nested_steps: Option<Vec<RoutineStep>>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutineMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<String>,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub equipment: Vec<String>,
    pub target_muscles: Vec<String>,
    pub author: Option<String>,
    pub step_count: Option<u32>,
    pub total_duration: Option<u32>,
}

impl Default for RoutineMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            categories: vec![],
            difficulty: String::new(),
            tags: vec![],
            equipment: vec![],
            target_muscles: vec![],
            author: None,
            step_count: None,
            total_duration: None,
        }
    }
}

impl RoutineMetadata {
    /// Cached aggregates, if both have been computed.
    ///
    /// The values are a snapshot taken when the routine was saved. Editing contexts should
    /// recompute instead.
    #[must_use]
    pub fn cached_summary(&self) -> Option<(u32, u32)> {
        Some((self.step_count?, self.total_duration?))
    }
}
