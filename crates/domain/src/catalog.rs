use std::collections::BTreeMap;

use crate::Translation;

/// Resolves the display name of an exercise referenced by a routine step.
///
/// Names are resolved once when a routine is loaded into the editor. The editor keeps the
/// resolved name and never asks again.
pub trait ExerciseCatalog {
    fn exercise_name(&self, exercise_ref: &str) -> Option<String>;
}

impl ExerciseCatalog for BTreeMap<String, String> {
    fn exercise_name(&self, exercise_ref: &str) -> Option<String> {
        self.get(exercise_ref).cloned()
    }
}

impl<C: ExerciseCatalog + ?Sized> ExerciseCatalog for &C {
    fn exercise_name(&self, exercise_ref: &str) -> Option<String> {
        (**self).exercise_name(exercise_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogExercise {
    pub id: String,
    pub translations: Vec<Translation>,
}

impl CatalogExercise {
    /// Name in the given language, falling back to the first translation and then to the id.
    #[must_use]
    pub fn name(&self, language_code: &str) -> &str {
        self.translations
            .iter()
            .find(|t| t.language_code == language_code)
            .or_else(|| self.translations.first())
            .map_or(self.id.as_str(), |t| t.name.as_str())
    }
}

/// Exercise catalog bound to a display language.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    exercises: BTreeMap<String, CatalogExercise>,
    language_code: String,
}

impl Catalog {
    pub fn new(exercises: impl IntoIterator<Item = CatalogExercise>, language_code: &str) -> Self {
        Self {
            exercises: exercises.into_iter().map(|e| (e.id.clone(), e)).collect(),
            language_code: language_code.to_string(),
        }
    }

    #[must_use]
    pub fn get(&self, exercise_ref: &str) -> Option<&CatalogExercise> {
        self.exercises.get(exercise_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

impl ExerciseCatalog for Catalog {
    fn exercise_name(&self, exercise_ref: &str) -> Option<String> {
        self.get(exercise_ref)
            .map(|e| e.name(&self.language_code).to_string())
    }
}
