use crate::{
    Editor, ExerciseCatalog, HydrateError, Name, NameError, Routine, RoutineID, RoutineMetadata,
    RoutineStep, Step, Translation,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("Routine must contain at least one step")]
    NoSteps,
    #[error("Repeat groups must contain at least one step")]
    EmptyRepeat,
}

/// Routine being edited, together with its name in the editing language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutineDraft {
    pub name: String,
    pub language_code: String,
    pub editor: Editor,
}

impl RoutineDraft {
    #[must_use]
    pub fn new(language_code: &str) -> Self {
        Self {
            name: String::new(),
            language_code: language_code.to_string(),
            editor: Editor::new(),
        }
    }

    pub fn from_routine(
        routine: &Routine,
        language_code: &str,
        catalog: &impl ExerciseCatalog,
    ) -> Result<Self, HydrateError> {
        Ok(Self {
            name: routine.name(language_code).to_string(),
            language_code: language_code.to_string(),
            editor: Editor::hydrate(&routine.steps, catalog)?,
        })
    }

    /// Assembles a new routine with a fresh id and metadata.
    pub fn build(&self) -> Result<Routine, SaveError> {
        let (name, steps) = self.validate()?;
        let mut routine = Routine {
            id: RoutineID::generate(),
            translations: vec![Translation::new(&self.language_code, &name.to_string())],
            steps,
            metadata: RoutineMetadata::default(),
            is_system_routine: false,
        };
        routine.update_metadata();
        Ok(routine)
    }

    /// Rewrites the name and steps of an existing routine.
    ///
    /// The id, the translations for other languages and the descriptive metadata are kept.
    pub fn apply_to(&self, routine: &Routine) -> Result<Routine, SaveError> {
        let (name, steps) = self.validate()?;
        let mut routine = routine.clone();
        routine.set_name(&self.language_code, &name.to_string());
        routine.steps = steps;
        routine.update_metadata();
        Ok(routine)
    }

    fn validate(&self) -> Result<(Name, Vec<RoutineStep>), SaveError> {
        let name = Name::new(&self.name)?;
        if self.editor.is_empty() {
            return Err(SaveError::NoSteps);
        }
        if self
            .editor
            .items()
            .iter()
            .any(|step| matches!(step, Step::RepeatGroup { items, .. } if items.is_empty()))
        {
            return Err(SaveError::EmptyRepeat);
        }
        Ok((name, self.editor.flatten()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{ExerciseMode, RepeatCount, Reps, RestMode, StepType, Time};

    fn draft() -> RoutineDraft {
        let mut draft = RoutineDraft::new("en");
        draft.name = String::from("  Morning  ");
        draft.editor.add_exercise(
            "squat-1",
            "Squat",
            ExerciseMode::Timed(Time::new(60).unwrap()),
        );
        let group = draft.editor.start_repeat_group(RepeatCount::new(2).unwrap());
        draft.editor.add_exercise_to_group(
            group,
            "push-up",
            "Push-up",
            ExerciseMode::Reps(Reps::new(12).unwrap()),
        );
        draft
            .editor
            .add_rest_to_group(group, RestMode::Timed(Time::new(30).unwrap()));
        draft
    }

    #[test]
    fn test_build() {
        let routine = draft().build().unwrap();

        assert!(!routine.id.is_nil());
        assert_eq!(routine.translations, vec![Translation::new("en", "Morning")]);
        assert_eq!(routine.steps.len(), 2);
        assert_eq!(routine.steps[1].step_type, StepType::Repeats);
        assert_eq!(routine.total_duration(), 120);
        assert_eq!(routine.metadata.total_duration, Some(120));
        assert_eq!(routine.metadata.step_count, Some(5));
        assert!(!routine.is_system_routine);
    }

    #[rstest]
    #[case::empty_name("   ", false, SaveError::Name(NameError::Empty))]
    #[case::no_steps("Morning", false, SaveError::NoSteps)]
    #[case::empty_repeat("Morning", true, SaveError::EmptyRepeat)]
    fn test_build_invalid(
        #[case] name: &str,
        #[case] with_empty_repeat: bool,
        #[case] expected: SaveError,
    ) {
        let mut draft = RoutineDraft::new("en");
        draft.name = name.to_string();
        if with_empty_repeat {
            draft.editor.add_rest(RestMode::Open);
            draft.editor.start_repeat_group(RepeatCount::default());
        }

        assert_eq!(draft.build(), Err(expected));
    }

    #[test]
    fn test_from_routine() {
        let routine = draft().build().unwrap();
        let catalog = BTreeMap::from([(String::from("squat-1"), String::from("Kniebeuge"))]);

        let draft = RoutineDraft::from_routine(&routine, "de", &catalog).unwrap();

        assert_eq!(draft.name, "Morning");
        assert_eq!(draft.language_code, "de");
        assert_eq!(draft.editor.items()[0].display_name(), "Kniebeuge");
        assert_eq!(draft.editor.summary(), self::draft().editor.summary());
    }

    #[test]
    fn test_apply_to() {
        let mut routine = draft().build().unwrap();
        routine.set_name("de", "Morgen");
        routine.metadata.author = Some(String::from("Jo"));
        let catalog = BTreeMap::<String, String>::new();
        let mut draft = RoutineDraft::from_routine(&routine, "en", &catalog).unwrap();
        draft.name = String::from("Evening");
        draft.editor.add_rest(RestMode::Timed(Time::new(15).unwrap()));

        let applied = draft.apply_to(&routine).unwrap();

        assert_eq!(applied.id, routine.id);
        assert_eq!(
            applied.translations,
            vec![
                Translation::new("en", "Evening"),
                Translation::new("de", "Morgen")
            ]
        );
        assert_eq!(applied.steps.len(), 3);
        assert_eq!(applied.metadata.total_duration, Some(135));
        assert_eq!(applied.metadata.author, Some(String::from("Jo")));
        assert_eq!(applied.metadata.created_at, routine.metadata.created_at);
    }

    #[test]
    fn test_apply_to_rejects_invalid_draft() {
        let routine = draft().build().unwrap();
        let draft = RoutineDraft::new("en");

        assert_eq!(
            draft.apply_to(&routine),
            Err(SaveError::Name(NameError::Empty))
        );
    }
}
