use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::{Display, Into};
use thiserror::Error;

static NEXT_STEP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a node in the editor tree.
///
/// Identifiers are minted from a process-wide counter and never reused. They carry no
/// positional information and are not part of the persisted routine.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("#{_0}")]
pub struct StepId(u64);

impl StepId {
    #[must_use]
    pub fn generate() -> Self {
        Self(NEXT_STEP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u32);

impl Time {
    pub const MAX: u32 = 86_400;

    pub fn new(value: u32) -> Result<Self, TimeError> {
        if !(1..=Self::MAX).contains(&value) {
            return Err(TimeError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Time {
    type Error = TimeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Time::new(parsed_value),
            Err(_) => Err(TimeError::ParseError),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Time must be in the range 1 to 86400 s")]
    OutOfRange,
    #[error("Time must be an integer")]
    ParseError,
}

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(1..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepsError {
    #[error("Reps must be in the range 1 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Number of times a repeat group is replayed. A repeat of one is not a repeat.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepeatCount(u32);

impl RepeatCount {
    pub const MIN: u32 = 2;
    pub const MAX: u32 = 99;

    pub fn new(value: u32) -> Result<Self, RepeatCountError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(RepeatCountError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// Clamps arbitrary user input into the valid range.
    #[must_use]
    pub fn saturating(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<&str> for RepeatCount {
    type Error = RepeatCountError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => RepeatCount::new(parsed_value),
            Err(_) => Err(RepeatCountError::ParseError),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepeatCountError {
    #[error("Repeat count must be in the range 2 to 99")]
    OutOfRange,
    #[error("Repeat count must be an integer")]
    ParseError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseMode {
    Timed(Time),
    Reps(Reps),
    Open,
}

impl ExerciseMode {
    #[must_use]
    pub fn seconds(&self) -> u32 {
        match self {
            ExerciseMode::Timed(time) => u32::from(*time),
            ExerciseMode::Reps(_) | ExerciseMode::Open => 0,
        }
    }

    #[must_use]
    pub fn reps(&self) -> Option<u32> {
        match self {
            ExerciseMode::Reps(reps) => Some(u32::from(*reps)),
            ExerciseMode::Timed(_) | ExerciseMode::Open => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestMode {
    Timed(Time),
    Open,
}

impl RestMode {
    #[must_use]
    pub fn seconds(&self) -> u32 {
        match self {
            RestMode::Timed(time) => u32::from(*time),
            RestMode::Open => 0,
        }
    }
}

/// Replacement mode for a leaf. The variant must match the kind of leaf it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    Exercise(ExerciseMode),
    Rest(RestMode),
}

impl From<ExerciseMode> for StepMode {
    fn from(value: ExerciseMode) -> Self {
        StepMode::Exercise(value)
    }
}

impl From<RestMode> for StepMode {
    fn from(value: RestMode) -> Self {
        StepMode::Rest(value)
    }
}

pub const REST_NAME: &str = "Rest";

/// A top-level item of a routine.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Exercise {
        id: StepId,
        exercise_ref: String,
        name: String,
        mode: ExerciseMode,
    },
    Rest {
        id: StepId,
        mode: RestMode,
    },
    RepeatGroup {
        id: StepId,
        repeat_count: RepeatCount,
        items: Vec<RepeatItem>,
    },
}

impl Step {
    #[must_use]
    pub fn id(&self) -> StepId {
        match self {
            Step::Exercise { id, .. } | Step::Rest { id, .. } | Step::RepeatGroup { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Step::Exercise { name, .. } => name.clone(),
            Step::Rest { .. } => REST_NAME.to_string(),
            Step::RepeatGroup { repeat_count, .. } => format!("Repeat {repeat_count}x"),
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Step::RepeatGroup { .. })
    }

    /// A step is valid if it is a leaf or a repeat group holding at least one item.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Step::Exercise { .. } | Step::Rest { .. } => true,
            Step::RepeatGroup { items, .. } => !items.is_empty(),
        }
    }

    /// Clone of this step in which every node carries a freshly minted identifier.
    #[must_use]
    pub fn with_fresh_ids(&self) -> Self {
        match self {
            Step::Exercise {
                exercise_ref,
                name,
                mode,
                ..
            } => Step::Exercise {
                id: StepId::generate(),
                exercise_ref: exercise_ref.clone(),
                name: name.clone(),
                mode: *mode,
            },
            Step::Rest { mode, .. } => Step::Rest {
                id: StepId::generate(),
                mode: *mode,
            },
            Step::RepeatGroup {
                repeat_count,
                items,
                ..
            } => Step::RepeatGroup {
                id: StepId::generate(),
                repeat_count: *repeat_count,
                items: items.iter().map(RepeatItem::with_fresh_id).collect(),
            },
        }
    }

    /// Compares two steps ignoring identifiers.
    #[must_use]
    pub fn structurally_eq(&self, other: &Step) -> bool {
        match (self, other) {
            (
                Step::RepeatGroup {
                    repeat_count: a_count,
                    items: a_items,
                    ..
                },
                Step::RepeatGroup {
                    repeat_count: b_count,
                    items: b_items,
                    ..
                },
            ) => {
                a_count == b_count
                    && a_items.len() == b_items.len()
                    && a_items
                        .iter()
                        .zip(b_items)
                        .all(|(a, b)| a.structurally_eq(b))
            }
            (Step::RepeatGroup { .. }, _) | (_, Step::RepeatGroup { .. }) => false,
            (a, b) => match (RepeatItem::try_from(a.clone()), RepeatItem::try_from(b.clone())) {
                (Ok(a), Ok(b)) => a.structurally_eq(&b),
                _ => false,
            },
        }
    }

    /// Replaces the mode of a leaf if the mode matches its kind. Groups have no mode.
    pub fn set_mode(&mut self, new_mode: StepMode) -> bool {
        match (self, new_mode) {
            (Step::Exercise { mode, .. }, StepMode::Exercise(new_mode)) => {
                *mode = new_mode;
                true
            }
            (Step::Rest { mode, .. }, StepMode::Rest(new_mode)) => {
                *mode = new_mode;
                true
            }
            _ => false,
        }
    }

    /// Identifiers of this step and all nodes contained in it.
    pub fn ids(&self) -> impl Iterator<Item = StepId> + '_ {
        let nested: &[RepeatItem] = match self {
            Step::RepeatGroup { items, .. } => items,
            Step::Exercise { .. } | Step::Rest { .. } => &[],
        };
        std::iter::once(self.id()).chain(nested.iter().map(RepeatItem::id))
    }
}

/// A leaf contained in a repeat group. Repeat groups cannot be nested.
#[derive(Debug, Clone, PartialEq)]
pub enum RepeatItem {
    Exercise {
        id: StepId,
        exercise_ref: String,
        name: String,
        mode: ExerciseMode,
    },
    Rest {
        id: StepId,
        mode: RestMode,
    },
}

impl RepeatItem {
    #[must_use]
    pub fn id(&self) -> StepId {
        match self {
            RepeatItem::Exercise { id, .. } | RepeatItem::Rest { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            RepeatItem::Exercise { name, .. } => name.clone(),
            RepeatItem::Rest { .. } => REST_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_fresh_id(&self) -> Self {
        match self {
            RepeatItem::Exercise {
                exercise_ref,
                name,
                mode,
                ..
            } => RepeatItem::Exercise {
                id: StepId::generate(),
                exercise_ref: exercise_ref.clone(),
                name: name.clone(),
                mode: *mode,
            },
            RepeatItem::Rest { mode, .. } => RepeatItem::Rest {
                id: StepId::generate(),
                mode: *mode,
            },
        }
    }

    #[must_use]
    pub fn structurally_eq(&self, other: &RepeatItem) -> bool {
        match (self, other) {
            (
                RepeatItem::Exercise {
                    exercise_ref: a_ref,
                    name: a_name,
                    mode: a_mode,
                    ..
                },
                RepeatItem::Exercise {
                    exercise_ref: b_ref,
                    name: b_name,
                    mode: b_mode,
                    ..
                },
            ) => a_ref == b_ref && a_name == b_name && a_mode == b_mode,
            (RepeatItem::Rest { mode: a_mode, .. }, RepeatItem::Rest { mode: b_mode, .. }) => {
                a_mode == b_mode
            }
            _ => false,
        }
    }

    /// Replaces the mode if it matches the kind of this leaf. Returns whether it was applied.
    pub fn set_mode(&mut self, new_mode: StepMode) -> bool {
        match (self, new_mode) {
            (RepeatItem::Exercise { mode, .. }, StepMode::Exercise(new_mode)) => {
                *mode = new_mode;
                true
            }
            (RepeatItem::Rest { mode, .. }, StepMode::Rest(new_mode)) => {
                *mode = new_mode;
                true
            }
            _ => false,
        }
    }
}

impl From<RepeatItem> for Step {
    fn from(value: RepeatItem) -> Self {
        match value {
            RepeatItem::Exercise {
                id,
                exercise_ref,
                name,
                mode,
            } => Step::Exercise {
                id,
                exercise_ref,
                name,
                mode,
            },
            RepeatItem::Rest { id, mode } => Step::Rest { id, mode },
        }
    }
}

impl TryFrom<Step> for RepeatItem {
    type Error = NestingError;

    fn try_from(value: Step) -> Result<Self, Self::Error> {
        match value {
            Step::Exercise {
                id,
                exercise_ref,
                name,
                mode,
            } => Ok(RepeatItem::Exercise {
                id,
                exercise_ref,
                name,
                mode,
            }),
            Step::Rest { id, mode } => Ok(RepeatItem::Rest { id, mode }),
            Step::RepeatGroup { .. } => Err(NestingError),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("repeat groups cannot be nested")]
pub struct NestingError;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_step_id_generate_is_unique() {
        let ids = (0..100).map(|_| StepId::generate()).collect::<Vec<_>>();
        let mut deduplicated = ids.clone();
        deduplicated.sort();
        deduplicated.dedup();
        assert_eq!(deduplicated.len(), ids.len());
    }

    #[rstest]
    #[case("30", Ok(Time(30)))]
    #[case(" 86400 ", Ok(Time(86_400)))]
    #[case("0", Err(TimeError::OutOfRange))]
    #[case("86401", Err(TimeError::OutOfRange))]
    #[case("1.5", Err(TimeError::ParseError))]
    fn test_time_try_from(#[case] value: &str, #[case] expected: Result<Time, TimeError>) {
        assert_eq!(Time::try_from(value), expected);
    }

    #[rstest]
    #[case("10", Ok(Reps(10)))]
    #[case("0", Err(RepsError::OutOfRange))]
    #[case("1000", Err(RepsError::OutOfRange))]
    #[case("", Err(RepsError::ParseError))]
    fn test_reps_try_from(#[case] value: &str, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::try_from(value), expected);
    }

    #[rstest]
    #[case("2", Ok(RepeatCount(2)))]
    #[case("99", Ok(RepeatCount(99)))]
    #[case("1", Err(RepeatCountError::OutOfRange))]
    #[case("100", Err(RepeatCountError::OutOfRange))]
    #[case("x", Err(RepeatCountError::ParseError))]
    fn test_repeat_count_try_from(
        #[case] value: &str,
        #[case] expected: Result<RepeatCount, RepeatCountError>,
    ) {
        assert_eq!(RepeatCount::try_from(value), expected);
    }

    #[rstest]
    #[case(0, 2)]
    #[case(1, 2)]
    #[case(5, 5)]
    #[case(500, 99)]
    fn test_repeat_count_saturating(#[case] value: u32, #[case] expected: u32) {
        assert_eq!(u32::from(RepeatCount::saturating(value)), expected);
    }

    #[test]
    fn test_display_name() {
        let exercise = Step::Exercise {
            id: StepId::generate(),
            exercise_ref: String::from("squat-1"),
            name: String::from("Squat"),
            mode: ExerciseMode::Open,
        };
        let rest = Step::Rest {
            id: StepId::generate(),
            mode: RestMode::Open,
        };
        let group = Step::RepeatGroup {
            id: StepId::generate(),
            repeat_count: RepeatCount::new(3).unwrap(),
            items: vec![],
        };

        assert_eq!(exercise.display_name(), "Squat");
        assert_eq!(rest.display_name(), "Rest");
        assert_eq!(group.display_name(), "Repeat 3x");
    }

    #[test]
    fn test_with_fresh_ids() {
        let group = Step::RepeatGroup {
            id: StepId::generate(),
            repeat_count: RepeatCount::new(3).unwrap(),
            items: vec![
                RepeatItem::Exercise {
                    id: StepId::generate(),
                    exercise_ref: String::from("push-up"),
                    name: String::from("Push-up"),
                    mode: ExerciseMode::Reps(Reps::new(10).unwrap()),
                },
                RepeatItem::Rest {
                    id: StepId::generate(),
                    mode: RestMode::Timed(Time::new(15).unwrap()),
                },
            ],
        };

        let copy = group.with_fresh_ids();

        assert!(copy.structurally_eq(&group));
        assert_ne!(copy, group);
        assert!(copy.ids().all(|id| group.ids().all(|other| other != id)));
    }

    #[test]
    fn test_structurally_eq_detects_differences() {
        let a = RepeatItem::Rest {
            id: StepId::generate(),
            mode: RestMode::Open,
        };
        let b = RepeatItem::Rest {
            id: StepId::generate(),
            mode: RestMode::Timed(Time::new(10).unwrap()),
        };

        assert!(!a.structurally_eq(&b));
        assert!(!Step::from(a.clone()).structurally_eq(&Step::from(b)));
        assert!(Step::from(a.clone()).structurally_eq(&Step::from(a.with_fresh_id())));
    }

    #[test]
    fn test_repeat_item_from_group_is_rejected() {
        let group = Step::RepeatGroup {
            id: StepId::generate(),
            repeat_count: RepeatCount::default(),
            items: vec![],
        };

        assert_eq!(RepeatItem::try_from(group), Err(NestingError));
    }

    #[test]
    fn test_set_mode_requires_matching_kind() {
        let mut rest = RepeatItem::Rest {
            id: StepId::generate(),
            mode: RestMode::Open,
        };

        assert!(!rest.set_mode(StepMode::Exercise(ExerciseMode::Open)));
        assert!(rest.set_mode(StepMode::Rest(RestMode::Timed(Time::new(20).unwrap()))));
        assert!(matches!(rest, RepeatItem::Rest { mode: RestMode::Timed(_), .. }));
    }
}
