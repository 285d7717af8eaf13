use log::{debug, warn};

use crate::{
    Editor, ExerciseCatalog, ExerciseMode, RepeatCount, RepeatCountError, RepeatItem, Reps,
    RepsError, RestMode, RoutineStep, Step, StepId, StepType, Time, TimeError,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HydrateError {
    #[error("repeat at position {0} contains a nested repeat")]
    NestedRepeat(u32),
    #[error("repeat at position {0} contains no steps")]
    EmptyRepeat(u32),
    #[error("repeat at position {0} has no repeat count")]
    MissingRepeatCount(u32),
    #[error("repeat at position {order}: {source}")]
    InvalidRepeatCount {
        order: u32,
        #[source]
        source: RepeatCountError,
    },
    #[error("exercise at position {0} has no exercise reference")]
    MissingExercise(u32),
    #[error("step at position {order}: {source}")]
    InvalidTime {
        order: u32,
        #[source]
        source: TimeError,
    },
    #[error("step at position {order}: {source}")]
    InvalidReps {
        order: u32,
        #[source]
        source: RepsError,
    },
}

/// Converts the editor tree into the persisted step list.
///
/// `order` is assigned 1-based per level. Empty repeat groups are flattened as they are, so
/// callers that want to block saving them have to check beforehand.
#[must_use]
pub fn flatten(items: &[Step]) -> Vec<RoutineStep> {
    (1..)
        .zip(items)
        .map(|(order, step)| match step {
            Step::Exercise {
                exercise_ref, mode, ..
            } => exercise_step(exercise_ref, *mode, order),
            Step::Rest { mode, .. } => rest_step(*mode, order),
            Step::RepeatGroup {
                repeat_count,
                items,
                ..
            } => RoutineStep {
                step_type: StepType::Repeats,
                exercise_ref: None,
                duration: 0,
                count: Some(u32::from(*repeat_count)),
                nested_steps: Some(flatten_items(items)),
                order,
            },
        })
        .collect()
}

fn flatten_items(items: &[RepeatItem]) -> Vec<RoutineStep> {
    (1..)
        .zip(items)
        .map(|(order, item)| match item {
            RepeatItem::Exercise {
                exercise_ref, mode, ..
            } => exercise_step(exercise_ref, *mode, order),
            RepeatItem::Rest { mode, .. } => rest_step(*mode, order),
        })
        .collect()
}

fn exercise_step(exercise_ref: &str, mode: ExerciseMode, order: u32) -> RoutineStep {
    RoutineStep {
        step_type: StepType::Exercise,
        exercise_ref: Some(exercise_ref.to_string()),
        duration: mode.seconds(),
        count: mode.reps(),
        nested_steps: None,
        order,
    }
}

fn rest_step(mode: RestMode, order: u32) -> RoutineStep {
    RoutineStep {
        step_type: StepType::Rest,
        exercise_ref: None,
        duration: mode.seconds(),
        count: None,
        nested_steps: None,
        order,
    }
}

/// Reconstructs the editor tree from a persisted step list.
///
/// Each level is sorted by `order` first. Every node gets a fresh identifier. Exercise names are
/// resolved through the catalog, falling back to the exercise reference. Malformed input is
/// rejected as a whole.
pub fn hydrate(
    steps: &[RoutineStep],
    catalog: &impl ExerciseCatalog,
) -> Result<Vec<Step>, HydrateError> {
    sorted(steps)
        .into_iter()
        .map(|step| match step.step_type {
            StepType::Exercise | StepType::Rest => hydrate_leaf(step, catalog).map(Step::from),
            StepType::Repeats => hydrate_group(step, catalog),
        })
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|err| warn!("failed to hydrate routine: {err}"))
}

fn sorted(steps: &[RoutineStep]) -> Vec<&RoutineStep> {
    let mut sorted = steps.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|step| step.order);
    sorted
}

fn hydrate_group(
    step: &RoutineStep,
    catalog: &impl ExerciseCatalog,
) -> Result<Step, HydrateError> {
    let order = step.order;
    let count = step.count.ok_or(HydrateError::MissingRepeatCount(order))?;
    let repeat_count = RepeatCount::new(count)
        .map_err(|source| HydrateError::InvalidRepeatCount { order, source })?;
    let nested_steps = match &step.nested_steps {
        Some(nested_steps) if !nested_steps.is_empty() => nested_steps,
        _ => return Err(HydrateError::EmptyRepeat(order)),
    };
    if nested_steps
        .iter()
        .any(|nested| nested.step_type == StepType::Repeats)
    {
        return Err(HydrateError::NestedRepeat(order));
    }
    Ok(Step::RepeatGroup {
        id: StepId::generate(),
        repeat_count,
        items: sorted(nested_steps)
            .into_iter()
            .map(|nested| hydrate_leaf(nested, catalog))
            .collect::<Result<_, _>>()?,
    })
}

fn hydrate_leaf(
    step: &RoutineStep,
    catalog: &impl ExerciseCatalog,
) -> Result<RepeatItem, HydrateError> {
    let order = step.order;
    match step.step_type {
        StepType::Exercise => {
            let exercise_ref = step
                .exercise_ref
                .clone()
                .ok_or(HydrateError::MissingExercise(order))?;
            let name = catalog.exercise_name(&exercise_ref).unwrap_or_else(|| {
                debug!("no catalog entry for exercise {exercise_ref}");
                exercise_ref.clone()
            });
            let mode = match (step.count, step.duration) {
                (Some(count), _) => ExerciseMode::Reps(
                    Reps::new(count).map_err(|source| HydrateError::InvalidReps { order, source })?,
                ),
                (None, 0) => ExerciseMode::Open,
                (None, duration) => ExerciseMode::Timed(time(duration, order)?),
            };
            Ok(RepeatItem::Exercise {
                id: StepId::generate(),
                exercise_ref,
                name,
                mode,
            })
        }
        StepType::Rest => Ok(RepeatItem::Rest {
            id: StepId::generate(),
            mode: match step.duration {
                0 => RestMode::Open,
                duration => RestMode::Timed(time(duration, order)?),
            },
        }),
        StepType::Repeats => Err(HydrateError::NestedRepeat(order)),
    }
}

fn time(duration: u32, order: u32) -> Result<Time, HydrateError> {
    Time::new(duration).map_err(|source| HydrateError::InvalidTime { order, source })
}

impl Editor {
    pub fn hydrate(
        steps: &[RoutineStep],
        catalog: &impl ExerciseCatalog,
    ) -> Result<Self, HydrateError> {
        hydrate(steps, catalog).map(Editor::from_items)
    }

    #[must_use]
    pub fn flatten(&self) -> Vec<RoutineStep> {
        flatten(self.items())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn catalog() -> BTreeMap<String, String> {
        BTreeMap::from([
            (String::from("squat-1"), String::from("Squat")),
            (String::from("push-up"), String::from("Push-up")),
        ])
    }

    fn leaf(
        step_type: StepType,
        exercise_ref: Option<&str>,
        duration: u32,
        count: Option<u32>,
        order: u32,
    ) -> RoutineStep {
        RoutineStep {
            step_type,
            exercise_ref: exercise_ref.map(str::to_string),
            duration,
            count,
            nested_steps: None,
            order,
        }
    }

    fn repeats(
        count: Option<u32>,
        nested_steps: Option<Vec<RoutineStep>>,
        order: u32,
    ) -> RoutineStep {
        RoutineStep {
            step_type: StepType::Repeats,
            exercise_ref: None,
            duration: 0,
            count,
            nested_steps,
            order,
        }
    }

    fn editor() -> Editor {
        let mut editor = Editor::new();
        editor.add_exercise("squat-1", "Squat", ExerciseMode::Timed(Time::new(30).unwrap()));
        editor.add_rest(RestMode::Open);
        let group = editor.start_repeat_group(RepeatCount::new(3).unwrap());
        editor.add_exercise_to_group(
            group,
            "push-up",
            "Push-up",
            ExerciseMode::Reps(Reps::new(10).unwrap()),
        );
        editor.add_rest_to_group(group, RestMode::Timed(Time::new(15).unwrap()));
        editor.add_exercise("plank", "plank", ExerciseMode::Open);
        editor
    }

    #[test]
    fn test_flatten() {
        assert_eq!(
            editor().flatten(),
            vec![
                leaf(StepType::Exercise, Some("squat-1"), 30, None, 1),
                leaf(StepType::Rest, None, 0, None, 2),
                repeats(
                    Some(3),
                    Some(vec![
                        leaf(StepType::Exercise, Some("push-up"), 0, Some(10), 1),
                        leaf(StepType::Rest, None, 15, None, 2),
                    ]),
                    3
                ),
                leaf(StepType::Exercise, Some("plank"), 0, None, 4),
            ]
        );
    }

    #[test]
    fn test_flatten_empty() {
        assert_eq!(flatten(&[]), vec![]);
    }

    #[test]
    fn test_round_trip() {
        let editor = editor();

        let hydrated = Editor::hydrate(&editor.flatten(), &catalog()).unwrap();

        assert_eq!(hydrated.items().len(), editor.items().len());
        assert!(
            hydrated
                .items()
                .iter()
                .zip(editor.items())
                .all(|(a, b)| a.structurally_eq(b))
        );
        assert!(
            hydrated
                .items()
                .iter()
                .flat_map(Step::ids)
                .all(|id| !editor.contains(id))
        );
        assert_eq!(hydrated.summary(), editor.summary());
        assert!(hydrated.is_well_formed());
    }

    #[test]
    fn test_hydrate_sorts_by_order() {
        let steps = vec![
            leaf(StepType::Rest, None, 20, None, 3),
            repeats(
                Some(2),
                Some(vec![
                    leaf(StepType::Rest, None, 0, None, 2),
                    leaf(StepType::Exercise, Some("push-up"), 0, Some(8), 1),
                ]),
                2,
            ),
            leaf(StepType::Exercise, Some("squat-1"), 45, None, 1),
        ];

        let items = hydrate(&steps, &catalog()).unwrap();

        assert!(matches!(
            &items[0],
            Step::Exercise { name, mode: ExerciseMode::Timed(_), .. } if name == "Squat"
        ));
        assert!(matches!(
            &items[1],
            Step::RepeatGroup { items, .. } if matches!(
                items.as_slice(),
                [RepeatItem::Exercise { .. }, RepeatItem::Rest { mode: RestMode::Open, .. }]
            )
        ));
        assert!(matches!(
            &items[2],
            Step::Rest {
                mode: RestMode::Timed(_),
                ..
            }
        ));
    }

    #[test]
    fn test_hydrate_unknown_exercise_uses_reference() {
        let items = hydrate(
            &[leaf(StepType::Exercise, Some("lunge"), 0, None, 1)],
            &catalog(),
        )
        .unwrap();

        assert_eq!(items[0].display_name(), "lunge");
    }

    #[test]
    fn test_hydrate_empty() {
        assert_eq!(hydrate(&[], &catalog()), Ok(vec![]));
    }

    #[rstest]
    #[case::nested_repeat(
        repeats(Some(2), Some(vec![repeats(Some(2), Some(vec![leaf(StepType::Rest, None, 10, None, 1)]), 1)]), 1),
        HydrateError::NestedRepeat(1)
    )]
    #[case::empty_repeat(repeats(Some(2), Some(vec![]), 1), HydrateError::EmptyRepeat(1))]
    #[case::missing_nested_steps(repeats(Some(2), None, 2), HydrateError::EmptyRepeat(2))]
    #[case::missing_count(
        repeats(None, Some(vec![leaf(StepType::Rest, None, 10, None, 1)]), 1),
        HydrateError::MissingRepeatCount(1)
    )]
    #[case::repeat_of_one(
        repeats(Some(1), Some(vec![leaf(StepType::Rest, None, 10, None, 1)]), 1),
        HydrateError::InvalidRepeatCount { order: 1, source: RepeatCountError::OutOfRange }
    )]
    #[case::missing_exercise(leaf(StepType::Exercise, None, 10, None, 4), HydrateError::MissingExercise(4))]
    #[case::zero_reps(
        leaf(StepType::Exercise, Some("squat-1"), 0, Some(0), 1),
        HydrateError::InvalidReps { order: 1, source: RepsError::OutOfRange }
    )]
    #[case::excessive_time(
        leaf(StepType::Rest, None, 100_000, None, 1),
        HydrateError::InvalidTime { order: 1, source: TimeError::OutOfRange }
    )]
    fn test_hydrate_rejects_malformed_input(
        #[case] step: RoutineStep,
        #[case] expected: HydrateError,
    ) {
        assert_eq!(hydrate(&[step], &catalog()), Err(expected));
    }

    #[test]
    fn test_hydrate_error_message() {
        assert_eq!(
            HydrateError::InvalidRepeatCount {
                order: 3,
                source: RepeatCountError::OutOfRange
            }
            .to_string(),
            "repeat at position 3: Repeat count must be in the range 2 to 99"
        );
    }
}
