use chrono::Duration;

use crate::{RepeatItem, RoutineStep, Step, StepType};

/// Derived summary values of a step, with repeat multipliers expanded.
///
/// Reps and open-ended steps have no fixed real-time length and contribute 0 to the duration.
pub trait Aggregate {
    /// Duration in seconds.
    fn duration(&self) -> u32;
    /// Number of exercise leaves.
    fn exercise_count(&self) -> u32;
    /// Number of leaves (exercises and rests). Groups themselves are not counted.
    fn step_count(&self) -> u32;
}

fn sum(values: impl Iterator<Item = u32>) -> u32 {
    values.fold(0, u32::saturating_add)
}

pub fn total_duration<A: Aggregate>(steps: &[A]) -> u32 {
    sum(steps.iter().map(Aggregate::duration))
}

pub fn exercise_count<A: Aggregate>(steps: &[A]) -> u32 {
    sum(steps.iter().map(Aggregate::exercise_count))
}

pub fn step_count<A: Aggregate>(steps: &[A]) -> u32 {
    sum(steps.iter().map(Aggregate::step_count))
}

impl Aggregate for RepeatItem {
    fn duration(&self) -> u32 {
        match self {
            RepeatItem::Exercise { mode, .. } => mode.seconds(),
            RepeatItem::Rest { mode, .. } => mode.seconds(),
        }
    }

    fn exercise_count(&self) -> u32 {
        match self {
            RepeatItem::Exercise { .. } => 1,
            RepeatItem::Rest { .. } => 0,
        }
    }

    fn step_count(&self) -> u32 {
        1
    }
}

impl Aggregate for Step {
    fn duration(&self) -> u32 {
        match self {
            Step::Exercise { mode, .. } => mode.seconds(),
            Step::Rest { mode, .. } => mode.seconds(),
            Step::RepeatGroup {
                repeat_count,
                items,
                ..
            } => total_duration(items).saturating_mul(u32::from(*repeat_count)),
        }
    }

    fn exercise_count(&self) -> u32 {
        match self {
            Step::Exercise { .. } => 1,
            Step::Rest { .. } => 0,
            Step::RepeatGroup {
                repeat_count,
                items,
                ..
            } => exercise_count(items).saturating_mul(u32::from(*repeat_count)),
        }
    }

    fn step_count(&self) -> u32 {
        match self {
            Step::Exercise { .. } | Step::Rest { .. } => 1,
            Step::RepeatGroup {
                repeat_count,
                items,
                ..
            } => step_count(items).saturating_mul(u32::from(*repeat_count)),
        }
    }
}

impl Aggregate for RoutineStep {
    fn duration(&self) -> u32 {
        match self.step_type {
            StepType::Exercise | StepType::Rest => self.duration,
            StepType::Repeats => self.repeated(total_duration),
        }
    }

    fn exercise_count(&self) -> u32 {
        match self.step_type {
            StepType::Exercise => 1,
            StepType::Rest => 0,
            StepType::Repeats => self.repeated(exercise_count),
        }
    }

    fn step_count(&self) -> u32 {
        match self.step_type {
            StepType::Exercise | StepType::Rest => 1,
            StepType::Repeats => self.repeated(step_count),
        }
    }
}

impl RoutineStep {
    /// Applies the repeat multiplier to a value computed over the nested steps. A repeat without
    /// a count or nested steps contributes 0.
    fn repeated(&self, f: fn(&[RoutineStep]) -> u32) -> u32 {
        match (self.count, &self.nested_steps) {
            (Some(count), Some(steps)) => f(steps).saturating_mul(count),
            _ => 0,
        }
    }
}

/// Snapshot of all aggregates of a step list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total_duration: u32,
    pub exercise_count: u32,
    pub step_count: u32,
}

impl Summary {
    pub fn of<A: Aggregate>(steps: &[A]) -> Self {
        Self {
            total_duration: total_duration(steps),
            exercise_count: exercise_count(steps),
            step_count: step_count(steps),
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::seconds(i64::from(self.total_duration))
    }
}
