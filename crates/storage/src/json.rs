use chrono::{DateTime, Utc};
use routine_builder_domain as domain;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub translations: Vec<Translation>,
    pub steps: Vec<RoutineStep>,
    #[serde(default)]
    pub metadata: RoutineMetadata,
    #[serde(default)]
    pub is_system_routine: bool,
}

impl From<domain::Routine> for Routine {
    fn from(value: domain::Routine) -> Self {
        Self {
            id: value.id.into(),
            translations: value
                .translations
                .into_iter()
                .map(Translation::from)
                .collect(),
            steps: value.steps.into_iter().map(RoutineStep::from).collect(),
            metadata: value.metadata.into(),
            is_system_routine: value.is_system_routine,
        }
    }
}

impl From<Routine> for domain::Routine {
    fn from(value: Routine) -> Self {
        Self {
            id: value.id.into(),
            translations: value
                .translations
                .into_iter()
                .map(domain::Translation::from)
                .collect(),
            steps: steps_to_domain(value.steps),
            metadata: value.metadata.into(),
            is_system_routine: value.is_system_routine,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub language_code: String,
    pub name: String,
}

impl From<domain::Translation> for Translation {
    fn from(value: domain::Translation) -> Self {
        Self {
            language_code: value.language_code,
            name: value.name,
        }
    }
}

impl From<Translation> for domain::Translation {
    fn from(value: Translation) -> Self {
        Self {
            language_code: value.language_code,
            name: value.name,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Exercise,
    Rest,
    Repeats,
}

impl From<domain::StepType> for StepType {
    fn from(value: domain::StepType) -> Self {
        match value {
            domain::StepType::Exercise => StepType::Exercise,
            domain::StepType::Rest => StepType::Rest,
            domain::StepType::Repeats => StepType::Repeats,
        }
    }
}

impl From<StepType> for domain::StepType {
    fn from(value: StepType) -> Self {
        match value {
            StepType::Exercise => domain::StepType::Exercise,
            StepType::Rest => domain::StepType::Rest,
            StepType::Repeats => domain::StepType::Repeats,
        }
    }
}

/// Persisted step.
///
/// Hand-written catalog files may omit `order`, in which case the position in the list is used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineStep {
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<RoutineStep>>,
    #[serde(default)]
    pub order: Option<u32>,
}

impl From<domain::RoutineStep> for RoutineStep {
    fn from(value: domain::RoutineStep) -> Self {
        Self {
            step_type: value.step_type.into(),
            exercise_id: value.exercise_ref,
            duration: value.duration,
            count: value.count,
            steps: value
                .nested_steps
                .map(|steps| steps.into_iter().map(RoutineStep::from).collect()),
            order: Some(value.order),
        }
    }
}

fn steps_to_domain(steps: Vec<RoutineStep>) -> Vec<domain::RoutineStep> {
    (1..)
        .zip(steps)
        .map(|(position, step)| domain::RoutineStep {
            step_type: step.step_type.into(),
            exercise_ref: step.exercise_id,
            duration: step.duration,
            count: step.count,
            nested_steps: step.steps.map(steps_to_domain),
            order: step.order.unwrap_or(position),
        })
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutineMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    #[serde(alias = "level")]
    pub difficulty: String,
    pub tags: Vec<String>,
    pub equipment: Vec<String>,
    pub target_muscles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u32>,
}

impl From<domain::RoutineMetadata> for RoutineMetadata {
    fn from(value: domain::RoutineMetadata) -> Self {
        Self {
            created_at: Some(value.created_at),
            updated_at: Some(value.updated_at),
            categories: value.categories,
            difficulty: value.difficulty,
            tags: value.tags,
            equipment: value.equipment,
            target_muscles: value.target_muscles,
            author: value.author,
            step_count: value.step_count,
            total_duration: value.total_duration,
        }
    }
}

impl From<RoutineMetadata> for domain::RoutineMetadata {
    fn from(value: RoutineMetadata) -> Self {
        let default = domain::RoutineMetadata::default();
        let created_at = value.created_at.unwrap_or(default.created_at);
        Self {
            created_at,
            updated_at: value.updated_at.unwrap_or(created_at),
            categories: value.categories,
            difficulty: value.difficulty,
            tags: value.tags,
            equipment: value.equipment,
            target_muscles: value.target_muscles,
            author: value.author,
            step_count: value.step_count,
            total_duration: value.total_duration,
        }
    }
}

/// Exercise entry of the catalog file. Fields other than the id and the translations are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    #[serde(default)]
    pub translations: Vec<Translation>,
}

impl From<Exercise> for domain::CatalogExercise {
    fn from(value: Exercise) -> Self {
        Self {
            id: value.id,
            translations: value
                .translations
                .into_iter()
                .map(domain::Translation::from)
                .collect(),
        }
    }
}
