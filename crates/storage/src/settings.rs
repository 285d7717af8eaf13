use routine_builder_domain::{ExerciseMode, RepeatCount, Reps, RestMode, Time};

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

/// Display language and the values preselected when adding steps.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub language_code: String,
    pub default_repeat_count: u32,
    pub default_exercise_time: u32,
    pub default_rest_time: u32,
    pub default_reps: u32,
}

impl Settings {
    #[must_use]
    pub fn repeat_count(&self) -> RepeatCount {
        RepeatCount::saturating(self.default_repeat_count)
    }

    #[must_use]
    pub fn timed_exercise(&self) -> ExerciseMode {
        Time::new(self.default_exercise_time).map_or(ExerciseMode::Open, ExerciseMode::Timed)
    }

    #[must_use]
    pub fn reps_exercise(&self) -> ExerciseMode {
        Reps::new(self.default_reps).map_or(ExerciseMode::Open, ExerciseMode::Reps)
    }

    #[must_use]
    pub fn timed_rest(&self) -> RestMode {
        Time::new(self.default_rest_time).map_or(RestMode::Open, RestMode::Timed)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language_code: String::from("en"),
            default_repeat_count: 2,
            default_exercise_time: 60,
            default_rest_time: 30,
            default_reps: 10,
        }
    }
}
