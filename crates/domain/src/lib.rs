#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod aggregate;
pub mod assembler;
pub mod catalog;
mod draft;
mod editor;
mod error;
mod name;
mod reorder;
mod routine;
mod service;
mod step;

pub use aggregate::{Aggregate, Summary};
pub use assembler::HydrateError;
pub use catalog::{Catalog, CatalogExercise, ExerciseCatalog};
pub use draft::{RoutineDraft, SaveError};
pub use editor::{Editor, Location, Node};
pub use error::{CreateError, DeleteError, ReadError, StorageError, UpdateError};
pub use name::{Name, NameError};
pub use reorder::{DragState, DropTarget, Position, ReorderEngine, ReorderError};
pub use routine::{
    Routine, RoutineID, RoutineMetadata, RoutineRepository, RoutineService, RoutineStep, StepType,
    Translation, UNNAMED_ROUTINE,
};
pub use service::Service;
pub use step::{
    ExerciseMode, NestingError, REST_NAME, RepeatCount, RepeatCountError, RepeatItem, Reps,
    RepsError, RestMode, Step, StepId, StepMode, Time, TimeError,
};
