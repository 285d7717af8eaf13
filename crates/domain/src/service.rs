use log::{debug, error};

use crate::{
    CreateError, DeleteError, ReadError, Routine, RoutineID, RoutineRepository, RoutineService,
    UpdateError,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: RoutineRepository> RoutineService for Service<R> {
    async fn get_routines(&self) -> Result<Vec<Routine>, ReadError> {
        log_on_error!(
            self.repository.read_routines(),
            ReadError,
            "get",
            "routines"
        )
    }

    async fn create_routine(&self, mut routine: Routine) -> Result<Routine, CreateError> {
        routine.update_metadata();
        log_on_error!(
            self.repository.create_routine(routine),
            CreateError,
            "create",
            "routine"
        )
    }

    async fn replace_routine(&self, mut routine: Routine) -> Result<Routine, UpdateError> {
        routine.update_metadata();
        log_on_error!(
            self.repository.replace_routine(routine),
            UpdateError,
            "replace",
            "routine"
        )
    }

    async fn delete_routine(&self, id: RoutineID) -> Result<RoutineID, DeleteError> {
        log_on_error!(
            self.repository.delete_routine(id),
            DeleteError,
            "delete",
            "routine"
        )
    }
}
