//! Business logic services

pub mod fines;
pub mod loans;

use std::sync::Arc;

use hourglass_rs::SafeTimeProvider;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub loans: loans::LoanService,
    pub fines: fines::FineEngine,
}

impl Services {
    /// Create all services with the given repository and time source.
    /// "Today" is the UTC calendar date of `time`.
    pub fn new(repository: Repository, time: Arc<SafeTimeProvider>) -> Self {
        let fines = fines::FineEngine::new(repository.clone(), time.clone());
        Self {
            loans: loans::LoanService::new(repository.clone(), fines.clone(), time),
            fines,
            repository,
        }
    }

    /// Whether the database answers
    pub async fn ready(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
