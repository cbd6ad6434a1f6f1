//! Command implementations
//!
//! Each command takes an opened [`AppContext`] and returns the value that
//! goes into the `data` field of the JSON envelope.

pub mod batch;
pub mod enrollment;
pub mod offering;
pub mod student;

use std::sync::Arc;

use registrar_core::{
    EnrollmentCoordinator, EnrollmentPolicy, LockRegistry, OfferingService, Stores,
    StudentService,
};

use crate::{config::Config, db::SqliteStore, error::CliError};

/// Services wired over one store and one lock registry.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub coordinator: EnrollmentCoordinator,
    pub offerings: OfferingService,
    pub students: StudentService,
}

impl AppContext {
    /// Open the configured database and build the services on top of it.
    pub async fn open(config: &Config) -> Result<Self, CliError> {
        let store = SqliteStore::open(&config.database_path)
            .await
            .map_err(CliError::Open)?;
        Ok(Self::new(
            Arc::new(store),
            EnrollmentPolicy {
                max_credits: config.max_credits,
            },
        ))
    }

    pub fn new(store: Arc<SqliteStore>, policy: EnrollmentPolicy) -> Self {
        let stores = Stores::shared(Arc::clone(&store));
        let locks = Arc::new(LockRegistry::new());
        Self {
            store,
            coordinator: EnrollmentCoordinator::new(stores.clone(), Arc::clone(&locks), policy),
            offerings: OfferingService::new(stores.clone(), locks),
            students: StudentService::new(stores),
        }
    }
}
