use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

use crate::adapters::db;
use crate::adapters::db::DbError;
use crate::domain::models::{EnergyReportRecord, UserRecord};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database lock poisoned")]
    DbLockPoisoned,
    #[error("database operation failed: {0}")]
    Database(#[from] DbError),
}

pub trait CredentialQueryHandler {
    fn find_user_by_credentials(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, ServiceError>;
    fn liveness_check(&self) -> Result<i64, ServiceError>;
}

pub trait ReportQueryHandler {
    fn list_reports_oldest_first(&self) -> Result<Vec<EnergyReportRecord>, ServiceError>;
    fn list_reports_newest_first(&self) -> Result<Vec<EnergyReportRecord>, ServiceError>;
}

#[derive(Clone)]
pub struct SqliteEmsService {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteEmsService {
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, ServiceError> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| ServiceError::DbLockPoisoned)?;
        op(&connection).map_err(ServiceError::from)
    }
}

impl CredentialQueryHandler for SqliteEmsService {
    fn find_user_by_credentials(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, ServiceError> {
        self.with_connection(|connection| {
            db::find_user_by_credentials(connection, user_name, password)
        })
    }

    fn liveness_check(&self) -> Result<i64, ServiceError> {
        self.with_connection(db::liveness_check)
    }
}

impl ReportQueryHandler for SqliteEmsService {
    fn list_reports_oldest_first(&self) -> Result<Vec<EnergyReportRecord>, ServiceError> {
        self.with_connection(db::list_reports_oldest_first)
    }

    fn list_reports_newest_first(&self) -> Result<Vec<EnergyReportRecord>, ServiceError> {
        self.with_connection(db::list_reports_newest_first)
    }
}
