//! Error shared by every persistence port.
//!
//! All repositories sit on the same database, so they fail in the same ways.
//! Services turn these into domain errors with the `From` conversion below or
//! match on [`RepositoryError::Conflict`] when a conflict has a specific
//! meaning (a taken email or slot).

use tracing::debug;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by repository adapters.
    pub enum RepositoryError {
        /// The database could not be reached.
        Connection { message: String } => "repository connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } => "repository query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } => "repository conflict: {message}",
    }
}

impl From<RepositoryError> for Error {
    fn from(error: RepositoryError) -> Self {
        debug!(%error, "repository error surfaced to service");
        match error {
            RepositoryError::Connection { message } => {
                Error::service_unavailable(format!("database unavailable: {message}"))
            }
            RepositoryError::Query { message } => {
                Error::internal(format!("database error: {message}"))
            }
            RepositoryError::Conflict { message } => Error::conflict(message),
        }
    }
}
