//! Delete probes that show foreign keys protecting referenced rows.

use anyhow::Result;
use rusqlite::ErrorCode;
use serde::Serialize;
use sql_training_core::select::{delete_row_by_id, select_row_by_id};
use tracing::{info, warn};

use crate::database::Database;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted(usize),
    NotFound,
    Rejected(String),
}

/// Try to delete `table.id = id`. A constraint violation is reported as
/// [`DeleteOutcome::Rejected`] and leaves the row in place.
///
/// # Errors
/// Returns an error for a malformed table name or any failure other than a
/// constraint violation.
pub fn try_delete(db: &mut Database, table: &str, id: i64) -> Result<DeleteOutcome> {
    if db
        .select_single_row(&select_row_by_id(table, id)?)?
        .is_none()
    {
        return Ok(DeleteOutcome::NotFound);
    }

    match db.delete(&delete_row_by_id(table, id)?) {
        Ok(deleted) => {
            info!(table, id, deleted, "row deleted");
            Ok(DeleteOutcome::Deleted(deleted))
        }
        Err(err) => match err.downcast_ref::<rusqlite::Error>() {
            Some(sqlite) if sqlite.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                warn!(table, id, error = %sqlite, "delete rejected");
                Ok(DeleteOutcome::Rejected(sqlite.to_string()))
            }
            _ => Err(err),
        },
    }
}
