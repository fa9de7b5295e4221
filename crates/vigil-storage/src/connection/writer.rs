//! Write helpers: BEGIN IMMEDIATE transactions.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use vigil_core::errors::StoreError;

use crate::queries::util::sql_err;

/// Run `f` inside a BEGIN IMMEDIATE transaction. The write lock is taken at
/// transaction start, so no SQLITE_BUSY surfaces mid-transaction.
/// Rolled back when `f` fails.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(sql_err)?;
    let result = f(&tx)?;
    tx.commit().map_err(sql_err)?;
    Ok(result)
}
