//! Persistence gateway and unit-of-work scopes.
//!
//! # Responsibility
//! - Own the single SQLite connection for the process lifetime.
//! - Hand out [`Scope`]s that bound one logical operation's writes.
//! - Provide generic record access (`get/save/update/query`) and
//!   many-to-many association helpers on top of a scope.
//!
//! # Invariants
//! - A scope is either committed, rolled back, or rolled back on close/drop.
//! - `Scope::close` is idempotent.
//! - Queries return rows in insertion (id ascending) order.

use super::migrations::current_user_version;
use super::{DbError, DbResult};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::time::Instant;

/// Table-backed record with a storage-assigned integer id.
///
/// `COLUMNS` lists every persisted column except `id`, in the same order
/// as [`Record::values`].
pub trait Record: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;
    fn from_row(row: &Row<'_>) -> DbResult<Self>;
    fn values(&self) -> Vec<Value>;
}

/// Many-to-many join table descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    pub table: &'static str,
    pub left: &'static str,
    pub right: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Eq,
    Ne,
}

#[derive(Debug, Clone)]
struct Condition {
    column: &'static str,
    comparison: Comparison,
    value: Value,
}

/// Conjunction of column conditions used by [`Scope::query`].
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Eq, value.into())
    }

    pub fn ne(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Ne, value.into())
    }

    fn with(mut self, column: &'static str, comparison: Comparison, value: Value) -> Self {
        self.conditions.push(Condition {
            column,
            comparison,
            value,
        });
        self
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(" WHERE 1 = 1");
        let mut bind_values = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            let op = match condition.comparison {
                Comparison::Eq => "=",
                Comparison::Ne => "<>",
            };
            sql.push_str(&format!(" AND {} {op} ?", condition.column));
            bind_values.push(condition.value.clone());
        }
        (sql, bind_values)
    }
}

/// Explicitly constructed persistence gateway.
///
/// Opened at process start through [`super::open_db`] or
/// [`super::open_db_in_memory`] and closed with [`Gateway::close`] at shutdown.
pub struct Gateway {
    conn: Connection,
}

impl Gateway {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Begins an immediate transaction and returns it as a scope.
    pub fn open_scope(&self) -> DbResult<Scope<'_>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        Ok(Scope { tx: Some(tx) })
    }

    /// Runs `work` inside one scope.
    ///
    /// Commits when `work` succeeds, rolls back when it fails, and releases
    /// the scope on every exit path. The error from `work` is returned
    /// unchanged; a failed rollback is logged, never masks it.
    pub fn in_scope<T, E, F>(&self, operation: &'static str, work: F) -> Result<T, E>
    where
        F: FnOnce(&Scope<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        let started_at = Instant::now();
        let mut scope = self.open_scope()?;

        match work(&scope) {
            Ok(value) => {
                scope.commit()?;
                debug!(
                    "event=scope module=db operation={operation} status=commit duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = scope.rollback() {
                    warn!(
                        "event=scope module=db operation={operation} status=rollback_failed error={rollback_err}"
                    );
                }
                debug!(
                    "event=scope module=db operation={operation} status=rollback duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Returns the schema version applied to the underlying database.
    pub fn schema_version(&self) -> DbResult<u32> {
        current_user_version(&self.conn)
    }

    /// Raw connection access for schema diagnostics and tests.
    ///
    /// Bypasses scopes; entity reads and writes go through [`Scope`].
    #[doc(hidden)]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the underlying connection.
    pub fn close(self) -> DbResult<()> {
        self.conn.close().map_err(|(_, err)| DbError::Sqlite(err))
    }
}

/// Unit-of-work boundary: one connection transaction.
pub struct Scope<'conn> {
    tx: Option<Transaction<'conn>>,
}

impl<'conn> Scope<'conn> {
    pub fn is_open(&self) -> bool {
        self.tx.is_some()
    }

    pub fn commit(&mut self) -> DbResult<()> {
        let tx = self.tx.take().ok_or(DbError::ScopeFinished)?;
        tx.commit()?;
        Ok(())
    }

    pub fn rollback(&mut self) -> DbResult<()> {
        let tx = self.tx.take().ok_or(DbError::ScopeFinished)?;
        tx.rollback()?;
        Ok(())
    }

    /// Releases the scope, rolling back uncommitted writes.
    ///
    /// Safe to call after `commit`, `rollback` or a previous `close`.
    pub fn close(&mut self) {
        if let Some(tx) = self.tx.take() {
            if let Err(err) = tx.rollback() {
                warn!("event=scope_close module=db status=error error={err}");
            }
        }
    }

    fn tx(&self) -> DbResult<&Transaction<'conn>> {
        self.tx.as_ref().ok_or(DbError::ScopeFinished)
    }

    pub fn get<R: Record>(&self, id: i64) -> DbResult<Option<R>> {
        let sql = format!(
            "SELECT id, {} FROM {} WHERE id = ?1;",
            R::COLUMNS.join(", "),
            R::TABLE
        );
        let mut stmt = self.tx()?.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(R::from_row(row)?));
        }
        Ok(None)
    }

    /// Inserts `record` ignoring its `id` and returns the assigned id.
    pub fn save<R: Record>(&self, record: &R) -> DbResult<i64> {
        let placeholders = (1..=R::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            R::TABLE,
            R::COLUMNS.join(", ")
        );
        let tx = self.tx()?;
        tx.execute(&sql, params_from_iter(record.values()))?;
        Ok(tx.last_insert_rowid())
    }

    /// Overwrites every column of the row matching `record.id()`.
    ///
    /// Returns `false` when no such row exists.
    pub fn update<R: Record>(&self, record: &R) -> DbResult<bool> {
        let assignments = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ?{};",
            R::TABLE,
            R::COLUMNS.len() + 1
        );
        let mut bind_values = record.values();
        bind_values.push(Value::Integer(record.id()));
        let changed = self.tx()?.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed > 0)
    }

    pub fn query<R: Record>(&self, filter: &Filter) -> DbResult<Vec<R>> {
        let (where_clause, bind_values) = filter.where_clause();
        let sql = format!(
            "SELECT id, {} FROM {}{where_clause} ORDER BY id ASC;",
            R::COLUMNS.join(", "),
            R::TABLE
        );
        let mut stmt = self.tx()?.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(R::from_row(row)?);
        }
        Ok(records)
    }

    /// Number of rows matching `filter`.
    pub fn count<R: Record>(&self, filter: &Filter) -> DbResult<i64> {
        let (where_clause, bind_values) = filter.where_clause();
        let sql = format!("SELECT COUNT(*) FROM {}{where_clause};", R::TABLE);
        let count = self
            .tx()?
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(count)
    }

    /// Records the pair; returns `false` when it was already present.
    pub fn link(&self, association: Association, left_id: i64, right_id: i64) -> DbResult<bool> {
        let sql = format!(
            "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?1, ?2);",
            association.table, association.left, association.right
        );
        let changed = self.tx()?.execute(&sql, params![left_id, right_id])?;
        Ok(changed > 0)
    }

    /// Removes the pair; returns `false` when it was already absent.
    pub fn unlink(&self, association: Association, left_id: i64, right_id: i64) -> DbResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1 AND {} = ?2;",
            association.table, association.left, association.right
        );
        let changed = self.tx()?.execute(&sql, params![left_id, right_id])?;
        Ok(changed > 0)
    }

    /// Right-side ids linked to `left_id`, ascending.
    pub fn linked_right(&self, association: Association, left_id: i64) -> DbResult<Vec<i64>> {
        self.linked_ids(association.table, association.right, association.left, left_id)
    }

    /// Left-side ids linked to `right_id`, ascending.
    pub fn linked_left(&self, association: Association, right_id: i64) -> DbResult<Vec<i64>> {
        self.linked_ids(association.table, association.left, association.right, right_id)
    }

    fn linked_ids(
        &self,
        table: &str,
        select_column: &str,
        match_column: &str,
        id: i64,
    ) -> DbResult<Vec<i64>> {
        let sql = format!(
            "SELECT {select_column} FROM {table} WHERE {match_column} = ?1 ORDER BY {select_column} ASC;"
        );
        let mut stmt = self.tx()?.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
