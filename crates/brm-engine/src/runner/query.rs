//! Pass/fail evaluation of a rule's query result.

use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};

/// What a query returned, reduced to what pass/fail needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    pub row_count: u64,
    /// Whether the first column of the first row equals 1. `None` with no rows.
    pub first_is_one: Option<bool>,
}

impl QueryOutcome {
    /// No rows pass; otherwise the first column of the first row must be 1.
    pub fn passed(&self) -> bool {
        self.first_is_one.unwrap_or(true)
    }

    pub fn message(&self) -> String {
        match self.first_is_one {
            None => "no rows returned".to_string(),
            Some(true) => format!("passed ({} rows)", self.row_count),
            Some(false) => format!("check returned a value other than 1 ({} rows)", self.row_count),
        }
    }
}

/// Step through every statement of `sql` in order.
///
/// `row_count` sums the rows of all statements. The pass/fail value comes
/// from the last statement that returns columns, so `UPDATE ...; SELECT 0`
/// is judged by its `SELECT`.
pub fn run_query(conn: &Connection, sql: &str) -> rusqlite::Result<QueryOutcome> {
    let mut outcome = QueryOutcome {
        row_count: 0,
        first_is_one: None,
    };

    let mut batch = Batch::new(conn, sql);
    while let Some(mut stmt) = batch.next()? {
        let has_columns = stmt.column_count() > 0;
        let mut rows = stmt.query([])?;
        let mut first_is_one = None;
        let mut count = 0;
        while let Some(row) = rows.next()? {
            if count == 0 && has_columns {
                first_is_one = Some(is_one(row.get_ref(0)?));
            }
            count += 1;
        }
        outcome.row_count += count;
        if has_columns {
            outcome.first_is_one = first_is_one;
        }
    }
    Ok(outcome)
}

fn is_one(value: ValueRef<'_>) -> bool {
    match value {
        ValueRef::Integer(i) => i == 1,
        ValueRef::Real(f) => f == 1.0,
        _ => false,
    }
}
