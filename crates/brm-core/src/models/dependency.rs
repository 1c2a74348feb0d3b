use serde::{Deserialize, Serialize};

/// A table a rule's SQL reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReference {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
    pub is_subselect: bool,
}

/// A column reference and whether it is read, written, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReference {
    pub column: String,
    pub is_write: bool,
    pub is_read: bool,
}

/// Everything the SQL dependency parser extracts from one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlDependencies {
    pub tables: Vec<TableReference>,
    /// CTE name → tables it reads.
    pub cte_tables: Vec<(String, Vec<TableReference>)>,
    /// alias → (schema, table).
    pub alias_map: Vec<(String, (Option<String>, String))>,
    pub columns: Vec<ColumnReference>,
}
