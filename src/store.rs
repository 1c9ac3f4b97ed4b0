//! Storage collaborators and the DuckDB-backed implementation

use crate::error::{MergeError, Result};
use crate::row::{Row, Value};
use duckdb::Connection;
use indexmap::IndexMap;

/// Raw column metadata as reported by the store's introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub ordinal: usize,
    pub nullable: bool,
    pub default: Option<String>,
    pub data_type: String,
    pub extra: String,
}

/// Column definition used when (re)creating the output table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub default: Option<String>,
}

/// Introspection and DDL against the store
pub trait SchemaStore {
    /// Columns of `table` ordered by ordinal position, empty if the table is missing
    fn columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>>;

    /// Drop `table` if present and create it again with a surrogate id plus `columns`,
    /// all of them nullable
    fn recreate_table(&mut self, table: &str, columns: &[ColumnDef]) -> Result<()>;
}

/// Row-level reads and writes against the store
pub trait RowStore {
    fn select_all(&mut self, table: &str, fields: &[String]) -> Result<Vec<Row>>;

    /// Insert all `rows` in a single statement; each row lines up with `fields`
    fn insert_rows(&mut self, table: &str, fields: &[String], rows: &[Vec<Value>]) -> Result<()>;
}

/// Quote an identifier for DuckDB
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sequence_name(table: &str) -> String {
    format!("{}_id_seq", table)
}

/// Store backed by a DuckDB database file (or `:memory:`)
pub struct DuckDbStore {
    connection: Connection,
    /// Declared column types of tables created through `recreate_table`
    column_types: IndexMap<String, IndexMap<String, String>>,
}

impl DuckDbStore {
    /// Open the database named by `dsn` and check that it answers queries
    pub fn open(dsn: &str) -> Result<Self> {
        let connection = if dsn.is_empty() || dsn == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(dsn)
        }
        .map_err(|e| {
            log::error!("Failed to open database '{}': {}", dsn, e);
            MergeError::connectivity(dsn, e)
        })?;

        let store = Self::from_connection(connection);
        store.ping().map_err(|e| {
            log::error!("Database '{}' did not answer: {}", dsn, e);
            MergeError::connectivity(dsn, e)
        })?;

        log::info!("Connected to database '{}'", dsn);
        Ok(store)
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection,
            column_types: IndexMap::new(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    fn ping(&self) -> std::result::Result<(), duckdb::Error> {
        self.connection.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))?;
        Ok(())
    }

    /// Declared type of each column of `table`, looked up once and cached
    fn declared_types(&mut self, table: &str) -> Result<IndexMap<String, String>> {
        if let Some(types) = self.column_types.get(table) {
            return Ok(types.clone());
        }
        let types: IndexMap<String, String> = self
            .columns(table)?
            .into_iter()
            .map(|c| (c.name, c.data_type))
            .collect();
        self.column_types.insert(table.to_string(), types.clone());
        Ok(types)
    }
}

impl SchemaStore for DuckDbStore {
    fn columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>> {
        let mut stmt = self
            .connection
            .prepare(
                "SELECT column_name, ordinal_position, column_default, is_nullable, data_type \
                 FROM information_schema.columns \
                 WHERE table_name = ? \
                   AND table_schema = current_schema() \
                   AND table_catalog = current_database() \
                 ORDER BY ordinal_position",
            )
            .map_err(|e| MergeError::schema(table, format!("Failed to prepare column query: {}", e)))?;

        let rows = stmt
            .query_map([table], |row| {
                let default: Option<String> = row.get(2)?;
                let extra = match &default {
                    Some(d) if d.to_lowercase().starts_with("nextval(") => "auto_increment".to_string(),
                    _ => String::new(),
                };
                Ok(ColumnMeta {
                    name: row.get(0)?,
                    ordinal: row.get::<_, i64>(1)? as usize,
                    default,
                    nullable: row.get::<_, String>(3)?.eq_ignore_ascii_case("YES"),
                    data_type: row.get(4)?,
                    extra,
                })
            })
            .map_err(|e| MergeError::schema(table, format!("Failed to query column info: {}", e)))?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| {
                MergeError::schema(table, format!("Failed to decode column info: {}", e))
            })?);
        }
        Ok(columns)
    }

    fn recreate_table(&mut self, table: &str, columns: &[ColumnDef]) -> Result<()> {
        let seq = sequence_name(table);
        let mut defs = vec![format!(
            "{} BIGINT PRIMARY KEY DEFAULT nextval('{}')",
            quote_ident("id"),
            seq
        )];
        for col in columns {
            let mut def = format!("{} {} NULL", quote_ident(&col.name), col.data_type);
            if let Some(default) = &col.default {
                def.push_str(&format!(" DEFAULT {}", default));
            }
            defs.push(def);
        }

        let ddl = format!(
            "DROP TABLE IF EXISTS {table};\n\
             DROP SEQUENCE IF EXISTS {seq};\n\
             CREATE SEQUENCE {seq} START 1;\n\
             CREATE TABLE {table} (\n  {cols}\n);",
            table = quote_ident(table),
            seq = quote_ident(&seq),
            cols = defs.join(",\n  ")
        );

        self.connection.execute_batch(&ddl).map_err(|e| {
            log::error!("Failed to create table '{}': {}\nSQL: {}", table, e, ddl);
            MergeError::schema(table, format!("Failed to create table: {}", e))
        })?;

        self.column_types.insert(
            table.to_string(),
            columns
                .iter()
                .map(|c| (c.name.clone(), c.data_type.clone()))
                .collect(),
        );
        log::info!("Recreated output table '{}'", table);
        Ok(())
    }
}

impl RowStore for DuckDbStore {
    fn select_all(&mut self, table: &str, fields: &[String]) -> Result<Vec<Row>> {
        // Everything is read back as text so that values compare textually
        let select_list = fields
            .iter()
            .map(|f| format!("CAST({col} AS VARCHAR) AS {col}", col = quote_ident(f)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM {}", select_list, quote_ident(table));

        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| MergeError::read(table, format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let mut values = IndexMap::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    values.insert(field.clone(), row.get::<_, Option<String>>(i)?);
                }
                Ok(Row::new(values))
            })
            .map_err(|e| MergeError::read(table, format!("Failed to query rows: {}", e)))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| MergeError::read(table, format!("Failed to decode row: {}", e)))?);
        }
        Ok(result)
    }

    fn insert_rows(&mut self, table: &str, fields: &[String], rows: &[Vec<Value>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let types = self.declared_types(table)?;

        let placeholders = fields
            .iter()
            .map(|f| match types.get(f) {
                Some(data_type) => format!("CAST(? AS {})", data_type),
                None => "?".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let single_row = format!("({})", placeholders);
        let values = vec![single_row; rows.len()].join(", ");

        let columns = fields
            .iter()
            .map(|f| quote_ident(f))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("INSERT INTO {} ({}) VALUES {}", quote_ident(table), columns, values);

        let params = rows.iter().flat_map(|row| row.iter());
        self.connection.execute(&sql, duckdb::params_from_iter(params))?;
        Ok(())
    }
}
