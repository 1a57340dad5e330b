//! SQL schema, generated from the entity registry.
//!
//! Executed once at connection startup. Every statement is idempotent, so
//! opening an existing database leaves its tables and rows alone.
//! Foreign keys are declared but not enforced: the archive contains
//! references to parents it does not export.

use std::fmt::Write as _;

use inat_core::{
  column::{Column, ColumnType},
  entity::Entity,
};

const PRELUDE: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = OFF;
";

const EPILOGUE: &str = "
PRAGMA user_version = 1;
";

pub fn sql_type(ty: ColumnType) -> &'static str {
  match ty {
    ColumnType::Integer => "INTEGER",
    ColumnType::Float => "FLOAT",
    ColumnType::String => "VARCHAR",
    ColumnType::Boolean => "BOOLEAN",
    ColumnType::Timestamp => "DATETIME",
  }
}

/// Double-quote an identifier (`user` is a keyword in most dialects).
pub fn quote(ident: &str) -> String { format!("\"{}\"", ident.replace('"', "\"\"")) }

pub fn index_name(table: &str, column: &str) -> String { format!("ix_{table}_{column}") }

/// Full schema DDL, tables in load order followed by their indexes.
pub fn schema_sql() -> String {
  let mut sql = String::from(PRELUDE);
  for entity in Entity::ALL {
    sql.push_str(&create_table_sql(entity));
  }
  for entity in Entity::ALL {
    sql.push_str(&create_indexes_sql(entity));
  }
  sql.push_str(EPILOGUE);
  sql
}

fn create_table_sql(entity: Entity) -> String {
  let columns = entity.columns();
  let mut lines: Vec<String> = columns.iter().map(column_sql).collect();

  let pk: Vec<String> = columns
    .iter()
    .filter(|c| c.primary_key)
    .map(|c| quote(c.name))
    .collect();
  if !pk.is_empty() {
    lines.push(format!("PRIMARY KEY ({})", pk.join(", ")));
  }

  for column in columns {
    if let Some(fk) = column.references {
      lines.push(format!(
        "FOREIGN KEY ({}) REFERENCES {} ({})",
        quote(column.name),
        quote(fk.table),
        quote(fk.column),
      ));
    }
  }

  format!(
    "\nCREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n",
    quote(entity.table()),
    lines.join(",\n    ")
  )
}

fn column_sql(column: &Column) -> String {
  let mut sql = format!("{} {}", quote(column.name), sql_type(column.ty));
  if !column.nullable {
    sql.push_str(" NOT NULL");
  }
  sql
}

fn create_indexes_sql(entity: Entity) -> String {
  let table = entity.table();
  let mut sql = String::new();
  for column in entity.columns().iter().filter(|c| c.indexed) {
    let _ = writeln!(
      sql,
      "CREATE INDEX IF NOT EXISTS {} ON {} ({});",
      quote(&index_name(table, column.name)),
      quote(table),
      quote(column.name),
    );
  }
  sql
}

pub fn delete_sql(entity: Entity) -> String {
  format!("DELETE FROM {}", quote(entity.table()))
}

/// Positional `INSERT` covering every column of `entity`.
pub fn insert_sql(entity: Entity) -> String {
  let columns = entity.columns();
  let names: Vec<String> = columns.iter().map(|c| quote(c.name)).collect();
  let params: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    quote(entity.table()),
    names.join(", "),
    params.join(", "),
  )
}
