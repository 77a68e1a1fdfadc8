//! Statement templates for the bracket-quoted, `@`-parameter dialect.
//!
//! Identifiers are wrapped `[table].[column]` without escaping embedded
//! `]` characters, an accepted limitation. Bulk variants concatenate one
//! single-row statement per row, suffixing placeholder names with the
//! 1-based row index so no two rows share a name.

use crate::{ast::Predicate, error::Error, schema::EntitySchema, to_sql::Printer, translate};

pub const LINE_SEP: &str = "\r\n";

/// How a bulk update binds the identity key.
///
/// `Shared` repeats the literal `@Id` on every row, so the whole batch
/// binds one identity value; `PerRow` suffixes it with the row index like
/// the SET placeholders. There is deliberately no default: the shared form
/// is almost certainly not what a caller wants, so the choice is forced
/// into the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkUpdateKey {
    Shared,
    PerRow,
}

fn bracketed(table: &str, columns: &[&str], sep: &str) -> String {
    columns
        .iter()
        .map(|c| format!("[{table}].[{c}]"))
        .collect::<Vec<_>>()
        .join(sep)
}

/// `INSERT INTO [t](...) OUTPUT INSERTED.Id VALUES(@..)`. The database
/// returns the generated identity through the OUTPUT clause; the caller
/// reads it back as a scalar and assigns it to the entity.
pub fn insert(table: &str, schema: &EntitySchema) -> Result<String, Error> {
    let columns = schema.columns_without_identity()?;
    let params: Vec<_> = columns.iter().map(|c| format!("@{c}")).collect();
    Ok(format!(
        "INSERT INTO [{table}]({}) OUTPUT INSERTED.{} VALUES({})",
        bracketed(table, &columns, ", "),
        schema.identity(),
        params.join(", "),
    ))
}

/// One plain `INSERT` line per row (no OUTPUT clause), placeholders
/// suffixed `@Col1`, `@Col2`, ...
pub fn insert_bulk(table: &str, schema: &EntitySchema, rows: usize) -> Result<String, Error> {
    if rows == 0 {
        return Err(Error::EmptyBatch);
    }
    let columns = schema.columns_without_identity()?;
    let column_list = bracketed(table, &columns, ", ");
    let mut sql = String::new();
    for i in 1..=rows {
        let params: Vec<_> = columns.iter().map(|c| format!("@{c}{i}")).collect();
        sql.push_str(&format!(
            "INSERT INTO [{table}]({column_list}) VALUES ({}){LINE_SEP}",
            params.join(", "),
        ));
    }
    Ok(sql)
}

pub fn update(table: &str, schema: &EntitySchema) -> Result<String, Error> {
    let columns = schema.columns_without_identity()?;
    let assignments: Vec<_> = columns
        .iter()
        .map(|c| format!("[{table}].[{c}] = @{c}"))
        .collect();
    let id = schema.identity();
    Ok(format!(
        "UPDATE [{table}] SET {} WHERE [{table}].[{id}] = @{id}",
        assignments.join(", "),
    ))
}

/// One `UPDATE` line per row. The SET placeholders are always row-suffixed;
/// the identity key in the WHERE clause follows `key`.
pub fn update_bulk(
    table: &str,
    schema: &EntitySchema,
    rows: usize,
    key: BulkUpdateKey,
) -> Result<String, Error> {
    if rows == 0 {
        return Err(Error::EmptyBatch);
    }
    let columns = schema.columns_without_identity()?;
    let id = schema.identity();
    let mut sql = String::new();
    for i in 1..=rows {
        let assignments: Vec<_> = columns
            .iter()
            .map(|c| format!("[{table}].[{c}] = @{c}{i}"))
            .collect();
        let key_param = match key {
            BulkUpdateKey::Shared => format!("@{id}"),
            BulkUpdateKey::PerRow => format!("@{id}{i}"),
        };
        sql.push_str(&format!(
            "UPDATE [{table}] SET {} WHERE [{table}].[{id}] = {key_param}{LINE_SEP}",
            assignments.join(", "),
        ));
    }
    Ok(sql)
}

pub fn delete(table: &str, schema: &EntitySchema) -> String {
    let id = schema.identity();
    format!("DELETE FROM [{table}] WHERE [{table}].[{id}] = @{id}")
}

/// A single statement deleting the whole batch; the caller binds one
/// array-valued parameter named after [`bulk_key_param`].
pub fn delete_bulk(table: &str, schema: &EntitySchema) -> String {
    let id = schema.identity();
    format!("DELETE FROM [{table}] WHERE [{table}].[{id}] IN(@{id}s)")
}

/// The parameter name a [`delete_bulk`] statement binds: the identity
/// column pluralized (`Ids`).
pub fn bulk_key_param(schema: &EntitySchema) -> String {
    format!("{}s", schema.identity())
}

pub fn select(
    table: &str,
    schema: &EntitySchema,
    predicate: Option<&Predicate>,
) -> Result<String, Error> {
    let sql = format!(
        "SELECT{LINE_SEP} {} FROM [{table}]",
        select_columns(table, schema)?,
    );
    append_where(sql, predicate)
}

pub fn select_first(
    table: &str,
    schema: &EntitySchema,
    predicate: Option<&Predicate>,
) -> Result<String, Error> {
    let sql = format!(
        "SELECT TOP(1){LINE_SEP} {} FROM [{table}]",
        select_columns(table, schema)?,
    );
    append_where(sql, predicate)
}

fn select_columns(table: &str, schema: &EntitySchema) -> Result<String, Error> {
    let columns = schema.columns()?;
    Ok(bracketed(table, columns, &format!(",{LINE_SEP}")))
}

fn append_where(sql: String, predicate: Option<&Predicate>) -> Result<String, Error> {
    match predicate {
        Some(predicate) => {
            let fragment = Printer::new(&translate::translate(predicate)?).to_string();
            Ok(format!("{sql} WHERE {fragment}"))
        }
        None => Ok(sql),
    }
}
