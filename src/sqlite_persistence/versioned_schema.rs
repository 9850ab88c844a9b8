use anyhow::{bail, Result};
use rusqlite::{params, types::Type, Connection};

/// Offset added to schema versions when written to `PRAGMA user_version`, so
/// a database managed by this crate is distinguishable from one where
/// user_version was never set (or was set by something else).
pub const BASE_DB_VERSION: usize = 50000;

#[macro_export]
macro_rules! schema_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // unused_mut fires when no optional field assignments are passed
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                check: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
        }
    }
}

#[allow(unused)]
pub enum OnDelete {
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
}

impl OnDelete {
    fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::NoAction => "NO ACTION",
            OnDelete::Restrict => "RESTRICT",
            OnDelete::SetNull => "SET NULL",
            OnDelete::SetDefault => "SET DEFAULT",
            OnDelete::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: OnDelete,
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<S>,
    /// Raw CHECK expression, e.g. `"id = 1"` for a singleton row.
    pub check: Option<S>,
    pub foreign_key: Option<&'a ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    /// (index_name, indexed column expression) pairs.
    pub indices: &'static [(&'static str, &'static str)],
    /// Multi-column UNIQUE constraints, one slice of column names each.
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut sql = format!("CREATE TABLE {} (", self.name);
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("{} {}", column.name, column.sql_type.as_sql()));
            if column.is_primary_key {
                sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                sql.push_str(" NOT NULL");
            }
            if column.is_unique {
                sql.push_str(" UNIQUE");
            }
            if let Some(default_value) = column.default_value {
                sql.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(check) = column.check {
                sql.push_str(&format!(" CHECK ({})", check));
            }
            if let Some(fk) = column.foreign_key {
                sql.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    fk.foreign_table,
                    fk.foreign_column,
                    fk.on_delete.as_sql()
                ));
            }
        }
        for unique in self.unique_constraints {
            sql.push_str(&format!(", UNIQUE ({})", unique.join(", ")));
        }
        sql.push_str(");");
        conn.execute(&sql, params![])?;

        for (index_name, column_expr) in self.indices {
            conn.execute(
                &format!("CREATE INDEX {} ON {}({});", index_name, self.name, column_expr),
                params![],
            )?;
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    /// Runs against a database at the previous version to bring it here.
    /// None for the initial version.
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    /// Compares the live database shape against this declaration. Column
    /// order matters; CHECK expressions are not reported by SQLite pragmas
    /// and so are only enforced at creation time.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            validate_columns(conn, table)?;
            validate_indices(conn, table)?;
            validate_unique_constraints(conn, table)?;
            validate_foreign_keys(conn, table)?;
        }
        Ok(())
    }
}

struct LiveColumn {
    name: String,
    sql_type: &'static SqlType,
    non_null: bool,
    default_value: Option<String>,
    is_primary_key: bool,
}

fn validate_columns(conn: &Connection, table: &Table) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.name))?;
    let live_columns: Vec<LiveColumn> = stmt
        .query_map(params![], |row| {
            let sql_type = match row.get::<_, String>(2)?.as_str() {
                "TEXT" => &SqlType::Text,
                "INTEGER" => &SqlType::Integer,
                "REAL" => &SqlType::Real,
                "BLOB" => &SqlType::Blob,
                _ => {
                    return Err(rusqlite::Error::InvalidColumnType(
                        2,
                        "".to_string(),
                        Type::Text,
                    ))
                }
            };
            Ok(LiveColumn {
                name: row.get(1)?,
                sql_type,
                non_null: row.get::<_, i32>(3)? == 1,
                default_value: row.get(4)?,
                is_primary_key: row.get::<_, i32>(5)? == 1,
            })
        })?
        .collect::<std::result::Result<_, _>>()?;

    if live_columns.len() != table.columns.len() {
        bail!(
            "Table {} has {} columns, expected {}. Found: [{}], expected: [{}]",
            table.name,
            live_columns.len(),
            table.columns.len(),
            live_columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            table
                .columns
                .iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    for (live, expected) in live_columns.iter().zip(table.columns.iter()) {
        if live.name != expected.name {
            bail!(
                "Table {} column name mismatch: expected {}, got {}",
                table.name,
                expected.name,
                live.name
            );
        }
        if live.sql_type != expected.sql_type {
            bail!(
                "Table {} column {} type mismatch: expected {:?}, got {:?}",
                table.name,
                expected.name,
                expected.sql_type,
                live.sql_type
            );
        }
        if live.non_null != expected.non_null {
            bail!(
                "Table {} column {} non-null mismatch: expected {}, got {}",
                table.name,
                expected.name,
                expected.non_null,
                live.non_null
            );
        }
        // SQLite may report defaults wrapped in parentheses
        if live.default_value.as_deref().map(strip_outer_parens)
            != expected.default_value.map(strip_outer_parens)
        {
            bail!(
                "Table {} column {} default mismatch: expected {:?}, got {:?}",
                table.name,
                expected.name,
                expected.default_value,
                live.default_value
            );
        }
        if live.is_primary_key != expected.is_primary_key {
            bail!(
                "Table {} column {} primary key mismatch: expected {}, got {}",
                table.name,
                expected.name,
                expected.is_primary_key,
                live.is_primary_key
            );
        }
    }
    Ok(())
}

fn validate_indices(conn: &Connection, table: &Table) -> Result<()> {
    for (index_name, _) in table.indices {
        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                params![index_name, table.name],
                |_| Ok(true),
            )
            .unwrap_or(false);
        if !exists {
            bail!("Table {} is missing index '{}'", table.name, index_name);
        }
    }
    Ok(())
}

/// SQLite surfaces table-level UNIQUE constraints as unique indices, so the
/// declared column sets are matched against `PRAGMA index_list` entries.
fn validate_unique_constraints(conn: &Connection, table: &Table) -> Result<()> {
    if table.unique_constraints.is_empty() {
        return Ok(());
    }

    let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", table.name))?;
    let unique_index_names: Vec<String> = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let is_unique: i32 = row.get(2)?;
            Ok((name, is_unique))
        })?
        .filter_map(|r| r.ok())
        .filter(|(_, is_unique)| *is_unique == 1)
        .map(|(name, _)| name)
        .collect();

    let mut unique_column_sets: Vec<Vec<String>> = Vec::new();
    for index_name in &unique_index_names {
        let mut idx_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
        let mut cols: Vec<String> = idx_stmt
            .query_map([], |row| row.get::<_, String>(2))?
            .filter_map(|r| r.ok())
            .collect();
        cols.sort();
        unique_column_sets.push(cols);
    }

    for expected_columns in table.unique_constraints {
        let mut expected_sorted: Vec<&str> = expected_columns.to_vec();
        expected_sorted.sort_unstable();

        let found = unique_column_sets.iter().any(|actual| {
            actual.iter().map(String::as_str).collect::<Vec<_>>() == expected_sorted
        });
        if !found {
            bail!(
                "Table {} is missing unique constraint on columns ({})",
                table.name,
                expected_columns.join(", ")
            );
        }
    }
    Ok(())
}

fn validate_foreign_keys(conn: &Connection, table: &Table) -> Result<()> {
    // PRAGMA foreign_key_list: id, seq, table, from, to, on_update, on_delete, match
    let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", table.name))?;

    struct LiveFk {
        from_column: String,
        to_table: String,
        to_column: String,
        on_delete: String,
    }

    let live_fks: Vec<LiveFk> = stmt
        .query_map([], |row| {
            Ok(LiveFk {
                from_column: row.get(3)?,
                to_table: row.get(2)?,
                to_column: row.get(4)?,
                on_delete: row.get(6)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    for column in table.columns {
        let Some(expected) = column.foreign_key else {
            continue;
        };
        let expected_on_delete = expected.on_delete.as_sql();
        let found = live_fks.iter().any(|live| {
            live.from_column == column.name
                && live.to_table == expected.foreign_table
                && live.to_column == expected.foreign_column
                && live.on_delete == expected_on_delete
        });
        if found {
            continue;
        }
        match live_fks.iter().find(|live| live.from_column == column.name) {
            Some(live) => bail!(
                "Table {} column {} foreign key mismatch: expected REFERENCES {}({}) ON DELETE {}, got REFERENCES {}({}) ON DELETE {}",
                table.name,
                column.name,
                expected.foreign_table,
                expected.foreign_column,
                expected_on_delete,
                live.to_table,
                live.to_column,
                live.on_delete
            ),
            None => bail!(
                "Table {} column {} is missing foreign key: expected REFERENCES {}({}) ON DELETE {}",
                table.name,
                column.name,
                expected.foreign_table,
                expected.foreign_column,
                expected_on_delete
            ),
        }
    }
    Ok(())
}

fn strip_outer_parens(s: &str) -> String {
    if s.starts_with('(') && s.ends_with(')') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
