//! Schema DDL in both supported dialects

use std::fmt;
use std::str::FromStr;

use unitrack_core::ValidationError;

const SQLITE_SCHEMA: &str = include_str!("../migrations/sqlite/20250101000000_initial_schema.sql");
const POSTGRES_SCHEMA: &str =
    include_str!("../migrations/postgres/20250101000000_initial_schema.sql");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(ValidationError::InvalidVariant {
                field: "dialect",
                value: other.to_owned(),
            }),
        }
    }
}

/// Full DDL for `dialect`, identical to the migration applied by `migrate`.
pub fn schema_sql(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Sqlite => SQLITE_SCHEMA,
        Dialect::Postgres => POSTGRES_SCHEMA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ROLE_CHECK_MARKER, SAME_IDENTIFIER_MARKER};

    const TABLES: [&str; 6] = [
        "universities",
        "profiles",
        "student_profile",
        "teacher_profile",
        "parent_links",
        "teacher_student_links",
    ];

    #[test]
    fn both_dialects_define_every_table() {
        for dialect in [Dialect::Sqlite, Dialect::Postgres] {
            let sql = schema_sql(dialect);
            for table in TABLES {
                assert!(
                    sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
                    "{dialect} schema lacks {table}"
                );
            }
        }
    }

    #[test]
    fn both_dialects_raise_trigger_markers() {
        for dialect in [Dialect::Sqlite, Dialect::Postgres] {
            let sql = schema_sql(dialect);
            assert!(sql.contains(ROLE_CHECK_MARKER));
            assert!(sql.contains(SAME_IDENTIFIER_MARKER));
        }
    }

    #[test]
    fn dialect_specific_types() {
        assert!(schema_sql(Dialect::Postgres).contains("CITEXT UNIQUE"));
        assert!(schema_sql(Dialect::Postgres).contains("role_type"));
        assert!(schema_sql(Dialect::Sqlite).contains("COLLATE NOCASE UNIQUE"));
    }

    #[test]
    fn parses_dialect_names() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert!("oracle".parse::<Dialect>().is_err());
    }
}
