//! SQL admission control.
//!
//! A parser-based whitelist: the input must parse (PostgreSQL dialect) to
//! exactly one statement, and that statement must be a SELECT or an EXPLAIN
//! whose inner statement is itself a SELECT. Everything else is rejected,
//! including statement kinds this module has never heard of — the
//! whitelist is closed-world.

use crate::error::QueryError;
use crate::port::QueryValidator;
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Validates SQL strings against the SELECT/EXPLAIN whitelist.
#[derive(Debug)]
pub struct SqlValidator {
    dialect: PostgreSqlDialect,
}

impl SqlValidator {
    pub fn new() -> Self {
        Self {
            dialect: PostgreSqlDialect {},
        }
    }
}

impl Default for SqlValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryValidator for SqlValidator {
    fn validate(&self, sql: &str) -> Result<(), QueryError> {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let statements = Parser::parse_sql(&self.dialect, trimmed)
            .map_err(|e| QueryError::ParseFailed(e.to_string()))?;

        let statement = match statements.as_slice() {
            [] => return Err(QueryError::EmptyQuery),
            [single] => single,
            _ => return Err(QueryError::MultiStatement),
        };

        match statement {
            Statement::Query(_) => Ok(()),
            // EXPLAIN wraps an arbitrary inner statement; the whitelist
            // must hold for the inner statement too, or `EXPLAIN DELETE`
            // would slip through the top-level check.
            Statement::Explain { statement, .. } => match statement.as_ref() {
                Statement::Query(_) => Ok(()),
                _ => Err(QueryError::NotAllowed),
            },
            _ => Err(QueryError::NotAllowed),
        }
    }
}
