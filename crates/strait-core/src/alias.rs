//! Column alias extraction for alias-aware masking.
//!
//! `SELECT "Email" AS email FROM t` produces a result row whose field is
//! `email`; a mask keyed on `Email` would silently miss it. This module
//! re-parses the original SQL and maps each aliased plain column reference
//! back to its base name. Expressions (function calls, casts, concats) are
//! skipped: they cannot be reliably mapped to a base column. Parse failures
//! yield an empty map — alias resolution fails open, the exact-name match
//! still applies.

use sqlparser::ast::{Expr, SelectItem, SetExpr, Statement};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use std::collections::HashMap;

/// Base column name → result alias.
pub type AliasMap = HashMap<String, String>;

/// Extracts `base column → alias` pairs from the SELECT list of `sql`.
pub fn extract_alias_map(sql: &str) -> AliasMap {
    let mut aliases = AliasMap::new();

    let Ok(statements) = Parser::parse_sql(&PostgreSqlDialect {}, sql) else {
        return aliases;
    };
    let Some(Statement::Query(query)) = statements.first() else {
        return aliases;
    };
    let SetExpr::Select(select) = query.body.as_ref() else {
        return aliases;
    };

    for item in &select.projection {
        let SelectItem::ExprWithAlias { expr, alias } = item else {
            continue;
        };
        // Only bare or table-qualified column references; the last path
        // segment is the column name ("Email" and c."Email" both map from
        // Email).
        let column = match expr {
            Expr::Identifier(ident) => Some(&ident.value),
            Expr::CompoundIdentifier(parts) => parts.last().map(|i| &i.value),
            _ => None,
        };
        if let Some(column) = column {
            if !column.is_empty() && *column != alias.value {
                aliases.insert(column.clone(), alias.value.clone());
            }
        }
    }

    aliases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_quoted_column_to_alias() {
        let aliases = extract_alias_map(r#"SELECT "Email" AS email FROM customers"#);
        assert_eq!(aliases.get("Email").map(String::as_str), Some("email"));
    }

    #[test]
    fn maps_table_qualified_reference() {
        let aliases = extract_alias_map(r#"SELECT c."Email" AS email FROM customers c"#);
        assert_eq!(aliases.get("Email").map(String::as_str), Some("email"));
    }

    #[test]
    fn skips_expressions() {
        let aliases =
            extract_alias_map("SELECT lower(email) AS email, id::text AS ident FROM users");
        assert!(aliases.is_empty());
    }

    #[test]
    fn skips_unaliased_targets_and_identity_aliases() {
        let aliases = extract_alias_map("SELECT email, id AS id FROM users");
        assert!(aliases.is_empty());
    }

    #[test]
    fn empty_on_parse_failure() {
        assert!(extract_alias_map("not sql at all (").is_empty());
    }

    #[test]
    fn empty_on_non_select() {
        assert!(extract_alias_map("EXPLAIN SELECT 1").is_empty());
    }
}
