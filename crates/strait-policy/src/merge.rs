//! Merging policy context into explorer results.
//!
//! Database-resident comments always win; the policy enriches empty fields,
//! never overrides.

use crate::document::ContextConfig;
use strait_core::port::{TableDetail, TableInfo};
use strait_core::MaskSpec;

/// Fills the table and column comments of `detail` from the policy where
/// the database left them empty.
pub fn merge_table_detail(detail: &mut TableDetail, context: &ContextConfig) {
    let key = format!("{}.{}", detail.schema, detail.name);
    let Some(table) = context.tables.get(&key) else {
        return;
    };

    if detail.comment.is_empty() && !table.description.is_empty() {
        detail.comment = table.description.clone();
    }

    for column in &mut detail.columns {
        if let Some(annotation) = table.columns.get(&column.name) {
            if column.comment.is_empty() && !annotation.description().is_empty() {
                column.comment = annotation.description().to_string();
            }
        }
    }
}

/// Same precedence rule for table listings.
pub fn merge_table_info_list(tables: &mut [TableInfo], context: &ContextConfig) {
    for table in tables {
        let key = format!("{}.{}", table.schema, table.name);
        if let Some(annotation) = context.tables.get(&key) {
            if table.comment.is_empty() && !annotation.description.is_empty() {
                table.comment = annotation.description.clone();
            }
        }
    }
}

/// Derives the bare-column-name → mask map used at query time. Load-time
/// conflict validation guarantees a single mask per name.
pub fn mask_spec(context: &ContextConfig) -> MaskSpec {
    let mut spec = MaskSpec::new();
    for table in context.tables.values() {
        for (column, annotation) in &table.columns {
            if let Some(mask) = annotation.mask() {
                spec.insert(column.clone(), mask);
            }
        }
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use strait_core::port::ColumnInfo;
    use strait_core::MaskType;

    fn context() -> ContextConfig {
        serde_yaml::from_str(
            r#"
tables:
  "public.users":
    description: "Registered users"
    columns:
      email:
        description: "Login email"
        mask: redact
      id: "Primary key"
"#,
        )
        .unwrap()
    }

    fn detail(comment: &str, column_comment: &str) -> TableDetail {
        TableDetail {
            schema: "public".to_string(),
            name: "users".to_string(),
            comment: comment.to_string(),
            columns: vec![ColumnInfo {
                name: "email".to_string(),
                data_type: "text".to_string(),
                is_nullable: false,
                default_value: String::new(),
                is_primary_key: false,
                comment: column_comment.to_string(),
                stats: None,
            }],
            ..TableDetail::default()
        }
    }

    #[test]
    fn database_comments_win_over_policy() {
        let mut d = detail("From COMMENT ON", "col comment");
        merge_table_detail(&mut d, &context());
        assert_eq!(d.comment, "From COMMENT ON");
        assert_eq!(d.columns[0].comment, "col comment");
    }

    #[test]
    fn policy_fills_empty_comments() {
        let mut d = detail("", "");
        merge_table_detail(&mut d, &context());
        assert_eq!(d.comment, "Registered users");
        assert_eq!(d.columns[0].comment, "Login email");
    }

    #[test]
    fn unknown_tables_are_untouched() {
        let mut d = detail("", "");
        d.name = "payments".to_string();
        merge_table_detail(&mut d, &context());
        assert_eq!(d.comment, "");
    }

    #[test]
    fn table_list_merge_follows_the_same_rule() {
        let mut tables = vec![
            TableInfo {
                schema: "public".to_string(),
                name: "users".to_string(),
                comment: String::new(),
                ..TableInfo::default()
            },
            TableInfo {
                schema: "public".to_string(),
                name: "users".to_string(),
                comment: "db wins".to_string(),
                ..TableInfo::default()
            },
        ];
        merge_table_info_list(&mut tables, &context());
        assert_eq!(tables[0].comment, "Registered users");
        assert_eq!(tables[1].comment, "db wins");
    }

    #[test]
    fn mask_spec_collects_only_masked_columns() {
        let spec = mask_spec(&context());
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.get("email"), Some(&MaskType::Redact));
    }
}
