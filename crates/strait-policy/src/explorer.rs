//! Policy decoration of a schema explorer.

use crate::document::Policy;
use crate::merge::{merge_table_detail, merge_table_info_list};
use async_trait::async_trait;
use std::sync::Arc;
use strait_core::port::{DiscoveryResult, SchemaExplorer, SchemaInfo, TableDetail, TableInfo};
use strait_core::{mask_rows, AliasMap, MaskSpec, QueryError};

/// Wraps a [`SchemaExplorer`] with policy context enrichment and sample-row
/// masking. Sample rows pass through no validator or executor, so they are
/// masked here before leaving the process.
pub struct PolicyExplorer {
    inner: Arc<dyn SchemaExplorer>,
    policy: Policy,
    masks: MaskSpec,
}

impl PolicyExplorer {
    pub fn new(inner: Arc<dyn SchemaExplorer>, policy: Policy, masks: MaskSpec) -> Self {
        Self {
            inner,
            policy,
            masks,
        }
    }
}

#[async_trait]
impl SchemaExplorer for PolicyExplorer {
    async fn list_schemas(&self) -> Result<Vec<SchemaInfo>, QueryError> {
        self.inner.list_schemas().await
    }

    async fn list_tables(&self) -> Result<Vec<TableInfo>, QueryError> {
        let mut tables = self.inner.list_tables().await?;
        merge_table_info_list(&mut tables, &self.policy.context);
        Ok(tables)
    }

    async fn describe_table(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<TableDetail, QueryError> {
        let mut detail = self.inner.describe_table(schema, table).await?;
        merge_table_detail(&mut detail, &self.policy.context);
        // Sample rows carry real values straight from the catalog path.
        mask_rows(&mut detail.sample_rows, &self.masks, &AliasMap::new());
        Ok(detail)
    }

    async fn discover(&self) -> Result<DiscoveryResult, QueryError> {
        let mut result = self.inner.discover().await?;
        for overview in &mut result.schemas {
            merge_table_info_list(&mut overview.tables, &self.policy.context);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strait_core::port::{ColumnInfo, SchemaOverview};
    use strait_core::{MaskType, ResultRow, SqlValue};

    struct FakeExplorer;

    #[async_trait]
    impl SchemaExplorer for FakeExplorer {
        async fn list_schemas(&self) -> Result<Vec<SchemaInfo>, QueryError> {
            Ok(vec![SchemaInfo {
                name: "public".to_string(),
            }])
        }

        async fn list_tables(&self) -> Result<Vec<TableInfo>, QueryError> {
            Ok(vec![TableInfo {
                schema: "public".to_string(),
                name: "users".to_string(),
                r#type: "table".to_string(),
                ..TableInfo::default()
            }])
        }

        async fn describe_table(
            &self,
            _schema: Option<&str>,
            table: &str,
        ) -> Result<TableDetail, QueryError> {
            if table != "users" {
                return Err(QueryError::NotFound(table.to_string()));
            }
            Ok(TableDetail {
                schema: "public".to_string(),
                name: "users".to_string(),
                columns: vec![ColumnInfo {
                    name: "email".to_string(),
                    data_type: "text".to_string(),
                    is_nullable: false,
                    default_value: String::new(),
                    is_primary_key: false,
                    comment: String::new(),
                    stats: None,
                }],
                sample_rows: vec![ResultRow::from_iter([(
                    "email".to_string(),
                    SqlValue::Text("leak@example.com".into()),
                )])],
                ..TableDetail::default()
            })
        }

        async fn discover(&self) -> Result<DiscoveryResult, QueryError> {
            Ok(DiscoveryResult {
                schemas: vec![SchemaOverview {
                    name: "public".to_string(),
                    tables: self.list_tables().await?,
                }],
            })
        }
    }

    fn policy() -> Policy {
        serde_yaml::from_str(
            r#"
context:
  tables:
    "public.users":
      description: "Registered users"
      columns:
        email:
          description: "Login email"
          mask: redact
"#,
        )
        .unwrap()
    }

    fn decorated() -> PolicyExplorer {
        let pol = policy();
        let masks = crate::merge::mask_spec(&pol.context);
        PolicyExplorer::new(Arc::new(FakeExplorer), pol, masks)
    }

    #[tokio::test]
    async fn describe_masks_sample_rows_and_merges_descriptions() {
        let detail = decorated().describe_table(None, "users").await.unwrap();
        assert_eq!(detail.comment, "Registered users");
        assert_eq!(detail.columns[0].comment, "Login email");
        assert_eq!(
            detail.sample_rows[0].get("email"),
            Some(&SqlValue::Text("***".into()))
        );
    }

    #[tokio::test]
    async fn not_found_passes_through_untouched() {
        let err = decorated()
            .describe_table(None, "nonexistent")
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::NotFound(name) if name == "nonexistent"));
    }

    #[tokio::test]
    async fn discover_merges_descriptions_per_schema() {
        let result = decorated().discover().await.unwrap();
        assert_eq!(result.schemas[0].tables[0].comment, "Registered users");
    }

    #[tokio::test]
    async fn mask_map_is_derived_from_the_policy() {
        let pol = policy();
        let masks = crate::merge::mask_spec(&pol.context);
        assert_eq!(masks.get("email"), Some(&MaskType::Redact));
    }
}
