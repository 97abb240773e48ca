//! The three tools and the boundary error sanitiser.
//!
//! Handlers are thin adapters: extract typed arguments, delegate to the
//! explorer or the query service, serialise the result as JSON text. Every
//! error crosses the boundary through [`sanitize_error`], which logs the
//! full detail for the operator and returns only a classified message to
//! the client.

use crate::protocol::{CallToolResult, ToolDefinition};
use serde_json::{json, Value};
use std::sync::Arc;
use strait_core::port::SchemaExplorer;
use strait_core::{QueryError, QueryService};

const DESC_DISCOVER: &str = "Discover all schemas and their tables in one call. Returns schemas with nested tables, \
each showing type, estimated row count, total size, column count, and whether indexes exist. \
Call this first to understand the full database landscape before describing individual tables.";

const DESC_DESCRIBE_TABLE: &str = "Describe a table's full structure including: columns with types, nullability, defaults, and comments; \
column-level statistics (cardinality classification, null rates, enum-like values with frequencies, \
value ranges for dates/numbers); primary keys; foreign keys with referenced tables; inferred \
foreign keys suggested by naming conventions; indexes; check constraints; row estimate; table size; \
statistics freshness; sample rows (up to 5); and index usage statistics (scan counts per index). \
Use this to understand a table before writing queries. \
Pay attention to: foreign keys for JOIN paths; cardinality to know what to GROUP BY vs filter; \
enum-like columns show the allowed values; value ranges show date spans and numeric scales; \
null rates help you handle NULLs correctly in filters and JOINs; \
sample rows reveal actual data patterns; index usage shows which indexes are active vs unused.";

const DESC_QUERY: &str = "Execute a read-only SQL query against the database and return results as a JSON array of objects. \
A server-side row limit and query timeout are enforced. \
Always use specific column names instead of SELECT *. \
Use JOINs based on foreign keys discovered via describe_table. \
Check column cardinality from describe_table to write efficient WHERE and GROUP BY clauses. \
Set explain=true to get the EXPLAIN plan instead of results. \
Set explain=true and analyze=true to get EXPLAIN ANALYZE (the query WILL be executed).";

/// Routes tool calls to the explorer and the query service.
pub struct ToolRouter {
    explorer: Arc<dyn SchemaExplorer>,
    query: Arc<QueryService>,
}

impl ToolRouter {
    pub fn new(explorer: Arc<dyn SchemaExplorer>, query: Arc<QueryService>) -> Self {
        Self { explorer, query }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "discover".to_string(),
                description: DESC_DISCOVER.to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                }),
            },
            ToolDefinition {
                name: "describe_table".to_string(),
                description: DESC_DESCRIBE_TABLE.to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "table_name": {
                            "type": "string",
                            "description": "Name of the table to describe",
                        },
                        "schema": {
                            "type": "string",
                            "description": "Schema name (optional, resolves automatically if omitted)",
                        },
                    },
                    "required": ["table_name"],
                }),
            },
            ToolDefinition {
                name: "query".to_string(),
                description: DESC_QUERY.to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "sql": {
                            "type": "string",
                            "description": "SQL query to execute (SELECT statements only)",
                        },
                        "explain": {
                            "type": "boolean",
                            "description": "Return EXPLAIN plan instead of query results. Defaults to false.",
                        },
                        "analyze": {
                            "type": "boolean",
                            "description": "Include actual execution statistics (only used with explain=true, the query WILL be executed). Defaults to false.",
                        },
                    },
                    "required": ["sql"],
                }),
            },
        ]
    }

    pub async fn call(&self, name: &str, arguments: &Value) -> CallToolResult {
        match name {
            "discover" => self.handle_discover().await,
            "describe_table" => self.handle_describe_table(arguments).await,
            "query" => self.handle_query(arguments).await,
            _ => CallToolResult::error(format!("unknown tool: {name}")),
        }
    }

    async fn handle_discover(&self) -> CallToolResult {
        match self.explorer.discover().await {
            Ok(result) => serialize_result(&result, "discover"),
            Err(err) => CallToolResult::error(sanitize_error(&err, "discover")),
        }
    }

    async fn handle_describe_table(&self, arguments: &Value) -> CallToolResult {
        let Some(table_name) = non_empty_str(arguments, "table_name") else {
            return CallToolResult::error("table_name is required");
        };
        let schema = non_empty_str(arguments, "schema");

        match self.explorer.describe_table(schema, table_name).await {
            Ok(detail) => serialize_result(&detail, "describe table"),
            Err(err) => CallToolResult::error(sanitize_error(&err, "describe table")),
        }
    }

    async fn handle_query(&self, arguments: &Value) -> CallToolResult {
        let Some(sql) = non_empty_str(arguments, "sql") else {
            return CallToolResult::error("sql is required");
        };
        let explain = arguments["explain"].as_bool().unwrap_or(false);
        let analyze = arguments["analyze"].as_bool().unwrap_or(false);

        let sql = if explain {
            if analyze {
                format!("EXPLAIN ANALYZE {sql}")
            } else {
                format!("EXPLAIN {sql}")
            }
        } else {
            sql.to_string()
        };

        match self.query.execute("query", &sql).await {
            Ok(rows) => serialize_result(&rows, "query"),
            Err(err) => CallToolResult::error(sanitize_error(&err, "query")),
        }
    }
}

fn non_empty_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments[key].as_str().filter(|s| !s.is_empty())
}

fn serialize_result<T: serde::Serialize>(value: &T, operation: &str) -> CallToolResult {
    match serde_json::to_string(value) {
        Ok(text) => CallToolResult::text(text),
        Err(err) => CallToolResult::error(sanitize_error(
            &QueryError::Internal(err.into()),
            operation,
        )),
    }
}

/// Logs the full error for the operator and returns a safe message for the
/// client. Validation errors are ours and pass through; infrastructure
/// errors are reduced to their class so database-internal details never
/// reach an untrusted model.
pub fn sanitize_error(err: &QueryError, operation: &str) -> String {
    tracing::error!(operation, error = %err, "tool error");

    if err.is_validation() {
        return format!("{operation}: {err}");
    }
    match err {
        QueryError::Timeout => format!("{operation}: query timed out"),
        QueryError::Connection(_) => format!("{operation}: database unavailable"),
        _ => format!("{operation}: internal error (check server logs)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use strait_core::port::{
        DiscoveryResult, NoopAuditor, NoopInstrumentation, QueryExecutor, SchemaInfo,
        SchemaOverview, TableDetail, TableInfo,
    };
    use strait_core::{MaskSpec, ResultRow, SqlValidator, SqlValue};

    struct FakeExplorer;

    #[async_trait]
    impl SchemaExplorer for FakeExplorer {
        async fn list_schemas(&self) -> Result<Vec<SchemaInfo>, QueryError> {
            Ok(vec![])
        }
        async fn list_tables(&self) -> Result<Vec<TableInfo>, QueryError> {
            Ok(vec![])
        }
        async fn describe_table(
            &self,
            _schema: Option<&str>,
            table: &str,
        ) -> Result<TableDetail, QueryError> {
            if table == "users" {
                Ok(TableDetail {
                    schema: "public".to_string(),
                    name: "users".to_string(),
                    ..TableDetail::default()
                })
            } else {
                Err(QueryError::NotFound(table.to_string()))
            }
        }
        async fn discover(&self) -> Result<DiscoveryResult, QueryError> {
            Ok(DiscoveryResult {
                schemas: vec![SchemaOverview {
                    name: "public".to_string(),
                    tables: vec![],
                }],
            })
        }
    }

    /// Records the SQL it receives and returns one fixed row.
    struct EchoExecutor {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl QueryExecutor for EchoExecutor {
        async fn execute(&self, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
            self.seen.lock().unwrap().push(sql.to_string());
            Ok(vec![ResultRow::from_iter([(
                "n".to_string(),
                SqlValue::Int(1),
            )])])
        }
    }

    fn router_with(executor: Arc<EchoExecutor>) -> ToolRouter {
        let service = QueryService::new(
            Arc::new(SqlValidator::new()),
            executor,
            Arc::new(NoopAuditor),
            MaskSpec::new(),
            Arc::new(NoopInstrumentation),
        );
        ToolRouter::new(Arc::new(FakeExplorer), Arc::new(service))
    }

    fn echo() -> Arc<EchoExecutor> {
        Arc::new(EchoExecutor {
            seen: Mutex::new(Vec::new()),
        })
    }

    fn text_of(result: &CallToolResult) -> &str {
        let crate::protocol::ToolContent::Text { text } = &result.content[0];
        text
    }

    #[test]
    fn three_tools_are_defined() {
        let router = router_with(echo());
        let names: Vec<String> = router.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["discover", "describe_table", "query"]);
    }

    #[tokio::test]
    async fn query_returns_rows_as_json_text() {
        let router = router_with(echo());
        let result = router
            .call("query", &json!({"sql": "SELECT 1 AS n"}))
            .await;
        assert!(!result.is_error());
        assert_eq!(text_of(&result), r#"[{"n":1}]"#);
    }

    #[tokio::test]
    async fn rejected_sql_surfaces_the_validation_message() {
        let router = router_with(echo());
        let result = router
            .call("query", &json!({"sql": "DROP TABLE users"}))
            .await;
        assert!(result.is_error());
        assert_eq!(text_of(&result), "query: only SELECT queries are allowed");
    }

    #[tokio::test]
    async fn explain_flag_prefixes_the_sql() {
        let executor = echo();
        let router = router_with(executor.clone());
        router
            .call("query", &json!({"sql": "SELECT 1", "explain": true}))
            .await;
        router
            .call(
                "query",
                &json!({"sql": "SELECT 1", "explain": true, "analyze": true}),
            )
            .await;
        let seen = executor.seen.lock().unwrap();
        assert_eq!(seen[0], "EXPLAIN SELECT 1");
        assert_eq!(seen[1], "EXPLAIN ANALYZE SELECT 1");
    }

    #[tokio::test]
    async fn analyze_without_explain_is_ignored() {
        let executor = echo();
        let router = router_with(executor.clone());
        router
            .call("query", &json!({"sql": "SELECT 1", "analyze": true}))
            .await;
        assert_eq!(executor.seen.lock().unwrap()[0], "SELECT 1");
    }

    #[tokio::test]
    async fn missing_sql_is_reported_without_reaching_the_service() {
        let router = router_with(echo());
        let result = router.call("query", &json!({})).await;
        assert!(result.is_error());
        assert_eq!(text_of(&result), "sql is required");
    }

    #[tokio::test]
    async fn missing_table_error_names_the_table() {
        let router = router_with(echo());
        let result = router
            .call("describe_table", &json!({"table_name": "nonexistent"}))
            .await;
        assert!(result.is_error());
        assert!(text_of(&result).contains("nonexistent"));
    }

    #[tokio::test]
    async fn unknown_tools_are_rejected() {
        let router = router_with(echo());
        let result = router.call("drop_everything", &json!({})).await;
        assert!(result.is_error());
    }

    #[test]
    fn sanitizer_maps_the_error_taxonomy() {
        assert_eq!(
            sanitize_error(&QueryError::NotAllowed, "query"),
            "query: only SELECT queries are allowed"
        );
        assert_eq!(
            sanitize_error(&QueryError::NotFound("users".into()), "describe table"),
            "describe table: table \"users\" not found"
        );
        assert_eq!(
            sanitize_error(&QueryError::Timeout, "query"),
            "query: query timed out"
        );
        assert_eq!(
            sanitize_error(&QueryError::Connection("refused".into()), "query"),
            "query: database unavailable"
        );
        // Internal detail never crosses the boundary.
        let message = sanitize_error(
            &QueryError::Internal(anyhow::anyhow!("oid 16384 missing chunk")),
            "query",
        );
        assert_eq!(message, "query: internal error (check server logs)");
        assert!(!message.contains("16384"));
    }
}
