//! Schema filtering and identifier helpers.

/// Returns a WHERE fragment and its bind arguments for filtering `column`
/// by the schema allow-list. `param_offset` is the first `$n` index to use
/// (1-based). An empty allow-list excludes the system schemas instead, so
/// `pg_catalog` and `information_schema` never leak into results.
pub(crate) fn schema_filter(
    schemas: &[String],
    column: &str,
    param_offset: usize,
) -> (String, Vec<String>) {
    if schemas.is_empty() {
        return (
            format!("{column} NOT IN ('pg_catalog', 'information_schema')"),
            Vec::new(),
        );
    }
    let placeholders: Vec<String> = (0..schemas.len())
        .map(|i| format!("${}", param_offset + i))
        .collect();
    (
        format!("{column} IN ({})", placeholders.join(", ")),
        schemas.to_vec(),
    )
}

/// Quotes a SQL identifier, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Type compatibility for FK inference: a closed equivalence over the
/// integer family, uuid, the text family, and exact matches.
pub(crate) fn is_type_compatible(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    const INT_TYPES: &[&str] = &[
        "integer",
        "bigint",
        "smallint",
        "int",
        "int2",
        "int4",
        "int8",
        "serial",
        "bigserial",
        "smallserial",
    ];
    const TEXT_TYPES: &[&str] = &["text", "character varying", "varchar"];

    let int_a = INT_TYPES.contains(&a.as_str());
    let int_b = INT_TYPES.contains(&b.as_str());
    if int_a && int_b {
        return true;
    }
    if a == "uuid" && b == "uuid" {
        return true;
    }
    if TEXT_TYPES.contains(&a.as_str()) && TEXT_TYPES.contains(&b.as_str()) {
        return true;
    }
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_excludes_system_schemas() {
        let (clause, args) = schema_filter(&[], "t.table_schema", 1);
        assert_eq!(
            clause,
            "t.table_schema NOT IN ('pg_catalog', 'information_schema')"
        );
        assert!(args.is_empty());
    }

    #[test]
    fn allow_list_builds_placeholders_from_the_offset() {
        let schemas = vec!["public".to_string(), "sales".to_string()];
        let (clause, args) = schema_filter(&schemas, "n.nspname", 2);
        assert_eq!(clause, "n.nspname IN ($2, $3)");
        assert_eq!(args, schemas);
    }

    #[test]
    fn quote_ident_doubles_embedded_quotes() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn integer_family_is_mutually_compatible() {
        assert!(is_type_compatible("integer", "bigint"));
        assert!(is_type_compatible("serial", "int8"));
        assert!(!is_type_compatible("integer", "uuid"));
    }

    #[test]
    fn text_family_and_exact_matches() {
        assert!(is_type_compatible("text", "character varying"));
        assert!(is_type_compatible("uuid", "uuid"));
        assert!(is_type_compatible("timestamptz", "timestamptz"));
        assert!(!is_type_compatible("text", "bytea"));
    }
}
