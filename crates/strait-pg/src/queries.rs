//! Catalog SQL.
//!
//! Queries with a `{filter}` placeholder receive the schema-filter clause
//! from `filters::schema_filter`; bind parameters for the filter start at
//! the `$n` index noted on each query.

/// Filter placeholder only; no other parameters.
pub(crate) const LIST_SCHEMAS: &str = "\
SELECT s.schema_name
FROM information_schema.schemata s
WHERE {filter}
ORDER BY s.schema_name";

/// Filter placeholder only. Returns listing info: size, column count,
/// index presence, comment.
pub(crate) const LIST_TABLES: &str = "\
SELECT
    t.table_schema,
    t.table_name,
    CASE t.table_type
        WHEN 'BASE TABLE' THEN 'table'
        WHEN 'VIEW' THEN 'view'
        ELSE lower(t.table_type)
    END AS type,
    COALESCE(s.n_live_tup, 0)::bigint AS row_estimate,
    CASE WHEN t.table_type = 'BASE TABLE' THEN
        COALESCE(pg_total_relation_size(
            (quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::regclass
        ), 0)
    ELSE 0
    END AS total_bytes,
    CASE WHEN t.table_type = 'BASE TABLE' THEN
        pg_size_pretty(COALESCE(pg_total_relation_size(
            (quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::regclass
        ), 0))
    ELSE '0 bytes'
    END AS size_human,
    (SELECT count(*)::int FROM information_schema.columns c
     WHERE c.table_schema = t.table_schema AND c.table_name = t.table_name
    ) AS column_count,
    EXISTS(
        SELECT 1 FROM pg_indexes pgi
        WHERE pgi.schemaname = t.table_schema AND pgi.tablename = t.table_name
    ) AS has_indexes,
    COALESCE(pg_catalog.obj_description(
        (quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::regclass, 'pg_class'
    ), '') AS comment
FROM information_schema.tables t
LEFT JOIN pg_stat_user_tables s
    ON s.schemaname = t.table_schema AND s.relname = t.table_name
WHERE {filter}
    AND t.table_type IN ('BASE TABLE', 'VIEW')
ORDER BY t.table_schema, t.table_name";

/// $1 = table_name; filter parameters start at $2. Resolves the schema and
/// comment for a table named without a schema.
pub(crate) const TABLE_META: &str = "\
SELECT t.table_schema,
       COALESCE(pg_catalog.obj_description(
           (quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::regclass, 'pg_class'
       ), '')
FROM information_schema.tables t
WHERE t.table_name = $1
    AND {filter}
LIMIT 1";

/// $1 = schema, $2 = table_name. Zero rows means the table does not exist.
pub(crate) const TABLE_COMMENT: &str = "\
SELECT COALESCE(pg_catalog.obj_description(c.oid, 'pg_class'), '')
FROM pg_class c
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1 AND c.relname = $2";

/// $1 = schema, $2 = table_name.
pub(crate) const COLUMNS: &str = "\
SELECT
    c.column_name,
    c.data_type,
    c.is_nullable = 'YES',
    COALESCE(c.column_default, ''),
    COALESCE(pg_catalog.col_description(
        (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass,
        c.ordinal_position
    ), '')
FROM information_schema.columns c
WHERE c.table_schema = $1 AND c.table_name = $2
ORDER BY c.ordinal_position";

/// $1 = schema, $2 = table_name.
pub(crate) const PRIMARY_KEYS: &str = "\
SELECT a.attname
FROM pg_index i
JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
WHERE i.indrelid = (quote_ident($1) || '.' || quote_ident($2))::regclass
    AND i.indisprimary";

/// $1 = schema, $2 = table_name.
pub(crate) const FOREIGN_KEYS: &str = "\
SELECT
    tc.constraint_name,
    kcu.column_name,
    ccu.table_name AS referenced_table,
    ccu.column_name AS referenced_column
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
    ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
JOIN information_schema.constraint_column_usage ccu
    ON tc.constraint_name = ccu.constraint_name AND tc.table_schema = ccu.table_schema
WHERE tc.constraint_type = 'FOREIGN KEY'
    AND tc.table_schema = $1
    AND tc.table_name = $2";

/// $1 = schema, $2 = table_name.
pub(crate) const INDEXES: &str = "\
SELECT
    pgi.indexname,
    pgi.indexdef,
    i.indisunique
FROM pg_indexes pgi
JOIN pg_class c ON c.relname = pgi.indexname
JOIN pg_index i ON i.indexrelid = c.oid
WHERE pgi.schemaname = $1 AND pgi.tablename = $2";

/// $1 = schema, $2 = table_name. Float casts keep the scan types uniform.
pub(crate) const COLUMN_STATS: &str = "\
SELECT
    s.attname,
    s.null_frac::float8,
    s.n_distinct::float8,
    s.most_common_vals::text,
    s.most_common_freqs::text,
    s.histogram_bounds::text
FROM pg_stats s
WHERE s.schemaname = $1 AND s.tablename = $2
ORDER BY s.attname";

/// $1 = schema, $2 = table_name.
pub(crate) const CHECK_CONSTRAINTS: &str = "\
SELECT
    c.conname,
    pg_get_constraintdef(c.oid)
FROM pg_constraint c
JOIN pg_class r ON r.oid = c.conrelid
JOIN pg_namespace n ON n.oid = r.relnamespace
WHERE n.nspname = $1 AND r.relname = $2 AND c.contype = 'c'
ORDER BY c.conname";

/// $1 = schema, $2 = table_name.
pub(crate) const TABLE_SIZE: &str = "\
SELECT
    COALESCE(c.reltuples::bigint, 0),
    COALESCE(pg_total_relation_size(c.oid), 0),
    pg_size_pretty(COALESCE(pg_total_relation_size(c.oid), 0))
FROM pg_class c
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1 AND c.relname = $2";

/// $1 = schema, $2 = table_name.
pub(crate) const STATS_AGE: &str = "\
SELECT COALESCE(last_autoanalyze, last_analyze)
FROM pg_stat_user_tables
WHERE schemaname = $1 AND relname = $2";

/// $1 = schema, $2 = table_name.
pub(crate) const INDEX_USAGE: &str = "\
SELECT
    s.indexrelname AS index_name,
    COALESCE(s.idx_scan, 0)::bigint AS scans,
    COALESCE(pg_relation_size(s.indexrelid), 0) AS size_bytes,
    pg_size_pretty(COALESCE(pg_relation_size(s.indexrelid), 0)) AS size_human
FROM pg_stat_user_indexes s
WHERE s.schemaname = $1 AND s.relname = $2
ORDER BY s.indexrelname";

/// $1 = schema, $2 = table_name. Column names and formatted types for FK
/// inference.
pub(crate) const PROFILE_COLUMNS: &str = "\
SELECT a.attname, pg_catalog.format_type(a.atttypid, a.atttypmod)
FROM pg_attribute a
JOIN pg_class c ON c.oid = a.attrelid
JOIN pg_namespace n ON n.oid = c.relnamespace
WHERE n.nspname = $1 AND c.relname = $2 AND a.attnum > 0 AND NOT a.attisdropped
ORDER BY a.attnum";

/// $1 = schema, $2 = table_name. Columns already covered by explicit FKs.
pub(crate) const EXPLICIT_FK_COLUMNS: &str = "\
SELECT kcu.column_name
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
    ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
WHERE tc.constraint_type = 'FOREIGN KEY'
    AND tc.table_schema = $1 AND tc.table_name = $2";

/// Filter placeholder; parameters start at $1. All primary key columns in
/// scope, for FK inference.
pub(crate) const PK_INDEX: &str = "\
SELECT c.relname, a.attname, pg_catalog.format_type(a.atttypid, a.atttypmod)
FROM pg_index i
JOIN pg_class c ON c.oid = i.indrelid
JOIN pg_namespace n ON n.oid = c.relnamespace
JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
WHERE i.indisprimary AND {filter}";
