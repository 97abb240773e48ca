//! Foreign-key candidates inferred from column naming patterns.
//!
//! Type compatibility is left to the adapter: type names are
//! database-specific.

use std::collections::HashSet;

/// A possible foreign key suggested by a `*_id` column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FkCandidate {
    /// e.g. `user_id`.
    pub column_name: String,
    /// e.g. `users`.
    pub referenced_table: String,
    /// `high` for the plural-s or bare-prefix match, `medium` for `+es`.
    pub confidence: &'static str,
    pub reason: String,
}

/// Checks whether `column_name` follows the `*_id` convention and matches a
/// known table name in plural (`+s`), bare, or `+es` form.
pub fn match_fk_naming_pattern(
    column_name: &str,
    table_names: &HashSet<String>,
) -> Option<FkCandidate> {
    let prefix = column_name.strip_suffix("_id")?;
    if prefix.is_empty() {
        return None;
    }

    let candidates = [format!("{prefix}s"), prefix.to_string(), format!("{prefix}es")];
    for (i, candidate) in candidates.iter().enumerate() {
        if !table_names.contains(candidate) {
            continue;
        }
        let confidence = if i < 2 { "high" } else { "medium" };
        return Some(FkCandidate {
            column_name: column_name.to_string(),
            referenced_table: candidate.clone(),
            confidence,
            reason: format!(
                "column {column_name:?} matches naming pattern for table {candidate:?}"
            ),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plural_s_match_is_high_confidence() {
        let c = match_fk_naming_pattern("user_id", &tables(&["users", "orders"])).unwrap();
        assert_eq!(c.referenced_table, "users");
        assert_eq!(c.confidence, "high");
    }

    #[test]
    fn bare_prefix_match_is_high_confidence() {
        let c = match_fk_naming_pattern("staff_id", &tables(&["staff"])).unwrap();
        assert_eq!(c.referenced_table, "staff");
        assert_eq!(c.confidence, "high");
    }

    #[test]
    fn es_plural_match_is_medium_confidence() {
        let c = match_fk_naming_pattern("address_id", &tables(&["addresses"])).unwrap();
        assert_eq!(c.referenced_table, "addresses");
        assert_eq!(c.confidence, "medium");
    }

    #[test]
    fn prefers_plural_s_over_es() {
        let c = match_fk_naming_pattern("box_id", &tables(&["boxs", "boxes"])).unwrap();
        assert_eq!(c.referenced_table, "boxs");
        assert_eq!(c.confidence, "high");
    }

    #[test]
    fn non_id_columns_do_not_match() {
        assert!(match_fk_naming_pattern("email", &tables(&["emails"])).is_none());
        assert!(match_fk_naming_pattern("_id", &tables(&["s"])).is_none());
    }

    #[test]
    fn unknown_tables_do_not_match() {
        assert!(match_fk_naming_pattern("vendor_id", &tables(&["users"])).is_none());
    }
}
