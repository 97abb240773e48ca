//! Column-value masking.
//!
//! Masks run post-execution, after rows are fully materialised, and rewrite
//! values in place. Matching is by bare result column name with one
//! alias-resolution hop (no transitive chains).

use crate::alias::AliasMap;
use crate::row::ResultRow;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// The closed set of masking directives a policy may assign to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskType {
    /// Replace with the literal `***`.
    Redact,
    /// Replace with the 64-hex-character SHA-256 of the rendered value.
    Hash,
    /// Reveal the last 4 code points, star the rest.
    Partial,
    /// Replace with SQL null.
    Null,
}

/// Bare result column name → mask.
pub type MaskSpec = HashMap<String, MaskType>;

/// Transforms one value according to `mask`. Nulls pass through untouched
/// for every mask type.
pub fn apply_mask(value: &SqlValue, mask: MaskType) -> SqlValue {
    if value.is_null() {
        return SqlValue::Null;
    }
    match mask {
        MaskType::Redact => SqlValue::Text("***".to_string()),
        MaskType::Hash => {
            let digest = Sha256::digest(value.render().as_bytes());
            SqlValue::Text(hex::encode(digest))
        }
        MaskType::Partial => SqlValue::Text(mask_partial(&value.render())),
        MaskType::Null => SqlValue::Null,
    }
}

/// Reveals only the last 4 Unicode code points. Values of 4 or fewer code
/// points come back as `***<value>`. Code-point counting, not bytes:
/// multi-byte scripts must not be split mid-character.
fn mask_partial(s: &str) -> String {
    let count = s.chars().count();
    if count <= 4 {
        return format!("***{s}");
    }
    let visible: String = s.chars().skip(count - 4).collect();
    let mut masked = "*".repeat(count - 4);
    masked.push_str(&visible);
    masked
}

/// Applies `spec` to every row in place. For each spec entry the exact
/// column name is tried first; if absent and the alias map carries a
/// mapping for that name, the aliased field is masked instead.
pub fn mask_rows(rows: &mut [ResultRow], spec: &MaskSpec, aliases: &AliasMap) {
    if spec.is_empty() {
        return;
    }
    for row in rows.iter_mut() {
        for (column, mask) in spec {
            if let Some(value) = row.get_mut(column) {
                *value = apply_mask(value, *mask);
            } else if let Some(alias) = aliases.get(column) {
                if let Some(value) = row.get_mut(alias) {
                    *value = apply_mask(value, *mask);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn redact_is_type_independent() {
        assert_eq!(apply_mask(&SqlValue::Int(42), MaskType::Redact), text("***"));
        assert_eq!(apply_mask(&text("secret"), MaskType::Redact), text("***"));
        assert_eq!(
            apply_mask(&SqlValue::Bool(true), MaskType::Redact),
            text("***")
        );
    }

    #[test]
    fn redact_is_idempotent() {
        let once = apply_mask(&text("secret"), MaskType::Redact);
        let twice = apply_mask(&once, MaskType::Redact);
        assert_eq!(once, twice);
    }

    #[test]
    fn null_passes_through_every_mask() {
        for mask in [
            MaskType::Redact,
            MaskType::Hash,
            MaskType::Partial,
            MaskType::Null,
        ] {
            assert_eq!(apply_mask(&SqlValue::Null, mask), SqlValue::Null);
        }
    }

    #[test]
    fn hash_is_deterministic_and_64_hex() {
        let a = apply_mask(&text("alice@example.com"), MaskType::Hash);
        let b = apply_mask(&text("alice@example.com"), MaskType::Hash);
        assert_eq!(a, b);
        let SqlValue::Text(digest) = a else {
            panic!("hash mask must produce text")
        };
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_collapses_equal_renderings_across_types() {
        assert_eq!(
            apply_mask(&SqlValue::Int(12345), MaskType::Hash),
            apply_mask(&text("12345"), MaskType::Hash)
        );
    }

    #[test]
    fn partial_reveals_last_four_code_points() {
        assert_eq!(
            apply_mask(&text("123456789"), MaskType::Partial),
            text("*****6789")
        );
    }

    #[test]
    fn partial_short_values_get_the_sentinel_prefix() {
        assert_eq!(apply_mask(&text("abcd"), MaskType::Partial), text("***abcd"));
        assert_eq!(apply_mask(&text("x"), MaskType::Partial), text("***x"));
    }

    #[test]
    fn partial_counts_code_points_not_bytes() {
        // 6 code points, multi-byte script; last 4 must survive intact.
        let masked = apply_mask(&text("日本語テスト"), MaskType::Partial);
        assert_eq!(masked, text("**語テスト"));
    }

    #[test]
    fn null_mask_is_indistinguishable_from_db_null() {
        assert_eq!(apply_mask(&text("secret"), MaskType::Null), SqlValue::Null);
    }

    #[test]
    fn mask_rows_hits_exact_names() {
        let mut rows = vec![ResultRow::from_iter([
            ("id".to_string(), SqlValue::Int(1)),
            ("email".to_string(), text("a@example.com")),
        ])];
        let spec = MaskSpec::from([("email".to_string(), MaskType::Redact)]);
        mask_rows(&mut rows, &spec, &AliasMap::new());
        assert_eq!(rows[0].get("email"), Some(&text("***")));
        assert_eq!(rows[0].get("id"), Some(&SqlValue::Int(1)));
    }

    #[test]
    fn mask_rows_follows_one_alias_hop() {
        // SELECT "Email" AS email — the row field is `email`, the mask is
        // keyed on `Email`.
        let mut rows = vec![ResultRow::from_iter([(
            "email".to_string(),
            text("a@example.com"),
        )])];
        let spec = MaskSpec::from([("Email".to_string(), MaskType::Redact)]);
        let aliases = AliasMap::from([("Email".to_string(), "email".to_string())]);
        mask_rows(&mut rows, &spec, &aliases);
        assert_eq!(rows[0].get("email"), Some(&text("***")));
    }

    #[test]
    fn mask_rows_without_spec_is_a_noop() {
        let mut rows = vec![ResultRow::from_iter([(
            "email".to_string(),
            text("a@example.com"),
        )])];
        mask_rows(&mut rows, &MaskSpec::new(), &AliasMap::new());
        assert_eq!(rows[0].get("email"), Some(&text("a@example.com")));
    }
}
