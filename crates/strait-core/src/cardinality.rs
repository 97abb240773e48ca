//! Cardinality classification of column value distributions.

use serde::{Deserialize, Serialize};

/// Human-friendly shape of a column's value distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardinalityClass {
    Unique,
    NearUnique,
    HighCardinality,
    LowCardinality,
    EnumLike,
}

impl CardinalityClass {
    /// Classifies from absolute distinct and total row counts. Adapters
    /// convert database-specific statistics (e.g. pg_stats `n_distinct`)
    /// to absolute counts before calling this.
    pub fn classify(distinct_count: i64, total_rows: i64) -> Self {
        if total_rows > 0 && distinct_count == total_rows {
            return CardinalityClass::Unique;
        }
        if total_rows > 0 && distinct_count as f64 / total_rows as f64 >= 0.9 {
            return CardinalityClass::NearUnique;
        }
        if distinct_count <= 20 {
            return CardinalityClass::EnumLike;
        }
        if distinct_count <= 200 {
            return CardinalityClass::LowCardinality;
        }
        CardinalityClass::HighCardinality
    }
}

#[cfg(test)]
mod tests {
    use super::CardinalityClass::{self, *};

    #[test]
    fn exact_match_on_rows_is_unique() {
        assert_eq!(CardinalityClass::classify(1000, 1000), Unique);
        assert_eq!(CardinalityClass::classify(1, 1), Unique);
    }

    #[test]
    fn ninety_percent_ratio_is_near_unique() {
        assert_eq!(CardinalityClass::classify(950, 1000), NearUnique);
        assert_eq!(CardinalityClass::classify(900, 1000), NearUnique);
    }

    #[test]
    fn small_distinct_counts_are_enum_like() {
        assert_eq!(CardinalityClass::classify(3, 1_000_000), EnumLike);
        assert_eq!(CardinalityClass::classify(20, 1_000_000), EnumLike);
    }

    #[test]
    fn mid_range_is_low_cardinality() {
        assert_eq!(CardinalityClass::classify(21, 1_000_000), LowCardinality);
        assert_eq!(CardinalityClass::classify(200, 1_000_000), LowCardinality);
    }

    #[test]
    fn everything_else_is_high_cardinality() {
        assert_eq!(CardinalityClass::classify(201, 1_000_000), HighCardinality);
        assert_eq!(CardinalityClass::classify(50_000, 1_000_000), HighCardinality);
    }

    #[test]
    fn zero_rows_falls_through_to_distinct_thresholds() {
        assert_eq!(CardinalityClass::classify(0, 0), EnumLike);
        assert_eq!(CardinalityClass::classify(500, 0), HighCardinality);
    }
}
