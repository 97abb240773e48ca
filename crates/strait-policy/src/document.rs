//! Policy document structure.

use serde::Deserialize;
use std::collections::HashMap;
use strait_core::MaskType;

/// Root of the policy YAML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub context: ContextConfig,
}

/// Maps fully-qualified table names (`schema.table`) to business context.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub tables: HashMap<String, TableContext>,
}

/// Descriptions and column annotations for one table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableContext {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub columns: HashMap<String, ColumnContext>,
}

/// A column annotation. The YAML admits both a plain string (description
/// only, the legacy form) and a mapping with description and mask.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnContext {
    Plain(String),
    Detailed {
        #[serde(default)]
        description: String,
        #[serde(default)]
        mask: Option<MaskType>,
    },
}

impl ColumnContext {
    pub fn description(&self) -> &str {
        match self {
            ColumnContext::Plain(desc) => desc,
            ColumnContext::Detailed { description, .. } => description,
        }
    }

    pub fn mask(&self) -> Option<MaskType> {
        match self {
            ColumnContext::Plain(_) => None,
            ColumnContext::Detailed { mask, .. } => *mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_value_admits_both_forms() {
        let yaml = r#"
tables:
  "public.users":
    description: "Registered users"
    columns:
      email:
        description: "Login email"
        mask: redact
      name: "Display name"
"#;
        let ctx: ContextConfig = serde_yaml::from_str(yaml).unwrap();
        let table = &ctx.tables["public.users"];
        assert_eq!(table.description, "Registered users");
        assert_eq!(table.columns["email"].description(), "Login email");
        assert_eq!(table.columns["email"].mask(), Some(MaskType::Redact));
        assert_eq!(table.columns["name"].description(), "Display name");
        assert_eq!(table.columns["name"].mask(), None);
    }

    #[test]
    fn unknown_mask_values_are_rejected_by_serde() {
        let yaml = r#"
tables:
  "public.users":
    columns:
      email:
        mask: scramble
"#;
        assert!(serde_yaml::from_str::<ContextConfig>(yaml).is_err());
    }
}
