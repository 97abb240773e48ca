//! Policy loading and validation.

use crate::document::Policy;
use std::path::Path;
use strait_core::MaskType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("reading policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing policy YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("validating policy: {0}")]
    Invalid(String),
}

/// Reads, parses, and validates a policy file. The returned policy is
/// published read-only; nothing revalidates at query time.
pub fn load_policy(path: impl AsRef<Path>) -> Result<Policy, PolicyError> {
    let data = std::fs::read_to_string(path)?;
    let policy: Policy = serde_yaml::from_str(&data)?;
    validate(&policy)?;
    Ok(policy)
}

fn validate(policy: &Policy) -> Result<(), PolicyError> {
    // Mask semantics are keyed by bare column name at query time, so one
    // name must never carry two different masks anywhere in the document.
    let mut seen: std::collections::HashMap<&str, (MaskType, &str)> =
        std::collections::HashMap::new();

    for (table_key, table) in &policy.context.tables {
        if table_key.is_empty() {
            return Err(PolicyError::Invalid(
                "context.tables contains an empty key".to_string(),
            ));
        }
        let parts: Vec<&str> = table_key.split('.').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(PolicyError::Invalid(format!(
                "context.tables key {table_key:?} must be qualified as schema.table"
            )));
        }

        for (column, context) in &table.columns {
            if column.is_empty() {
                return Err(PolicyError::Invalid(format!(
                    "context.tables[{table_key:?}].columns contains an empty key"
                )));
            }
            let Some(mask) = context.mask() else {
                continue;
            };
            if let Some((previous_mask, previous_table)) = seen.get(column.as_str()) {
                if *previous_mask != mask {
                    return Err(PolicyError::Invalid(format!(
                        "column {column:?} has conflicting masks: {previous_mask:?} in {previous_table} vs {mask:?} in {table_key}"
                    )));
                }
            }
            seen.insert(column, (mask, table_key));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_str(yaml: &str) -> Result<Policy, PolicyError> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        load_policy(file.path())
    }

    #[test]
    fn loads_a_valid_policy() {
        let policy = load_str(
            r#"
context:
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
        .unwrap();
        assert_eq!(policy.context.tables.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_policy("/nonexistent/policy.yaml"),
            Err(PolicyError::Io(_))
        ));
    }

    #[test]
    fn unqualified_table_keys_are_rejected() {
        let err = load_str(
            r#"
context:
  tables:
    users:
      description: "no schema"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("schema.table"));
    }

    #[test]
    fn empty_column_keys_are_rejected() {
        let err = load_str(
            r#"
context:
  tables:
    "public.users":
      columns:
        "": "oops"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty key"));
    }

    #[test]
    fn invalid_mask_values_fail_to_parse() {
        assert!(matches!(
            load_str(
                r#"
context:
  tables:
    "public.users":
      columns:
        email:
          mask: scramble
"#,
            ),
            Err(PolicyError::Yaml(_))
        ));
    }

    #[test]
    fn conflicting_masks_across_tables_fail_naming_both_sites() {
        let err = load_str(
            r#"
context:
  tables:
    "public.users":
      columns:
        email:
          mask: redact
    "public.orders":
      columns:
        email:
          mask: hash
"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("email"), "{message}");
        assert!(message.contains("public.users"), "{message}");
        assert!(message.contains("public.orders"), "{message}");
    }

    #[test]
    fn identical_masks_across_tables_are_allowed() {
        assert!(load_str(
            r#"
context:
  tables:
    "public.users":
      columns:
        email:
          mask: redact
    "public.orders":
      columns:
        email:
          mask: redact
"#,
        )
        .is_ok());
    }
}
