//! Field-scoped validation errors.
//!
//! Mutations collect every problem with the submitted input and hand the
//! whole map back, so the caller can render each message next to the
//! offending field instead of failing on the first problem.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Validation messages keyed by field name.
///
/// Line-item fields use the `items[<index>].<field>` convention, where the
/// index refers to the submitted row after blank rows are filtered out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single field, single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Messages for one field; empty when the field validated cleanly.
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_multiple_messages_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("number", "Invoice number is required");
        errors.add("number", "This invoice number already exists");
        errors.add("issue_date", "Issue date is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.messages("number").len(), 2);
        assert_eq!(
            errors.messages("issue_date"),
            &["Issue date is required".to_string()]
        );
        assert!(errors.messages("due_date").is_empty());
    }

    #[test]
    fn display_joins_fields_and_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Client name is required");
        errors.add("email", "Invalid email address");

        let rendered = errors.to_string();
        assert!(rendered.contains("name: Client name is required"));
        assert!(rendered.contains("email: Invalid email address"));
    }
}
