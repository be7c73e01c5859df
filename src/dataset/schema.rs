//! Class schema: ordered class names indexed by class id.

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// Ordered class names. Position in the list is the class id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassSchema {
    names: Vec<String>,
}

impl ClassSchema {
    /// Build a schema, rejecting an empty list or blank names.
    pub fn new<I, S>(names: I) -> Result<Self, PrepError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.into().trim().to_string())
            .collect();

        if names.is_empty() {
            return Err(PrepError::InvalidConfig {
                message: "class schema must contain at least one class".to_string(),
            });
        }
        if let Some(idx) = names.iter().position(|name| name.is_empty()) {
            return Err(PrepError::InvalidConfig {
                message: format!("class name at index {} is empty", idx),
            });
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `class_id` is a valid index into the schema.
    pub fn contains(&self, class_id: i64) -> bool {
        class_id >= 0 && (class_id as u64) < self.names.len() as u64
    }
}

impl Default for ClassSchema {
    fn default() -> Self {
        Self {
            names: vec!["fire".to_string(), "smoke".to_string()],
        }
    }
}
