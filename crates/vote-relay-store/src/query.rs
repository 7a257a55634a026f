//! Document store query builders.
//!
//! Queries travel as repeated `queries[]` URL parameters, each holding one
//! JSON query object:
//!
//! ```text
//! {"method":"equal","attribute":"targetId","values":["post42"]}
//! {"method":"limit","values":[1]}
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, StoreError};

/// A single filter or pagination query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Query {
    /// Match documents whose attribute equals one of the values.
    Equal {
        /// Attribute name.
        attribute: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Cap the number of returned documents. Does not affect `total`.
    Limit {
        /// Single-element list holding the cap.
        values: [u64; 1],
    },
}

impl Query {
    /// `attribute == value`.
    #[must_use]
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    /// Return at most `limit` documents.
    #[must_use]
    pub const fn limit(limit: u64) -> Self {
        Self::Limit { values: [limit] }
    }

    /// Serialize to the JSON form used in the `queries[]` parameter.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidQuery` if the query cannot be serialized.
    pub fn to_param(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| StoreError::InvalidQuery(e.to_string()))
    }

    /// Returns `true` if a document satisfies this query.
    ///
    /// `Limit` matches every document.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Self::Equal { attribute, values } => document
                .get(attribute)
                .is_some_and(|v| values.iter().any(|expected| expected == v)),
            Self::Limit { .. } => true,
        }
    }
}
