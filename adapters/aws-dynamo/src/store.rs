//! The four item-level primitives the user repository needs from a store.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::conversions::Item;

/// Equality filter `attribute == value`, the only predicate the repository issues.
#[derive(Clone, Debug, PartialEq)]
pub struct EqFilter {
    pub attribute: String,
    pub value: AttributeValue,
}

impl EqFilter {
    pub fn new(attribute: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            attribute: attribute.into(),
            value,
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        item.get(&self.attribute) == Some(&self.value)
    }

    /// Filter expression plus its name and value placeholders.
    ///
    /// The attribute name is always aliased so reserved words like `name`
    /// and key names containing `-` are safe.
    pub fn render(&self) -> (String, HashMap<String, String>, HashMap<String, AttributeValue>) {
        let names = HashMap::from([("#f".to_string(), self.attribute.clone())]);
        let values = HashMap::from([(":v".to_string(), self.value.clone())]);
        ("#f = :v".to_string(), names, values)
    }
}

/// `SET #a0 = :a0, #a1 = :a1, ...` for the given attributes, in order.
pub fn render_update(
    attrs: &[(String, AttributeValue)],
) -> (String, HashMap<String, String>, HashMap<String, AttributeValue>) {
    let mut clauses = Vec::with_capacity(attrs.len());
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    for (i, (name, value)) in attrs.iter().enumerate() {
        clauses.push(format!("#a{i} = :a{i}"));
        names.insert(format!("#a{i}"), name.clone());
        values.insert(format!(":a{i}"), value.clone());
    }
    (format!("SET {}", clauses.join(", ")), names, values)
}

/// Failure reported by the store. Propagated as-is, never retried here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store answered with an error code (throttling, missing table, validation...).
    #[error("{operation} failed: {code}: {message}")]
    Service {
        operation: &'static str,
        code: String,
        message: String,
    },
    /// The request never got a service answer (connectivity, timeout, credentials).
    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
}

/// Minimal store client contract.
///
/// `scan` returns the first page only. `update_item` on a missing key is
/// whatever the store does (DynamoDB creates the item).
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn scan(&self, table: &str, filter: &EqFilter) -> Result<Vec<Item>, StoreError>;
    async fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError>;
    async fn update_item(
        &self,
        table: &str,
        key: Item,
        attrs: &[(String, AttributeValue)],
    ) -> Result<(), StoreError>;
    async fn delete_item(&self, table: &str, key: Item) -> Result<(), StoreError>;
}
