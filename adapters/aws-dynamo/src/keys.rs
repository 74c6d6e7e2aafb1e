//! Single-table key layout for users.
//!
//! Users live alongside other entity kinds in one physical table. Each user
//! item is keyed by `PK = SK = "USER_<id>"` and tagged with
//! `ENTITY_TYPE = "USER"`.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::conversions::DecodeError;

pub const USER_PREFIX: &str = "USER_";
pub const ENTITY_TYPE_USER: &str = "USER";
pub const ENTITY_TYPE_ATTR: &str = "ENTITY_TYPE";

/// Names of the partition and sort key attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: String,
}

impl KeySchema {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    /// Attribute names used by tables provisioned before the `PK`/`SK` rename.
    pub fn legacy() -> Self {
        Self::new("TABLE-USER_PK", "TABLE-USER_SK")
    }

    /// `"default"` or `"legacy"`, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "legacy" => Some(Self::legacy()),
            _ => None,
        }
    }
}

impl Default for KeySchema {
    fn default() -> Self {
        Self::new("PK", "SK")
    }
}

/// Pattern: `USER_<id>`
pub fn user_pk(id: &str) -> String {
    format!("{USER_PREFIX}{id}")
}

/// Pattern: `USER_<id>` (same as PK, users have no sub-items)
pub fn user_sk(id: &str) -> String {
    format!("{USER_PREFIX}{id}")
}

/// Full primary key of a user item.
pub fn user_key(schema: &KeySchema, id: &str) -> HashMap<String, AttributeValue> {
    let mut key = HashMap::new();
    key.insert(schema.partition_key.clone(), AttributeValue::S(user_pk(id)));
    key.insert(schema.sort_key.clone(), AttributeValue::S(user_sk(id)));
    key
}

/// Recover the user id from a partition key.
///
/// Only the leading `USER_` is stripped; underscores inside the id are kept,
/// so `USER_a_b` decodes to `a_b`.
pub fn id_from_pk(pk: &str) -> Result<String, DecodeError> {
    pk.strip_prefix(USER_PREFIX)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::InvalidKey(pk.to_string()))
}
