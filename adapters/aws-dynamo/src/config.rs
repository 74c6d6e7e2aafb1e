use crate::keys::KeySchema;

/// A table setting that is missing or unparseable.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TableConfigError {
    /// Environment variable at fault.
    pub var: &'static str,
    pub message: String,
}

/// Where user items live and how their keys are named.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamoTable {
    pub name: String,
    pub schema: KeySchema,
    /// Endpoint override, e.g. `http://localhost:8000` for DynamoDB Local.
    pub endpoint_url: Option<String>,
}

impl DynamoTable {
    /// Create with an explicit table name and the default `PK`/`SK` schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: KeySchema::default(),
            endpoint_url: None,
        }
    }

    /// Build from environment variables:
    /// - `DYNAMO_TABLE_USERS` (required)
    /// - `DYNAMO_KEY_SCHEMA` (optional, `default` or `legacy`)
    /// - `DYNAMO_ENDPOINT_URL` (optional)
    pub fn from_env() -> Result<Self, TableConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, TableConfigError> {
        let name = get("DYNAMO_TABLE_USERS")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TableConfigError {
                var: "DYNAMO_TABLE_USERS",
                message: "missing DYNAMO_TABLE_USERS".into(),
            })?;
        let schema = match get("DYNAMO_KEY_SCHEMA") {
            Some(raw) => KeySchema::parse(&raw).ok_or_else(|| TableConfigError {
                var: "DYNAMO_KEY_SCHEMA",
                message: format!("invalid DYNAMO_KEY_SCHEMA: {raw} (expected default or legacy)"),
            })?,
            None => KeySchema::default(),
        };
        let endpoint_url = get("DYNAMO_ENDPOINT_URL").filter(|s| !s.is_empty());
        Ok(Self {
            name,
            schema,
            endpoint_url,
        })
    }
}
