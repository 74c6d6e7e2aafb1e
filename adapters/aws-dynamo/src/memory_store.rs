//! In-process `ItemStore` for tests and local runs.
//!
//! Follows DynamoDB's observable item semantics closely enough to exercise
//! the repository: put overwrites, update upserts, deleting a missing key
//! succeeds, and unknown tables fail with `ResourceNotFoundException`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::conversions::Item;
use crate::keys::KeySchema;
use crate::store::{EqFilter, ItemStore, StoreError};

type Table = BTreeMap<(String, String), Item>;

pub struct MemoryItemStore {
    schema: KeySchema,
    tables: Mutex<HashMap<String, Table>>,
    fail_next: Mutex<Option<StoreError>>,
}

impl MemoryItemStore {
    pub fn new(schema: KeySchema) -> Self {
        Self {
            schema,
            tables: Mutex::new(HashMap::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Create an empty table. Existing tables are left untouched.
    pub fn with_table(self, name: impl Into<String>) -> Self {
        if let Ok(mut tables) = self.tables.lock() {
            tables.entry(name.into()).or_default();
        }
        self
    }

    /// Make the next call fail with `err`, whatever the operation.
    pub fn fail_next(&self, err: StoreError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(err);
        }
    }

    /// Raw items of a table in key order.
    pub fn items(&self, table: &str) -> Vec<Item> {
        let Ok(tables) = self.tables.lock() else {
            return Vec::new();
        };
        match tables.get(table) {
            Some(t) => t.values().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn check(
        &self,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, HashMap<String, Table>>, StoreError> {
        let injected = self
            .fail_next
            .lock()
            .map_err(|_| poisoned(operation))?
            .take();
        if let Some(err) = injected {
            return Err(err);
        }
        self.tables.lock().map_err(|_| poisoned(operation))
    }

    fn key_of(
        &self,
        operation: &'static str,
        item: &Item,
    ) -> Result<(String, String), StoreError> {
        let part = |name: &str| {
            item.get(name)
                .and_then(|v| v.as_s().ok())
                .cloned()
                .ok_or_else(|| StoreError::Service {
                    operation,
                    code: "ValidationException".into(),
                    message: format!("missing key attribute {name}"),
                })
        };
        Ok((
            part(self.schema.partition_key.as_str())?,
            part(self.schema.sort_key.as_str())?,
        ))
    }
}

fn poisoned(operation: &'static str) -> StoreError {
    StoreError::Transport {
        operation,
        message: "mutex poisoned".into(),
    }
}

fn table_mut<'a>(
    tables: &'a mut HashMap<String, Table>,
    operation: &'static str,
    table: &str,
) -> Result<&'a mut Table, StoreError> {
    tables.get_mut(table).ok_or_else(|| StoreError::Service {
        operation,
        code: "ResourceNotFoundException".into(),
        message: format!("table {table} not found"),
    })
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn scan(&self, table: &str, filter: &EqFilter) -> Result<Vec<Item>, StoreError> {
        let mut tables = self.check("Scan")?;
        let t = table_mut(&mut tables, "Scan", table)?;
        Ok(t.values().filter(|it| filter.matches(it)).cloned().collect())
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError> {
        let mut tables = self.check("PutItem")?;
        let key = self.key_of("PutItem", &item)?;
        table_mut(&mut tables, "PutItem", table)?.insert(key, item);
        Ok(())
    }

    async fn update_item(
        &self,
        table: &str,
        key: Item,
        attrs: &[(String, AttributeValue)],
    ) -> Result<(), StoreError> {
        let mut tables = self.check("UpdateItem")?;
        let k = self.key_of("UpdateItem", &key)?;
        let entry = table_mut(&mut tables, "UpdateItem", table)?
            .entry(k)
            .or_insert(key);
        for (name, value) in attrs {
            entry.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<(), StoreError> {
        let mut tables = self.check("DeleteItem")?;
        let k = self.key_of("DeleteItem", &key)?;
        table_mut(&mut tables, "DeleteItem", table)?.remove(&k);
        Ok(())
    }
}
