use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use domain::{CoreError, User, UserRepository};
use tracing::{debug, warn};

use crate::config::DynamoTable;
use crate::conversions::{item_to_user, user_to_item, user_update_attrs, DecodeError};
use crate::keys::{self, KeySchema, ENTITY_TYPE_ATTR, ENTITY_TYPE_USER};
use crate::sdk_store::SdkItemStore;
use crate::store::{EqFilter, ItemStore, StoreError};

/// User repository over a single shared table.
///
/// Every lookup is a filtered scan, so reads cost O(table size). The store
/// handle is injected; the repository keeps no state of its own.
pub struct DynamoUserRepo<S = SdkItemStore> {
    store: S,
    table: String,
    schema: KeySchema,
}

impl<S: ItemStore> DynamoUserRepo<S> {
    pub fn new(store: S, table: impl Into<String>, schema: KeySchema) -> Self {
        Self {
            store,
            table: table.into(),
            schema,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Scan with `filter` and decode the first item returned, if any.
    async fn first_match(&self, filter: EqFilter) -> Result<Option<User>, CoreError> {
        let items = self
            .store
            .scan(&self.table, &filter)
            .await
            .map_err(store_failure)?;
        match items.first() {
            Some(item) => item_to_user(&self.schema, item)
                .map(Some)
                .map_err(decode_failure),
            None => Ok(None),
        }
    }
}

impl DynamoUserRepo<SdkItemStore> {
    /// Construct with a default AWS SDK client for the given table.
    pub async fn connect(table: DynamoTable) -> Self {
        let store = SdkItemStore::from_env(table.endpoint_url.as_deref()).await;
        Self::new(store, table.name, table.schema)
    }
}

#[async_trait]
impl<S: ItemStore> UserRepository for DynamoUserRepo<S> {
    async fn get_all(&self) -> Result<Vec<User>, CoreError> {
        debug!(table = %self.table, "scan users");
        let filter = EqFilter::new(
            ENTITY_TYPE_ATTR,
            AttributeValue::S(ENTITY_TYPE_USER.to_string()),
        );
        let items = self
            .store
            .scan(&self.table, &filter)
            .await
            .map_err(store_failure)?;
        let mut users = Vec::with_capacity(items.len());
        for item in &items {
            match item_to_user(&self.schema, item) {
                Ok(user) => users.push(user),
                Err(e) => warn!(table = %self.table, error = %e, "skipping unreadable user item"),
            }
        }
        Ok(users)
    }

    async fn save(&self, user: User) -> Result<User, CoreError> {
        debug!(table = %self.table, id = %user.id, "put user");
        let item = user_to_item(&self.schema, &user);
        self.store
            .put_item(&self.table, item)
            .await
            .map_err(store_failure)?;
        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        debug!(table = %self.table, %username, "scan user by username");
        self.first_match(EqFilter::new(
            "username",
            AttributeValue::S(username.to_string()),
        ))
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, CoreError> {
        debug!(table = %self.table, %id, "scan user by id");
        self.first_match(EqFilter::new(
            self.schema.partition_key.clone(),
            AttributeValue::S(keys::user_pk(id)),
        ))
        .await
    }

    async fn update(&self, user: User) -> Result<User, CoreError> {
        debug!(table = %self.table, id = %user.id, "update user");
        let key = keys::user_key(&self.schema, &user.id);
        self.store
            .update_item(&self.table, key, &user_update_attrs(&user))
            .await
            .map_err(store_failure)?;
        Ok(user)
    }

    async fn delete(&self, user: &User) -> Result<(), CoreError> {
        debug!(table = %self.table, id = %user.id, "delete user");
        let key = keys::user_key(&self.schema, &user.id);
        self.store
            .delete_item(&self.table, key)
            .await
            .map_err(store_failure)
    }
}

fn store_failure(e: StoreError) -> CoreError {
    warn!(error = %e, "dynamo request failed");
    CoreError::Repository(format!("dynamo error: {e}"))
}

fn decode_failure(e: DecodeError) -> CoreError {
    warn!(error = %e, "unreadable user item");
    CoreError::Decode(e.to_string())
}
