//! DynamoDB adapter implementing the `UserRepository` port.
//!
//! Users are stored in one shared table using a single-table layout:
//! - `PK = SK = "USER_<id>"`, with the key attribute names configurable
//!   through [`KeySchema`] (`PK`/`SK` or the legacy `TABLE-USER_PK`/`TABLE-USER_SK`).
//! - `ENTITY_TYPE = "USER"` so other entity kinds can share the table.
//! - `username`, `name` as `S` and `age` as `N`.
//!
//! Notes:
//! - The repository talks to the table through the [`ItemStore`] port
//!   (scan, put, update, delete). [`SdkItemStore`] is the production
//!   implementation, [`MemoryItemStore`] the in-process one.
//! - Lookups by id and username are filtered scans. There is no index usage,
//!   no pagination past the first page and no retry.
//! - [`DynamoTable::from_env`] reads `DYNAMO_TABLE_USERS`,
//!   `DYNAMO_KEY_SCHEMA` and `DYNAMO_ENDPOINT_URL`;
//!   [`DynamoUserRepo::connect`] builds the SDK client for that table.

mod config;
mod conversions;
mod keys;
mod memory_store;
mod repo;
mod sdk_store;
mod store;

pub use config::{DynamoTable, TableConfigError};
pub use conversions::{item_to_user, user_to_item, user_update_attrs, DecodeError, Item};
pub use keys::{
    id_from_pk, user_key, user_pk, user_sk, KeySchema, ENTITY_TYPE_ATTR, ENTITY_TYPE_USER,
    USER_PREFIX,
};
pub use memory_store::MemoryItemStore;
pub use repo::DynamoUserRepo;
pub use sdk_store::SdkItemStore;
pub use store::{render_update, EqFilter, ItemStore, StoreError};
