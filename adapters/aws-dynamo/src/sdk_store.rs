//! `ItemStore` backed by `aws-sdk-dynamodb`.

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

use crate::conversions::Item;
use crate::store::{render_update, EqFilter, ItemStore, StoreError};

/// Thin wrapper over an injected SDK client. Owns no other state.
#[derive(Clone, Debug)]
pub struct SdkItemStore {
    client: Client,
}

impl SdkItemStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential chain (env, profile, IMDS).
    ///
    /// `endpoint_url` points the client at DynamoDB Local or another
    /// compatible endpoint.
    pub async fn from_env(endpoint_url: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let conf = loader.load().await;
        Self::new(Client::new(&conf))
    }
}

#[async_trait]
impl ItemStore for SdkItemStore {
    async fn scan(&self, table: &str, filter: &EqFilter) -> Result<Vec<Item>, StoreError> {
        let (expr, names, values) = filter.render();
        let out = self
            .client
            .scan()
            .table_name(table)
            .filter_expression(expr)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .send()
            .await
            .map_err(|e| map_sdk_err("Scan", e))?;
        Ok(out.items.unwrap_or_default())
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_sdk_err("PutItem", e))?;
        Ok(())
    }

    async fn update_item(
        &self,
        table: &str,
        key: Item,
        attrs: &[(String, AttributeValue)],
    ) -> Result<(), StoreError> {
        let (expr, names, values) = render_update(attrs);
        self.client
            .update_item()
            .table_name(table)
            .set_key(Some(key))
            .update_expression(expr)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .send()
            .await
            .map_err(|e| map_sdk_err("UpdateItem", e))?;
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| map_sdk_err("DeleteItem", e))?;
        Ok(())
    }
}

fn map_sdk_err<E>(operation: &'static str, e: E) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match e.code() {
        Some(code) => StoreError::Service {
            operation,
            code: code.to_string(),
            message: e.message().unwrap_or_default().to_string(),
        },
        None => StoreError::Transport {
            operation,
            message: DisplayErrorContext(&e).to_string(),
        },
    }
}
