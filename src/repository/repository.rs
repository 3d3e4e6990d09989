use std::sync::Arc;

use async_trait::async_trait;
use opentelemetry::Context;

use super::error::RepositoryError;
use crate::order::{NewOrder, OrderId};

/// Insert an order and return the identifier storage generated for it.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, cx: &Context, order: &NewOrder) -> Result<OrderId, RepositoryError>;
}

#[async_trait]
impl<R: OrderRepository + ?Sized> OrderRepository for Arc<R> {
    async fn insert(&self, cx: &Context, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        (**self).insert(cx, order).await
    }
}
