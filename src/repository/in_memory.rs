use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use opentelemetry::Context;

use super::error::RepositoryError;
use super::repository::OrderRepository;
use crate::order::{NewOrder, Order, OrderId};

/// In-memory order storage with sequential ids starting at 1.
///
/// Cloning creates another handle to the same storage.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored orders, in insertion order.
    pub fn orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("read"))?;
        Ok(orders.clone())
    }

    pub fn get(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("read"))?;
        Ok(orders.iter().find(|o| o.order_id == order_id).cloned())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, _cx: &Context, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| RepositoryError::LockPoisoned("write"))?;

        let next = orders.len() as i64 + 1;
        let order_id = OrderId::new(next).ok_or(RepositoryError::InvalidId(next))?;
        orders.push(order.clone().assign_id(order_id));
        Ok(order_id)
    }
}
