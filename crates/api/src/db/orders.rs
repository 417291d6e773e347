//! Order repository.
//!
//! Checkout inserts the order and empties the buyer's cart in one
//! transaction, so a placed order with a still-full cart can never be
//! observed.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use threadline_core::{Money, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderAddress, OrderItem};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    items: Json<Vec<OrderItem>>,
    subtotal: Money,
    shipping_cost: Money,
    discount: Money,
    tax: Money,
    total: Money,
    shipping_address: Json<OrderAddress>,
    billing_address: Json<OrderAddress>,
    payment_method: String,
    payment_status: String,
    status: String,
    tracking_number: Option<String>,
    tracking_url: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
    delivered_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let payment_status: PaymentStatus = row
            .payment_status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: OrderId::new(row.id),
            user: UserId::new(row.user_id),
            items: row.items.0,
            subtotal: row.subtotal,
            shipping_cost: row.shipping_cost,
            discount: row.discount,
            tax: row.tax,
            total: row.total,
            shipping_address: row.shipping_address.0,
            billing_address: row.billing_address.0,
            payment_method: row.payment_method,
            payment_status,
            status,
            tracking_number: row.tracking_number,
            tracking_url: row.tracking_url,
            estimated_delivery: row.estimated_delivery,
            delivered_date: row.delivered_date,
            date: row.created_at,
        })
    }
}

/// Everything needed to place an order. Items are the caller-supplied
/// snapshot, stored verbatim.
#[derive(Debug)]
pub struct NewOrder {
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub shipping_address: OrderAddress,
    pub billing_address: OrderAddress,
    pub payment_method: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's orders, newest first, optionally filtered by status.
    /// Returns the requested page and the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user: UserId,
        status: Option<OrderStatus>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        let mut query = QueryBuilder::new("SELECT * FROM orders WHERE user_id = ");
        query.push_bind(user.as_i32());
        push_status_filter(&mut query, status);
        query.push(" ORDER BY created_at DESC");
        query.push(" LIMIT ").push_bind(i64::from(limit));
        query.push(" OFFSET ").push_bind(offset);

        let rows: Vec<OrderRow> = query.build_query_as().fetch_all(self.pool).await?;
        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM orders WHERE user_id = ");
        count_query.push_bind(user.as_i32());
        push_status_filter(&mut count_query, status);
        let total: i64 = count_query.build_query_scalar().fetch_one(self.pool).await?;

        Ok((orders, u64::try_from(total).unwrap_or_default()))
    }

    /// Get one of the user's orders by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row =
            sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user)
                .fetch_optional(self.pool)
                .await?;

        row.map(Order::try_from).transpose()
    }

    /// Insert the order and clear the buyer's cart in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn create(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (user_id, items, subtotal, shipping_cost, discount, tax,
                                 total, shipping_address, billing_address, payment_method,
                                 payment_status, status, estimated_delivery)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *",
        )
        .bind(new_order.user)
        .bind(Json(&new_order.items))
        .bind(new_order.subtotal)
        .bind(new_order.shipping_cost)
        .bind(new_order.discount)
        .bind(new_order.tax)
        .bind(new_order.total)
        .bind(Json(&new_order.shipping_address))
        .bind(Json(&new_order.billing_address))
        .bind(&new_order.payment_method)
        .bind(new_order.payment_status.to_string())
        .bind(new_order.status.to_string())
        .bind(new_order.estimated_delivery)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE carts SET items = '[]'::jsonb, updated_at = now() WHERE user_id = $1",
        )
        .bind(new_order.user)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Order::try_from(row)
    }

    /// Persist a validated status change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Whether the user has a delivered order containing the product. Used
    /// to mark reviews as verified purchases.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_delivered_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM orders
                 WHERE user_id = $1
                   AND status = 'delivered'
                   AND EXISTS (
                       SELECT 1 FROM jsonb_array_elements(items) AS item
                       WHERE (item->>'product')::int = $2
                   )
             )",
        )
        .bind(user)
        .bind(product)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}

/// Append the optional status filter to a query.
fn push_status_filter(query: &mut QueryBuilder<'_, Postgres>, status: Option<OrderStatus>) {
    if let Some(status) = status {
        query.push(" AND status = ").push_bind(status.to_string());
    }
}
