//! Order route handlers.
//!
//! Checkout copies the caller-supplied item snapshot verbatim into the
//! order, so historical totals are immune to later catalog changes, and
//! clears the cart in the same transaction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use threadline_core::{Money, OrderId, OrderStatus, PaymentStatus};

use crate::db::orders::{NewOrder, OrderRepository};
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::middleware::RequireAuth;
use crate::models::order::{Order, OrderAddress, OrderItem};
use crate::state::AppState;

/// Default page size for order history.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Shipping estimate offered at checkout.
const ESTIMATED_DELIVERY_DAYS: i64 = 5;

/// Order history query parameters.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    /// Status filter; absent or `all` means everything.
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Pagination metadata for order history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPagination {
    pub total_orders: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

/// Paginated order history.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub pagination: OrderPagination,
}

/// Checkout request body. Items are the snapshot to store verbatim.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping_address: OrderAddress,
    pub billing_address: OrderAddress,
    pub payment_method: String,
    pub subtotal: Money,
    pub shipping_cost: Money,
    #[serde(default)]
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// List the caller's orders, newest first.
///
/// GET /api/orders
///
/// # Errors
///
/// Returns 400 for an unknown status filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<OrderListResponse>> {
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<OrderStatus>()
                .map_err(|_| AppError::BadRequest("Invalid order status".to_owned()))?,
        ),
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let (orders, total) = OrderRepository::new(state.pool())
        .list_for_user(current.id, status, page, limit)
        .await?;

    let total_pages = total.div_ceil(u64::from(limit));

    Ok(Json(OrderListResponse {
        orders,
        pagination: OrderPagination {
            total_orders: total,
            total_pages,
            current_page: page,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
            limit,
        },
    }))
}

/// Get one of the caller's orders.
///
/// GET /api/orders/{id}
///
/// # Errors
///
/// Returns 404 for unknown orders, including other users' orders.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get_for_user(id, current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(Json(order))
}

/// Place an order from the supplied item snapshot and clear the cart.
///
/// POST /api/orders
///
/// # Errors
///
/// Returns 400 for an empty item list (missing fields are rejected by body
/// deserialization).
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    if body.items.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one item".to_owned(),
        ));
    }

    let order = OrderRepository::new(state.pool())
        .create(NewOrder {
            user: current.id,
            items: body.items,
            subtotal: body.subtotal,
            shipping_cost: body.shipping_cost,
            discount: body.discount,
            tax: body.tax,
            total: body.total,
            shipping_address: body.shipping_address,
            billing_address: body.billing_address,
            payment_method: body.payment_method,
            status: OrderStatus::Processing,
            payment_status: PaymentStatus::Paid,
            estimated_delivery: Some(Utc::now() + Duration::days(ESTIMATED_DELIVERY_DAYS)),
        })
        .await?;

    tracing::info!(order_id = %order.id, user_id = %current.id, "order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Cancel one of the caller's orders, if its status still allows it.
///
/// POST /api/orders/{id}/cancel
///
/// # Errors
///
/// Returns 404 for unknown orders, 400 for delivered or already cancelled
/// ones.
#[instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let orders = OrderRepository::new(state.pool());

    let mut order = orders
        .get_for_user(id, current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    order.cancel()?;
    orders.set_status(order.id, order.status).await?;

    Ok(Json(order))
}
