//! Order Lifecycle Manager
//!
//! Owns order creation-or-reuse per table, line-item addition, kitchen
//! dispatch and total recalculation.
//!
//! # Operation Flow
//!
//! ```text
//! operation(args)
//!     ├─ 1. Validate input (no DB access)
//!     ├─ 2. Begin transaction
//!     ├─ 3. Read + check current state (named error codes)
//!     ├─ 4. Write rows via db::repository
//!     ├─ 5. Commit (any earlier `?` drops the tx → rollback)
//!     └─ 6. Publish events (fire-and-forget)
//! ```

use std::sync::Arc;

use shared::message::payload::{
    KitchenNewItemsPayload, OrderCreatedPayload, OrderUpdatedPayload, TableStatusChangedPayload,
};
use shared::message::{PosEvent, Room, StaffRole};
use shared::models::{
    Actor, DiningTable, DispatchedItem, KitchenDispatch, Order, OrderCreate, OrderDetail,
    OrderLineInput, OrderLineStatus, OrderQuery, OrderStatus, OrderTotals, TableStatus,
};
use serde_json::json;
use shared::util::{day_key, now_millis};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{audit_log, dining_table, kitchen_queue, menu_item, order, order_line};
use crate::db::{self, repository::RepoError};
use crate::money;
use crate::notify::Notifier;
use crate::utils::validation::{
    MAX_BATCH_ITEMS, MAX_CUSTOMER_COUNT, MAX_MODIFIER_LEN, MAX_MODIFIERS, MAX_NOTE_LEN,
    validate_optional_text, validate_quantity, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};


/// `ORD-YYYYMMDD-NNNN`
pub fn format_order_number(day: &str, seq: i64) -> String {
    format!("ORD-{day}-{seq:04}")
}

pub(crate) fn order_not_found(order_id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
        .with_detail("order_id", order_id)
}

pub(crate) fn table_not_found(table_id: i64) -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, format!("Table {table_id} not found"))
        .with_detail("table_id", table_id)
}

/// Load an order that still accepts changes
///
/// Takes the order's write lock first so concurrent writers queue up.
pub(crate) async fn load_unsettled(conn: &mut SqliteConnection, order_id: i64) -> AppResult<Order> {
    if !order::lock(&mut *conn, order_id).await? {
        return Err(order_not_found(order_id));
    }
    let order = order::find_by_id(&mut *conn, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    if order.status.is_settled() {
        return Err(AppError::with_message(
            ErrorCode::OrderNotOpen,
            format!("Order {} is already {}", order.order_number, order.status.as_str()),
        )
        .with_detail("status", order.status.as_str()));
    }
    Ok(order)
}

/// Recompute and persist the four monetary fields from the current lines
///
/// The only place order-level money is derived from lines.
pub(crate) async fn refresh_totals(
    conn: &mut SqliteConnection,
    order_id: i64,
    discount: f64,
    tax_rate: f64,
    now: i64,
) -> AppResult<OrderTotals> {
    let total = order_line::sum_line_totals(&mut *conn, order_id).await?;
    let totals = money::compute_totals(total, discount, tax_rate);
    order::update_totals(&mut *conn, order_id, &totals, now).await?;
    Ok(totals)
}

/// Order plus lines plus tickets, read on one connection
pub(crate) async fn load_detail(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> AppResult<OrderDetail> {
    let order = order::find_by_id(&mut *conn, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    let lines = order_line::find_by_order(&mut *conn, order_id).await?;
    let kitchen_tickets = kitchen_queue::find_by_order(&mut *conn, order_id).await?;
    Ok(OrderDetail {
        order,
        lines,
        kitchen_tickets,
    })
}

fn validate_line_input(input: &OrderLineInput) -> AppResult<()> {
    validate_quantity(input.quantity)?;
    validate_optional_text(&input.note, "note", MAX_NOTE_LEN)?;
    if input.modifiers.len() > MAX_MODIFIERS {
        return Err(AppError::validation(format!(
            "too many modifiers ({}, max {MAX_MODIFIERS})",
            input.modifiers.len()
        )));
    }
    for modifier in &input.modifiers {
        validate_required_text(&modifier.name, "modifier name", MAX_MODIFIER_LEN)?;
        validate_optional_text(&modifier.value, "modifier value", MAX_MODIFIER_LEN)?;
    }
    Ok(())
}

fn order_updated(order: &Order) -> PosEvent {
    PosEvent::OrderUpdated(OrderUpdatedPayload {
        order_id: order.id,
        status: order.status,
        total: order.total,
        final_amount: order.final_amount,
    })
}

fn new_items_event(dispatch: &KitchenDispatch, items: Vec<DispatchedItem>) -> PosEvent {
    PosEvent::KitchenNewItems(KitchenNewItemsPayload {
        order_id: dispatch.order_id,
        order_number: dispatch.order_number.clone(),
        table_id: dispatch.table_id,
        items,
    })
}

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
    tax_rate: f64,
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("tax_rate", &self.tax_rate)
            .finish_non_exhaustive()
    }
}

impl OrderService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>, tax_rate: f64) -> Self {
        Self {
            pool,
            notifier,
            tax_rate,
        }
    }

    /// Resolve the table and reject statuses that block a new order
    pub async fn validate_table_for_order(&self, table_id: i64) -> AppResult<DiningTable> {
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        check_table(&mut conn, table_id).await
    }

    /// Return the table's unsettled order, or open a new one
    ///
    /// Idempotent: repeated calls without an intervening payment return the
    /// same order. The table row is write-locked for the whole transaction
    /// and a partial unique index backs up the one-unsettled-order rule.
    pub async fn get_or_create_order_for_table(
        &self,
        req: &OrderCreate,
        actor: Actor,
    ) -> AppResult<Order> {
        validate_optional_text(&req.note, "note", MAX_NOTE_LEN)?;
        let customer_count = req.customer_count.unwrap_or(1);
        if !(1..=MAX_CUSTOMER_COUNT).contains(&customer_count) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("customer_count must be between 1 and {MAX_CUSTOMER_COUNT}"),
            ));
        }

        let mut tx = db::begin(&self.pool).await?;

        if !dining_table::lock(&mut *tx, req.table_id).await? {
            return Err(table_not_found(req.table_id));
        }
        if let Some(existing) = order::find_unsettled_for_table(&mut *tx, req.table_id).await? {
            tracing::debug!(table_id = req.table_id, order_id = existing.id, "Reusing unsettled order");
            return Ok(existing);
        }
        check_table(&mut tx, req.table_id).await?;

        let now = now_millis();
        let day = day_key(now);
        let seq = order::next_daily_sequence(&mut *tx, &day).await?;
        let new_order = order::NewOrder {
            order_number: format_order_number(&day, seq),
            table_id: req.table_id,
            source: req.source.unwrap_or_default(),
            customer_count,
            waiter_id: actor.user_id,
            created_by: actor.user_id,
            note: req.note.clone(),
            now,
        };

        let order_id = match order::insert(&mut *tx, &new_order).await {
            Ok(id) => id,
            Err(e) if e.is_duplicate() => {
                // Lost the race to a concurrent opener; theirs is the table's order
                drop(tx);
                tracing::warn!(table_id = req.table_id, error = %e, "Concurrent order creation, re-reading");
                return order::find_unsettled_for_table(&self.pool, req.table_id)
                    .await?
                    .ok_or_else(|| AppError::conflict(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        dining_table::occupy(&mut *tx, req.table_id, order_id, now).await?;
        let created = order::find_by_id(&mut *tx, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;
        db::commit(tx).await?;

        tracing::info!(
            order_id,
            order_number = %created.order_number,
            table_id = req.table_id,
            "Order opened"
        );

        self.notifier
            .publish_all(vec![
                (
                    PosEvent::OrderCreated(OrderCreatedPayload {
                        order_id,
                        order_number: created.order_number.clone(),
                        table_id: req.table_id,
                    }),
                    Room::All,
                ),
                (
                    PosEvent::TableStatusChanged(TableStatusChangedPayload {
                        table_id: req.table_id,
                        status: TableStatus::Occupied,
                        current_order_id: Some(order_id),
                    }),
                    Room::All,
                ),
            ])
            .await;

        Ok(created)
    }

    /// Add a batch of lines priced from the live catalog
    ///
    /// All-or-nothing: the first invalid item rolls back the whole batch.
    pub async fn add_items_to_order(
        &self,
        order_id: i64,
        items: &[OrderLineInput],
    ) -> AppResult<OrderDetail> {
        if items.is_empty() {
            return Err(AppError::validation("items must not be empty"));
        }
        if items.len() > MAX_BATCH_ITEMS {
            return Err(AppError::validation(format!(
                "too many items ({}, max {MAX_BATCH_ITEMS})",
                items.len()
            )));
        }
        for item in items {
            validate_line_input(item)?;
        }

        let mut tx = db::begin(&self.pool).await?;
        let current = load_unsettled(&mut tx, order_id).await?;
        let now = now_millis();

        for item in items {
            let menu = menu_item::find_by_id(&mut *tx, item.menu_item_id)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::MenuItemNotFound,
                        format!("Menu item {} not found", item.menu_item_id),
                    )
                    .with_detail("menu_item_id", item.menu_item_id)
                })?;
            if !menu.is_available {
                return Err(AppError::with_message(
                    ErrorCode::MenuItemNotAvailable,
                    format!("{} is not available", menu.name),
                )
                .with_detail("menu_item_id", menu.id));
            }

            order_line::insert(
                &mut *tx,
                &order_line::NewOrderLine {
                    order_id,
                    menu_item_id: menu.id,
                    line_total: money::line_total(menu.price, item.quantity),
                    menu_item_name: menu.name,
                    unit_price: menu.price,
                    quantity: item.quantity,
                    modifiers: item.modifiers.clone(),
                    note: item.note.clone(),
                    now,
                },
            )
            .await?;
        }

        refresh_totals(&mut tx, order_id, current.discount_amount, self.tax_rate, now).await?;
        let detail = load_detail(&mut tx, order_id).await?;
        db::commit(tx).await?;

        tracing::info!(order_id, items = items.len(), total = detail.order.total, "Items added");
        self.notifier
            .publish(order_updated(&detail.order), Room::All)
            .await;
        Ok(detail)
    }

    /// Create one kitchen ticket per pending line and advance the order
    pub async fn send_order_to_kitchen(&self, order_id: i64) -> AppResult<KitchenDispatch> {
        let mut tx = db::begin(&self.pool).await?;
        let current = load_unsettled(&mut tx, order_id).await?;

        let pending = order_line::find_pending_for_dispatch(&mut *tx, order_id).await?;
        if pending.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::NoPendingItems,
                format!("Order {} has no pending items", current.order_number),
            ));
        }

        let now = now_millis();
        let mut items = Vec::with_capacity(pending.len());
        for line in pending {
            let ticket_id = kitchen_queue::insert(
                &mut *tx,
                &kitchen_queue::NewTicket {
                    order_id,
                    order_line_id: line.id,
                    menu_item_id: line.menu_item_id,
                    kitchen_area_id: line.kitchen_area_id,
                    quantity: line.quantity,
                    now,
                },
            )
            .await?;
            order_line::update_status(&mut *tx, line.id, OrderLineStatus::SentToKitchen, now)
                .await?;
            items.push(DispatchedItem {
                kitchen_queue_id: ticket_id,
                order_line_id: line.id,
                menu_item_id: line.menu_item_id,
                item_name: line.menu_item_name,
                quantity: line.quantity,
                kitchen_area_id: line.kitchen_area_id,
            });
        }
        order::update_status(&mut *tx, order_id, OrderStatus::SentToKitchen, now).await?;
        db::commit(tx).await?;

        let dispatch = KitchenDispatch {
            order_id,
            order_number: current.order_number,
            table_id: current.table_id,
            items,
        };
        tracing::info!(order_id, tickets = dispatch.items.len(), "Order sent to kitchen");

        let mut events = Vec::new();
        for (area, area_items) in dispatch.by_area() {
            if let Some(area_id) = area {
                events.push((new_items_event(&dispatch, area_items), Room::Area(area_id)));
            }
        }
        events.push((
            new_items_event(&dispatch, dispatch.items.clone()),
            Room::Role(StaffRole::Chef),
        ));
        self.notifier.publish_all(events).await;

        Ok(dispatch)
    }

    /// Recompute totals with an explicit discount and tax rate
    ///
    /// `None` keeps the stored discount / the configured rate. A discount
    /// that changes the stored amount is recorded in the audit log.
    pub async fn calculate_order_totals(
        &self,
        order_id: i64,
        discount: Option<f64>,
        tax_rate: Option<f64>,
        actor: Actor,
    ) -> AppResult<OrderTotals> {
        if let Some(d) = discount {
            crate::utils::validation::require_non_negative(d, "discount")?;
        }
        if let Some(rate) = tax_rate
            && !(rate.is_finite() && (0.0..=1.0).contains(&rate))
        {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("tax_rate must be between 0 and 1, got {rate}"),
            ));
        }

        let mut tx = db::begin(&self.pool).await?;
        let current = load_unsettled(&mut tx, order_id).await?;
        let now = now_millis();
        let totals = refresh_totals(
            &mut tx,
            order_id,
            discount.unwrap_or(current.discount_amount),
            tax_rate.unwrap_or(self.tax_rate),
            now,
        )
        .await?;
        if discount.is_some() && totals.discount_amount != current.discount_amount {
            audit_log::insert(
                &mut *tx,
                &audit_log::NewAuditLog {
                    user_id: actor.user_id,
                    action: "discount_applied",
                    entity_type: "order",
                    entity_id: Some(order_id),
                    details: json!({
                        "discount_type": "fixed",
                        "discount_value": discount,
                        "discount_amount": totals.discount_amount,
                        "previous_amount": current.discount_amount,
                    }),
                    now,
                },
            )
            .await?;
        }
        db::commit(tx).await?;

        self.notifier
            .publish(
                PosEvent::OrderUpdated(OrderUpdatedPayload {
                    order_id,
                    status: current.status,
                    total: totals.total,
                    final_amount: totals.final_amount,
                }),
                Room::All,
            )
            .await;
        Ok(totals)
    }

    /// Delete a line that has not been dispatched yet
    pub async fn remove_pending_line(&self, order_id: i64, line_id: i64) -> AppResult<OrderDetail> {
        let mut tx = db::begin(&self.pool).await?;
        let current = load_unsettled(&mut tx, order_id).await?;

        let line = order_line::find_by_id(&mut *tx, line_id)
            .await?
            .filter(|l| l.order_id == order_id)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::OrderLineNotFound,
                    format!("Line {line_id} not found on order {order_id}"),
                )
            })?;
        if line.status != OrderLineStatus::Pending {
            return Err(AppError::with_message(
                ErrorCode::OrderLineNotPending,
                format!("Line {line_id} is already {}", line.status.as_str()),
            )
            .with_detail("status", line.status.as_str()));
        }

        let now = now_millis();
        order_line::delete_pending(&mut *tx, order_id, line_id).await?;
        refresh_totals(&mut tx, order_id, current.discount_amount, self.tax_rate, now).await?;
        let detail = load_detail(&mut tx, order_id).await?;
        db::commit(tx).await?;

        tracing::info!(order_id, line_id, "Pending line removed");
        self.notifier
            .publish(order_updated(&detail.order), Room::All)
            .await;
        Ok(detail)
    }

    pub async fn get_order_detail(&self, order_id: i64) -> AppResult<OrderDetail> {
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        load_detail(&mut conn, order_id).await
    }

    pub async fn list_orders(&self, query: &OrderQuery) -> AppResult<Vec<Order>> {
        Ok(order::find_all(&self.pool, query).await?)
    }
}

/// Table must exist and accept a new order
async fn check_table(conn: &mut SqliteConnection, table_id: i64) -> AppResult<DiningTable> {
    let table = dining_table::find_by_id(&mut *conn, table_id)
        .await?
        .ok_or_else(|| table_not_found(table_id))?;
    if !table.status.accepts_new_order() {
        return Err(AppError::with_message(
            ErrorCode::TableNeedsCleaning,
            format!("Table {} needs cleaning", table.table_number),
        )
        .with_detail("table_id", table_id));
    }
    Ok(table)
}
