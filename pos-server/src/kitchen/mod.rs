//! Kitchen Queue Coordinator
//!
//! Per-ticket status machine (see [`KitchenStatus::allowed_next`]) and the
//! order status inferred from the statuses of the order's lines.

use std::sync::Arc;

use shared::message::payload::{
    KitchenItemReadyPayload, KitchenPriorityPayload, KitchenStatusChangedPayload,
    OrderUpdatedPayload,
};
use shared::message::{PosEvent, Room, StaffRole};
use shared::models::{
    KitchenArea, KitchenQueueEntry, KitchenQueueQuery, KitchenStatus, KitchenStatusChange,
    KitchenTicket, OrderLineStatus, OrderStatus,
};
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db::repository::{kitchen_queue, menu_item, order, order_line};
use crate::db;
use crate::notify::Notifier;
use crate::orders::refresh_totals;
use crate::utils::{AppError, AppResult, ErrorCode};


/// Order status implied by its lines, if any
///
/// Every line counts, cancelled ones included: a single cancelled line keeps
/// the order from ever being inferred `ready_to_serve` or `served`.
pub fn infer_order_status(lines: &[OrderLineStatus]) -> Option<OrderStatus> {
    if lines.is_empty() {
        None
    } else if lines.iter().all(|s| *s == OrderLineStatus::Ready) {
        Some(OrderStatus::ReadyToServe)
    } else if lines.iter().all(|s| *s == OrderLineStatus::Served) {
        Some(OrderStatus::Served)
    } else {
        None
    }
}

fn ticket_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::KitchenItemNotFound,
        format!("Kitchen item {id} not found"),
    )
    .with_detail("kitchen_queue_id", id)
}

fn invalid_transition(id: i64, from: KitchenStatus, to: KitchenStatus) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidStatusTransition,
        format!("Invalid status transition: {} -> {}", from.as_str(), to.as_str()),
    )
    .with_detail("kitchen_queue_id", id)
    .with_detail("from", from.as_str())
    .with_detail("to", to.as_str())
}

/// Kitchen display room of a ticket; unassigned tickets go to every chef
fn station_room(kitchen_area_id: Option<i64>) -> Room {
    match kitchen_area_id {
        Some(area) => Room::Area(area),
        None => Room::Role(StaffRole::Chef),
    }
}

/// Kitchen queue service
#[derive(Clone)]
pub struct KitchenService {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
    tax_rate: f64,
}

impl std::fmt::Debug for KitchenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KitchenService").finish_non_exhaustive()
    }
}

impl KitchenService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>, tax_rate: f64) -> Self {
        Self {
            pool,
            notifier,
            tax_rate,
        }
    }

    /// Move a ticket one step along the status machine
    ///
    /// Mirrors the status onto the order line, re-derives the order status
    /// on `ready`/`served` and recomputes totals on `cancelled`. Illegal
    /// transitions fail with `INVALID_STATUS_TRANSITION` and write nothing.
    pub async fn update_status(
        &self,
        ticket_id: i64,
        to: KitchenStatus,
    ) -> AppResult<KitchenStatusChange> {
        let mut tx = db::begin(&self.pool).await?;
        if !kitchen_queue::lock(&mut *tx, ticket_id).await? {
            return Err(ticket_not_found(ticket_id));
        }
        let ticket = kitchen_queue::find_by_id(&mut *tx, ticket_id)
            .await?
            .ok_or_else(|| ticket_not_found(ticket_id))?;
        let from = ticket.status;
        if !from.can_transition_to(to) {
            return Err(invalid_transition(ticket_id, from, to));
        }

        let now = now_millis();
        if !kitchen_queue::transition(&mut *tx, ticket_id, from, to, now).await? {
            // Status moved under us between read and write
            return Err(invalid_transition(ticket_id, from, to));
        }
        order_line::update_status(&mut *tx, ticket.order_line_id, to.line_status(), now).await?;

        let parent = order::find_by_id(&mut *tx, ticket.order_id)
            .await?
            .ok_or_else(|| crate::orders::order_not_found(ticket.order_id))?;
        let mut order_status = None;
        let mut totals = None;
        if !parent.status.is_settled() {
            if matches!(to, KitchenStatus::Ready | KitchenStatus::Served) {
                let lines = order_line::find_statuses(&mut *tx, parent.id).await?;
                if let Some(inferred) = infer_order_status(&lines)
                    && inferred != parent.status
                {
                    order::update_status(&mut *tx, parent.id, inferred, now).await?;
                    order_status = Some(inferred);
                }
            }
            if to == KitchenStatus::Cancelled {
                totals = Some(
                    refresh_totals(&mut tx, parent.id, parent.discount_amount, self.tax_rate, now)
                        .await?,
                );
            }
        }

        let updated = kitchen_queue::find_by_id(&mut *tx, ticket_id)
            .await?
            .ok_or_else(|| ticket_not_found(ticket_id))?;
        db::commit(tx).await?;

        tracing::info!(
            kitchen_queue_id = ticket_id,
            order_id = parent.id,
            from = from.as_str(),
            to = to.as_str(),
            "Kitchen item status updated"
        );

        let mut events = vec![(
            PosEvent::KitchenStatusChanged(KitchenStatusChangedPayload {
                kitchen_queue_id: ticket_id,
                order_id: parent.id,
                order_line_id: ticket.order_line_id,
                from,
                status: to,
                order_status,
            }),
            station_room(ticket.kitchen_area_id),
        )];
        if to == KitchenStatus::Ready {
            events.push((
                PosEvent::KitchenItemReady(KitchenItemReadyPayload {
                    kitchen_queue_id: ticket_id,
                    order_id: parent.id,
                    order_line_id: ticket.order_line_id,
                    table_id: parent.table_id,
                }),
                Room::Role(StaffRole::Waiter),
            ));
        }
        if order_status.is_some() || totals.is_some() {
            events.push((
                PosEvent::OrderUpdated(OrderUpdatedPayload {
                    order_id: parent.id,
                    status: order_status.unwrap_or(parent.status),
                    total: totals.map_or(parent.total, |t| t.total),
                    final_amount: totals.map_or(parent.final_amount, |t| t.final_amount),
                }),
                Room::All,
            ));
        }
        self.notifier.publish_all(events).await;

        Ok(KitchenStatusChange {
            ticket: updated,
            from,
            order_status,
        })
    }

    /// Flag a ticket as priority; allowed in any status
    pub async fn mark_priority(&self, ticket_id: i64) -> AppResult<KitchenTicket> {
        let mut tx = db::begin(&self.pool).await?;
        if !kitchen_queue::set_priority(&mut *tx, ticket_id, now_millis()).await? {
            return Err(ticket_not_found(ticket_id));
        }
        let ticket = kitchen_queue::find_by_id(&mut *tx, ticket_id)
            .await?
            .ok_or_else(|| ticket_not_found(ticket_id))?;
        db::commit(tx).await?;

        tracing::info!(kitchen_queue_id = ticket_id, order_id = ticket.order_id, "Kitchen item marked priority");
        self.notifier
            .publish(
                PosEvent::KitchenPriority(KitchenPriorityPayload {
                    kitchen_queue_id: ticket.id,
                    order_id: ticket.order_id,
                    kitchen_area_id: ticket.kitchen_area_id,
                }),
                station_room(ticket.kitchen_area_id),
            )
            .await;
        Ok(ticket)
    }

    /// Kitchen display: oldest first, pending + cooking unless filtered
    pub async fn get_queue(&self, query: &KitchenQueueQuery) -> AppResult<Vec<KitchenQueueEntry>> {
        let statuses = query.statuses().map_err(AppError::validation)?;
        if let Some(area_id) = query.kitchen_area_id
            && menu_item::find_kitchen_area(&self.pool, area_id).await?.is_none()
        {
            return Err(AppError::with_message(
                ErrorCode::KitchenAreaNotFound,
                format!("Kitchen area {area_id} not found"),
            ));
        }
        Ok(kitchen_queue::find_queue(&self.pool, &statuses, query.kitchen_area_id, now_millis()).await?)
    }

    pub async fn list_areas(&self) -> AppResult<Vec<KitchenArea>> {
        Ok(menu_item::find_kitchen_areas(&self.pool).await?)
    }

    pub async fn get_ticket(&self, ticket_id: i64) -> AppResult<KitchenTicket> {
        kitchen_queue::find_by_id(&self.pool, ticket_id)
            .await?
            .ok_or_else(|| ticket_not_found(ticket_id))
    }
}
