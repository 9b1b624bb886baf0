//! Payment Settlement
//!
//! Final total computation, the single payment record per order, table
//! release, and the bill calculators (split, discount).
//!
//! # Settlement
//!
//! ```text
//! process_payment(req)
//!     ├─ order exists, not paid/completed, method active
//!     ├─ final = total − discount + tax   (overrides win, else stored)
//!     ├─ tendered ≥ final − 0.01          (else INSUFFICIENT_PAYMENT)
//!     ├─ tx: order → paid, payments row, table → needs_cleaning, audit
//!     ├─ stock ledger (own tx, failure logged and ignored)
//!     └─ payment:completed, table:status_changed
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use shared::message::payload::{
    OrderUpdatedPayload, PaymentCompletedPayload, TableStatusChangedPayload,
};
use shared::message::{PosEvent, Room};
use shared::models::{
    Actor, DiscountApplied, DiscountRequest, Order, Payment, PaymentMethod, PaymentReceipt,
    PaymentRequest, SplitBill, SplitRequest, SplitShare, TableStatus,
};
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db;
use crate::db::repository::{RepoError, audit_log, dining_table, order, order_line, payment};
use crate::inventory::StockLedger;
use crate::money;
use crate::notify::Notifier;
use crate::orders::{load_unsettled, order_not_found, refresh_totals};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_PAYMENT_AMOUNT, require_non_negative, validate_optional_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};


/// Upper bound for an equal split
const MAX_SPLIT_PEOPLE: u32 = 100;

fn already_paid(order: &Order) -> AppError {
    AppError::with_message(
        ErrorCode::OrderAlreadyPaid,
        format!("Order {} is already paid", order.order_number),
    )
    .with_detail("order_id", order.id)
}

fn invalid_split(msg: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::InvalidSplit, msg)
}

fn validate_request(req: &PaymentRequest) -> AppResult<()> {
    require_non_negative(req.amount_paid, "amount_paid")?;
    if req.amount_paid > MAX_PAYMENT_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("amount_paid exceeds maximum allowed ({MAX_PAYMENT_AMOUNT})"),
        ));
    }
    if let Some(discount) = req.discount_amount {
        require_non_negative(discount, "discount_amount")?;
    }
    if let Some(tax) = req.tax_amount {
        require_non_negative(tax, "tax_amount")?;
    }
    validate_optional_text(&req.note, "note", MAX_NOTE_LEN)
}

/// Payment service
#[derive(Clone)]
pub struct PaymentService {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
    ledger: Arc<dyn StockLedger>,
    tax_rate: f64,
}

impl std::fmt::Debug for PaymentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentService")
            .field("tax_rate", &self.tax_rate)
            .finish_non_exhaustive()
    }
}

impl PaymentService {
    pub fn new(
        pool: SqlitePool,
        notifier: Arc<dyn Notifier>,
        ledger: Arc<dyn StockLedger>,
        tax_rate: f64,
    ) -> Self {
        Self {
            pool,
            notifier,
            ledger,
            tax_rate,
        }
    }

    /// Settle an order and release its table
    pub async fn process_payment(
        &self,
        req: &PaymentRequest,
        actor: Actor,
    ) -> AppResult<PaymentReceipt> {
        validate_request(req)?;

        let mut tx = db::begin(&self.pool).await?;
        if !order::lock(&mut *tx, req.order_id).await? {
            return Err(order_not_found(req.order_id));
        }
        let current = order::find_by_id(&mut *tx, req.order_id)
            .await?
            .ok_or_else(|| order_not_found(req.order_id))?;
        if current.status.is_settled() {
            return Err(already_paid(&current));
        }
        let method = payment::find_active_method(&mut *tx, req.payment_method_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InvalidPaymentMethod,
                    format!("Payment method {} is not available", req.payment_method_id),
                )
            })?;

        let totals = money::settle_totals(
            current.total,
            req.discount_amount.unwrap_or(current.discount_amount),
            req.tax_amount.unwrap_or(current.tax_amount),
        );
        if !money::is_payment_sufficient(req.amount_paid, totals.final_amount) {
            return Err(AppError::with_message(
                ErrorCode::InsufficientPayment,
                format!(
                    "Tendered {:.2} is less than the amount due {:.2}",
                    req.amount_paid, totals.final_amount
                ),
            )
            .with_detail("final_amount", totals.final_amount)
            .with_detail("amount_paid", req.amount_paid));
        }
        let change_amount = money::change_due(req.amount_paid, totals.final_amount);

        let now = now_millis();
        if !order::mark_paid(&mut *tx, current.id, &totals, now).await? {
            return Err(already_paid(&current));
        }
        let payment_id = match payment::insert(
            &mut *tx,
            &payment::NewPayment {
                order_id: current.id,
                payment_method_id: method.id,
                amount: totals.total,
                discount_amount: totals.discount_amount,
                tax_amount: totals.tax_amount,
                final_amount: totals.final_amount,
                amount_paid: req.amount_paid,
                change_amount,
                note: req.note.clone(),
                processed_by: actor.user_id,
                now,
            },
        )
        .await
        {
            Ok(id) => id,
            Err(RepoError::Duplicate(_)) => return Err(already_paid(&current)),
            Err(e) => return Err(e.into()),
        };
        dining_table::set_unlinked_status(&mut *tx, current.table_id, TableStatus::NeedsCleaning, now)
            .await?;
        audit_log::insert(
            &mut *tx,
            &audit_log::NewAuditLog {
                user_id: actor.user_id,
                action: "payment",
                entity_type: "order",
                entity_id: Some(current.id),
                details: json!({
                    "payment_id": payment_id,
                    "payment_method": method.name,
                    "final_amount": totals.final_amount,
                    "amount_paid": req.amount_paid,
                    "change_amount": change_amount,
                }),
                now,
            },
        )
        .await?;

        let paid = order::find_by_id(&mut *tx, current.id)
            .await?
            .ok_or_else(|| order_not_found(current.id))?;
        let record = payment::find_by_id(&mut *tx, payment_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("payment {payment_id} vanished")))?;
        db::commit(tx).await?;

        tracing::info!(
            order_id = paid.id,
            payment_id,
            final_amount = totals.final_amount,
            change_amount,
            "Payment processed"
        );

        if let Err(e) = self.ledger.deduct_for_order(paid.id).await {
            tracing::warn!(order_id = paid.id, error = %e, "Inventory deduction failed, payment kept");
        }

        self.notifier
            .publish_all(vec![
                (
                    PosEvent::PaymentCompleted(PaymentCompletedPayload {
                        payment_id,
                        order_id: paid.id,
                        table_id: paid.table_id,
                        final_amount: totals.final_amount,
                        change_amount,
                    }),
                    Room::All,
                ),
                (
                    PosEvent::TableStatusChanged(TableStatusChangedPayload {
                        table_id: paid.table_id,
                        status: TableStatus::NeedsCleaning,
                        current_order_id: None,
                    }),
                    Room::All,
                ),
            ])
            .await;

        Ok(PaymentReceipt {
            payment: record,
            order: paid,
        })
    }

    pub async fn get_payment(&self, payment_id: i64) -> AppResult<Payment> {
        payment::find_by_id(&self.pool, payment_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::PaymentNotFound,
                    format!("Payment {payment_id} not found"),
                )
            })
    }

    pub async fn get_payment_for_order(&self, order_id: i64) -> AppResult<Payment> {
        payment::find_by_order(&self.pool, order_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::PaymentNotFound,
                    format!("Order {order_id} has no payment"),
                )
            })
    }

    pub async fn list_methods(&self) -> AppResult<Vec<PaymentMethod>> {
        Ok(payment::find_active_methods(&self.pool).await?)
    }

    /// Compute how an order's bill would be shared; nothing is stored
    pub async fn split_bill(&self, order_id: i64, req: &SplitRequest) -> AppResult<SplitBill> {
        let current = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;

        let splits = match req {
            SplitRequest::Equal { number_of_people } => {
                let people = *number_of_people;
                if people == 0 || people > MAX_SPLIT_PEOPLE {
                    return Err(invalid_split(format!(
                        "number_of_people must be between 1 and {MAX_SPLIT_PEOPLE}"
                    )));
                }
                money::equal_shares(current.final_amount, people)
                    .into_iter()
                    .zip(1..)
                    .map(|(amount, person)| SplitShare { person, amount })
                    .collect()
            }
            SplitRequest::ByItem { item_assignments } => {
                if item_assignments.is_empty() {
                    return Err(invalid_split("item_assignments must not be empty"));
                }
                let mut seen = HashSet::new();
                let mut splits = Vec::with_capacity(item_assignments.len());
                for assignment in item_assignments {
                    if assignment.line_ids.is_empty() {
                        return Err(invalid_split(format!(
                            "person {} has no lines",
                            assignment.person
                        )));
                    }
                    for id in &assignment.line_ids {
                        if !seen.insert(*id) {
                            return Err(invalid_split(format!("line {id} is assigned twice")));
                        }
                    }
                    let (amount, found) =
                        order_line::sum_selected_totals(&self.pool, order_id, &assignment.line_ids)
                            .await?;
                    if found != assignment.line_ids.len() as i64 {
                        return Err(invalid_split(format!(
                            "person {} references lines outside order {order_id}",
                            assignment.person
                        )));
                    }
                    splits.push(SplitShare {
                        person: assignment.person,
                        amount: money::to_f64(money::to_decimal(amount)),
                    });
                }
                splits
            }
            SplitRequest::Custom { amounts } => {
                if amounts.is_empty() {
                    return Err(invalid_split("amounts must not be empty"));
                }
                for share in amounts {
                    require_non_negative(share.amount, "amount")
                        .map_err(|e| invalid_split(e.message))?;
                }
                amounts.clone()
            }
        };

        Ok(SplitBill {
            order_id,
            total_amount: current.final_amount,
            split_type: req.kind().to_string(),
            splits,
        })
    }

    /// Store a discount on an unsettled order and recompute its totals
    pub async fn apply_discount(
        &self,
        order_id: i64,
        req: &DiscountRequest,
        actor: Actor,
    ) -> AppResult<DiscountApplied> {
        validate_optional_text(&req.reason, "reason", MAX_NOTE_LEN)?;

        let mut tx = db::begin(&self.pool).await?;
        let current = match load_unsettled(&mut tx, order_id).await {
            Err(e) if e.is(ErrorCode::OrderNotOpen) => {
                let settled = order::find_by_id(&mut *tx, order_id)
                    .await?
                    .ok_or_else(|| order_not_found(order_id))?;
                return Err(already_paid(&settled));
            }
            other => other?,
        };
        let discount = money::discount_amount(req.discount_type, req.discount_value, current.total)
            .map_err(|msg| AppError::with_message(ErrorCode::InvalidDiscount, msg))?;

        let now = now_millis();
        let totals = refresh_totals(&mut tx, order_id, discount, self.tax_rate, now).await?;
        audit_log::insert(
            &mut *tx,
            &audit_log::NewAuditLog {
                user_id: actor.user_id,
                action: "discount_applied",
                entity_type: "order",
                entity_id: Some(order_id),
                details: json!({
                    "discount_type": req.discount_type,
                    "discount_value": req.discount_value,
                    "discount_amount": totals.discount_amount,
                    "reason": req.reason,
                }),
                now,
            },
        )
        .await?;
        let updated = order::find_by_id(&mut *tx, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;
        db::commit(tx).await?;

        tracing::info!(order_id, discount_amount = totals.discount_amount, "Discount applied");
        self.notifier
            .publish(
                PosEvent::OrderUpdated(OrderUpdatedPayload {
                    order_id,
                    status: updated.status,
                    total: updated.total,
                    final_amount: updated.final_amount,
                }),
                Room::All,
            )
            .await;

        Ok(DiscountApplied {
            order_id,
            discount_amount: totals.discount_amount,
            new_total: money::to_f64(
                money::to_decimal(totals.total) - money::to_decimal(totals.discount_amount),
            ),
            order: updated,
        })
    }
}
