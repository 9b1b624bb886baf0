//! Payment Repository

use super::RepoResult;
use shared::models::{Payment, PaymentMethod};
use sqlx::{Executor, Sqlite};

const COLUMNS: &str = "id, order_id, payment_method_id, amount, discount_amount, tax_amount, final_amount, amount_paid, change_amount, note, processed_by, created_at";

/// Insert payload; amounts are already rounded by the caller
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: i64,
    pub payment_method_id: i64,
    pub amount: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
    pub amount_paid: f64,
    pub change_amount: f64,
    pub note: Option<String>,
    pub processed_by: Option<i64>,
    pub now: i64,
}

/// Insert the settlement record; Duplicate if the order already has one
pub async fn insert<'e, E>(executor: E, data: &NewPayment) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO payments (order_id, payment_method_id, amount, discount_amount, tax_amount, final_amount, amount_paid, change_amount, note, processed_by, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) RETURNING id",
    )
    .bind(data.order_id)
    .bind(data.payment_method_id)
    .bind(data.amount)
    .bind(data.discount_amount)
    .bind(data.tax_amount)
    .bind(data.final_amount)
    .bind(data.amount_paid)
    .bind(data.change_amount)
    .bind(&data.note)
    .bind(data.processed_by)
    .bind(data.now)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Payment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let payment =
        sqlx::query_as::<_, Payment>(&format!("SELECT {COLUMNS} FROM payments WHERE id = ?"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(payment)
}

pub async fn find_by_order<'e, E>(executor: E, order_id: i64) -> RepoResult<Option<Payment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payments WHERE order_id = ?"
    ))
    .bind(order_id)
    .fetch_optional(executor)
    .await?;
    Ok(payment)
}

pub async fn find_active_methods<'e, E>(executor: E) -> RepoResult<Vec<PaymentMethod>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let methods = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, name, is_active FROM payment_methods WHERE is_active = 1 ORDER BY id",
    )
    .fetch_all(executor)
    .await?;
    Ok(methods)
}

/// Active method by id; inactive methods are reported as missing
pub async fn find_active_method<'e, E>(executor: E, id: i64) -> RepoResult<Option<PaymentMethod>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let method = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, name, is_active FROM payment_methods WHERE id = ? AND is_active = 1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(method)
}
