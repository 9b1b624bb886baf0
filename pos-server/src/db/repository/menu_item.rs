//! Menu Item / Kitchen Area Repository (read side only)

use super::RepoResult;
use shared::models::{KitchenArea, MenuItem};
use sqlx::{Executor, Sqlite};

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<MenuItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let item = sqlx::query_as::<_, MenuItem>(
        "SELECT id, name, price, is_available, kitchen_area_id, prep_time_minutes FROM menu_items WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(item)
}

pub async fn find_kitchen_areas<'e, E>(executor: E) -> RepoResult<Vec<KitchenArea>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let areas = sqlx::query_as::<_, KitchenArea>(
        "SELECT id, name, description FROM kitchen_areas ORDER BY name",
    )
    .fetch_all(executor)
    .await?;
    Ok(areas)
}

pub async fn find_kitchen_area<'e, E>(executor: E, id: i64) -> RepoResult<Option<KitchenArea>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let area = sqlx::query_as::<_, KitchenArea>(
        "SELECT id, name, description FROM kitchen_areas WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(area)
}
