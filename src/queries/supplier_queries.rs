use sqlx::{PgExecutor, PgPool};

use crate::{error::Result, models::Choice};

pub async fn get_choices(pool: &PgPool) -> Result<Vec<Choice>> {
    let choices = sqlx::query_as::<_, Choice>(
        "SELECT id, company_name AS label FROM suppliers ORDER BY company_name ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(choices)
}

pub async fn exists(executor: impl PgExecutor<'_>, id: i32) -> Result<bool> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await?;

    Ok(found)
}
