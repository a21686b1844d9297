use sqlx::PgPool;

use crate::{error::Result, models::CatalogSummary};

pub async fn catalog_summary(pool: &PgPool) -> Result<CatalogSummary> {
    let summary = sqlx::query_as::<_, CatalogSummary>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM products) AS products,
            (SELECT COUNT(*) FROM categories) AS categories,
            (SELECT COUNT(*) FROM suppliers) AS suppliers,
            (SELECT COUNT(*) FROM users) AS users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(summary)
}
