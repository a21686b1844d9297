use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use super::contains_pattern;
use crate::{
    error::Result,
    forms::ProductInput,
    models::{Product, ProductDetail, ProductFilter},
    utils::pagination::PageRequest,
};

const DETAIL_SELECT: &str = r#"
    SELECT
        p.id, p.category_id, p.supplier_id, p.product_name, p.sku,
        p.unit_price, p.discount, p.units_in_stock, p.description,
        c.name AS category, s.company_name AS supplier
    FROM products p
    JOIN categories c ON c.id = p.category_id
    JOIN suppliers s ON s.id = p.supplier_id
"#;

pub async fn find_by_id(executor: impl PgExecutor<'_>, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(product)
}

pub async fn find_detail_by_id(pool: &PgPool, id: i32) -> Result<Option<ProductDetail>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(DETAIL_SELECT);
    query.push(" WHERE p.id = ");
    query.push_bind(id);

    let product = query
        .build_query_as::<ProductDetail>()
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

/// Whether another product already uses `sku`.
pub async fn sku_taken(
    executor: impl PgExecutor<'_>,
    sku: &str,
    except_id: Option<i32>,
) -> Result<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND ($2::INTEGER IS NULL OR id <> $2))",
    )
    .bind(sku)
    .bind(except_id)
    .fetch_one(executor)
    .await?;

    Ok(taken)
}

pub async fn create_product(executor: impl PgExecutor<'_>, input: &ProductInput) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (
            category_id, supplier_id, product_name, sku,
            unit_price, discount, units_in_stock, description
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(input.category_id)
    .bind(input.supplier_id)
    .bind(&input.product_name)
    .bind(&input.sku)
    .bind(input.unit_price)
    .bind(input.discount)
    .bind(input.units_in_stock)
    .bind(&input.description)
    .fetch_one(executor)
    .await?;

    Ok(product)
}

pub async fn update_product(
    executor: impl PgExecutor<'_>,
    id: i32,
    input: &ProductInput,
) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET
            category_id = $1,
            supplier_id = $2,
            product_name = $3,
            sku = $4,
            unit_price = $5,
            discount = $6,
            units_in_stock = $7,
            description = $8
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(input.category_id)
    .bind(input.supplier_id)
    .bind(&input.product_name)
    .bind(&input.sku)
    .bind(input.unit_price)
    .bind(input.discount)
    .bind(input.units_in_stock)
    .bind(&input.description)
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

pub async fn delete_product(executor: impl PgExecutor<'_>, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("DELETE FROM products WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(product)
}

fn push_filter(query: &mut QueryBuilder<'static, Postgres>, filter: &ProductFilter) {
    match filter {
        ProductFilter::All => {}
        ProductFilter::Name(q) => {
            query.push(" WHERE p.product_name ILIKE ");
            query.push_bind(contains_pattern(q));
            query.push(" ESCAPE '\\'");
        }
        ProductFilter::Category(q) => {
            query.push(" WHERE LOWER(c.name) = LOWER(");
            query.push_bind(q.clone());
            query.push(")");
        }
    }
}

pub fn page_query(filter: &ProductFilter, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(DETAIL_SELECT);
    push_filter(&mut query, filter);

    query.push(" ORDER BY p.id ASC");
    query.push(" LIMIT ");
    query.push_bind(page.limit());
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    query
}

pub fn count_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT COUNT(*) FROM products p JOIN categories c ON c.id = p.category_id",
    );
    push_filter(&mut query, filter);

    query
}

/// One page of matching products plus the total number of matches.
pub async fn fetch_page(
    pool: &PgPool,
    filter: &ProductFilter,
    page: PageRequest,
) -> Result<(Vec<ProductDetail>, i64)> {
    let total: i64 = count_query(filter)
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let products = page_query(filter, page)
        .build_query_as::<ProductDetail>()
        .fetch_all(pool)
        .await?;

    Ok((products, total))
}
