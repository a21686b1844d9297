use sqlx::{PgPool, Postgres, QueryBuilder};

use super::contains_pattern;
use crate::{
    error::Result,
    models::{User, UserResponse},
    utils::pagination::PageRequest,
};

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

fn push_search(query: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(q) = search {
        let pattern = contains_pattern(q);
        query.push(" WHERE (email ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" ESCAPE '\\' OR name ILIKE ");
        query.push_bind(pattern);
        query.push(" ESCAPE '\\')");
    }
}

fn page_query(search: Option<&str>, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT id, email, name, role, created_at FROM users");
    push_search(&mut query, search);
    query.push(" ORDER BY id ASC LIMIT ");
    query.push_bind(page.limit());
    query.push(" OFFSET ");
    query.push_bind(page.offset());
    query
}

pub async fn search_users(
    pool: &PgPool,
    search: Option<&str>,
    page: PageRequest,
) -> Result<(Vec<UserResponse>, i64)> {
    let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM users");
    push_search(&mut count, search);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let users = page_query(search, page)
        .build_query_as::<UserResponse>()
        .fetch_all(pool)
        .await?;

    Ok((users, total))
}
