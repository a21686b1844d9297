use serde::{Deserialize, Serialize};

/// An `(id, label)` pair used to populate a selection field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i32,
    pub label: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CatalogSummary {
    pub products: i64,
    pub categories: i64,
    pub suppliers: i64,
    pub users: i64,
}
