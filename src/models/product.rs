use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Choice;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub category_id: i32,
    pub supplier_id: i32,
    pub product_name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub units_in_stock: i32,
    pub description: Option<String>,
}

/// A product joined with the labels of its category and supplier.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    pub category: String,
    pub supplier: String,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductDetail>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
    /// Opaque token replaying the active filter on page links.
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(default, deserialize_with = "crate::utils::pagination::lenient_page")]
    pub page: Option<u32>,
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductFormResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductDetail>,
    pub categories: Vec<Choice>,
    pub suppliers: Vec<Choice>,
}

#[derive(Debug, Serialize)]
pub struct ProductImagesResponse {
    pub images: Vec<String>,
}

/// What the product listing is narrowed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "query", rename_all = "lowercase")]
pub enum ProductFilter {
    #[default]
    All,
    /// Case-insensitive substring of the product name.
    Name(String),
    /// Case-insensitive match on the category label.
    Category(String),
}
