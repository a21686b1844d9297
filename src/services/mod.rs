pub mod image_store;
pub mod product_listing;
pub mod product_service;
