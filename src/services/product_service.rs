//! Product writes that span the database and the image directory.

use sqlx::{PgConnection, PgPool};

use super::image_store::{ImageStore, SavedImages, UploadedFile};
use crate::{
    error::{AppError, FieldErrors, Result},
    forms::ProductInput,
    models::Product,
    queries::{category_queries, product_queries, supplier_queries},
};

const INVALID_CHOICE: &str = "Not a valid choice.";
const SKU_IN_USE: &str = "SKU already in use.";

async fn check_references(
    conn: &mut PgConnection,
    input: &ProductInput,
    except_id: Option<i32>,
) -> Result<()> {
    let mut errors = FieldErrors::new();

    if !category_queries::exists(&mut *conn, input.category_id).await? {
        errors.add("category_id", INVALID_CHOICE);
    }
    if !supplier_queries::exists(&mut *conn, input.supplier_id).await? {
        errors.add("supplier_id", INVALID_CHOICE);
    }
    if product_queries::sku_taken(&mut *conn, &input.sku, except_id).await? {
        errors.add("sku", SKU_IN_USE);
    }

    errors.into_result()?;
    Ok(())
}

/// A concurrent insert can still win the race for a SKU.
fn sku_conflict(err: AppError) -> AppError {
    match err {
        AppError::DatabaseError(sqlx::Error::Database(ref db)) if db.is_unique_violation() => {
            AppError::Validation(FieldErrors::single("sku", SKU_IN_USE))
        }
        other => other,
    }
}

async fn undo_images(images: SavedImages, sku: &str) {
    if let Err(e) = images.rollback().await {
        tracing::warn!(sku, error = %e, "Failed to roll back images of an aborted write");
    }
}

async fn restore_directory(images: &ImageStore, current_sku: &str, previous_sku: &str) {
    if let Err(e) = images.rename(current_sku, previous_sku).await {
        tracing::warn!(
            sku = %previous_sku,
            error = %e,
            "Failed to restore image directory after aborted update"
        );
    }
}

/// `actor` is the acting admin's email, recorded in the logs.
pub async fn create_product(
    pool: &PgPool,
    images: &ImageStore,
    actor: &str,
    input: &ProductInput,
    files: &[UploadedFile],
) -> Result<Product> {
    let mut tx = pool.begin().await?;

    check_references(&mut tx, input, None).await?;
    let product = product_queries::create_product(&mut *tx, input)
        .await
        .map_err(sku_conflict)?;

    let saved = images.save(&product.sku, files).await?;

    if let Err(e) = tx.commit().await {
        undo_images(saved, &product.sku).await;
        return Err(sku_conflict(e.into()));
    }
    saved.finish();

    tracing::info!(id = product.id, sku = %product.sku, actor, "Product created");

    Ok(product)
}

pub async fn update_product(
    pool: &PgPool,
    images: &ImageStore,
    actor: &str,
    id: i32,
    input: &ProductInput,
    files: &[UploadedFile],
) -> Result<Product> {
    let mut tx = pool.begin().await?;

    let existing = product_queries::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;

    check_references(&mut tx, input, Some(id)).await?;
    let product = product_queries::update_product(&mut *tx, id, input)
        .await
        .map_err(sku_conflict)?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;

    images.rename(&existing.sku, &product.sku).await?;

    let saved = match images.save(&product.sku, files).await {
        Ok(saved) => saved,
        Err(e) => {
            restore_directory(images, &product.sku, &existing.sku).await;
            return Err(e);
        }
    };

    if let Err(e) = tx.commit().await {
        undo_images(saved, &product.sku).await;
        restore_directory(images, &product.sku, &existing.sku).await;
        return Err(sku_conflict(e.into()));
    }
    saved.finish();

    tracing::info!(id, sku = %product.sku, actor, "Product updated");

    Ok(product)
}

/// Deletes the row and then its image directory. The row is gone even if
/// the directory cannot be removed.
pub async fn delete_product(
    pool: &PgPool,
    images: &ImageStore,
    actor: &str,
    id: i32,
) -> Result<Product> {
    let product = product_queries::delete_product(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;

    if let Err(e) = images.remove_all(&product.sku).await {
        tracing::warn!(id, sku = %product.sku, error = %e, "Failed to remove product images");
    }

    tracing::info!(id, sku = %product.sku, actor, "Product deleted");

    Ok(product)
}

pub async fn product_images(pool: &PgPool, images: &ImageStore, id: i32) -> Result<Vec<String>> {
    let product = product_queries::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;

    images.list_urls(&product.sku).await
}
