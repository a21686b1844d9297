use axum::extract::Multipart;

use crate::{
    error::{AppError, Result},
    forms::ProductForm,
    services::image_store::UploadedFile,
};

pub const IMAGES_FIELD: &str = "images";

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Multipart error: {}", e))
}

/// Splits a multipart product submission into its text fields and uploaded images.
pub async fn read_product_submission(
    mut multipart: Multipart,
) -> Result<(ProductForm, Vec<UploadedFile>)> {
    let mut form = ProductForm::default();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGES_FIELD {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            // an empty file input still sends a nameless part
            if filename.is_empty() {
                continue;
            }
            files.push(UploadedFile { filename, data });
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        if !form.set(&name, value) {
            tracing::debug!(field = %name, "Ignoring unknown product form field");
        }
    }

    Ok((form, files))
}
