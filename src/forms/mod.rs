//! Submitted form payloads and the pure functions that validate them.
//!
//! Forms arrive as loosely typed strings. Validation either yields typed
//! input or a [`FieldErrors`](crate::error::FieldErrors) map covering every
//! failing field, never a partial result.

mod filter_form;
mod product_form;

pub use filter_form::{FilterAction, FilterForm, FilterMode, validate_filter};
pub use product_form::{
    ProductForm, ProductInput, SubmitAction, validate_discount, validate_product,
    validate_unit_price,
};

const REQUIRED: &str = "This field is required.";

fn is_pressed(flag: &Option<String>) -> bool {
    flag.as_deref().is_some_and(|v| !v.is_empty())
}
