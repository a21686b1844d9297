use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::REQUIRED;
use crate::error::FieldErrors;

pub const NAME_MAX_LEN: usize = 60;
pub const SKU_MAX_LEN: usize = 20;
const PRICE_PLACES: u32 = 6;
const DISCOUNT_PLACES: u32 = 4;
/// `NUMERIC(20, 6)` leaves fourteen integer digits.
const PRICE_LIMIT: Decimal = Decimal::from_parts(0x107A_4000, 0x5AF3, 0, false, 0); // 100_000_000_000_000

/// Raw product form as posted by the client.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub product_name: Option<String>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub sku: Option<String>,
    pub unit_price: Option<String>,
    pub discount: Option<String>,
    pub units_in_stock: Option<String>,
    pub description: Option<String>,
    pub save: Option<String>,
    pub save_and_continue: Option<String>,
}

impl ProductForm {
    /// Assigns a text field by its form name. Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "product_name" => &mut self.product_name,
            "category_id" => &mut self.category_id,
            "supplier_id" => &mut self.supplier_id,
            "sku" => &mut self.sku,
            "unit_price" => &mut self.unit_price,
            "discount" => &mut self.discount,
            "units_in_stock" => &mut self.units_in_stock,
            "description" => &mut self.description,
            "save" => &mut self.save,
            "save_and_continue" => &mut self.save_and_continue,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn action(&self) -> SubmitAction {
        if super::is_pressed(&self.save) {
            SubmitAction::Save
        } else {
            SubmitAction::SaveAndContinue
        }
    }
}

/// Which submit button was used; decides where a successful submission redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Save,
    SaveAndContinue,
}

/// Validated product fields, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub product_name: String,
    pub category_id: i32,
    pub supplier_id: i32,
    pub sku: String,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub units_in_stock: i32,
    pub description: Option<String>,
}

pub fn validate_discount(discount: Decimal) -> Result<(), &'static str> {
    if discount < Decimal::ZERO || discount > Decimal::ONE {
        return Err("Discount has to be from 0 to 1.");
    }
    Ok(())
}

pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price has to be positive.");
    }
    if price >= PRICE_LIMIT {
        return Err("Price is too large.");
    }
    Ok(())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &Option<String>,
    max_len: usize,
) -> Option<String> {
    let Some(text) = non_blank(value) else {
        errors.add(field, REQUIRED);
        return None;
    };
    if text.chars().count() > max_len {
        errors.add(
            field,
            format!("Field must be between 1 and {} characters long.", max_len),
        );
        return None;
    }
    Some(text.to_string())
}

fn required_choice(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> Option<i32> {
    let Some(text) = non_blank(value) else {
        errors.add(field, REQUIRED);
        return None;
    };
    match text.parse::<i32>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, "Invalid Choice: could not coerce.");
            None
        }
    }
}

/// Rounds the way Postgres does when storing into a `NUMERIC` column.
fn to_scale(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

pub fn validate_product(form: &ProductForm) -> Result<ProductInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let product_name = required_text(&mut errors, "product_name", &form.product_name, NAME_MAX_LEN);
    let category_id = required_choice(&mut errors, "category_id", &form.category_id);
    let supplier_id = required_choice(&mut errors, "supplier_id", &form.supplier_id);

    let sku = required_text(&mut errors, "sku", &form.sku, SKU_MAX_LEN).and_then(|sku| {
        let valid = sku
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Some(sku)
        } else {
            errors.add(
                "sku",
                "SKU may only contain letters, digits, '-' and '_'.",
            );
            None
        }
    });

    let unit_price = match non_blank(&form.unit_price) {
        None => {
            errors.add("unit_price", REQUIRED);
            None
        }
        Some(text) => match parse_decimal(text) {
            None => {
                errors.add("unit_price", "Not a valid decimal value.");
                None
            }
            Some(price) => match validate_unit_price(to_scale(price, PRICE_PLACES)) {
                Ok(()) => Some(to_scale(price, PRICE_PLACES)),
                Err(msg) => {
                    errors.add("unit_price", msg);
                    None
                }
            },
        },
    };

    let discount = match non_blank(&form.discount) {
        None => Some(Decimal::ZERO),
        Some(text) => match parse_decimal(text) {
            None => {
                errors.add("discount", "Not a valid float value.");
                None
            }
            Some(discount) => match validate_discount(to_scale(discount, DISCOUNT_PLACES)) {
                Ok(()) => Some(to_scale(discount, DISCOUNT_PLACES)),
                Err(msg) => {
                    errors.add("discount", msg);
                    None
                }
            },
        },
    };

    let units_in_stock = match non_blank(&form.units_in_stock) {
        None => Some(0),
        Some(text) => match text.parse::<i32>() {
            Ok(units) => Some(units),
            Err(_) => {
                errors.add("units_in_stock", "Not a valid integer value.");
                None
            }
        },
    };

    let description = non_blank(&form.description).map(str::to_string);

    match (
        product_name,
        category_id,
        supplier_id,
        sku,
        unit_price,
        discount,
        units_in_stock,
    ) {
        (
            Some(product_name),
            Some(category_id),
            Some(supplier_id),
            Some(sku),
            Some(unit_price),
            Some(discount),
            Some(units_in_stock),
        ) if errors.is_empty() => Ok(ProductInput {
            product_name,
            category_id,
            supplier_id,
            sku,
            unit_price,
            discount,
            units_in_stock,
            description,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            product_name: Some("Salted crackers".into()),
            category_id: Some("1".into()),
            supplier_id: Some("2".into()),
            sku: Some("X1".into()),
            unit_price: Some("10.000000".into()),
            discount: Some("0.1".into()),
            units_in_stock: Some("5".into()),
            description: Some("Crunchy".into()),
            save: Some("Save".into()),
            save_and_continue: None,
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn accepts_a_complete_form() {
        let input = validate_product(&valid_form()).unwrap();
        assert_eq!(input.sku, "X1");
        assert_eq!(input.unit_price, dec("10"));
        assert_eq!(input.discount, dec("0.1"));
        assert_eq!(input.units_in_stock, 5);
        assert_eq!(input.description.as_deref(), Some("Crunchy"));
    }

    #[test]
    fn discount_accepted_only_within_unit_interval() {
        for ok in ["0", "0.0", "0.5", "1", "1.0"] {
            assert!(validate_discount(dec(ok)).is_ok(), "{ok} should pass");
        }
        for bad in ["-0.0001", "1.0001", "2", "-1"] {
            assert!(validate_discount(dec(bad)).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn unit_price_accepted_only_when_not_negative() {
        assert!(validate_unit_price(dec("0")).is_ok());
        assert!(validate_unit_price(dec("0.000001")).is_ok());
        assert!(validate_unit_price(dec("99999.5")).is_ok());
        assert!(validate_unit_price(dec("-0.01")).is_err());
    }

    #[test]
    fn price_must_fit_fourteen_integer_digits() {
        assert_eq!(PRICE_LIMIT, dec("100000000000000"));
        assert!(validate_unit_price(dec("1000000")).is_ok());
        assert!(validate_unit_price(dec("99999999999999.999999")).is_ok());
        assert_eq!(
            validate_unit_price(dec("100000000000000")),
            Err("Price is too large.")
        );

        let mut form = valid_form();
        form.unit_price = Some("99999999999999.9999995".into());
        assert_eq!(
            validate_product(&form).unwrap_err().get("unit_price"),
            Some(&["Price is too large.".to_string()][..])
        );
    }

    #[test]
    fn out_of_range_values_reject_whole_submission() {
        let mut form = valid_form();
        form.discount = Some("1.5".into());
        form.unit_price = Some("-3".into());

        let errors = validate_product(&form).unwrap_err();
        assert_eq!(
            errors.get("discount"),
            Some(&["Discount has to be from 0 to 1.".to_string()][..])
        );
        assert_eq!(
            errors.get("unit_price"),
            Some(&["Price has to be positive.".to_string()][..])
        );
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let errors = validate_product(&ProductForm::default()).unwrap_err();
        for field in ["product_name", "category_id", "supplier_id", "sku", "unit_price"] {
            assert!(errors.contains(field), "{field} missing from {errors:?}");
        }
        assert!(!errors.contains("discount"));
        assert!(!errors.contains("units_in_stock"));
    }

    #[test]
    fn optional_fields_take_defaults() {
        let mut form = valid_form();
        form.discount = None;
        form.units_in_stock = Some(String::new());
        form.description = Some("   ".into());

        let input = validate_product(&form).unwrap();
        assert_eq!(input.discount, Decimal::ZERO);
        assert_eq!(input.units_in_stock, 0);
        assert_eq!(input.description, None);
    }

    #[test]
    fn sku_must_be_short_and_path_safe() {
        let mut form = valid_form();
        form.sku = Some("A".repeat(SKU_MAX_LEN + 1));
        assert!(validate_product(&form).unwrap_err().contains("sku"));

        form.sku = Some("../etc".into());
        assert!(validate_product(&form).unwrap_err().contains("sku"));

        form.sku = Some("AB-12_c".into());
        assert!(validate_product(&form).is_ok());
    }

    #[test]
    fn malformed_numbers_are_field_errors() {
        let mut form = valid_form();
        form.category_id = Some("snacks".into());
        form.unit_price = Some("ten".into());
        form.units_in_stock = Some("5.5".into());

        let errors = validate_product(&form).unwrap_err();
        assert!(errors.contains("category_id"));
        assert!(errors.contains("unit_price"));
        assert!(errors.contains("units_in_stock"));
    }

    #[test]
    fn price_is_rounded_to_six_places() {
        let mut form = valid_form();
        form.unit_price = Some("1.23456789".into());
        assert_eq!(validate_product(&form).unwrap().unit_price, dec("1.234568"));
    }

    #[test]
    fn discount_is_rounded_to_four_places() {
        let mut form = valid_form();
        form.discount = Some("0.12345".into());
        assert_eq!(validate_product(&form).unwrap().discount, dec("0.1235"));

        form.discount = Some("0.12344".into());
        assert_eq!(validate_product(&form).unwrap().discount, dec("0.1234"));

        form.discount = Some("1.00004".into());
        assert_eq!(validate_product(&form).unwrap().discount, dec("1.0000"));

        form.discount = Some("1.00005".into());
        assert!(validate_product(&form).unwrap_err().contains("discount"));
    }

    #[test]
    fn submit_flag_selects_action() {
        let mut form = valid_form();
        assert_eq!(form.action(), SubmitAction::Save);

        form.save = None;
        form.save_and_continue = Some("Save and add another".into());
        assert_eq!(form.action(), SubmitAction::SaveAndContinue);
    }

    #[test]
    fn set_assigns_known_fields_only() {
        let mut form = ProductForm::default();
        assert!(form.set("sku", "Z9".into()));
        assert!(!form.set("csrf_token", "abc".into()));
        assert_eq!(form.sku.as_deref(), Some("Z9"));
    }
}
