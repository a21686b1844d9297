use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{REQUIRED, is_pressed};
use crate::{error::FieldErrors, models::ProductFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Name,
    Category,
}

impl FilterMode {
    pub fn filter(self, query: &str) -> ProductFilter {
        match self {
            FilterMode::Name => ProductFilter::Name(query.to_string()),
            FilterMode::Category => ProductFilter::Category(query.to_string()),
        }
    }
}

impl FromStr for FilterMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "1" => Ok(FilterMode::Name),
            "category" | "2" => Ok(FilterMode::Category),
            _ => Err(()),
        }
    }
}

/// Product list filter form, posted url-encoded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterForm {
    pub filter_mode: Option<String>,
    pub query: Option<String>,
    pub reset: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Drop any filter and go back to the first unfiltered page.
    Reset,
    Search(ProductFilter),
    /// Nothing to search for; show the unfiltered list.
    ShowAll,
}

pub fn validate_filter(form: &FilterForm) -> Result<FilterAction, FieldErrors> {
    let mut errors = FieldErrors::new();

    let mode = match form.filter_mode.as_deref().map(str::trim) {
        None | Some("") => {
            errors.add("filter_mode", REQUIRED);
            None
        }
        Some(raw) => match raw.parse::<FilterMode>() {
            Ok(mode) => Some(mode),
            Err(()) => {
                errors.add("filter_mode", "Not a valid choice.");
                None
            }
        },
    };

    let query = form.query.as_deref().unwrap_or_default().trim();
    let search = is_pressed(&form.search);
    let reset = is_pressed(&form.reset);

    if query.is_empty() && search && !reset {
        errors.add("query", "Query has to include at least one symbol.");
    }

    errors.into_result()?;

    if reset {
        return Ok(FilterAction::Reset);
    }

    match mode {
        Some(mode) if search || !query.is_empty() => {
            Ok(FilterAction::Search(mode.filter(query)))
        }
        _ => Ok(FilterAction::ShowAll),
    }
}
