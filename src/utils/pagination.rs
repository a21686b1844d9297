use serde::{Deserialize, Deserializer};

/// A 1-indexed page of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Missing or zero pages fall back to the first page.
    pub fn new(page: Option<u32>, per_page: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

/// Reads a `page` query value, treating anything that is not a page number as absent.
pub fn lenient_page<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|page| page.trim().parse::<u32>().ok()))
}

pub fn page_count(total: i64, per_page: u32) -> u32 {
    if total <= 0 {
        return 0;
    }
    let per_page = i64::from(per_page.max(1));
    u32::try_from((total + per_page - 1) / per_page).unwrap_or(u32::MAX)
}
