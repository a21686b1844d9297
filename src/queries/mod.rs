pub mod admin_queries;
pub mod category_queries;
pub mod product_queries;
pub mod supplier_queries;
pub mod user_queries;

/// `%query%` with LIKE wildcards in the query taken literally. Pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_in_query_are_escaped() {
        assert_eq!(contains_pattern("tea"), "%tea%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
