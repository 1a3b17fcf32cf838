pub mod vec_utils;
pub mod str_utils;

/// Trims a free-text search query and lowercases it. Blank queries become `None`.
pub fn normalize_query(query: Option<&str>) -> Option<String> {
    query.map(|x| x.trim().to_lowercase()).filter(|x| !x.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query(None), None);
        assert_eq!(normalize_query(Some("   ")), None);
        assert_eq!(normalize_query(Some("  Flip RESET ")), Some("flip reset".to_string()));
    }
}
