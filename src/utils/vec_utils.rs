pub trait PageExtensions<T> {
    /// Returns the 1-based `page` of at most `limit` items.
    fn page(self, page: usize, limit: usize) -> Vec<T>;
}

impl<T> PageExtensions<T> for Vec<T> {
    fn page(self, page: usize, limit: usize) -> Vec<T> {
        let skip = page.saturating_sub(1).saturating_mul(limit);
        self.into_iter().skip(skip).take(limit).collect()
    }
}

/// Number of pages needed to show `count` items, `limit` per page.
pub fn total_pages(count: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    count.div_ceil(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(items.clone().page(1, 3), vec![1, 2, 3]);
        assert_eq!(items.clone().page(3, 3), vec![7]);
        assert!(items.clone().page(4, 3).is_empty());
        assert_eq!(items.page(0, 3), vec![1, 2, 3]);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
        assert_eq!(total_pages(3, 0), 0);
    }
}
