//! Fixed-size pages with clamping.

/// `max(1, ceil(len / page_size))`. A zero page size is treated as one.
#[must_use]
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

#[must_use]
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<'_, T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// `"Page 2 of 5"`.
    #[must_use]
    pub fn info(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

/// Slices out one page, clamping `page` into `[1, total_pages]`.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total = total_pages(items.len(), page_size);
    let page = clamp_page(page, total);

    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        page,
        total_pages: total,
        total_items: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_list_has_one_page() {
        let items: [u8; 0] = [];
        let page = paginate(&items, 1, 10);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_previous());
        assert!(!page.has_next());
        assert_eq!(page.info(), "Page 1 of 1");
    }

    #[test]
    fn test_page_above_range_clamps_down() {
        let items: Vec<u32> = (0..23).collect();
        let page = paginate(&items, 99, 10);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, &[20, 21, 22]);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_zero_clamps_up() {
        let items: Vec<u32> = (0..23).collect();
        let page = paginate(&items, 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.info(), "Page 1 of 3");
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
        assert_eq!(total_pages(0, 5), 1);
    }

    proptest! {
        #[test]
        fn clamped_page_is_in_range(
            len in 0usize..200,
            page in 0usize..50,
            page_size in 1usize..30,
        ) {
            let items: Vec<usize> = (0..len).collect();
            let p = paginate(&items, page, page_size);
            prop_assert!(p.page >= 1);
            prop_assert!(p.page <= p.total_pages);
            prop_assert!(p.items.len() <= page_size);
            prop_assert_eq!(p.total_items, len);
        }

        #[test]
        fn pages_cover_every_item_once(len in 0usize..120, page_size in 1usize..15) {
            let items: Vec<usize> = (0..len).collect();
            let total = total_pages(len, page_size);
            let joined: Vec<usize> = (1..=total)
                .flat_map(|n| paginate(&items, n, page_size).items.to_vec())
                .collect();
            prop_assert_eq!(joined, items);
        }
    }
}
