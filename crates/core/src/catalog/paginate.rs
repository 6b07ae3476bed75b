//! Page slicing.

use serde::Serialize;

/// One page of a listing plus the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed page number that was requested.
    pub page: u32,
    pub per_page: usize,
    /// Items across all pages.
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Transform the items while keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        usize::try_from(self.page).is_ok_and(|page| page < self.total_pages)
    }
}

/// Slice `[(page - 1) * per_page, page * per_page)` out of `items`.
///
/// Page 0, pages past the end, and a zero page size all yield an empty slice
/// rather than an error. `total_pages` is `ceil(len / per_page)`.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: u32, per_page: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = if per_page == 0 {
        0
    } else {
        total_items.div_ceil(per_page)
    };

    let slice = usize::try_from(page)
        .ok()
        .and_then(|page| page.checked_sub(1))
        .and_then(|index| index.checked_mul(per_page))
        .and_then(|start| {
            let end = start.saturating_add(per_page).min(total_items);
            items.get(start..end)
        })
        .unwrap_or_default();

    Page {
        items: slice.to_vec(),
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_last_page() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(&items, 1, 12);
        assert_eq!(first.items, (1..=12).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());

        let last = paginate(&items, 3, 12);
        assert_eq!(last.items, vec![25]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_pages_concatenate_to_input() {
        let items: Vec<u32> = (1..=31).collect();
        for per_page in 1..=10 {
            let total_pages = paginate(&items, 1, per_page).total_pages;
            let joined: Vec<u32> = (1..=total_pages)
                .flat_map(|page| {
                    paginate(&items, u32::try_from(page).unwrap_or(u32::MAX), per_page).items
                })
                .collect();
            assert_eq!(joined, items, "per_page = {per_page}");
        }
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let items = vec!['a', 'b', 'c'];
        assert!(paginate(&items, 0, 2).items.is_empty());
        assert!(paginate(&items, 3, 2).items.is_empty());
        assert!(paginate(&items, u32::MAX, 2).items.is_empty());
    }

    #[test]
    fn test_zero_page_size() {
        let page = paginate(&[1, 2, 3], 1, 0);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_items, 3);
    }

    #[test]
    fn test_exact_multiple() {
        let items: Vec<u32> = (1..=24).collect();
        assert_eq!(paginate(&items, 1, 12).total_pages, 2);
        assert!(paginate(&items, 3, 12).items.is_empty());
    }
}
