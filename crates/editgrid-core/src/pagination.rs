//! Client-side page slicing over the filtered, sorted rows.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Keeps the page index inside the data after filtering shrinks it.
    pub fn clamp(&mut self, total: usize) {
        let last = self.page_count(total) - 1;
        if self.page_index > last {
            self.page_index = last;
        }
    }

    pub fn next(&mut self, total: usize) -> bool {
        if self.page_index + 1 < self.page_count(total) {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.page_index > 0 {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 0;
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page_index * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_pages() {
        let items: Vec<u32> = (0..7).collect();
        let mut page = Pagination::new(3);
        assert_eq!(page.slice(&items), &[0, 1, 2]);
        assert!(page.next(items.len()));
        assert!(page.next(items.len()));
        assert_eq!(page.slice(&items), &[6]);
        assert!(!page.next(items.len()));
        assert!(page.previous());
        assert_eq!(page.slice(&items), &[3, 4, 5]);
    }

    #[test]
    fn empty_data_has_one_page() {
        let page = Pagination::new(10);
        assert_eq!(page.page_count(0), 1);
        assert!(page.slice::<u32>(&[]).is_empty());
    }

    #[test]
    fn clamp_after_shrink() {
        let mut page = Pagination::new(2);
        page.page_index = 4;
        page.clamp(3);
        assert_eq!(page.page_index, 1);
    }

    #[test]
    fn zero_page_size_is_bumped() {
        assert_eq!(Pagination::new(0).page_size, 1);
    }
}
