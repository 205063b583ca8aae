use super::RenderError;
use crate::feed::FeedEntry;

/// Entries per page when the configuration does not set it.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    pub entries: &'a [FeedEntry],
    /// 1-based page number.
    pub number: usize,
    pub total_pages: usize,
    /// Length of the whole result list.
    pub total_entries: usize,
    /// Index of `entries[0]` in the whole result list.
    pub offset: usize,
}

impl Page<'_> {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.number > 1
    }
}

/// Number of pages needed for `total` entries. An empty list still has one
/// (empty) page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Page `number` (1-based) of `entries` split into pages of `page_size`.
pub fn paginate(entries: &[FeedEntry], page_size: usize, number: usize) -> Result<Page<'_>, RenderError> {
    let page_size = page_size.max(1);
    let total_pages = page_count(entries.len(), page_size);
    if number == 0 || number > total_pages {
        return Err(RenderError::PageOutOfRange {
            page: number,
            pages: total_pages,
        });
    }

    let offset = (number - 1) * page_size;
    let end = (offset + page_size).min(entries.len());
    Ok(Page {
        entries: &entries[offset.min(end)..end],
        number,
        total_pages,
        total_entries: entries.len(),
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<FeedEntry> {
        (0..n)
            .map(|i| FeedEntry::new(format!("Paper {i}"), "", format!("https://arxiv.org/abs/{i}")))
            .collect()
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_paginate_slices_in_order() {
        let all = entries(25);
        let page = paginate(&all, 10, 3).unwrap();
        assert_eq!(page.entries.len(), 5);
        assert_eq!(page.entries[0].title, "Paper 20");
        assert_eq!(page.offset, 20);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next());
        assert!(page.has_prev());
    }

    #[test]
    fn test_paginate_empty_list_has_one_page() {
        let page = paginate(&[], 10, 1).unwrap();
        assert!(page.entries.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn test_paginate_out_of_range() {
        let all = entries(3);
        assert!(matches!(
            paginate(&all, 2, 3),
            Err(RenderError::PageOutOfRange { page: 3, pages: 2 })
        ));
        assert!(paginate(&all, 2, 0).is_err());
    }
}
