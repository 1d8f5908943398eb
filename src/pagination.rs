//! Pagination arithmetic: request sanitizing, page counts and the
//! page-number range rendered by clients.

/// A sanitized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Builds a request from raw client input. A page below 1 (or absent,
    /// or unparseable upstream) becomes 1; the limit falls back to
    /// `default_limit` and is clamped to `[1, max_limit]`.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, max_limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        // Saturating: the page number is client-controlled and may be
        // arbitrarily large; an absurd page must stay a past-the-end
        // offset, never wrap negative.
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Number of pages needed to show `total` results at `limit` per page.
///
/// Zero means there are no results at all, which callers render as a
/// distinct empty state rather than "page 1 of 0".
pub fn total_pages(total: i64, limit: i64) -> i64 {
    debug_assert!(limit > 0);
    (total + limit - 1) / limit
}

/// One slot in the rendered page navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEntry {
    Page(i64),
    Ellipsis,
}

/// The page numbers a client should render for navigation.
///
/// At most `window` contiguous pages are shown, centered on the current
/// page and clamped to `[1, total_pages]`:
///
/// ```text
/// start = max(1, page - window / 2)
/// end   = min(total_pages, start + window - 1)
/// start = max(1, end - window + 1)      // keep the window full near the end
/// ```
///
/// Page 1 leads in when the window starts past it, with an ellipsis when
/// the gap is more than one page; the last page trails out symmetrically.
/// An empty result set (`total_pages == 0`) yields an empty range.
pub fn page_range(page: i64, total_pages: i64, window: i64) -> Vec<PageEntry> {
    let mut range = Vec::new();
    if total_pages < 1 || window < 1 {
        return range;
    }

    let mut start = (page - window / 2).max(1);
    let end = (start + window - 1).min(total_pages);
    if end - start < window - 1 {
        start = (end - window + 1).max(1);
    }

    if start > 1 {
        range.push(PageEntry::Page(1));
        if start > 2 {
            range.push(PageEntry::Ellipsis);
        }
    }

    for p in start..=end {
        range.push(PageEntry::Page(p));
    }

    if end < total_pages {
        if end < total_pages - 1 {
            range.push(PageEntry::Ellipsis);
        }
        range.push(PageEntry::Page(total_pages));
    }

    range
}
