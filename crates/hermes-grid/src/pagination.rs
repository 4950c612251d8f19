//! Page arithmetic and the compact page list.

use serde::Serialize;

/// Number of pages for `rows` rows; never less than one.
pub fn total_pages(rows: usize, page_size: usize) -> usize {
    rows.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a 1-based page number into `[1, total]`.
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Half-open absolute row range shown on `page`.
pub fn page_bounds(page: usize, page_size: usize, rows: usize) -> (usize, usize) {
    let start = (page.max(1) - 1).saturating_mul(page_size).min(rows);
    let end = (start + page_size).min(rows);
    (start, end)
}

/// "Showing rows a-b of n" for the given page.
pub fn showing_summary(page: usize, page_size: usize, rows: usize) -> String {
    let (start, end) = page_bounds(page, page_size, rows);
    let first = if rows == 0 { 0 } else { start + 1 };
    format!("Showing rows {first}-{end} of {rows}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageItem {
    Page(usize),
    Dots,
}

/// Compact page list: `boundary` pages at each end, `sibling` pages around
/// `current`, gaps shown as [`PageItem::Dots`].
pub fn page_items(total: usize, current: usize, boundary: usize, sibling: usize) -> Vec<PageItem> {
    if total == 0 {
        return vec![];
    }
    let total_numbers = boundary * 2 + sibling * 2 + 3;
    if total <= total_numbers {
        return (1..=total).map(PageItem::Page).collect();
    }

    let siblings_start = current.saturating_sub(sibling).max(boundary + 1);
    let siblings_end = (current + sibling).min(total - boundary);

    let mut pages: Vec<PageItem> = (1..=boundary).map(PageItem::Page).collect();
    if siblings_start > boundary + 1 {
        pages.push(PageItem::Dots);
    }
    pages.extend((siblings_start..=siblings_end).map(PageItem::Page));
    if siblings_end < total - boundary {
        pages.push(PageItem::Dots);
    }
    pages.extend((total - boundary + 1..=total).map(PageItem::Page));

    pages.dedup();
    pages
}

/// Resolve the page-jump field. Non-digits are ignored and the result is
/// clamped into range; an empty field counts as zero and lands on page 1.
pub fn parse_page_jump(input: &str, total: usize) -> usize {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    let requested = if digits.is_empty() {
        0
    } else {
        digits.parse::<usize>().unwrap_or(usize::MAX)
    };
    clamp_page(requested, total)
}
