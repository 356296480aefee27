use std::fmt;

/// Windows at or below this size list every page.
const FULL_RANGE_LIMIT: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(u32),
    Ellipsis,
}

impl fmt::Display for PageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageMarker::Page(n) => write!(f, "{n}"),
            PageMarker::Ellipsis => f.write_str("…"),
        }
    }
}

pub fn total_pages(total_count: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    u32::try_from(total_count.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
}

/// Markers for the navigation. Callers only render this when `total > 1`.
pub fn page_range(current: u32, total: u32) -> Vec<PageMarker> {
    use PageMarker::{Ellipsis, Page};

    if total <= FULL_RANGE_LIMIT {
        return (1..=total).map(Page).collect();
    }
    if current <= 4 {
        return vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(total)];
    }
    if current >= total - 3 {
        return vec![
            Page(1),
            Ellipsis,
            Page(total - 4),
            Page(total - 3),
            Page(total - 2),
            Page(total - 1),
            Page(total),
        ];
    }
    vec![
        Page(1),
        Ellipsis,
        Page(current - 1),
        Page(current),
        Page(current + 1),
        Ellipsis,
        Page(total),
    ]
}
