use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PER_PAGE: u64 = 10;

/// `?page=` as sent by the client. Kept as a string so that `last` and
/// malformed values can be told apart from a missing parameter.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page number is not an integer")]
    NotAnInteger,
    #[error("page number is less than 1")]
    LessThanOne,
    #[error("that page contains no results")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Resolves the requested page against `count` rows.
/// An empty result set still has a valid first page.
pub fn resolve(requested: Option<&str>, count: u64, per_page: u64) -> Result<PageWindow, PageError> {
    let num_pages = if count == 0 { 1 } else { count.div_ceil(per_page) };

    let number = match requested.map(str::trim) {
        None | Some("") => 1,
        Some("last") => num_pages,
        Some(raw) => {
            let n: i64 = raw.parse().map_err(|_| PageError::NotAnInteger)?;
            if n < 1 {
                return Err(PageError::LessThanOne);
            }
            n as u64
        }
    };

    if number > num_pages {
        return Err(PageError::Empty);
    }

    Ok(PageWindow {
        number,
        num_pages,
        offset: (number - 1) * per_page,
        limit: per_page,
    })
}

#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, count: u64) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let w = resolve(None, 25, PER_PAGE).unwrap();
        assert_eq!(w, PageWindow { number: 1, num_pages: 3, offset: 0, limit: 10 });
    }

    #[test]
    fn last_resolves_to_final_page() {
        let w = resolve(Some("last"), 25, PER_PAGE).unwrap();
        assert_eq!(w.number, 3);
        assert_eq!(w.offset, 20);
    }

    #[test]
    fn empty_listing_has_a_first_page() {
        let w = resolve(Some("1"), 0, PER_PAGE).unwrap();
        assert_eq!(w.num_pages, 1);
        assert_eq!(resolve(Some("2"), 0, PER_PAGE), Err(PageError::Empty));
    }

    #[test]
    fn rejects_bad_page_numbers() {
        assert_eq!(resolve(Some("abc"), 5, PER_PAGE), Err(PageError::NotAnInteger));
        assert_eq!(resolve(Some("0"), 5, PER_PAGE), Err(PageError::LessThanOne));
        assert_eq!(resolve(Some("2"), 10, PER_PAGE), Err(PageError::Empty));
    }

    #[test]
    fn page_flags() {
        let w = resolve(Some("2"), 30, PER_PAGE).unwrap();
        let page = Page::new(vec![1, 2, 3], w, 30);
        assert!(page.has_next);
        assert!(page.has_previous);
    }
}
