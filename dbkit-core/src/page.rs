//! A single page of query results plus the arithmetic needed to render
//! pagination controls around it.
//!
//! A [`Page`] is built once from rows that were already fetched and is
//! immutable afterwards. Page numbers are 1-based; row indexes reported by
//! [`Page::start_index`] and [`Page::end_index`] are 1-based as well.

use std::fmt;
use std::ops::{Bound, Index, RangeBounds};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::PageError;
use crate::style::PaginationStyle;

/// One slice of a larger result set
#[derive(Clone, PartialEq, Eq)]
pub struct Page<T> {
    rows: Vec<T>,
    total: u64,
    page: u64,
    page_size: u64,
}

impl<T> Page<T> {
    /// Create a page over already-fetched rows.
    ///
    /// `page` is clamped to a minimum of 1. A `page_size` of zero is
    /// rejected because the page count would be undefined.
    pub fn new(rows: Vec<T>, total: u64, page: u64, page_size: u64) -> Result<Self, PageError> {
        if page_size == 0 {
            return Err(PageError::ZeroPageSize);
        }

        Ok(Self {
            rows,
            total,
            page: page.max(1),
            page_size,
        })
    }

    /// Rows of the current page.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    /// Row count across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Current page number (1-indexed).
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of pages needed to show `total` rows.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// True when there is more than one page to navigate between.
    pub fn has_other(&self) -> bool {
        self.total_pages() > 1
    }

    /// Next page number, or the current one on the last page.
    pub fn next_page(&self) -> u64 {
        if self.has_next() {
            self.page + 1
        } else {
            self.page
        }
    }

    /// Previous page number, or the current one on the first page.
    pub fn previous_page(&self) -> u64 {
        if self.has_previous() {
            self.page - 1
        } else {
            self.page
        }
    }

    /// 1-based index of the first row on this page, 0 for an empty result.
    pub fn start_index(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (self.page - 1).saturating_mul(self.page_size).saturating_add(1)
    }

    /// 1-based index of the last row on this page, 0 for an empty result.
    pub fn end_index(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        self.start_index()
            .saturating_add(self.rows.len() as u64)
            .saturating_sub(1)
            .min(self.total)
    }

    /// Rows on this page, not the overall total.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.rows.get(index)
    }

    /// Sub-slice of the rows. Out-of-range bounds yield an empty slice
    /// instead of panicking.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> &[T] {
        clamped_slice(&self.rows, range)
    }

    /// Fresh iterator over the rows. Every call starts from the first row.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Page numbers to render as navigation controls.
    pub fn iter_pages<S: PaginationStyle>(&self, style: &S) -> S::Pages {
        style.iterate_pages(self.page, self.total_pages())
    }

    /// Convert the rows while keeping the pagination metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Resolve `range` against `items`, clamping both ends to the slice length.
pub(crate) fn clamped_slice<T, R: RangeBounds<usize>>(items: &[T], range: R) -> &[T] {
    let len = items.len();
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    }
    .min(len);
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    }
    .min(len);

    if start >= end {
        &[]
    } else {
        &items[start..end]
    }
}

impl<T> Index<usize> for Page<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics when `index` is out of range, like slice indexing.
    fn index(&self, index: usize) -> &T {
        &self.rows[index]
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<T> fmt::Display for Page<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page {} of {}, rows {} - {} of {}.",
            self.page,
            self.total_pages(),
            self.start_index(),
            self.end_index(),
            self.total
        )
    }
}

impl<T> fmt::Debug for Page<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Page: page={}, total_pages={}>",
            self.page,
            self.total_pages()
        )
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Page", 7)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("page", &self.page)?;
        state.serialize_field("page_size", &self.page_size)?;
        state.serialize_field("total_pages", &self.total_pages())?;
        state.serialize_field("has_next", &self.has_next())?;
        state.serialize_field("has_previous", &self.has_previous())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::SlidingStyle;

    fn page<T>(rows: Vec<T>, total: u64, page: u64, page_size: u64) -> Page<T> {
        Page::new(rows, total, page, page_size).unwrap()
    }

    #[test]
    fn page_arithmetic() {
        let p = page((1..=10).collect(), 101, 2, 10);
        assert_eq!(p.total_pages(), 11);
        assert!(p.has_next());
        assert!(p.has_previous());
        assert!(p.has_other());
        assert_eq!(p.previous_page(), 1);
        assert_eq!(p.next_page(), 3);
        assert_eq!(p.start_index(), 11);
        assert_eq!(p.end_index(), 20);
        assert_eq!(p.len(), 10);
        assert!(!p.is_empty());
        assert_eq!(p[0], 1);
        assert_eq!(p.get(11), None);
    }

    #[test]
    fn indexes_saturate_for_huge_pages() {
        let p = page(vec![1_u8], 5, u64::MAX, 2);
        assert_eq!(p.start_index(), u64::MAX);
        assert_eq!(p.end_index(), 5);
        assert_eq!(p.next_page(), u64::MAX);
    }

    #[test]
    #[should_panic]
    fn index_out_of_range_panics() {
        let p = page(vec![1, 2], 2, 1, 2);
        let _ = p[11];
    }

    #[test]
    fn slice_out_of_range_is_empty() {
        let p = page(vec![1, 2, 3], 3, 1, 3);
        assert_eq!(p.slice(1..), &[2, 3]);
        assert_eq!(p.slice(5..9), &[] as &[i32]);
        assert_eq!(p.slice(..=10), &[1, 2, 3]);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = Page::new(vec![1], 1, 1, 0).unwrap_err();
        assert_eq!(err, PageError::ZeroPageSize);
    }

    #[test]
    fn page_number_is_clamped() {
        let p = page(Vec::<i32>::new(), 10, 0, 5);
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn iteration_restarts_but_iterator_is_fused() {
        let p = page(vec![1, 2], 2, 1, 2);
        assert_eq!(p.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!((&p).into_iter().count(), 2);

        let mut it = p.iter();
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next(), Some(&2));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn no_other_pages() {
        let p = page(Vec::<i32>::new(), 2, 1, 2);
        assert!(!p.has_other());
    }

    #[test]
    fn iter_pages_stops_at_page_count() {
        let p = page(Vec::<i32>::new(), 4, 1, 2);
        let mut pages = p.iter_pages(&SlidingStyle::default());
        assert_eq!(pages.by_ref().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(pages.next(), None);
    }

    #[test]
    fn iter_pages_without_rows() {
        let p = page(Vec::<i32>::new(), 0, 1, 1);
        assert_eq!(p.iter_pages(&SlidingStyle::default()).next(), None);
        assert_eq!(p.next_page(), 1);
        assert_eq!(p.previous_page(), 1);
        assert_eq!(p.start_index(), 0);
        assert_eq!(p.end_index(), 0);
    }

    #[test]
    fn iter_pages_with_default_style() {
        let p = page((0..200).collect(), 200, 1, 10);
        let pages: Vec<_> = p.iter_pages(&SlidingStyle::default()).collect();
        assert_eq!(pages, vec![1, 2, 3, 4]);
    }

    #[test]
    fn first_page_indexes() {
        let p = page(vec![1, 2], 2, 1, 2);
        assert_eq!(p.start_index(), 1);
        assert_eq!(p.end_index(), 2);
    }

    #[test]
    fn next_and_previous_saturate() {
        let p = page(vec![1, 2], 1, 1, 1);
        assert!(!p.has_next());
        assert!(!p.has_previous());
        assert_eq!(p.next_page(), 1);
        assert_eq!(p.previous_page(), 1);
    }

    #[test]
    fn debug_and_display() {
        let p = page(vec![1, 2], 2, 1, 2);
        assert_eq!(format!("{:?}", p), "<Page: page=1, total_pages=1>");
        assert_eq!(p.to_string(), "Page 1 of 1, rows 1 - 2 of 2.");
    }

    #[test]
    fn map_keeps_metadata() {
        let p = page(vec![1, 2], 12, 3, 2).map(|n| n.to_string());
        assert_eq!(p.rows(), &["1".to_string(), "2".to_string()]);
        assert_eq!(p.total(), 12);
        assert_eq!(p.page(), 3);
        assert_eq!(p.page_size(), 2);
    }

    #[test]
    fn serializes_with_derived_fields() {
        let p = page(vec![1, 2], 5, 2, 2);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "rows": [1, 2],
                "total": 5,
                "page": 2,
                "page_size": 2,
                "total_pages": 3,
                "has_next": true,
                "has_previous": true,
            })
        );
    }
}
