//! Paging for the skip carousel and the loading skeleton's shimmer.

use std::ops::Range;
use std::time::Duration;

/// Delay between automatic page turns.
pub const AUTOPLAY_INTERVAL: Duration = Duration::from_secs(5);

/// Page cursor over a list of `len` items shown `per_page` at a time.
///
/// The item list lives elsewhere (in `FetchState`); every method that needs
/// its length takes it as an argument so the cursor never caches a stale one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    per_page: usize,
    autoplay: bool,
}

impl Carousel {
    pub fn new(per_page: usize) -> Self {
        Self {
            index: 0,
            per_page: per_page.max(1),
            autoplay: true,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn set_autoplay(&mut self, on: bool) {
        self.autoplay = on;
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.per_page)
    }

    pub fn next(&mut self, len: usize) {
        let pages = self.total_pages(len);
        if pages > 0 {
            self.index = (self.index + 1) % pages;
        }
    }

    pub fn prev(&mut self, len: usize) {
        let pages = self.total_pages(len);
        if pages > 0 {
            self.index = (self.index + pages - 1) % pages;
        }
    }

    /// Jump to `page`. Returns `false` and stays put when out of range.
    pub fn go_to(&mut self, page: usize, len: usize) -> bool {
        if page >= self.total_pages(len) {
            return false;
        }
        self.index = page;
        true
    }

    /// Item indices on the current page.
    pub fn visible(&self, len: usize) -> Range<usize> {
        let start = (self.index * self.per_page).min(len);
        let end = (start + self.per_page).min(len);
        start..end
    }

    /// Change the page size (screen resize), keeping the cursor in range.
    pub fn set_per_page(&mut self, per_page: usize, len: usize) {
        self.per_page = per_page.max(1);
        let pages = self.total_pages(len);
        if self.index >= pages {
            self.index = pages.saturating_sub(1);
        }
    }

    /// Autoplay timer fired. Returns whether the page turned.
    pub fn tick(&mut self, len: usize) -> bool {
        if !self.autoplay || len == 0 {
            return false;
        }
        let before = self.index;
        self.next(len);
        before != self.index
    }
}

/// Which skeleton card is highlighted while skips load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shimmer {
    index: usize,
    count: usize,
}

impl Shimmer {
    pub fn new(count: usize) -> Self {
        Self {
            index: 0,
            count: count.max(1),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn advance(&mut self) -> usize {
        self.index = (self.index + 1) % self.count;
        self.index
    }
}
