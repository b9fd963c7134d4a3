//! # Paginator
//!
//! Chunks entries into pages and renders one page as markdown. The active
//! paginator for a room lives in `RoomState` next to the event ID of the
//! message it controls; `.next`/`.prev` edit that message in place.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginator {
    pub title: String,
    entries: Vec<String>,
    per_page: usize,
    page: usize,
}

impl Paginator {
    pub fn new(title: &str, entries: Vec<String>, per_page: usize) -> Self {
        Self {
            title: title.to_string(),
            entries,
            per_page: per_page.max(1),
            page: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(self.per_page).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Step forward. Saturates at the last page; returns whether it moved.
    pub fn next(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Step back. Saturates at the first page; returns whether it moved.
    pub fn prev(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn render(&self) -> String {
        let start = self.page * self.per_page;
        let end = (start + self.per_page).min(self.entries.len());
        let body = self.entries[start..end].join("\n");
        format!(
            "**{}**\n\n{}\n\n_Page {}/{}_ · `.prev` `.next` `.close`",
            self.title,
            body,
            self.page + 1,
            self.page_count()
        )
    }

    /// Final rendering once the list is closed and controls stop working.
    pub fn render_closed(&self) -> String {
        format!("**{}**\n\n_closed_", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("entry {i}")).collect()
    }

    #[test]
    fn chunks_into_pages() {
        let pager = Paginator::new("List", entries(25), 10);
        assert_eq!(pager.page_count(), 3);
    }

    #[test]
    fn empty_list_still_has_one_page() {
        let pager = Paginator::new("List", vec![], 10);
        assert_eq!(pager.page_count(), 1);
        assert!(pager.render().contains("Page 1/1"));
    }

    #[test]
    fn stepping_saturates() {
        let mut pager = Paginator::new("List", entries(15), 10);
        assert!(!pager.prev());
        assert!(pager.next());
        assert!(!pager.next());
        assert_eq!(pager.current_page(), 1);
        assert!(pager.prev());
        assert_eq!(pager.current_page(), 0);
    }

    #[test]
    fn renders_only_the_current_page() {
        let mut pager = Paginator::new("List", entries(12), 10);
        let first = pager.render();
        assert!(first.contains("entry 1"));
        assert!(!first.contains("entry 11"));
        pager.next();
        let second = pager.render();
        assert!(second.contains("entry 11"));
        assert!(!second.contains("entry 1\n"));
        assert!(second.contains("Page 2/2"));
    }
}
