//! Page navigation state

use serde::{Deserialize, Serialize};

use crate::errors::PracticeError;

/// Current position in the score
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    current_page: u32,
    total_pages: u32,
}

impl Navigation {
    /// Start on page 1
    pub fn new(total_pages: u32) -> Result<Self, PracticeError> {
        Self::at_page(1, total_pages)
    }

    /// Start on a given page
    pub fn at_page(current_page: u32, total_pages: u32) -> Result<Self, PracticeError> {
        if total_pages == 0 {
            return Err(PracticeError::InvalidPage {
                page: current_page,
                total_pages,
            });
        }
        let mut nav = Self {
            current_page: 1,
            total_pages,
        };
        nav.set_page(current_page)?;
        Ok(nav)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page == 1
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page == self.total_pages
    }

    /// Jump to a page
    pub fn set_page(&mut self, page: u32) -> Result<(), PracticeError> {
        if page == 0 || page > self.total_pages {
            return Err(PracticeError::InvalidPage {
                page,
                total_pages: self.total_pages,
            });
        }
        self.current_page = page;
        Ok(())
    }

    /// Jump to a page, clamped into the score
    pub fn go_to_clamped(&mut self, page: u32) {
        self.current_page = page.clamp(1, self.total_pages);
    }

    /// Go forward one page; returns false on the last page
    pub fn next_page(&mut self) -> bool {
        if self.is_last_page() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Go back one page; returns false on the first page
    pub fn previous_page(&mut self) -> bool {
        if self.is_first_page() {
            return false;
        }
        self.current_page -= 1;
        true
    }
}
