use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Decides which roster rows are laid out for a given scroll position.
/// Every row is one terminal line high.
pub trait RowWindowing {
    fn window(&self, total: usize, scroll: usize, viewport_rows: usize) -> Range<usize>;
}

/// Lays out the whole roster.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullRoster;

impl RowWindowing for FullRoster {
    fn window(&self, total: usize, _scroll: usize, _viewport_rows: usize) -> Range<usize> {
        0..total
    }
}

/// Lays out only the rows on screen plus `buffer` rows on either side.
#[derive(Debug, Clone, Copy)]
pub struct Virtualized {
    pub buffer: usize,
}

impl RowWindowing for Virtualized {
    fn window(&self, total: usize, scroll: usize, viewport_rows: usize) -> Range<usize> {
        let scroll = scroll.min(total);
        let start = scroll.saturating_sub(self.buffer);
        let end = scroll
            .saturating_add(viewport_rows)
            .saturating_add(self.buffer)
            .min(total);
        start..end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowingMode {
    #[default]
    Auto,
    Full,
    Virtualized,
}

impl WindowingMode {
    /// Parses the argument of `:virtual`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "off" | "full" => Some(Self::Full),
            "on" | "virtualized" => Some(Self::Virtualized),
            _ => None,
        }
    }

    pub fn is_virtualized(&self, total: usize, threshold: usize) -> bool {
        match self {
            Self::Auto => total >= threshold,
            Self::Full => false,
            Self::Virtualized => true,
        }
    }

    pub fn strategy(&self, total: usize, threshold: usize, buffer: usize) -> Box<dyn RowWindowing> {
        if self.is_virtualized(total, threshold) {
            Box::new(Virtualized { buffer })
        } else {
            Box::new(FullRoster)
        }
    }
}

/// Scroll offsets and visible extent of the grid, in rows and day columns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_row: usize,
    pub scroll_day: usize,
    pub rows: usize,
    pub days: usize,
}

impl Viewport {
    pub fn visible_rows(&self) -> Range<usize> {
        self.scroll_row..self.scroll_row + self.rows
    }

    pub fn visible_days(&self) -> Range<usize> {
        self.scroll_day..self.scroll_day + self.days
    }

    /// Scrolls the minimum needed to keep the cursor on screen.
    pub fn follow(&mut self, cursor_row: usize, cursor_day: usize) {
        self.scroll_row = follow_axis(self.scroll_row, self.rows, cursor_row);
        self.scroll_day = follow_axis(self.scroll_day, self.days, cursor_day);
    }

    pub fn scroll_rows_by(&mut self, delta: isize, total_rows: usize) {
        let max_scroll = total_rows.saturating_sub(self.rows.max(1));
        self.scroll_row = self.scroll_row.saturating_add_signed(delta).min(max_scroll);
    }
}

fn follow_axis(scroll: usize, extent: usize, cursor: usize) -> usize {
    if extent == 0 {
        return cursor;
    }
    if cursor < scroll {
        cursor
    } else if cursor >= scroll + extent {
        cursor + 1 - extent
    } else {
        scroll
    }
}
