//! Row context menu placement.

use serde::Serialize;

pub const CURSOR_OFFSET: i64 = 4;
pub const MENU_WIDTH: i64 = 180;
pub const MENU_HEIGHT: i64 = 150;

/// Open menu for one absolute row, positioned in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextMenu {
    pub abs_row: usize,
    pub top: i64,
    pub left: i64,
}

impl ContextMenu {
    /// Anchor just below-right of the cursor, kept inside the viewport.
    pub fn open(abs_row: usize, client_x: i64, client_y: i64, viewport_w: i64, viewport_h: i64) -> Self {
        let top = client_y
            .saturating_add(CURSOR_OFFSET)
            .min(viewport_h.saturating_sub(MENU_HEIGHT))
            .max(0);
        let left = client_x
            .saturating_add(CURSOR_OFFSET)
            .min(viewport_w.saturating_sub(MENU_WIDTH))
            .max(0);
        Self { abs_row, top, left }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_from_cursor() {
        let m = ContextMenu::open(7, 100, 200, 1280, 800);
        assert_eq!((m.abs_row, m.left, m.top), (7, 104, 204));
    }

    #[test]
    fn test_extreme_coordinates_saturate() {
        let m = ContextMenu::open(0, i64::MAX, i64::MAX, i64::MAX, i64::MAX);
        assert_eq!((m.left, m.top), (i64::MAX - MENU_WIDTH, i64::MAX - MENU_HEIGHT));
        let m = ContextMenu::open(0, i64::MIN, i64::MIN, i64::MIN, i64::MIN);
        assert_eq!((m.left, m.top), (0, 0));
    }

    #[test]
    fn test_clamped_to_viewport() {
        let m = ContextMenu::open(0, 1270, 790, 1280, 800);
        assert_eq!((m.left, m.top), (1100, 650));
    }

    #[test]
    fn test_tiny_viewport_never_negative() {
        let m = ContextMenu::open(0, 50, 50, 100, 100);
        assert_eq!((m.left, m.top), (0, 0));
    }
}
