/// Distance from the bottom, in CSS pixels, that still counts as "reading the latest".
pub const NEAR_BOTTOM_PX: f64 = 120.0;

/// Scroll geometry of a scrollable element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    pub fn distance_from_bottom(&self) -> f64 {
        (self.max_scroll_top() - self.scroll_top).max(0.0)
    }

    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.distance_from_bottom() <= threshold
    }
}

/// Where to put `scrollTop` after the feed re-renders.
///
/// A reader who was near the bottom follows new messages; anyone scrolled
/// further up keeps their exact position. `force` pins to the bottom
/// regardless (first load of a channel).
pub fn scroll_after_update(
    before: ScrollMetrics,
    after: ScrollMetrics,
    threshold: f64,
    force: bool,
) -> f64 {
    if force || before.is_near_bottom(threshold) {
        after.max_scroll_top()
    } else {
        before.scroll_top.min(after.max_scroll_top())
    }
}

#[cfg(test)]
mod tests {
    use super::{NEAR_BOTTOM_PX, ScrollMetrics, scroll_after_update};

    fn metrics(scroll_top: f64, scroll_height: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height,
            client_height: 400.0,
        }
    }

    #[test]
    fn near_bottom_reader_follows_new_messages() {
        let before = metrics(550.0, 1000.0); // 50px from bottom
        let after = metrics(550.0, 1300.0);
        assert_eq!(scroll_after_update(before, after, NEAR_BOTTOM_PX, false), 900.0);
    }

    #[test]
    fn reader_scrolled_up_keeps_position() {
        let before = metrics(200.0, 1000.0); // 400px from bottom
        let after = metrics(0.0, 1300.0);
        assert_eq!(scroll_after_update(before, after, NEAR_BOTTOM_PX, false), 200.0);
    }

    #[test]
    fn threshold_boundary_counts_as_near() {
        let before = metrics(600.0 - NEAR_BOTTOM_PX, 1000.0);
        assert!(before.is_near_bottom(NEAR_BOTTOM_PX));
        let before = metrics(600.0 - NEAR_BOTTOM_PX - 1.0, 1000.0);
        assert!(!before.is_near_bottom(NEAR_BOTTOM_PX));
    }

    #[test]
    fn forced_update_pins_to_bottom() {
        let before = metrics(0.0, 1000.0);
        let after = metrics(0.0, 1000.0);
        assert_eq!(scroll_after_update(before, after, NEAR_BOTTOM_PX, true), 600.0);
    }

    #[test]
    fn short_content_has_no_scroll_range() {
        let m = metrics(0.0, 100.0);
        assert_eq!(m.max_scroll_top(), 0.0);
        assert!(m.is_near_bottom(0.0));
    }
}
