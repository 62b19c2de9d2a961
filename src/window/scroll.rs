//! Viewport detection from rendered list geometry.

/// Geometry of the rendered page list, as reported by the rendering layer
/// on scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollEvent {
    /// Scroll offset of the list.
    pub scroll_top: f64,
    /// Visible height of the list.
    pub client_height: f64,
    /// Top offset of each rendered page element, in window order.
    pub page_offsets: Vec<f64>,
}

impl ScrollEvent {
    pub fn new(scroll_top: f64, client_height: f64, page_offsets: Vec<f64>) -> Self {
        Self {
            scroll_top,
            client_height,
            page_offsets,
        }
    }

    /// Builds the event for a list of equally tall pages.
    pub fn uniform(scroll_top: f64, client_height: f64, page_height: f64, page_count: usize) -> Self {
        let page_offsets = (0..page_count).map(|i| i as f64 * page_height).collect();
        Self::new(scroll_top, client_height, page_offsets)
    }

    /// Returns the window indices of the top and bottom visible pages,
    /// considering at most `page_count` elements.
    pub fn visible_indices(&self, page_count: usize) -> Option<(usize, usize)> {
        let count = page_count.min(self.page_offsets.len());
        if count == 0 {
            return None;
        }
        let top = self.boundary_index(self.scroll_top, count);
        let bottom = self.boundary_index(self.scroll_top + self.client_height, count);
        Some((top, bottom.max(top)))
    }

    /// The element straddling `boundary`: the one before the first element
    /// whose top edge lies below it. When no element starts below the
    /// boundary the list is scrolled to its end and the last one is used.
    /// This holds for the top boundary too: it never falls back to the first
    /// element, so a list scrolled to its end reports only its tail.
    fn boundary_index(&self, boundary: f64, count: usize) -> usize {
        match self.page_offsets[..count].iter().position(|&top| top > boundary) {
            Some(0) => 0,
            Some(i) => i - 1,
            None => count - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_indices_mid_list() {
        // Pages 100 tall, viewport shows 250..450.
        let event = ScrollEvent::uniform(250.0, 200.0, 100.0, 10);
        assert_eq!(event.visible_indices(10), Some((2, 4)));
    }

    #[test]
    fn test_visible_indices_at_edges() {
        let event = ScrollEvent::uniform(0.0, 150.0, 100.0, 10);
        assert_eq!(event.visible_indices(10), Some((0, 1)));

        let event = ScrollEvent::uniform(950.0, 150.0, 100.0, 10);
        assert_eq!(event.visible_indices(10), Some((9, 9)));
    }

    #[test]
    fn test_scrolled_past_last_page_start_pins_both_bounds_to_it() {
        // Both boundaries lie beyond the top of the last page.
        let event = ScrollEvent::uniform(1950.0, 300.0, 200.0, 10);
        assert_eq!(event.visible_indices(10), Some((9, 9)));

        // Only the bottom boundary does; the top still tracks its page.
        let event = ScrollEvent::uniform(1650.0, 300.0, 200.0, 10);
        assert_eq!(event.visible_indices(10), Some((8, 9)));
    }

    #[test]
    fn test_visible_indices_clamped_to_window() {
        let event = ScrollEvent::uniform(250.0, 200.0, 100.0, 10);
        assert_eq!(event.visible_indices(3), Some((2, 2)));
        assert_eq!(event.visible_indices(0), None);
        assert_eq!(ScrollEvent::new(0.0, 100.0, vec![]).visible_indices(5), None);
    }
}
