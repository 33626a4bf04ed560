//! Mapping between a scroll offset and a slide index.
//!
//! The deck is laid out as one tall scrollable column. The slide whose
//! fraction of the column is nearest the current offset is the active one.

/// Scroll progress through the column, in `[0, 1]`.
///
/// `scrollable_height` is the content height minus the viewport height. A
/// column that cannot scroll has progress `0`.
pub fn scroll_progress(scroll_top: f64, scrollable_height: f64) -> f64 {
    if !scroll_top.is_finite() || !scrollable_height.is_finite() || scrollable_height <= 0.0 {
        return 0.0;
    }
    (scroll_top / scrollable_height).clamp(0.0, 1.0)
}

/// The slide index for a scroll offset.
///
/// Returns `0` for an empty deck and never exceeds `slide_count - 1`.
///
/// ```
/// use horizon_overture::scroll::map_scroll_offset_to_index;
///
/// assert_eq!(map_scroll_offset_to_index(0.0, 1000.0, 5), 0);
/// assert_eq!(map_scroll_offset_to_index(500.0, 1000.0, 5), 2);
/// assert_eq!(map_scroll_offset_to_index(1000.0, 1000.0, 5), 4);
/// ```
pub fn map_scroll_offset_to_index(scroll_top: f64, scrollable_height: f64, slide_count: usize) -> usize {
    if slide_count == 0 {
        return 0;
    }
    let last = slide_count - 1;
    let progress = scroll_progress(scroll_top, scrollable_height);
    let index = (progress * last as f64).round() as usize;
    index.min(last)
}

/// The scroll offset that shows slide `index`.
///
/// The inverse of [`map_scroll_offset_to_index`]. Out-of-range indices are
/// clamped to the last slide.
pub fn scroll_offset_for_index(index: usize, scrollable_height: f64, slide_count: usize) -> f64 {
    if slide_count <= 1 || !scrollable_height.is_finite() || scrollable_height <= 0.0 {
        return 0.0;
    }
    let last = slide_count - 1;
    index.min(last) as f64 / last as f64 * scrollable_height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_guards() {
        assert_eq!(scroll_progress(100.0, 0.0), 0.0);
        assert_eq!(scroll_progress(100.0, -5.0), 0.0);
        assert_eq!(scroll_progress(f64::NAN, 100.0), 0.0);
        assert_eq!(scroll_progress(-20.0, 100.0), 0.0);
        assert_eq!(scroll_progress(150.0, 100.0), 1.0);
        assert_eq!(scroll_progress(25.0, 100.0), 0.25);
    }

    #[test]
    fn test_index_rounds_to_nearest() {
        // 8 slides, 7 gaps of 100 px each
        assert_eq!(map_scroll_offset_to_index(0.0, 700.0, 8), 0);
        assert_eq!(map_scroll_offset_to_index(49.0, 700.0, 8), 0);
        assert_eq!(map_scroll_offset_to_index(51.0, 700.0, 8), 1);
        assert_eq!(map_scroll_offset_to_index(349.0, 700.0, 8), 3);
        assert_eq!(map_scroll_offset_to_index(700.0, 700.0, 8), 7);
    }

    #[test]
    fn test_index_edge_cases() {
        assert_eq!(map_scroll_offset_to_index(300.0, 700.0, 0), 0);
        assert_eq!(map_scroll_offset_to_index(300.0, 700.0, 1), 0);
        assert_eq!(map_scroll_offset_to_index(300.0, 0.0, 8), 0);
        assert_eq!(map_scroll_offset_to_index(9000.0, 700.0, 8), 7);
        assert_eq!(map_scroll_offset_to_index(-10.0, 700.0, 8), 0);
    }

    #[test]
    fn test_offset_inverts_index() {
        let height = 1234.0;
        for count in 1..10 {
            for index in 0..count {
                let offset = scroll_offset_for_index(index, height, count);
                assert_eq!(map_scroll_offset_to_index(offset, height, count), index);
            }
        }
        assert_eq!(scroll_offset_for_index(12, 700.0, 8), 700.0);
        assert_eq!(scroll_offset_for_index(3, 0.0, 8), 0.0);
    }
}
