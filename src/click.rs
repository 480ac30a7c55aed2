/// Tap handling for the terminal-in-browser UI.
///
/// The renderer records which terminal rows act like which key; the DOM
/// mouse handler turns a pixel position into a row and looks the key up.
/// Nothing here touches web_sys, so it is unit tested directly.

/// A row that triggers `key` when tapped.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBinding {
    pub row: u16,
    pub key: char,
}

/// Row bindings published by the last rendered frame.
#[derive(Debug, Default)]
pub struct ClickMap {
    bindings: Vec<RowBinding>,
    pub terminal_rows: u16,
}

impl ClickMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame's bindings.
    pub fn begin_frame(&mut self, terminal_rows: u16) {
        self.bindings.clear();
        self.terminal_rows = terminal_rows;
    }

    pub fn bind(&mut self, row: u16, key: char) {
        self.bindings.push(RowBinding { row, key });
    }

    /// First binding on `row`.
    pub fn key_at(&self, row: u16) -> Option<char> {
        self.bindings.iter().find(|b| b.row == row).map(|b| b.key)
    }

    /// Pixel offset from the grid top to a key, using the current row count.
    pub fn key_at_pixel(&self, click_y: f64, grid_height: f64) -> Option<char> {
        pixel_y_to_row(click_y, grid_height, self.terminal_rows).and_then(|row| self.key_at(row))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Convert a pixel Y offset inside the grid to a terminal row.
///
/// Returns `None` outside the grid or for degenerate geometry.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    let bad_height = grid_height.is_nan() || grid_height <= 0.0;
    let bad_y = click_y.is_nan() || click_y < 0.0;
    if bad_height || bad_y || terminal_rows == 0 {
        return None;
    }
    let cell_height = grid_height / f64::from(terminal_rows);
    let row = (click_y / cell_height) as u16;
    (row < terminal_rows).then_some(row)
}

/// Narrow terminals stack panels instead of placing them side by side.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_from_pixels() {
        // 30 rows at 15px
        assert_eq!(pixel_y_to_row(0.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(14.9, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 450.0, 30), Some(1));
        assert_eq!(pixel_y_to_row(449.0, 450.0, 30), Some(29));
    }

    #[test]
    fn outside_grid_is_none() {
        assert_eq!(pixel_y_to_row(450.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(-1.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 0.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 450.0, 0), None);
        assert_eq!(pixel_y_to_row(f64::NAN, 450.0, 30), None);
    }

    #[test]
    fn bound_rows_resolve_to_keys() {
        let mut map = ClickMap::new();
        map.begin_frame(30);
        map.bind(4, 'c');
        map.bind(11, '1');
        assert_eq!(map.key_at(4), Some('c'));
        assert_eq!(map.key_at(11), Some('1'));
        assert_eq!(map.key_at(13), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn first_binding_wins() {
        let mut map = ClickMap::new();
        map.bind(2, 'b');
        map.bind(2, 'x');
        assert_eq!(map.key_at(2), Some('b'));
    }

    #[test]
    fn begin_frame_clears() {
        let mut map = ClickMap::new();
        map.begin_frame(20);
        map.bind(1, 'u');
        map.begin_frame(24);
        assert!(map.is_empty());
        assert_eq!(map.terminal_rows, 24);
    }

    #[test]
    fn tap_pipeline() {
        let mut map = ClickMap::new();
        map.begin_frame(40);
        map.bind(6, 'c');
        map.bind(21, 'b');
        let grid_height = 40.0 * 15.0;
        // centre of row 6
        assert_eq!(map.key_at_pixel(6.0 * 15.0 + 7.5, grid_height), Some('c'));
        assert_eq!(map.key_at_pixel(21.0 * 15.0 + 1.0, grid_height), Some('b'));
        assert_eq!(map.key_at_pixel(30.0 * 15.0, grid_height), None);
    }

    #[test]
    fn narrow_threshold() {
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
    }
}
