//! Chart row geometry
//!
//! The renderer lays task and resource rows out as horizontal bands that
//! span the full image width, starting below a fixed header. The offsets
//! here are part of the renderer contract, not derived from the image.

/// Row band layout of a rendered chart image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowGeometry {
    /// Pixel offset of the first row from the top of the image
    pub offset_y: u32,

    /// Pixel height of one row band
    pub row_height: u32,
}

/// The renderer's known layout.
pub const CHART_GEOMETRY: RowGeometry = RowGeometry {
    offset_y: 50,
    row_height: 20,
};

impl RowGeometry {
    /// Maps a vertical pixel position to a row number:
    /// `(y - offset_y) / row_height`, so a position at an exact band
    /// multiple already belongs to the next row. Positions above the first
    /// band map to no row. The horizontal position plays no part; rows
    /// span the full width.
    pub fn row_at(&self, y: u32) -> Option<u32> {
        if y < self.offset_y || self.row_height == 0 {
            return None;
        }
        Some((y - self.offset_y) / self.row_height)
    }

    /// Pixel y at the vertical center of a row band, for synthesizing
    /// coordinates from row-oriented front ends.
    pub fn row_center_y(&self, row: u32) -> u32 {
        self.offset_y + row * self.row_height + self.row_height / 2
    }
}
