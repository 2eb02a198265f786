//! RTF table row and cell definitions.
//!
//! RTF tables have no table object: each row repeats its definition
//! (`\trowd ... \cellxN`) before or after the cell contents. The reader
//! collects definitions in a [`RowFormat`] and pairs them with the cells
//! closed by `\cell` when `\row` arrives.

use super::border::{Borders, Shading};
use bitflags::bitflags;
use smallvec::SmallVec;

/// Largest cell width in twips (22 inches).
pub const MAX_CELL_TWIPS: i32 = 31_680;
/// Percent widths are in fiftieths of a percent.
pub const MAX_CELL_FIFTIETHS: i32 = 5_000;

/// Unit of a [`CellWidth`] (`\clftsWidthN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthType {
    /// No preferred width
    #[default]
    Nil,
    /// Determined by content
    Auto,
    /// Fiftieths of a percent of the table width
    Percent,
    /// Twips
    Twips,
}

impl WidthType {
    pub fn from_parameter(value: i32) -> WidthType {
        match value {
            1 => WidthType::Auto,
            2 => WidthType::Percent,
            3 => WidthType::Twips,
            _ => WidthType::Nil,
        }
    }

    pub fn parameter(self) -> i32 {
        match self {
            WidthType::Nil => 0,
            WidthType::Auto => 1,
            WidthType::Percent => 2,
            WidthType::Twips => 3,
        }
    }
}

/// Preferred width of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellWidth {
    pub width_type: WidthType,
    pub value: i32,
}

impl CellWidth {
    #[inline]
    pub fn new(width_type: WidthType, value: i32) -> Self {
        Self { width_type, value }.clamped()
    }

    /// Bound the value to the range of its unit.
    #[inline]
    pub fn clamped(self) -> Self {
        let value = match self.width_type {
            WidthType::Nil | WidthType::Auto => 0,
            WidthType::Percent => self.value.clamp(0, MAX_CELL_FIFTIETHS),
            WidthType::Twips => self.value.clamp(0, MAX_CELL_TWIPS),
        };
        Self { value, ..self }
    }

    /// Width in twips, if it is fixed.
    #[inline]
    pub fn twips(&self) -> Option<i32> {
        (self.width_type == WidthType::Twips && self.value > 0).then_some(self.value)
    }
}

bitflags! {
    /// Cell merge flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MergeFlags: u8 {
        /// First cell of a horizontal merge (`\clmgf`)
        const HORIZONTAL_FIRST = 0x01;
        /// Continuation of a horizontal merge (`\clmrg`)
        const HORIZONTAL = 0x02;
        /// First cell of a vertical merge (`\clvmgf`)
        const VERTICAL_FIRST = 0x04;
        /// Continuation of a vertical merge (`\clvmrg`)
        const VERTICAL = 0x08;
    }
}

/// Definition of one cell of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellDef {
    /// Right edge in twips relative to the row's left edge (`\cellxN`)
    pub right_edge: i32,
    pub merge: MergeFlags,
    pub borders: Borders,
    pub shading: Shading,
    pub width: CellWidth,
}

/// Row definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFormat {
    /// Left edge of the row (`\trleftN`)
    pub left: i32,
    /// Half the space between cells (`\trgaphN`)
    pub gap: i32,
    /// Defined cells, in order
    pub cells: SmallVec<[CellDef; 8]>,
}

impl RowFormat {
    /// Close the pending cell definition at `right_edge`.
    pub fn push_cell(&mut self, mut cell: CellDef, right_edge: i32) {
        // Right edges must grow monotonically
        let min = self.cells.last().map_or(i32::MIN, |c| c.right_edge.saturating_add(1));
        cell.right_edge = right_edge.max(min);
        self.cells.push(cell);
    }

    /// Left edge of cell `index` in twips.
    #[inline]
    pub fn left_edge(&self, index: usize) -> i32 {
        match index {
            0 => self.left,
            _ => self.cells.get(index - 1).map_or(self.left, |c| c.right_edge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_width_clamp() {
        assert_eq!(CellWidth::new(WidthType::Twips, 100_000).value, MAX_CELL_TWIPS);
        assert_eq!(CellWidth::new(WidthType::Percent, -5).value, 0);
        assert_eq!(CellWidth::new(WidthType::Auto, 300).twips(), None);
        assert_eq!(CellWidth::new(WidthType::Twips, 1440).twips(), Some(1440));
    }

    #[test]
    fn test_row_edges() {
        let mut row = RowFormat {
            left: 100,
            ..Default::default()
        };
        row.push_cell(CellDef::default(), 2000);
        row.push_cell(CellDef::default(), 1500);
        assert_eq!(row.left_edge(0), 100);
        assert_eq!(row.left_edge(1), 2000);
        assert_eq!(row.cells[1].right_edge, 2001);
    }
}
