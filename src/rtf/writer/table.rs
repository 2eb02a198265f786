//! Row definitions for `Table` elements.
//!
//! Cell geometry is only complete once a row has been read, while RTF wants
//! `\trowd ... \cellxN` before the cell contents. The writer remembers where
//! each row starts and inserts the definition there when the row ends.

use super::output::RtfOutput;
use crate::rtf::border::{Border, BorderSide, Borders, Shading};
use crate::rtf::table::{CellDef, CellWidth, MergeFlags, WidthType};

/// Span and borders of a `TableCell`, as read from its attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellSpec {
    pub column_span: usize,
    pub row_span: usize,
    pub borders: Borders,
    pub shading: Shading,
}

/// Vertical merge still covering a column: rows left and columns spanned.
#[derive(Debug, Clone, Copy)]
struct Covered {
    rows: usize,
    span: usize,
}

#[derive(Debug, Default)]
struct RowState {
    /// Offset of the row definition in the output
    offset: usize,
    column: usize,
    cells: Vec<CellDef>,
}

#[derive(Debug)]
pub struct TableState {
    /// Column widths in twips
    columns: Vec<i32>,
    /// Half the cell spacing in twips (`\trgaphN`)
    gap: i32,
    default_width: i32,
    covered: Vec<Option<Covered>>,
    row: Option<RowState>,
}

impl TableState {
    pub fn new(gap: i32, default_width: i32) -> Self {
        Self {
            columns: Vec::new(),
            gap,
            default_width,
            covered: Vec::new(),
            row: None,
        }
    }

    pub fn add_column(&mut self, width: Option<i32>) {
        self.columns.push(width.unwrap_or(self.default_width));
    }

    /// Right edge of `column` in twips.
    fn edge(&self, column: usize) -> i32 {
        (0..=column)
            .map(|c| self.columns.get(c).copied().unwrap_or(self.default_width))
            .fold(0i32, |sum, width| sum.saturating_add(width))
    }

    pub fn start_row(&mut self, offset: usize) {
        self.row = Some(RowState {
            offset,
            ..Default::default()
        });
    }

    #[inline]
    pub fn in_row(&self) -> bool {
        self.row.is_some()
    }

    /// Take the next cell of the current row if a vertical merge from an
    /// earlier row covers it. The caller writes an empty cell for it.
    pub fn take_covered(&mut self) -> bool {
        let Some(column) = self.row.as_ref().map(|r| r.column) else {
            return false;
        };
        let Some(Some(covered)) = self.covered.get(column).copied() else {
            return false;
        };
        self.covered[column] = (covered.rows > 1).then_some(Covered {
            rows: covered.rows - 1,
            ..covered
        });
        let cell = self.cell_def(column, covered.span, MergeFlags::VERTICAL, Default::default());
        if let Some(row) = self.row.as_mut() {
            row.cells.push(cell);
            row.column += covered.span;
        }
        true
    }

    /// Whether columns after the current one are still covered.
    pub fn has_trailing_covered(&self) -> bool {
        self.row.as_ref().is_some_and(|row| {
            self.covered
                .iter()
                .skip(row.column)
                .any(Option::is_some)
        })
    }

    /// Skip an uncovered column at the end of a row.
    pub fn skip_column(&mut self) {
        if let Some(row) = self.row.as_mut() {
            row.column += 1;
        }
    }

    pub fn start_cell(&mut self, spec: &CellSpec) {
        let Some(column) = self.row.as_ref().map(|r| r.column) else {
            return;
        };
        let span = spec.column_span.max(1);
        let mut merge = MergeFlags::empty();
        if spec.row_span > 1 {
            merge |= MergeFlags::VERTICAL_FIRST;
            if self.covered.len() <= column {
                self.covered.resize(column + 1, None);
            }
            self.covered[column] = Some(Covered {
                rows: spec.row_span - 1,
                span,
            });
        }
        let mut cell = self.cell_def(column, span, merge, spec.borders);
        cell.shading = spec.shading;
        if let Some(row) = self.row.as_mut() {
            row.cells.push(cell);
            row.column += span;
        }
    }

    fn cell_def(&self, column: usize, span: usize, merge: MergeFlags, borders: Borders) -> CellDef {
        let left = if column == 0 { 0 } else { self.edge(column - 1) };
        let right_edge = self.edge(column + span - 1);
        CellDef {
            right_edge,
            merge,
            borders,
            shading: Shading::default(),
            width: CellWidth::new(WidthType::Twips, right_edge.saturating_sub(left)),
        }
    }

    /// Finish the row: insert its definition at the remembered offset.
    pub fn end_row(&mut self, out: &mut RtfOutput) {
        let Some(row) = self.row.take() else {
            return;
        };
        let mut def = RtfOutput::new(encoding_rs::WINDOWS_1252);
        def.control_word("trowd", None);
        if self.gap > 0 {
            def.control_word("trgaph", Some(self.gap));
        }
        def.control_word("trleft", Some(0));
        for cell in &row.cells {
            write_cell_def(&mut def, cell);
        }
        out.insert(row.offset, def.as_str());
    }
}

const CELL_BORDER_WORDS: [(BorderSide, &str); 4] = [
    (BorderSide::Top, "clbrdrt"),
    (BorderSide::Left, "clbrdrl"),
    (BorderSide::Bottom, "clbrdrb"),
    (BorderSide::Right, "clbrdrr"),
];

fn write_cell_def(out: &mut RtfOutput, cell: &CellDef) {
    if cell.merge.contains(MergeFlags::VERTICAL_FIRST) {
        out.control_word("clvmgf", None);
    }
    if cell.merge.contains(MergeFlags::VERTICAL) {
        out.control_word("clvmrg", None);
    }
    for (side, word) in CELL_BORDER_WORDS {
        let border = cell.borders.side(side);
        if border.is_visible() {
            out.control_word(word, None);
            write_border(out, border);
        }
    }
    if let Some(back) = cell.shading.back {
        out.control_word("clcbpat", Some(back as i32));
    }
    out.control_word("clftsWidth", Some(cell.width.width_type.parameter()));
    out.control_word("clwWidth", Some(cell.width.value));
    out.control_word("cellx", Some(cell.right_edge));
}

/// Style, width and color of one border side.
pub fn write_border(out: &mut RtfOutput, border: &Border) {
    out.control_word(border.style.control_word(), None);
    out.control_word("brdrw", Some(border.width));
    if let Some(color) = border.color_ref {
        out.control_word("brdrcf", Some(color as i32));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtf::border::BorderStyle;

    fn table() -> TableState {
        let mut table = TableState::new(0, 2880);
        table.add_column(Some(1440));
        table.add_column(Some(2880));
        table
    }

    fn spec(column_span: usize, row_span: usize) -> CellSpec {
        CellSpec {
            column_span,
            row_span,
            ..Default::default()
        }
    }

    fn row_definition(table: &mut TableState) -> String {
        let mut out = RtfOutput::new(encoding_rs::WINDOWS_1252);
        table.end_row(&mut out);
        out.into_string()
    }

    #[test]
    fn test_row_definition() {
        let mut table = table();
        table.start_row(0);
        assert!(table.in_row());
        table.start_cell(&spec(1, 1));
        table.start_cell(&spec(1, 1));
        // Third cell falls back to the default width
        table.start_cell(&spec(1, 1));
        assert_eq!(
            row_definition(&mut table),
            "\\trowd\\trleft0\\clftsWidth3\\clwWidth1440\\cellx1440\
             \\clftsWidth3\\clwWidth2880\\cellx4320\
             \\clftsWidth3\\clwWidth2880\\cellx7200"
        );
        assert!(!table.in_row());
    }

    #[test]
    fn test_column_span_and_gap() {
        let mut table = TableState::new(54, 2880);
        table.add_column(Some(1440));
        table.add_column(None);
        table.start_row(0);
        table.start_cell(&spec(2, 1));
        assert_eq!(
            row_definition(&mut table),
            "\\trowd\\trgaph54\\trleft0\\clftsWidth3\\clwWidth4320\\cellx4320"
        );
    }

    #[test]
    fn test_vertical_merge() {
        let mut table = table();
        table.start_row(0);
        table.start_cell(&spec(1, 3));
        table.start_cell(&spec(1, 1));
        assert!(row_definition(&mut table).contains("\\clvmgf\\clftsWidth3\\clwWidth1440\\cellx1440"));

        for _ in 0..2 {
            table.start_row(0);
            assert!(table.take_covered());
            assert!(!table.take_covered());
            table.start_cell(&spec(1, 1));
            assert!(row_definition(&mut table).starts_with(
                "\\trowd\\trleft0\\clvmrg\\clftsWidth3\\clwWidth1440\\cellx1440\\clftsWidth3"
            ));
        }

        table.start_row(0);
        assert!(!table.take_covered());
        assert!(!table.has_trailing_covered());
    }

    #[test]
    fn test_trailing_covered_cells() {
        let mut table = table();
        table.start_row(0);
        table.start_cell(&spec(1, 1));
        table.start_cell(&spec(1, 2));
        row_definition(&mut table);

        table.start_row(0);
        table.start_cell(&spec(1, 1));
        assert!(table.has_trailing_covered());
        assert!(table.take_covered());
        assert!(!table.has_trailing_covered());
        assert!(row_definition(&mut table).ends_with("\\clvmrg\\clftsWidth3\\clwWidth2880\\cellx4320"));
    }

    #[test]
    fn test_cell_borders_and_shading() {
        let mut table = table();
        let border = Border {
            style: BorderStyle::Single,
            width: 30,
            color_ref: Some(2),
        };
        let mut cell = spec(1, 1);
        cell.borders = Borders::all(border);
        cell.shading.back = Some(1);
        table.start_row(0);
        table.start_cell(&cell);
        let def = row_definition(&mut table);
        assert!(def.contains("\\clbrdrt\\brdrs\\brdrw30\\brdrcf2\\clbrdrl\\brdrs"));
        assert!(def.contains("\\clcbpat1\\clftsWidth3"));
    }

    #[test]
    fn test_edges_saturate() {
        let mut table = TableState::new(0, 2880);
        table.add_column(Some(i32::MAX));
        table.add_column(Some(i32::MAX));
        table.start_row(0);
        table.start_cell(&spec(1, 1));
        table.start_cell(&spec(1, 1));
        table.start_cell(&spec(63, 1));
        let def = row_definition(&mut table);
        assert!(def.contains(&format!("\\clwWidth{}\\cellx{}", i32::MAX, i32::MAX)));
        assert!(def.ends_with(&format!("\\clwWidth0\\cellx{}", i32::MAX)));
    }
}
