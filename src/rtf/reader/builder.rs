//! Assembly of the flow-document tree.
//!
//! The reader hands over resolved formatting and content in document order;
//! the builder groups runs into paragraphs, list paragraphs into nested
//! `List`/`ListItem` elements and cell paragraphs into tables.

use crate::common::unit::{fmt_num, twips_to_px};
use crate::rtf::format::{Alignment, VerticalAlign};
use crate::rtf::list::MarkerStyle;
use crate::rtf::table::MergeFlags;
use crate::rtf::types::Color;
use crate::xaml::properties::{Decorations, Thickness};
use crate::xaml::{Element, PRESENTATION_NAMESPACE};

/// Character properties of a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunProps {
    pub font_family: Option<String>,
    /// Size in pixels
    pub font_size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub decorations: Decorations,
    pub baseline: VerticalAlign,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    /// `xml:lang` tag
    pub language: Option<String>,
}

impl RunProps {
    fn apply(&self, element: &mut Element) {
        if let Some(family) = &self.font_family {
            element.set_attr("FontFamily", family.as_str());
        }
        if let Some(size) = self.font_size {
            element.set_attr("FontSize", fmt_num(size));
        }
        if self.bold {
            element.set_attr("FontWeight", "Bold");
        }
        if self.italic {
            element.set_attr("FontStyle", "Italic");
        }
        if let Some(decorations) = self.decorations.to_xaml() {
            element.set_attr("TextDecorations", decorations);
        }
        if let Some(color) = self.foreground {
            element.set_attr("Foreground", color.to_argb());
        }
        if let Some(color) = self.background {
            element.set_attr("Background", color.to_argb());
        }
        if self.baseline != VerticalAlign::Baseline {
            element.set_attr("BaselineAlignment", self.baseline.as_str());
        }
        if let Some(language) = &self.language {
            element.set_attr("xml:lang", language.as_str());
        }
    }
}

/// Border and background of a paragraph or cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxProps {
    pub border_thickness: Option<Thickness>,
    pub border_brush: Option<Color>,
    pub background: Option<Color>,
}

impl BoxProps {
    fn apply(&self, element: &mut Element) {
        if let Some(thickness) = self.border_thickness {
            element.set_attr("BorderThickness", thickness.to_xaml());
        }
        if let Some(color) = self.border_brush {
            element.set_attr("BorderBrush", color.to_argb());
        }
        if let Some(color) = self.background {
            element.set_attr("Background", color.to_argb());
        }
    }
}

/// Paragraph properties, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParagraphProps {
    pub alignment: Alignment,
    pub margin: Thickness,
    pub text_indent: f64,
    pub line_height: Option<f64>,
    pub frame: BoxProps,
}

impl ParagraphProps {
    fn apply(&self, element: &mut Element) {
        if self.alignment != Alignment::Left {
            element.set_attr("TextAlignment", self.alignment.as_str());
        }
        if !self.margin.is_zero() {
            element.set_attr("Margin", self.margin.to_xaml());
        }
        if self.text_indent != 0.0 {
            element.set_attr("TextIndent", fmt_num(self.text_indent));
        }
        if let Some(height) = self.line_height {
            element.set_attr("LineHeight", fmt_num(height));
        }
        self.frame.apply(element);
    }
}

/// Where a list paragraph goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPlacement {
    /// Override index (`\lsN`)
    pub ls: i32,
    pub level: u8,
    pub marker: MarkerStyle,
    pub start: i32,
}

/// Geometry and look of one cell of a row, in twips.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellGeometry {
    pub right_edge: i32,
    pub merge: MergeFlags,
    pub frame: BoxProps,
}

/// Definition of a completed row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowDef {
    pub left: i32,
    pub gap: i32,
    pub cells: Vec<CellGeometry>,
    /// Preferred width (`\clwWidthN`) of cells that have no `\cellx`
    pub fallback_width: Option<i32>,
}

struct OpenList {
    ls: i32,
    level: u8,
    element: Element,
}

/// Blocks of the document body or of one table cell.
#[derive(Default)]
struct BlockContainer {
    blocks: Vec<Element>,
    lists: Vec<OpenList>,
}

impl BlockContainer {
    fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.lists.is_empty()
    }

    fn push_block(&mut self, block: Element) {
        self.close_lists();
        self.blocks.push(block);
    }

    fn push_list_paragraph(&mut self, paragraph: Element, placement: &ListPlacement) {
        while let Some(top) = self.lists.last() {
            if top.level > placement.level {
                self.pop_list();
            } else {
                if top.level == placement.level && top.ls != placement.ls {
                    self.pop_list();
                }
                break;
            }
        }
        if self.lists.last().is_none_or(|top| top.level != placement.level) {
            let mut list = Element::new("List").with_attr("MarkerStyle", placement.marker.as_str());
            if placement.start != 1 {
                list.set_attr("StartIndex", placement.start.to_string());
            }
            self.lists.push(OpenList {
                ls: placement.ls,
                level: placement.level,
                element: list,
            });
        }
        let mut item = Element::new("ListItem");
        item.push(paragraph);
        if let Some(top) = self.lists.last_mut() {
            top.element.push(item);
        }
    }

    fn pop_list(&mut self) {
        let Some(open) = self.lists.pop() else {
            return;
        };
        match self.lists.last_mut() {
            Some(parent) => match parent.element.last_element_mut() {
                Some(item) => item.push(open.element),
                None => {
                    let mut item = Element::new("ListItem");
                    item.push(open.element);
                    parent.element.push(item);
                },
            },
            None => self.blocks.push(open.element),
        }
    }

    fn close_lists(&mut self) {
        while !self.lists.is_empty() {
            self.pop_list();
        }
    }

    fn finish(mut self) -> Vec<Element> {
        self.close_lists();
        self.blocks
    }
}

/// Cell of a row while the table is assembled.
struct CellOut {
    column_span: usize,
    row_span: usize,
    frame: BoxProps,
    blocks: Vec<Element>,
}

#[derive(Default)]
struct TableBuilder {
    rows: Vec<(RowDef, Vec<Vec<Element>>)>,
    row_cells: Vec<Vec<Element>>,
    cell: BlockContainer,
}

impl TableBuilder {
    fn end_cell(&mut self) {
        let cell = std::mem::take(&mut self.cell);
        self.row_cells.push(cell.finish());
    }

    fn end_row(&mut self, def: RowDef) {
        if !self.cell.is_empty() {
            self.end_cell();
        }
        let cells = std::mem::take(&mut self.row_cells);
        self.rows.push((def, cells));
    }

    fn build(mut self, default_column_width: i32) -> Element {
        if !self.cell.is_empty() || !self.row_cells.is_empty() {
            self.end_row(RowDef::default());
        }

        // Rows without enough `\cellx` get cells of their preferred or the
        // default width
        for (def, cells) in &mut self.rows {
            let width = def.fallback_width.unwrap_or(default_column_width);
            while def.cells.len() < cells.len() {
                let last = def.cells.last().map_or(def.left, |c| c.right_edge);
                def.cells.push(CellGeometry {
                    right_edge: last.saturating_add(width),
                    ..Default::default()
                });
            }
        }

        let left = self.rows.iter().map(|(def, _)| def.left).min().unwrap_or(0);
        let mut edges: Vec<i32> = self
            .rows
            .iter()
            .flat_map(|(def, _)| def.cells.iter().map(|c| c.right_edge))
            .collect();
        edges.sort_unstable();
        edges.dedup();

        let mut table = Element::new("Table");
        if let Some(gap) = self.rows.first().map(|(def, _)| def.gap).filter(|g| *g > 0) {
            table.set_attr("CellSpacing", fmt_num(twips_to_px(gap.saturating_mul(2))));
        }
        if !edges.is_empty() {
            let mut columns = Element::new("Table.Columns");
            let mut previous = left;
            for edge in &edges {
                let width = edge.saturating_sub(previous).max(0);
                columns.push(
                    Element::new("TableColumn").with_attr("Width", fmt_num(twips_to_px(width))),
                );
                previous = *edge;
            }
            table.push(columns);
        }

        // Origin (row, cell) of an open vertical merge, per column
        let mut vertical: Vec<Option<(usize, usize)>> = vec![None; edges.len()];
        let mut rows_out: Vec<Vec<CellOut>> = Vec::with_capacity(self.rows.len());
        for (row_index, (def, mut cells)) in self.rows.into_iter().enumerate() {
            let mut out: Vec<CellOut> = Vec::with_capacity(def.cells.len());
            for (i, geometry) in def.cells.iter().enumerate() {
                let blocks = if i < cells.len() {
                    std::mem::take(&mut cells[i])
                } else {
                    Vec::new()
                };
                let cell_left = if i == 0 {
                    def.left
                } else {
                    def.cells[i - 1].right_edge
                };
                let first_column = edges.iter().filter(|e| **e <= cell_left).count();
                let span = edges
                    .iter()
                    .filter(|e| **e > cell_left && **e <= geometry.right_edge)
                    .count()
                    .max(1);

                if geometry.merge.contains(MergeFlags::HORIZONTAL)
                    && !geometry.merge.contains(MergeFlags::HORIZONTAL_FIRST)
                    && let Some(previous) = out.last_mut()
                {
                    previous.column_span += span;
                    previous.blocks.extend(blocks);
                    continue;
                }

                if geometry.merge.contains(MergeFlags::VERTICAL)
                    && let Some(Some((origin_row, origin_cell))) = vertical.get(first_column).copied()
                {
                    let origin = if origin_row == row_index {
                        out.get_mut(origin_cell)
                    } else {
                        rows_out
                            .get_mut(origin_row)
                            .and_then(|row| row.get_mut(origin_cell))
                    };
                    if let Some(origin) = origin {
                        origin.row_span += 1;
                        origin.blocks.extend(blocks);
                    }
                    continue;
                }

                let origin = geometry
                    .merge
                    .contains(MergeFlags::VERTICAL_FIRST)
                    .then_some((row_index, out.len()));
                for slot in vertical.iter_mut().skip(first_column).take(span) {
                    *slot = origin;
                }
                out.push(CellOut {
                    column_span: span,
                    row_span: 1,
                    frame: geometry.frame,
                    blocks,
                });
            }
            rows_out.push(out);
        }

        let mut group = Element::new("TableRowGroup");
        for row in rows_out {
            let mut row_element = Element::new("TableRow");
            for cell in row {
                let mut cell_element = Element::new("TableCell");
                if cell.column_span > 1 {
                    cell_element.set_attr("ColumnSpan", cell.column_span.to_string());
                }
                if cell.row_span > 1 {
                    cell_element.set_attr("RowSpan", cell.row_span.to_string());
                }
                cell.frame.apply(&mut cell_element);
                for block in cell.blocks {
                    cell_element.push(block);
                }
                row_element.push(cell_element);
            }
            group.push(row_element);
        }
        table.push(group);
        table
    }
}

/// Incremental builder of the document tree.
pub struct DocumentBuilder {
    body: BlockContainer,
    table: Option<TableBuilder>,
    /// Open inline containers; index 0 is the paragraph in progress
    inline: Vec<Element>,
    /// Navigation targets of the open hyperlinks, innermost last
    links: Vec<String>,
    run: Option<(RunProps, String)>,
    default_column_width: i32,
}

impl DocumentBuilder {
    pub fn new(default_column_width: i32) -> Self {
        Self {
            body: BlockContainer::default(),
            table: None,
            inline: vec![Element::new("Paragraph")],
            links: Vec::new(),
            run: None,
            default_column_width,
        }
    }

    /// Append text with the given properties.
    pub fn text(&mut self, props: &RunProps, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.run {
            Some((current, buffer)) if current == props => buffer.push_str(text),
            _ => {
                self.flush_run();
                self.run = Some((props.clone(), text.to_string()));
            },
        }
    }

    fn flush_run(&mut self) {
        let Some((props, text)) = self.run.take() else {
            return;
        };
        let mut run = Element::new("Run");
        props.apply(&mut run);
        run.push_text(&text);
        self.push_inline(run);
    }

    fn push_inline(&mut self, element: Element) {
        if let Some(top) = self.inline.last_mut() {
            top.push(element);
        }
    }

    pub fn line_break(&mut self) {
        self.flush_run();
        self.push_inline(Element::new("LineBreak"));
    }

    pub fn image(&mut self, uri: &str, width: Option<f64>, height: Option<f64>) {
        self.flush_run();
        let mut image = Element::new("Image").with_attr("Source", uri);
        if let Some(width) = width {
            image.set_attr("Width", fmt_num(width));
        }
        if let Some(height) = height {
            image.set_attr("Height", fmt_num(height));
        }
        let mut container = Element::new("InlineUIContainer");
        container.push(image);
        self.push_inline(container);
    }

    pub fn start_hyperlink(&mut self, uri: &str) {
        self.flush_run();
        self.inline
            .push(Element::new("Hyperlink").with_attr("NavigateUri", uri));
        self.links.push(uri.to_string());
    }

    pub fn end_hyperlink(&mut self) {
        if self.links.pop().is_none() {
            return;
        }
        self.flush_run();
        self.close_inline();
    }

    fn close_inline(&mut self) {
        if self.inline.len() < 2 {
            return;
        }
        if let Some(link) = self.inline.pop()
            && !link.children.is_empty()
        {
            self.push_inline(link);
        }
    }

    /// Whether the paragraph in progress has any content.
    pub fn has_inline_content(&self) -> bool {
        self.run.is_some() || self.inline.iter().any(|e| !e.children.is_empty())
    }

    /// Close the paragraph in progress.
    ///
    /// Hyperlinks still open continue in the next paragraph.
    pub fn end_paragraph(
        &mut self,
        props: &ParagraphProps,
        list: Option<ListPlacement>,
        in_table: bool,
    ) {
        self.flush_run();
        for _ in 0..self.links.len() {
            self.close_inline();
        }
        let mut paragraph = std::mem::replace(&mut self.inline[0], Element::new("Paragraph"));
        self.inline.truncate(1);
        for uri in &self.links {
            self.inline
                .push(Element::new("Hyperlink").with_attr("NavigateUri", uri.as_str()));
        }
        props.apply(&mut paragraph);

        let container = if in_table {
            &mut self.table.get_or_insert_with(TableBuilder::default).cell
        } else {
            self.close_table();
            &mut self.body
        };
        match list {
            Some(placement) => container.push_list_paragraph(paragraph, &placement),
            None => container.push_block(paragraph),
        }
    }

    /// `\cell`: close the current table cell.
    pub fn end_cell(&mut self) {
        self.table.get_or_insert_with(TableBuilder::default).end_cell();
    }

    /// `\row`: close the current row.
    pub fn end_row(&mut self, def: RowDef) {
        self.table.get_or_insert_with(TableBuilder::default).end_row(def);
    }

    /// Whether a table is being assembled.
    pub fn in_table(&self) -> bool {
        self.table.is_some()
    }

    fn close_table(&mut self) {
        if let Some(table) = self.table.take() {
            let element = table.build(self.default_column_width);
            self.body.push_block(element);
        }
    }

    /// Complete the document and return its root.
    pub fn finish(mut self) -> Element {
        self.close_table();
        let mut root = Element::new("Section")
            .with_attr("xmlns", PRESENTATION_NAMESPACE)
            .with_attr("xml:space", "preserve");
        for block in self.body.finish() {
            root.push(block);
        }
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(builder: &mut DocumentBuilder, text: &str) {
        builder.text(&RunProps::default(), text);
    }

    fn bullet(ls: i32, level: u8) -> Option<ListPlacement> {
        Some(ListPlacement {
            ls,
            level,
            marker: MarkerStyle::Disc,
            start: 1,
        })
    }

    #[test]
    fn test_runs_merge_until_props_change() {
        let mut b = DocumentBuilder::new(2880);
        run(&mut b, "a");
        run(&mut b, "b");
        b.text(
            &RunProps {
                bold: true,
                ..Default::default()
            },
            "c",
        );
        b.end_paragraph(&ParagraphProps::default(), None, false);
        let root = b.finish();
        let p = root.elements().next().unwrap();
        let runs: Vec<&Element> = p.elements().collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text(), "ab");
        assert_eq!(runs[1].attr("FontWeight"), Some("Bold"));
    }

    #[test]
    fn test_nested_lists() {
        let mut b = DocumentBuilder::new(2880);
        for (text, level) in [("a", 0), ("b", 1), ("c", 0)] {
            run(&mut b, text);
            b.end_paragraph(&ParagraphProps::default(), bullet(1, level), false);
        }
        run(&mut b, "d");
        b.end_paragraph(&ParagraphProps::default(), None, false);

        let root = b.finish();
        let blocks: Vec<&Element> = root.elements().collect();
        assert_eq!(blocks.len(), 2);
        let list = blocks[0];
        assert_eq!(list.name, "List");
        assert_eq!(list.attr("MarkerStyle"), Some("Disc"));
        let items: Vec<&Element> = list.elements().collect();
        assert_eq!(items.len(), 2);
        let nested = items[0].elements().nth(1).unwrap();
        assert_eq!(nested.name, "List");
        assert_eq!(nested.text(), "b");
        assert_eq!(items[1].text(), "c");
    }

    #[test]
    fn test_different_override_starts_new_list() {
        let mut b = DocumentBuilder::new(2880);
        run(&mut b, "a");
        b.end_paragraph(&ParagraphProps::default(), bullet(1, 0), false);
        run(&mut b, "b");
        b.end_paragraph(&ParagraphProps::default(), bullet(2, 0), false);
        assert_eq!(b.finish().elements().count(), 2);
    }

    #[test]
    fn test_hyperlink_spanning_paragraphs() {
        let mut b = DocumentBuilder::new(2880);
        b.start_hyperlink("http://a");
        run(&mut b, "x");
        b.end_paragraph(&ParagraphProps::default(), None, false);
        run(&mut b, "y");
        b.end_hyperlink();
        b.end_paragraph(&ParagraphProps::default(), None, false);

        let root = b.finish();
        for p in root.elements() {
            let link = p.elements().next().unwrap();
            assert_eq!(link.name, "Hyperlink");
            assert_eq!(link.attr("NavigateUri"), Some("http://a"));
        }
    }

    #[test]
    fn test_table_spans() {
        let mut b = DocumentBuilder::new(2880);
        let geometry = |right_edge, merge| CellGeometry {
            right_edge,
            merge,
            frame: BoxProps::default(),
        };
        for (texts, cells) in [
            (
                vec!["a", "b"],
                vec![
                    geometry(1440, MergeFlags::VERTICAL_FIRST),
                    geometry(2880, MergeFlags::empty()),
                ],
            ),
            (
                vec!["", "c"],
                vec![
                    geometry(1440, MergeFlags::VERTICAL),
                    geometry(2880, MergeFlags::empty()),
                ],
            ),
            (vec!["wide"], vec![geometry(2880, MergeFlags::empty())]),
        ] {
            for text in texts {
                if !text.is_empty() {
                    run(&mut b, text);
                    b.end_paragraph(&ParagraphProps::default(), None, true);
                }
                b.end_cell();
            }
            b.end_row(RowDef {
                cells,
                ..Default::default()
            });
        }
        run(&mut b, "after");
        b.end_paragraph(&ParagraphProps::default(), None, false);

        let root = b.finish();
        let table = root.elements().next().unwrap();
        assert_eq!(table.name, "Table");
        assert!(table.attr("CellSpacing").is_none());
        let columns = table.elements().next().unwrap();
        assert_eq!(columns.elements().count(), 2);
        assert_eq!(columns.elements().next().unwrap().attr("Width"), Some("96"));

        let rows: Vec<&Element> = table.elements().nth(1).unwrap().elements().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].elements().next().unwrap().attr("RowSpan"), Some("2"));
        assert_eq!(rows[1].elements().count(), 1);
        assert_eq!(rows[2].elements().next().unwrap().attr("ColumnSpan"), Some("2"));
        assert_eq!(root.elements().nth(1).unwrap().text(), "after");
    }

    #[test]
    fn test_extreme_row_geometry() {
        let mut b = DocumentBuilder::new(2880);
        for texts in [vec!["a", "b"], vec!["c"]] {
            for text in texts {
                run(&mut b, text);
                b.end_paragraph(&ParagraphProps::default(), None, true);
                b.end_cell();
            }
            b.end_row(RowDef {
                left: i32::MIN,
                gap: i32::MAX,
                cells: vec![CellGeometry {
                    right_edge: i32::MAX,
                    ..Default::default()
                }],
                fallback_width: None,
            });
        }

        let root = b.finish();
        let table = root.elements().next().unwrap();
        assert!(table.attr("CellSpacing").is_some());
        let columns = table.elements().next().unwrap();
        assert!(columns.elements().count() >= 1);
    }

    #[test]
    fn test_preferred_width_of_undefined_cells() {
        let mut b = DocumentBuilder::new(2880);
        for text in ["a", "b"] {
            run(&mut b, text);
            b.end_paragraph(&ParagraphProps::default(), None, true);
            b.end_cell();
        }
        b.end_row(RowDef {
            fallback_width: Some(720),
            ..Default::default()
        });

        let root = b.finish();
        let columns = root.elements().next().unwrap().elements().next().unwrap();
        let widths: Vec<&str> = columns.elements().filter_map(|c| c.attr("Width")).collect();
        assert_eq!(widths, ["48", "48"]);
    }
}
