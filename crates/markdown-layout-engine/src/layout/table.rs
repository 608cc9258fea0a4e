//! Tables as aligned text rows.
//!
//! Cells are flattened to one line and padded to their column's display
//! width, so a fixed-advance measurer sees straight columns.

use unicode_width::UnicodeWidthStr;

use crate::nodes::{Node, NodeKind, TableAlignment};

use super::styled::{StyledText, TextStyle};
use super::theme::Theme;

const COLUMN_SEPARATOR: &str = " │ ";

/// Body-row tint strength relative to the header background.
const STRIPE_ALPHA: f32 = 0.45;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TableRowText {
    pub cells: Vec<String>,
    pub is_head: bool,
}

/// Rows of a table in order, header rows first as they appear.
pub(crate) fn collect_rows(table: &Node) -> Vec<TableRowText> {
    let mut rows = Vec::new();
    for section in table.children() {
        let is_head = matches!(section.kind(), NodeKind::TableHead { .. });
        let mut loose_cells = Vec::new();
        for child in section.children() {
            match child.kind() {
                NodeKind::TableRow { .. } => {
                    let cells: Vec<_> = child
                        .children()
                        .iter()
                        .filter(|c| matches!(c.kind(), NodeKind::TableCell { .. }))
                        .map(|c| cell_text(c))
                        .collect();
                    if !cells.is_empty() {
                        rows.push(TableRowText { cells, is_head });
                    }
                }
                NodeKind::TableCell { .. } => loose_cells.push(cell_text(child)),
                _ => {}
            }
        }
        if !loose_cells.is_empty() {
            rows.push(TableRowText {
                cells: loose_cells,
                is_head,
            });
        }
    }
    rows
}

pub(crate) fn cell_text(cell: &Node) -> String {
    cell.plain_text().replace('\n', " ").trim().to_string()
}

pub(crate) fn layout_table(table: &Node, theme: &Theme) -> StyledText {
    let alignments: &[Option<TableAlignment>] = match table.kind() {
        NodeKind::Table { alignments, .. } => alignments,
        _ => &[],
    };
    let rows = collect_rows(table);
    let columns = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let mut out = StyledText::new();
    if columns == 0 {
        return out;
    }

    // The widest row sets the column count, so rows are only ever padded.
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|i| match row.cells.get(i) {
                    Some(text) if !text.is_empty() => text.clone(),
                    _ => " ".to_string(),
                })
                .collect()
        })
        .collect();
    let widths: Vec<usize> = (0..columns)
        .map(|i| cells.iter().map(|r| r[i].width()).max().unwrap_or(1))
        .collect();

    let mut body_index = 0;
    for (row, cells) in rows.iter().zip(&cells) {
        let style = row_style(theme, row.is_head, body_index);
        if !row.is_head {
            body_index += 1;
        }
        let separator = TextStyle {
            foreground: theme.table_color.foreground,
            ..style.clone()
        };

        if !out.is_empty() {
            out.push_text("\n", style.clone());
        }
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                out.push_text(COLUMN_SEPARATOR, separator.clone());
            }
            let alignment = alignments.get(i).copied().flatten();
            out.push_text(pad(cell, widths[i], alignment), style.clone());
        }
    }
    out
}

fn row_style(theme: &Theme, is_head: bool, body_index: usize) -> TextStyle {
    let mut style = theme.paragraph_style();
    style.paragraph.paragraph_spacing = 0.0;
    if is_head {
        style.font = style.font.bold();
        style.background = theme.table_color.background;
    } else if body_index % 2 == 1 {
        style.background = theme.table_color.background.map(|c| c.with_alpha(STRIPE_ALPHA));
    }
    style
}

fn pad(text: &str, width: usize, alignment: Option<TableAlignment>) -> String {
    let gap = width.saturating_sub(text.width());
    let (left, right) = match alignment {
        Some(TableAlignment::Right) => (gap, 0),
        Some(TableAlignment::Center) => (gap / 2, gap - gap / 2),
        Some(TableAlignment::Left) | None => (0, gap),
    };
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}
