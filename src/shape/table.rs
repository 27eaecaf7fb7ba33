//! Table shapes: a grid of rich-text cells with borders and merges.

use rustc_hash::FxHashSet;

use crate::hash::{StableHash, StableHasher};

use super::metrics::CELL_PADDING;
use super::text::{Align, TextBody};

/// Column of a table shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub align: Align,
    /// Width in target points
    pub width: f32,
    /// Width given by a `p{...}` column, exempt from auto-fit
    pub fixed: bool,
}

/// Border overrides local to one cell (from a `\multicolumn` spec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellBorders {
    pub left: Option<bool>,
    pub right: Option<bool>,
}

/// Table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub body: TextBody,
    /// Alignment override (multicolumn)
    pub align: Option<Align>,
    pub borders: CellBorders,
}

impl Cell {
    fn new(size: f32) -> Self {
        Self {
            body: TextBody::new(size),
            align: None,
            borders: CellBorders::default(),
        }
    }
}

/// Horizontal merge of `span` cells starting at (`row`, `col`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    pub row: usize,
    pub col: usize,
    pub span: usize,
}

/// Partial horizontal line above `row`, from column `from` to `to` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CLine {
    pub row: usize,
    pub from: usize,
    pub to: usize,
}

/// Table shape content.
#[derive(Debug, Clone, PartialEq)]
pub struct TableShape {
    pub columns: Vec<Column>,
    /// Rows of `columns.len()` cells each
    pub rows: Vec<Vec<Cell>>,
    /// Row count the grid was created with (before pause truncation)
    pub declared_rows: usize,
    /// Vertical border positions; `i` is the line left of column `i`
    pub vertical_borders: FxHashSet<usize>,
    /// Horizontal border positions; `i` is the line above row `i`
    pub hlines: FxHashSet<usize>,
    pub clines: Vec<CLine>,
    pub merges: Vec<Merge>,
}

impl TableShape {
    /// Create an empty grid.
    pub fn new(columns: Vec<Column>, rows: usize, size: f32) -> Self {
        let grid = (0..rows)
            .map(|_| (0..columns.len()).map(|_| Cell::new(size)).collect())
            .collect();
        Self {
            columns,
            rows: grid,
            declared_rows: rows,
            vertical_borders: FxHashSet::default(),
            hlines: FxHashSet::default(),
            clines: Vec::new(),
            merges: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cell at (`row`, `col`).
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    /// Mutable cell at (`row`, `col`).
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row)?.get_mut(col)
    }

    /// Merge starting at (`row`, `col`), if any.
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&Merge> {
        self.merges.iter().find(|m| m.row == row && m.col == col)
    }

    /// Check if (`row`, `col`) is covered by a merge started further left.
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.merges
            .iter()
            .any(|m| m.row == row && m.col < col && col < m.col + m.span)
    }

    /// Delete rows from index `from` onward.
    pub fn delete_trailing_rows(&mut self, from: usize) {
        if from >= self.rows.len() {
            return;
        }
        self.rows.truncate(from);
        self.merges.retain(|m| m.row < from);
        // a line below the last kept row stays
        self.hlines.retain(|&line| line <= from);
        self.clines.retain(|line| line.row <= from);
    }

    /// Total width.
    pub fn width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    /// Width available to the content of (`row`, `col`), merges included.
    pub fn cell_width(&self, row: usize, col: usize) -> f32 {
        let span = self.merge_at(row, col).map_or(1, |m| m.span);
        let outer: f32 = self.columns.iter().skip(col).take(span).map(|c| c.width).sum();
        (outer - 2.0 * CELL_PADDING).max(0.0)
    }

    /// Height of each row.
    pub fn row_heights(&self) -> Vec<f32> {
        self.rows
            .iter()
            .enumerate()
            .map(|(r, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .filter(|(c, _)| !self.is_covered(r, *c))
                    .map(|(c, cell)| cell.body.layout(self.cell_width(r, c)).height())
                    .fold(0.0, f32::max)
                    + 2.0 * CELL_PADDING
            })
            .collect()
    }

    /// Total height.
    pub fn height(&self) -> f32 {
        self.row_heights().iter().sum()
    }

    /// Shrink columns without a fixed width to their widest unmerged cell.
    pub fn fit_columns(&mut self) {
        for col in 0..self.columns.len() {
            if self.columns[col].fixed {
                continue;
            }
            let required = (0..self.rows.len())
                .filter(|&row| {
                    !self.is_covered(row, col)
                        && self.merge_at(row, col).is_none_or(|m| m.span == 1)
                })
                .filter_map(|row| self.cell(row, col))
                .map(|cell| cell.body.layout(f32::INFINITY).max_width())
                .fold(0.0, f32::max)
                + 2.0 * CELL_PADDING;
            let column = &mut self.columns[col];
            column.width = column.width.min(required);
        }
    }
}

// =============================================================================
// Digest
// =============================================================================

impl StableHash for Cell {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        let hasher = self.body.stable_hash(hasher);
        let hasher = hasher.update_usize(self.align.map_or(0, |a| a as usize + 1));
        let border = |b: Option<bool>| b.map_or(0, |b| b as usize + 1);
        hasher
            .update_usize(border(self.borders.left))
            .update_usize(border(self.borders.right))
    }
}

impl StableHash for TableShape {
    fn stable_hash(&self, hasher: StableHasher) -> StableHasher {
        let mut hasher = hasher
            .update_usize(self.columns.len())
            .update_usize(self.declared_rows);
        for column in &self.columns {
            hasher = hasher
                .update_usize(column.align as usize)
                .update_f32(column.width)
                .update_bool(column.fixed);
        }
        for row in &self.rows {
            hasher = row.as_slice().stable_hash(hasher);
        }

        let mut vertical: Vec<_> = self.vertical_borders.iter().copied().collect();
        vertical.sort_unstable();
        let mut hlines: Vec<_> = self.hlines.iter().copied().collect();
        hlines.sort_unstable();
        hasher = vertical.into_iter().fold(hasher.update_str("|"), StableHasher::update_usize);
        hasher = hlines.into_iter().fold(hasher.update_str("-"), StableHasher::update_usize);

        hasher = self.clines.iter().fold(hasher, |h, l| {
            h.update_usize(l.row).update_usize(l.from).update_usize(l.to)
        });
        self.merges.iter().fold(hasher, |h, m| {
            h.update_usize(m.row).update_usize(m.col).update_usize(m.span)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatSettings;

    fn column(width: f32, fixed: bool) -> Column {
        Column { align: Align::Left, width, fixed }
    }

    fn table() -> TableShape {
        let mut table = TableShape::new(vec![column(200.0, false), column(100.0, true)], 5, 20.0);
        for (r, row) in table.rows.iter_mut().enumerate() {
            row[0].body.append(&format!("R{r}"), &FormatSettings::new(20.0), false);
        }
        table.hlines.extend([0, 2, 5]);
        table
    }

    #[test]
    fn test_grid_shape() {
        let table = table();
        assert_eq!(table.row_count(), 5);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.width(), 300.0);
        assert!(table.cell(4, 1).is_some());
        assert!(table.cell(5, 0).is_none());
    }

    #[test]
    fn test_delete_trailing_rows() {
        let mut table = table();
        table.merges.push(Merge { row: 3, col: 0, span: 2 });
        table.delete_trailing_rows(2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.declared_rows, 5);
        assert!(table.merges.is_empty());
        assert!(table.hlines.contains(&2));
        assert!(!table.hlines.contains(&5));

        // out of range is a no-op
        table.delete_trailing_rows(7);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_fit_columns_shrinks_only_unfixed() {
        let mut table = table();
        table.fit_columns();
        // "R0" = 2 glyphs of 10pt + padding
        assert_eq!(table.columns[0].width, 20.0 + 2.0 * CELL_PADDING);
        assert_eq!(table.columns[1].width, 100.0);

        // never grows
        let mut narrow = TableShape::new(vec![column(10.0, false)], 1, 20.0);
        narrow.rows[0][0].body.append("wide text", &FormatSettings::new(20.0), false);
        narrow.fit_columns();
        assert_eq!(narrow.columns[0].width, 10.0);
    }

    #[test]
    fn test_merges() {
        let mut table = table();
        table.merges.push(Merge { row: 1, col: 0, span: 2 });
        assert!(table.is_covered(1, 1));
        assert!(!table.is_covered(1, 0));
        assert_eq!(table.cell_width(1, 0), 300.0 - 2.0 * CELL_PADDING);
    }
}
