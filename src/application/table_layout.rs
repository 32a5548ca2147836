// Table layout - column sizing and cell wrapping for document tables
use crate::domain::report::TableBlock;
use thiserror::Error;

/// Millimetres per point
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width relative to the font size
const AVG_GLYPH_RATIO: f32 = 0.5;
/// Fallback renderer character budget per cell
pub const FALLBACK_CELL_CHARS: usize = 47;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("table has no columns")]
    NoColumns,
    #[error("{columns} columns do not fit in {width:.0}mm")]
    TooManyColumns { columns: usize, width: f32 },
    #[error("row {row} is taller than {max_height:.0}mm")]
    RowTooTall { row: usize, max_height: f32 },
}

/// Approximate rendered width of one character
pub fn char_width(font_size: f32) -> f32 {
    font_size * PT_TO_MM * AVG_GLYPH_RATIO
}

/// Keep the first 47 characters and mark the cut with an ellipsis
pub fn truncate_cell(text: &str) -> String {
    if text.chars().count() <= FALLBACK_CELL_CHARS {
        return text.to_string();
    }
    let kept: String = text.chars().take(FALLBACK_CELL_CHARS).collect();
    format!("{}...", kept)
}

/// Greedy word wrap; words longer than a line are split
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..max_chars).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    /// Wrapped lines per column
    pub cells: Vec<Vec<String>>,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    pub column_widths: Vec<f32>,
    pub header: GridRow,
    pub rows: Vec<GridRow>,
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
}

impl TableGrid {
    pub fn total_height(&self) -> f32 {
        self.header.height + self.rows.iter().map(|r| r.height).sum::<f32>()
    }
}

pub trait TableLayout: Send + Sync {
    /// Lay out a table with at least one row into `width` millimetres
    fn layout(&self, table: &TableBlock, width: f32, max_row_height: f32) -> Result<TableGrid, LayoutError>;
}

#[derive(Debug, Clone)]
pub struct GridTableLayout {
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
    pub min_column_width: f32,
}

impl Default for GridTableLayout {
    fn default() -> Self {
        Self {
            font_size: 8.0,
            line_height: 3.8,
            padding: 1.8,
            min_column_width: 14.0,
        }
    }
}

impl GridTableLayout {
    fn natural_width(&self, texts: impl Iterator<Item = usize>) -> f32 {
        let longest = texts.max().unwrap_or(0).min(60) as f32;
        longest * char_width(self.font_size) + 2.0 * self.padding
    }

    fn column_widths(&self, table: &TableBlock, width: f32) -> Vec<f32> {
        let columns = table.headers.len();
        let natural: Vec<f32> = (0..columns)
            .map(|col| {
                let header = std::iter::once(table.headers[col].chars().count());
                let cells = table
                    .rows
                    .iter()
                    .map(move |row| row.get(col).map(|c| c.chars().count()).unwrap_or(0));
                self.natural_width(header.chain(cells)).max(self.min_column_width)
            })
            .collect();

        let natural_total: f32 = natural.iter().sum();
        if natural_total <= width {
            // Stretch to the full content width
            return natural.iter().map(|w| w * width / natural_total).collect();
        }

        let floor = self.min_column_width * columns as f32;
        let surplus_total = natural_total - floor;
        natural
            .iter()
            .map(|w| {
                let surplus = w - self.min_column_width;
                self.min_column_width + surplus / surplus_total * (width - floor)
            })
            .collect()
    }

    fn grid_row(&self, texts: &[&str], widths: &[f32]) -> GridRow {
        let per_char = char_width(self.font_size);
        let cells: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(col, w)| {
                let text = texts.get(col).copied().unwrap_or("");
                let max_chars = ((w - 2.0 * self.padding) / per_char).floor() as usize;
                wrap_text(text, max_chars)
            })
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        GridRow {
            cells,
            height: lines as f32 * self.line_height + 2.0 * self.padding,
        }
    }
}

impl TableLayout for GridTableLayout {
    fn layout(&self, table: &TableBlock, width: f32, max_row_height: f32) -> Result<TableGrid, LayoutError> {
        let columns = table.headers.len();
        if columns == 0 {
            return Err(LayoutError::NoColumns);
        }
        if columns as f32 * self.min_column_width > width {
            return Err(LayoutError::TooManyColumns { columns, width });
        }

        let widths = self.column_widths(table, width);
        let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
        let header = self.grid_row(&headers, &widths);

        let mut rows = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            let texts: Vec<&str> = row.iter().map(String::as_str).collect();
            let grid_row = self.grid_row(&texts, &widths);
            if grid_row.height > max_row_height {
                return Err(LayoutError::RowTooTall {
                    row: index,
                    max_height: max_row_height,
                });
            }
            rows.push(grid_row);
        }

        Ok(TableGrid {
            column_widths: widths,
            header,
            rows,
            font_size: self.font_size,
            line_height: self.line_height,
            padding: self.padding,
        })
    }
}
