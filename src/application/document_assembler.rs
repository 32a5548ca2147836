// Document assembler - lays report sections out onto paginated pages
use crate::application::table_layout::{
    char_width, truncate_cell, LayoutError, TableGrid, TableLayout,
};
use crate::domain::document::{
    Document, DocumentCursor, Element, FontWeight, LogoImage, Page, PageGeometry, Rgb,
};
use crate::domain::report::{ReportQuery, ReportSection, StatCard, TableBlock};
use chrono::NaiveDateTime;
use std::sync::Arc;

const LOGO_SIZE: f32 = 18.0;
const HEADER_BASE_HEIGHT: f32 = 26.0;
const HEADER_LINE_HEIGHT: f32 = 5.0;
const SECTION_TITLE_HEIGHT: f32 = 9.0;
const DESCRIPTION_HEIGHT: f32 = 5.0;
const CARDS_PER_ROW: usize = 4;
const CARD_HEIGHT: f32 = 20.0;
const CARD_GAP: f32 = 4.0;
const PLACEHOLDER_HEIGHT: f32 = 14.0;
const PLACEHOLDER_FONT_SIZE: f32 = 10.0;
const FALLBACK_ROW_HEIGHT: f32 = 7.0;
const FALLBACK_FONT_SIZE: f32 = 8.0;
const KEEP_WITH_HEADER_ROWS: usize = 3;

pub const NO_DATA_TEXT: &str = "No data available";

/// Everything the assembler needs for one report document
pub struct ReportDocument<'a> {
    pub title: &'a str,
    pub organization: &'a str,
    pub query: &'a ReportQuery,
    pub sections: &'a [ReportSection],
    pub logo: Option<LogoImage>,
    pub generated_at: NaiveDateTime,
}

#[derive(Clone)]
pub struct DocumentAssembler {
    layout: Arc<dyn TableLayout>,
    geometry: PageGeometry,
}

impl DocumentAssembler {
    pub fn new(layout: Arc<dyn TableLayout>) -> Self {
        Self {
            layout,
            geometry: PageGeometry::A4,
        }
    }

    pub fn assemble(&self, report: ReportDocument<'_>) -> Document {
        let mut pages = PageWriter::new(self.geometry);

        self.draw_header(&mut pages, &report);

        for section in report.sections {
            match section {
                ReportSection::Stats { title, cards } => self.draw_stats(&mut pages, title, cards),
                ReportSection::Table(table) => self.draw_table(&mut pages, table),
            }
            pages.advance(self.geometry.spacing);
        }

        let mut pages = pages.finish();
        self.draw_footers(&mut pages, report.organization);

        Document {
            title: report.title.to_string(),
            geometry: self.geometry,
            pages,
            logo: report.logo,
        }
    }

    fn draw_header(&self, pages: &mut PageWriter, report: &ReportDocument<'_>) {
        let margin = self.geometry.margin;
        let top = pages.cursor.vertical_offset;

        match &report.logo {
            Some(_) => pages.push(Element::Logo {
                x: margin,
                y: top,
                width: LOGO_SIZE,
                height: LOGO_SIZE,
            }),
            None => draw_placeholder_logo(pages, margin, top),
        }

        let text_x = margin + LOGO_SIZE + 6.0;
        pages.text(text_x, top + 7.0, 16.0, FontWeight::Bold, Rgb::BRAND, report.organization);
        pages.text(text_x, top + 14.0, 13.0, FontWeight::Bold, Rgb::BLACK, report.title);
        pages.text(
            text_x,
            top + 20.0,
            9.0,
            FontWeight::Regular,
            Rgb::MUTED,
            &format!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M")),
        );

        let mut extra_lines = Vec::new();
        if let Some(range) = report.query.describe_range() {
            extra_lines.push(range);
        }
        if let Some(search) = &report.query.search {
            extra_lines.push(format!("Search: {}", search));
        }
        let mut line_y = top + 20.0;
        for line in &extra_lines {
            line_y += HEADER_LINE_HEIGHT;
            pages.text(text_x, line_y, 9.0, FontWeight::Regular, Rgb::MUTED, line);
        }

        let height = HEADER_BASE_HEIGHT + HEADER_LINE_HEIGHT * extra_lines.len() as f32;
        pages.push(Element::Rect {
            x: margin,
            y: top + height - 0.6,
            width: self.geometry.content_width(),
            height: 0.6,
            fill: Rgb::BRAND,
        });
        pages.advance(height + self.geometry.spacing);
    }

    fn draw_section_title(&self, pages: &mut PageWriter, title: &str) {
        let y = pages.cursor.vertical_offset;
        pages.text(self.geometry.margin, y + 6.0, 12.0, FontWeight::Bold, Rgb::BLACK, title);
        pages.advance(SECTION_TITLE_HEIGHT);
    }

    fn draw_stats(&self, pages: &mut PageWriter, title: &str, cards: &[StatCard]) {
        if cards.is_empty() {
            let estimate = SECTION_TITLE_HEIGHT + PLACEHOLDER_HEIGHT;
            pages.ensure_space(estimate);
            self.draw_section_title(pages, title);
            self.draw_placeholder(pages);
            return;
        }

        let rows = cards.len().div_ceil(CARDS_PER_ROW);
        let estimate = SECTION_TITLE_HEIGHT
            + rows as f32 * CARD_HEIGHT
            + rows.saturating_sub(1) as f32 * CARD_GAP;
        pages.ensure_space(estimate);
        self.draw_section_title(pages, title);

        let card_width = (self.geometry.content_width() - CARD_GAP * (CARDS_PER_ROW - 1) as f32)
            / CARDS_PER_ROW as f32;
        for (row_index, row) in cards.chunks(CARDS_PER_ROW).enumerate() {
            if row_index > 0 {
                pages.advance(CARD_GAP);
            }
            let y = pages.cursor.vertical_offset;
            for (col, card) in row.iter().enumerate() {
                let x = self.geometry.margin + col as f32 * (card_width + CARD_GAP);
                pages.push(Element::Rect {
                    x,
                    y,
                    width: card_width,
                    height: CARD_HEIGHT,
                    fill: Rgb::CARD,
                });
                pages.text(x + 4.0, y + 9.0, 14.0, FontWeight::Bold, Rgb::BRAND, &card.value);
                pages.text(x + 4.0, y + 16.0, 8.0, FontWeight::Regular, Rgb::MUTED, &card.label);
            }
            pages.advance(CARD_HEIGHT);
        }
    }

    fn draw_placeholder(&self, pages: &mut PageWriter) {
        let y = pages.cursor.vertical_offset;
        pages.push(Element::Rect {
            x: self.geometry.margin,
            y,
            width: self.geometry.content_width(),
            height: PLACEHOLDER_HEIGHT,
            fill: Rgb::PLACEHOLDER,
        });
        let text_width = char_width(PLACEHOLDER_FONT_SIZE) * NO_DATA_TEXT.chars().count() as f32;
        pages.text(
            self.geometry.margin + (self.geometry.content_width() - text_width) / 2.0,
            y + 8.5,
            PLACEHOLDER_FONT_SIZE,
            FontWeight::Regular,
            Rgb::MUTED,
            NO_DATA_TEXT,
        );
        pages.advance(PLACEHOLDER_HEIGHT);
    }

    fn draw_table(&self, pages: &mut PageWriter, table: &TableBlock) {
        let preamble = SECTION_TITLE_HEIGHT
            + if table.description.is_some() {
                DESCRIPTION_HEIGHT
            } else {
                0.0
            };

        if table.rows.is_empty() {
            pages.ensure_space(preamble + PLACEHOLDER_HEIGHT);
            self.draw_table_preamble(pages, table);
            self.draw_placeholder(pages);
            return;
        }

        let usable = self.geometry.usable_height();
        match self.layout.layout(table, self.geometry.content_width(), usable / 2.0) {
            Ok(grid) => {
                let full = preamble + grid.total_height();
                let leading: f32 = grid.rows.iter().take(KEEP_WITH_HEADER_ROWS).map(|r| r.height).sum();
                pages.ensure_space(self.table_estimate(full, preamble + grid.header.height + leading));
                self.draw_table_preamble(pages, table);
                self.draw_grid(pages, &grid);
            }
            Err(error) => {
                self.log_layout_fallback(table, &error);
                let full = preamble + FALLBACK_ROW_HEIGHT * (table.rows.len() + 1) as f32;
                let leading = preamble + FALLBACK_ROW_HEIGHT * (KEEP_WITH_HEADER_ROWS + 1) as f32;
                pages.ensure_space(self.table_estimate(full, leading));
                self.draw_table_preamble(pages, table);
                self.draw_fallback(pages, table);
            }
        }
    }

    /// A table that fits on one page is kept together. A longer one only needs
    /// its title, header and first rows to fit, since it continues on later pages.
    fn table_estimate(&self, full: f32, leading: f32) -> f32 {
        if full <= self.geometry.usable_height() {
            full
        } else {
            leading
        }
    }

    fn log_layout_fallback(&self, table: &TableBlock, error: &LayoutError) {
        tracing::warn!(
            table = %table.title,
            rows = table.rows.len(),
            error = %error,
            "table layout failed, using fixed-row renderer"
        );
    }

    fn draw_table_preamble(&self, pages: &mut PageWriter, table: &TableBlock) {
        self.draw_section_title(pages, &table.title);
        if let Some(description) = &table.description {
            let y = pages.cursor.vertical_offset;
            pages.text(self.geometry.margin, y + 3.0, 8.0, FontWeight::Regular, Rgb::MUTED, description);
            pages.advance(DESCRIPTION_HEIGHT);
        }
    }

    fn draw_grid(&self, pages: &mut PageWriter, grid: &TableGrid) {
        self.draw_grid_row(pages, grid, &grid.header.cells, grid.header.height, true, false);

        for (index, row) in grid.rows.iter().enumerate() {
            if pages.would_overflow(row.height) {
                pages.new_page();
                self.draw_grid_row(pages, grid, &grid.header.cells, grid.header.height, true, false);
            }
            self.draw_grid_row(pages, grid, &row.cells, row.height, false, index % 2 == 1);
        }
    }

    fn draw_grid_row(
        &self,
        pages: &mut PageWriter,
        grid: &TableGrid,
        cells: &[Vec<String>],
        height: f32,
        header: bool,
        striped: bool,
    ) {
        let y = pages.cursor.vertical_offset;
        let fill = if header {
            Some(Rgb::BRAND)
        } else if striped {
            Some(Rgb::STRIPE)
        } else {
            None
        };
        if let Some(fill) = fill {
            pages.push(Element::Rect {
                x: self.geometry.margin,
                y,
                width: self.geometry.content_width(),
                height,
                fill,
            });
        }

        let (weight, color) = if header {
            (FontWeight::Bold, Rgb::WHITE)
        } else {
            (FontWeight::Regular, Rgb::BLACK)
        };
        let mut x = self.geometry.margin;
        for (lines, width) in cells.iter().zip(&grid.column_widths) {
            for (line_index, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline = y + grid.padding + grid.line_height * (line_index as f32 + 0.8);
                pages.text(x + grid.padding, baseline, grid.font_size, weight, color, line);
            }
            x += width;
        }
        pages.advance(height);
    }

    fn draw_fallback(&self, pages: &mut PageWriter, table: &TableBlock) {
        let columns = table.headers.len().max(1);
        let column_width = self.geometry.content_width() / columns as f32;
        let header: Vec<String> = table.headers.iter().map(|h| truncate_cell(h)).collect();

        self.draw_fallback_row(pages, &header, column_width, Some(Rgb::BRAND), true);
        for (index, row) in table.rows.iter().enumerate() {
            if pages.would_overflow(FALLBACK_ROW_HEIGHT) {
                pages.new_page();
                self.draw_fallback_row(pages, &header, column_width, Some(Rgb::BRAND), true);
            }
            let cells: Vec<String> = (0..columns)
                .map(|col| row.get(col).map(|c| truncate_cell(c)).unwrap_or_default())
                .collect();
            let fill = (index % 2 == 1).then_some(Rgb::STRIPE);
            self.draw_fallback_row(pages, &cells, column_width, fill, false);
        }
    }

    fn draw_fallback_row(
        &self,
        pages: &mut PageWriter,
        cells: &[String],
        column_width: f32,
        fill: Option<Rgb>,
        header: bool,
    ) {
        let y = pages.cursor.vertical_offset;
        if let Some(fill) = fill {
            pages.push(Element::Rect {
                x: self.geometry.margin,
                y,
                width: self.geometry.content_width(),
                height: FALLBACK_ROW_HEIGHT,
                fill,
            });
        }
        let (weight, color) = if header {
            (FontWeight::Bold, Rgb::WHITE)
        } else {
            (FontWeight::Regular, Rgb::BLACK)
        };
        for (col, text) in cells.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let x = self.geometry.margin + col as f32 * column_width + 1.5;
            pages.text(x, y + 5.0, FALLBACK_FONT_SIZE, weight, color, text);
        }
        pages.advance(FALLBACK_ROW_HEIGHT);
    }

    fn draw_footers(&self, pages: &mut [Page], organization: &str) {
        let total = pages.len();
        let y = self.geometry.height - self.geometry.margin / 2.0;
        for (index, page) in pages.iter_mut().enumerate() {
            page.elements.push(footer_text(self.geometry.margin, y, organization.to_string()));
            page.elements.push(footer_text(
                self.geometry.width - self.geometry.margin - 18.0,
                y,
                format!("Page {} of {}", index + 1, total),
            ));
        }
    }
}

fn footer_text(x: f32, y: f32, content: String) -> Element {
    Element::Text {
        x,
        y,
        size: 8.0,
        weight: FontWeight::Regular,
        color: Rgb::MUTED,
        content,
    }
}

/// Drawn logo block used whenever the real image is unavailable
fn draw_placeholder_logo(pages: &mut PageWriter, x: f32, y: f32) {
    pages.push(Element::Rect {
        x,
        y,
        width: LOGO_SIZE,
        height: LOGO_SIZE,
        fill: Rgb::BRAND,
    });
    pages.text(x + 3.2, y + 11.5, 12.0, FontWeight::Bold, Rgb::WHITE, "MC");
}

/// Pages under construction plus the running cursor
struct PageWriter {
    geometry: PageGeometry,
    pages: Vec<Page>,
    cursor: DocumentCursor,
}

impl PageWriter {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            cursor: DocumentCursor {
                page_index: 0,
                vertical_offset: geometry.margin,
            },
        }
    }

    fn at_page_top(&self) -> bool {
        self.cursor.vertical_offset <= self.geometry.margin
    }

    fn would_overflow(&self, height: f32) -> bool {
        self.cursor.vertical_offset + height > self.geometry.bottom_limit()
    }

    /// Break before drawing when `height` does not fit on the current page
    fn ensure_space(&mut self, height: f32) {
        if self.would_overflow(height) && !self.at_page_top() {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = DocumentCursor {
            page_index: self.pages.len() - 1,
            vertical_offset: self.geometry.margin,
        };
    }

    fn advance(&mut self, dy: f32) {
        self.cursor.vertical_offset += dy;
    }

    fn push(&mut self, element: Element) {
        self.pages[self.cursor.page_index].elements.push(element);
    }

    fn text(&mut self, x: f32, y: f32, size: f32, weight: FontWeight, color: Rgb, content: &str) {
        self.push(Element::Text {
            x,
            y,
            size,
            weight,
            color,
            content: content.to_string(),
        });
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}
