// Document model - a paginated display list produced by the assembler and consumed by writers
//
// Coordinates are millimetres from the top-left corner of the page.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub spacing: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
        margin: 20.0,
        spacing: 8.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest offset content may reach before a page break
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin
    }

    pub fn usable_height(&self) -> f32 {
        self.bottom_limit() - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::A4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(33, 37, 41);
    pub const MUTED: Rgb = Rgb(108, 117, 125);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BRAND: Rgb = Rgb(13, 110, 253);
    pub const CARD: Rgb = Rgb(241, 245, 255);
    pub const STRIPE: Rgb = Rgb(245, 245, 245);
    pub const PLACEHOLDER: Rgb = Rgb(248, 249, 250);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `y` is the text baseline
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: FontWeight,
        color: Rgb,
        content: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgb,
    },
    /// Drawn from the document's logo image
    Logo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

/// Layout position; `vertical_offset` only grows until a new page resets it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentCursor {
    pub page_index: usize,
    pub vertical_offset: f32,
}

/// Decoded logo as packed 8-bit RGB pixels, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct LogoImage {
    pub rgb: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
    pub logo: Option<LogoImage>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text in drawing order across pages
    pub fn text_content(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                Element::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}
