// PDF writer - replays the document display list through printpdf
use crate::application::export::{DocumentWriter, ExportError};
use crate::domain::document::{Document, Element, FontWeight, LogoImage, Rgb};
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};
use std::io::BufWriter;

const MM_PER_INCH: f32 = 25.4;

pub struct PdfWriter;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl DocumentWriter for PdfWriter {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn write(&self, document: &Document) -> Result<Vec<u8>, ExportError> {
        let geometry = document.geometry;
        let (width, height) = (Mm(geometry.width), Mm(geometry.height));
        let (doc, first_page, first_layer) = PdfDocument::new(&document.title, width, height, "Layer 1");

        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ExportError::Render(format!("PDF font error: {e}")))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| ExportError::Render(format!("PDF font error: {e}")))?,
        };

        for (index, page) in document.pages.iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(width, height, format!("Page {}", index + 1))
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            for element in &page.elements {
                draw(&layer, &fonts, geometry.height, document.logo.as_ref(), element);
            }
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| ExportError::Render(format!("PDF save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ExportError::Render(format!("PDF buffer error: {e}")))
    }
}

fn color(rgb: Rgb) -> Color {
    let Rgb(r, g, b) = rgb;
    Color::Rgb(printpdf::Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

/// Display list rectangles are top-left based; PDF space starts bottom-left
fn fill_rect(layer: &PdfLayerReference, page_height: f32, x: f32, y: f32, width: f32, height: f32, fill: Rgb) {
    layer.set_fill_color(color(fill));
    let rect = printpdf::Rect::new(
        Mm(x),
        Mm(page_height - y - height),
        Mm(x + width),
        Mm(page_height - y),
    )
    .with_mode(PaintMode::Fill);
    layer.add_rect(rect);
}

fn draw(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    page_height: f32,
    logo: Option<&LogoImage>,
    element: &Element,
) {
    match element {
        Element::Text {
            x,
            y,
            size,
            weight,
            color: text_color,
            content,
        } => {
            let font = match weight {
                FontWeight::Regular => &fonts.regular,
                FontWeight::Bold => &fonts.bold,
            };
            layer.set_fill_color(color(*text_color));
            layer.use_text(content.as_str(), *size, Mm(*x), Mm(page_height - y), font);
        }
        Element::Rect {
            x,
            y,
            width,
            height,
            fill,
        } => fill_rect(layer, page_height, *x, *y, *width, *height, *fill),
        Element::Logo { x, y, width, height } => {
            let placed = logo.is_some_and(|logo| {
                draw_logo(layer, page_height, logo, *x, *y, *width, *height)
            });
            if !placed {
                fill_rect(layer, page_height, *x, *y, *width, *height, Rgb::BRAND);
            }
        }
    }
}

/// Scale the image to fit the box without distortion; false when the pixels
/// do not match the stated dimensions
fn draw_logo(
    layer: &PdfLayerReference,
    page_height: f32,
    logo: &LogoImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> bool {
    if logo.width_px == 0 || logo.height_px == 0 {
        return false;
    }
    let Some(pixels) = RgbImage::from_raw(logo.width_px, logo.height_px, logo.rgb.clone()) else {
        tracing::warn!(
            width_px = logo.width_px,
            height_px = logo.height_px,
            len = logo.rgb.len(),
            "logo pixel buffer does not match its dimensions"
        );
        return false;
    };

    let dpi_for_width = logo.width_px as f32 * MM_PER_INCH / width;
    let dpi_for_height = logo.height_px as f32 * MM_PER_INCH / height;
    let dpi = dpi_for_width.max(dpi_for_height);
    let drawn_height = logo.height_px as f32 * MM_PER_INCH / dpi;

    Image::from_dynamic_image(&DynamicImage::ImageRgb8(pixels)).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(page_height - y - drawn_height)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{Page, PageGeometry};

    fn document(logo: Option<LogoImage>) -> Document {
        let text = |y: f32, content: &str| Element::Text {
            x: 20.0,
            y,
            size: 10.0,
            weight: FontWeight::Regular,
            color: Rgb::BLACK,
            content: content.to_string(),
        };
        Document {
            title: "User Overview Report".to_string(),
            geometry: PageGeometry::A4,
            pages: vec![
                Page {
                    elements: vec![
                        Element::Logo {
                            x: 20.0,
                            y: 20.0,
                            width: 18.0,
                            height: 18.0,
                        },
                        Element::Rect {
                            x: 20.0,
                            y: 50.0,
                            width: 170.0,
                            height: 7.0,
                            fill: Rgb::STRIPE,
                        },
                        text(55.0, "Total Users"),
                    ],
                },
                Page {
                    elements: vec![text(30.0, "Page 2 of 2")],
                },
            ],
            logo,
        }
    }

    #[test]
    fn test_writes_multi_page_pdf() {
        let bytes = PdfWriter.write(&document(None)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_writes_logo_pixels() {
        let logo = LogoImage {
            rgb: vec![200; 8 * 4 * 3],
            width_px: 8,
            height_px: 4,
        };
        let with_logo = PdfWriter.write(&document(Some(logo))).unwrap();
        let without = PdfWriter.write(&document(None)).unwrap();
        assert!(with_logo.starts_with(b"%PDF"));
        assert!(with_logo.len() > without.len());
    }

    #[test]
    fn test_short_pixel_buffer_still_renders() {
        let logo = LogoImage {
            rgb: vec![0; 10],
            width_px: 64,
            height_px: 64,
        };
        let bytes = PdfWriter.write(&document(Some(logo))).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
