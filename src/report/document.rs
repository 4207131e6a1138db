//! PDF report: a pure page layout over a [`BatchReport`], drawn with `printpdf`.
//!
//! Layout works top-down in millimetres on A4; [`render_pdf`] flips the
//! coordinates when it hands the pages to the PDF backend.

use printpdf::path::PaintMode;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect};

use crate::config::ReportSettings;
use crate::error::PipelineError;
use crate::predict::{BatchReport, HealthStatus, PredictionResult};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LAYER_NAME: &str = "Report";

const MARGIN: f32 = 10.0;
/// Content never extends below this line; the next row starts a new page.
const PAGE_BREAK_Y: f32 = PAGE_HEIGHT_MM - 20.0;
const CELL_PADDING: f32 = 1.0;
const COLUMN_WIDTH: f32 = 60.0;
const HEADER_HEIGHT: f32 = 10.0;
const ROW_HEIGHT: f32 = 8.0;
const LINE_HEIGHT: f32 = 10.0;
const FOOTER_LINE_HEIGHT: f32 = 8.0;
const BORDER_WIDTH_PT: f32 = 0.5;

const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 12.0;
const ROW_SIZE: f32 = 10.0;

/// Average Helvetica advance width, in ems.
const AVG_GLYPH_EM: f32 = 0.52;
const AVG_BOLD_GLYPH_EM: f32 = 0.58;

const BLACK: Rgb = Rgb(0, 0, 0);
const HEALTHY_TEXT: Rgb = Rgb(0, 150, 0);
const DISTRESSED_TEXT: Rgb = Rgb(220, 0, 0);
const SHADED_ROW: Rgb = Rgb(245, 245, 245);
const PLAIN_ROW: Rgb = Rgb(255, 255, 255);
const TABLE_COLUMNS: [&str; 3] = ["Company", "Status", "Risk (%)"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Face {
    Regular,
    Bold,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn to_color(self) -> Color {
        let unit = |c: u8| c as f32 / 255.0;
        Color::Rgb(printpdf::Rgb::new(unit(self.0), unit(self.1), unit(self.2), None))
    }
}

/// One drawing instruction; `y` grows downwards from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<Rgb>,
        border: bool,
    },
    Text {
        x: f32,
        baseline: f32,
        face: Face,
        size: f32,
        color: Rgb,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PageLayout {
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

#[derive(Clone, Copy)]
struct CellStyle {
    face: Face,
    size: f32,
    color: Rgb,
    fill: Option<Rgb>,
    border: bool,
    align: Align,
}

/// Cursor flowing content down the page, breaking onto new pages.
struct Layout {
    finished: Vec<PageLayout>,
    page: PageLayout,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            page: PageLayout::default(),
            y: MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.page));
        self.y = MARGIN;
    }

    fn skip(&mut self, height: f32) {
        self.y += height;
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= PAGE_BREAK_Y
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.finished.push(self.page);
        self.finished
    }

    /// Full-width line of centred text.
    fn centered_line(&mut self, text: &str, face: Face, size: f32, height: f32) {
        if !self.fits(height) {
            self.new_page();
        }
        let style = CellStyle {
            face,
            size,
            color: BLACK,
            fill: None,
            border: false,
            align: Align::Center,
        };
        self.cell(MARGIN, PAGE_WIDTH_MM - 2.0 * MARGIN, height, text, style);
        self.y += height;
    }

    fn cell(&mut self, x: f32, w: f32, h: f32, text: &str, style: CellStyle) {
        let y = self.y;
        if style.fill.is_some() || style.border {
            self.page.ops.push(DrawOp::Rect {
                x,
                y,
                w,
                h,
                fill: style.fill,
                border: style.border,
            });
        }
        let text = fit_text(&printable(text), style.face, style.size, w - 2.0 * CELL_PADDING);
        let text_x = match style.align {
            Align::Left => x + CELL_PADDING,
            Align::Center => x + (w - text_width_mm(&text, style.face, style.size)).max(0.0) / 2.0,
        };
        self.page.ops.push(DrawOp::Text {
            x: text_x,
            baseline: y + h / 2.0 + 0.3 * points_to_mm(style.size),
            face: style.face,
            size: style.size,
            color: style.color,
            text,
        });
    }

    fn table_header(&mut self) {
        let style = CellStyle {
            face: Face::Bold,
            size: BODY_SIZE,
            color: BLACK,
            fill: None,
            border: true,
            align: Align::Center,
        };
        for (i, title) in TABLE_COLUMNS.iter().enumerate() {
            let x = MARGIN + i as f32 * COLUMN_WIDTH;
            self.cell(x, COLUMN_WIDTH, HEADER_HEIGHT, title, style);
        }
        self.y += HEADER_HEIGHT;
    }

    fn table_row(&mut self, index: usize, result: &PredictionResult) {
        if !self.fits(ROW_HEIGHT) {
            self.new_page();
            self.table_header();
        }
        let style = CellStyle {
            face: Face::Regular,
            size: ROW_SIZE,
            color: match result.status {
                HealthStatus::Healthy => HEALTHY_TEXT,
                HealthStatus::Distressed => DISTRESSED_TEXT,
            },
            fill: Some(if index % 2 == 1 { SHADED_ROW } else { PLAIN_ROW }),
            border: true,
            align: Align::Left,
        };
        let cells = [
            result.company.clone(),
            result.status.to_string(),
            format!("{:.2}", result.risk_probability),
        ];
        for (i, text) in cells.iter().enumerate() {
            let x = MARGIN + i as f32 * COLUMN_WIDTH;
            self.cell(x, COLUMN_WIDTH, ROW_HEIGHT, text, style);
        }
        self.y += ROW_HEIGHT;
    }
}

/// Lay out the finished batch page by page.
///
/// A batch without rows yields a single summary-only page.
pub(crate) fn layout_pages(report: &BatchReport, settings: &ReportSettings) -> Vec<PageLayout> {
    let mut layout = Layout::new();
    layout.centered_line(&settings.title, Face::Bold, TITLE_SIZE, LINE_HEIGHT);
    layout.skip(5.0);
    layout.centered_line(&summary_line(report), Face::Regular, BODY_SIZE, LINE_HEIGHT);
    layout.centered_line(&average_line(report), Face::Regular, BODY_SIZE, LINE_HEIGHT);
    layout.skip(10.0);

    if !report.results.is_empty() {
        if !layout.fits(HEADER_HEIGHT + ROW_HEIGHT) {
            layout.new_page();
        }
        layout.table_header();
        for (index, result) in report.results.iter().enumerate() {
            layout.table_row(index, result);
        }
        layout.skip(10.0);
    }

    for line in settings.footer.lines() {
        layout.centered_line(line, Face::Oblique, ROW_SIZE, FOOTER_LINE_HEIGHT);
    }
    layout.finish()
}

/// Render the finished batch as a PDF document.
pub fn render_pdf(report: &BatchReport, settings: &ReportSettings) -> Result<Vec<u8>, PipelineError> {
    let pages = layout_pages(report, settings);
    let bytes = write_pdf(&settings.title, &pages).map_err(|reason| PipelineError::Render {
        what: "PDF report",
        reason,
    })?;
    tracing::debug!(pages = pages.len(), bytes = bytes.len(), "Rendered PDF report");
    Ok(bytes)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Oblique => &self.oblique,
        }
    }
}

fn write_pdf(title: &str, pages: &[PageLayout]) -> Result<Vec<u8>, String> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
    let builtin = |font: BuiltinFont| doc.add_builtin_font(font).map_err(|err| err.to_string());
    let fonts = Fonts {
        regular: builtin(BuiltinFont::Helvetica)?,
        bold: builtin(BuiltinFont::HelveticaBold)?,
        oblique: builtin(BuiltinFont::HelveticaOblique)?,
    };
    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, page, &fonts);
    }
    doc.save_to_bytes().map_err(|err| err.to_string())
}

fn draw_page(layer: &PdfLayerReference, page: &PageLayout, fonts: &Fonts) {
    layer.set_outline_color(BLACK.to_color());
    layer.set_outline_thickness(BORDER_WIDTH_PT);
    for op in &page.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                w,
                h,
                fill,
                border,
            } => {
                let mode = match (fill, border) {
                    (Some(_), true) => PaintMode::FillStroke,
                    (Some(_), false) => PaintMode::Fill,
                    (None, true) => PaintMode::Stroke,
                    (None, false) => continue,
                };
                if let Some(fill) = fill {
                    layer.set_fill_color(fill.to_color());
                }
                let rect = Rect::new(
                    Mm(*x),
                    Mm(PAGE_HEIGHT_MM - y - h),
                    Mm(x + w),
                    Mm(PAGE_HEIGHT_MM - y),
                );
                layer.add_rect(rect.with_mode(mode));
            }
            DrawOp::Text {
                x,
                baseline,
                face,
                size,
                color,
                text,
            } => {
                layer.set_fill_color(color.to_color());
                layer.use_text(text.as_str(), *size, Mm(*x), Mm(PAGE_HEIGHT_MM - baseline), fonts.get(*face));
            }
        }
    }
}

pub(crate) fn summary_line(report: &BatchReport) -> String {
    format!(
        "Summary: {} Healthy | {} At Risk",
        report.summary.healthy_count, report.summary.distressed_count
    )
}

pub(crate) fn average_line(report: &BatchReport) -> String {
    match report.summary.average_health_score {
        Some(score) => format!("Average Health Score: {score:.2}%"),
        None => "Average Health Score: n/a".to_string(),
    }
}

fn points_to_mm(size: f32) -> f32 {
    size * 25.4 / 72.0
}

/// Built-in fonts only cover single-byte text; anything else prints as `?`.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

fn text_width_mm(text: &str, face: Face, size: f32) -> f32 {
    let em = match face {
        Face::Bold => AVG_BOLD_GLYPH_EM,
        Face::Regular | Face::Oblique => AVG_GLYPH_EM,
    };
    text.chars().count() as f32 * em * points_to_mm(size)
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width` mm.
fn fit_text(text: &str, face: Face, size: f32, max_width: f32) -> String {
    if text_width_mm(text, face, size) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "...";
        if text_width_mm(&candidate, face, size) <= max_width {
            return candidate;
        }
    }
    String::new()
}
