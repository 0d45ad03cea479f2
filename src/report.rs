use std::fmt;
use std::fmt::Formatter;
use std::io::BufWriter;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb};
use crate::chart::{BarChart, thousands};
use crate::models::NormalizedInput;

pub const REPORT_FILE_NAME: &str = "GreenOpt_Report.pdf";
pub const REPORT_MIME_TYPE: &str = "application/pdf";

// A4 landscape and the plot area within it, all in mm
const PAGE_WIDTH: f64 = 297.0;
const PAGE_HEIGHT: f64 = 210.0;
const PLOT_LEFT: f64 = 45.0;
const PLOT_RIGHT: f64 = 257.0;
const PLOT_BOTTOM: f64 = 40.0;
const PLOT_TOP: f64 = 170.0;
const BAR_WIDTH: f64 = 70.0;
const TICKS: usize = 5;

const PT_TO_MM: f64 = 0.3528;

#[derive(Debug)]
pub struct ReportError(pub String);
impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ReportError: {}", self.0)
    }
}
fn pdf_error<E: fmt::Debug>(e: E) -> ReportError {
    ReportError(format!("{:?}", e))
}

/// Renders the report chart into a single page PDF and returns the document bytes
///
/// # Arguments
///
/// * 'chart' - the bar chart to draw
/// * 'input' - location and capacity the estimate was made for, printed as a caption
pub fn render_report(chart: &BarChart, input: &NormalizedInput) -> Result<Vec<u8>, ReportError> {
    if !chart.value.is_finite() || chart.value <= 0.0 {
        return Err(ReportError(format!("can't draw a bar of height {}", chart.value)));
    }

    let (doc, page, layer) = PdfDocument::new(chart.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "chart");
    let layer = doc.get_page(page).get_layer(layer);
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

    let black = rgb(0.0, 0.0, 0.0);
    let grey = rgb(0.8, 0.8, 0.8);
    let y_max = axis_max(chart.value);
    let to_y = |value: f64| PLOT_BOTTOM + value / y_max * (PLOT_TOP - PLOT_BOTTOM);

    // Grid lines and y axis ticks
    layer.set_outline_thickness(0.5);
    for i in 0..=TICKS {
        let value = y_max * i as f64 / TICKS as f64;
        let y = to_y(value);
        layer.set_outline_color(if i == 0 { black.clone() } else { grey.clone() });
        layer.add_shape(polyline(&[(PLOT_LEFT, y), (PLOT_RIGHT, y)], false));

        layer.set_fill_color(black.clone());
        text_right(&layer, &regular, &thousands(value), 9.0, PLOT_LEFT - 2.0, y - 1.0);
    }
    layer.set_outline_color(black.clone());
    layer.add_shape(polyline(&[(PLOT_LEFT, PLOT_BOTTOM), (PLOT_LEFT, PLOT_TOP)], false));

    // The bar
    let center = (PLOT_LEFT + PLOT_RIGHT) / 2.0;
    let left = center - BAR_WIDTH / 2.0;
    let right = center + BAR_WIDTH / 2.0;
    let top = to_y(chart.value);
    layer.set_fill_color(hex_color(&chart.color)?);
    layer.add_shape(polygon(&[(left, PLOT_BOTTOM), (right, PLOT_BOTTOM), (right, top), (left, top)]));

    // Labels
    layer.set_fill_color(black);
    let overlay_y = to_y(chart.value * chart.annotation.height_ratio);
    text_centered(&layer, &bold, &chart.annotation.text, 12.0, center, overlay_y);
    text_centered(&layer, &regular, &chart.category, 11.0, center, PLOT_BOTTOM - 7.0);
    layer.use_text(chart.y_axis_label.as_str(), 10.0, Mm(PLOT_LEFT - 20.0), Mm(PLOT_TOP + 6.0), &regular);
    text_centered(&layer, &bold, &chart.title, 18.0, PAGE_WIDTH / 2.0, PAGE_HEIGHT - 22.0);

    let caption = format!(
        "Location {:.2}, {:.2} - system capacity {} kW",
        input.lat, input.lon, input.capacity_kw
    );
    text_centered(&layer, &regular, &caption, 9.0, PAGE_WIDTH / 2.0, 15.0);

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).map_err(pdf_error)?;

    writer.into_inner().map_err(pdf_error)
}

/// Returns a rounded upper limit for the y axis leaving some headroom above the bar
///
/// # Arguments
///
/// * 'value' - the bar value, must be positive
fn axis_max(value: f64) -> f64 {
    let target = value * 1.1;
    let magnitude = 10f64.powi(target.log10().floor() as i32);

    [1.0, 2.0, 2.5, 5.0, 10.0].iter()
        .map(|step| step * magnitude)
        .find(|limit| *limit >= target)
        .unwrap_or(10.0 * magnitude)
}

fn rgb(r: f64, g: f64, b: f64) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// Converts a css style color, e.g. "#10a674", to a pdf color
fn hex_color(hex: &str) -> Result<Color, ReportError> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ReportError(format!("malformed color '{}'", hex)));
    }

    let mut channels = [0.0f64; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|e| ReportError(format!("malformed color '{}': {}", hex, e)))?;
        *channel = byte as f64 / 255.0;
    }

    Ok(rgb(channels[0], channels[1], channels[2]))
}

fn polyline(points: &[(f64, f64)], closed: bool) -> Line {
    Line {
        points: points.iter().map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false)).collect(),
        is_closed: closed,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    }
}

fn polygon(points: &[(f64, f64)]) -> Line {
    Line {
        has_fill: true,
        has_stroke: false,
        ..polyline(points, true)
    }
}

/// Rough text width for the builtin Helvetica, which comes without metrics
fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.5 * PT_TO_MM
}

fn text_centered(layer: &PdfLayerReference, font: &IndirectFontRef, text: &str, size: f64, center_x: f64, y: f64) {
    layer.use_text(text, size, Mm(center_x - text_width(text, size) / 2.0), Mm(y), font);
}

fn text_right(layer: &PdfLayerReference, font: &IndirectFontRef, text: &str, size: f64, right_x: f64, y: f64) {
    layer.use_text(text, size, Mm(right_x - text_width(text, size)), Mm(y), font);
}
