//! Log-log comparison charts rendered as standalone SVG.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use wmp_core::errors::WmpError;
use wmp_core::Reaction;

use crate::config::PlotConfig;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 80.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;

const CANDIDATE_COLOR: &str = "#008000";
const REFERENCE_COLOR: &str = "#0000ff";
const ERROR_COLOR: &str = "#ff0000";

/// Curves for one channel chart.
#[derive(Debug, Clone, Copy)]
pub struct PlotRequest<'a> {
    /// Canonical nuclide name.
    pub nuclide: &'a str,
    /// Channel plotted.
    pub reaction: Reaction,
    /// Temperature as written into artefact names.
    pub temperature_tag: &'a str,
    /// Grid energies (eV).
    pub energy: &'a [f64],
    /// Multipole cross sections.
    pub candidate: &'a [f64],
    /// Reference cross sections.
    pub reference: &'a [f64],
    /// Relative error curve.
    pub relative: &'a [f64],
}

/// Produces chart artefacts.
pub trait PlotRenderer {
    /// Renders one chart and returns its path.
    fn render(&self, request: &PlotRequest<'_>) -> Result<PathBuf, WmpError>;
}

/// Writes `<nuclide>_validation_<T>K_<reaction>.svg` files.
#[derive(Debug, Clone)]
pub struct SvgPlotRenderer {
    out_dir: PathBuf,
    config: PlotConfig,
}

impl SvgPlotRenderer {
    /// Renderer writing into `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>, config: PlotConfig) -> Self {
        Self {
            out_dir: out_dir.into(),
            config,
        }
    }
}

impl PlotRenderer for SvgPlotRenderer {
    fn render(&self, request: &PlotRequest<'_>) -> Result<PathBuf, WmpError> {
        let path = self.out_dir.join(format!(
            "{}_validation_{}K_{}.svg",
            request.nuclide, request.temperature_tag, request.reaction
        ));
        let svg = render_svg(request, &self.config);
        fs::write(&path, svg).map_err(|err| WmpError::io("plot_write", &path, err))?;
        Ok(path)
    }
}

/// Decade range `[floor(log10 min), ceil(log10 max)]` over positive values.
fn decade_range<'a>(series: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let (lo, hi) = series
        .into_iter()
        .filter(|value| **value > 0.0 && value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
            (lo.min(*value), hi.max(*value))
        });
    if !lo.is_finite() {
        return None;
    }
    let lo = lo.log10().floor();
    let mut hi = hi.log10().ceil();
    if hi <= lo {
        hi = lo + 1.0;
    }
    Some((lo, hi))
}

struct Axes {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    x_range: (f64, f64),
}

impl Axes {
    fn x(&self, energy: f64) -> f64 {
        let t = (energy.log10() - self.x_range.0) / (self.x_range.1 - self.x_range.0);
        self.x0 + t * (self.x1 - self.x0)
    }

    fn y(&self, value: f64, range: (f64, f64)) -> f64 {
        let t = (value.log10() - range.0) / (range.1 - range.0);
        self.y1 - t * (self.y1 - self.y0)
    }
}

/// Polylines for a series, broken wherever a value cannot be drawn on a log
/// axis.
fn polylines(
    svg: &mut String,
    axes: &Axes,
    energy: &[f64],
    values: &[f64],
    range: (f64, f64),
    style: &str,
) {
    let mut segment = String::new();
    let flush = |segment: &mut String, svg: &mut String| {
        if segment.trim().contains(' ') {
            let _ = write!(svg, "<polyline fill='none' {style} points='{}' />", segment.trim());
        }
        segment.clear();
    };
    for (energy, value) in energy.iter().zip(values) {
        if *value > 0.0 && value.is_finite() {
            let _ = write!(
                segment,
                "{:.2},{:.2} ",
                axes.x(*energy),
                axes.y(*value, range)
            );
        } else {
            flush(&mut segment, svg);
        }
    }
    flush(&mut segment, svg);
}

/// Renders a dual-axis log-log chart: cross sections against the left axis,
/// relative error against the right axis.
pub fn render_svg(request: &PlotRequest<'_>, config: &PlotConfig) -> String {
    let width = f64::from(config.width);
    let height = f64::from(config.height);
    let title = format!(
        "{} {} xs {}K",
        request.nuclide, request.reaction, request.temperature_tag
    );
    let mut svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' font-family='sans-serif' font-size='12'>",
        w = config.width,
        h = config.height
    );
    let _ = write!(
        svg,
        "<rect width='{width}' height='{height}' fill='#ffffff' /><text x='{:.2}' y='24' text-anchor='middle' font-size='14'>{title}</text>",
        width / 2.0
    );

    let x_range = decade_range(request.energy);
    let xs_range = decade_range(request.candidate.iter().chain(request.reference));
    let (Some(x_range), Some(xs_range)) = (x_range, xs_range) else {
        svg.push_str("</svg>");
        return svg;
    };
    let err_range = decade_range(request.relative).unwrap_or((-1.0, 0.0));
    let axes = Axes {
        x0: MARGIN_LEFT,
        x1: width - MARGIN_RIGHT,
        y0: MARGIN_TOP,
        y1: height - MARGIN_BOTTOM,
        x_range,
    };

    let _ = write!(
        svg,
        "<rect x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}' fill='none' stroke='#000000' />",
        axes.x0,
        axes.y0,
        axes.x1 - axes.x0,
        axes.y1 - axes.y0
    );
    for decade in (x_range.0 as i32)..=(x_range.1 as i32) {
        let x = axes.x(10f64.powi(decade));
        let _ = write!(
            svg,
            "<line x1='{x:.2}' y1='{:.2}' x2='{x:.2}' y2='{:.2}' stroke='#000000' /><text x='{x:.2}' y='{:.2}' text-anchor='middle'>1e{decade}</text>",
            axes.y1,
            axes.y1 + 5.0,
            axes.y1 + 18.0
        );
    }
    for decade in (xs_range.0 as i32)..=(xs_range.1 as i32) {
        let y = axes.y(10f64.powi(decade), xs_range);
        let _ = write!(
            svg,
            "<line x1='{:.2}' y1='{y:.2}' x2='{:.2}' y2='{y:.2}' stroke='{REFERENCE_COLOR}' /><text x='{:.2}' y='{:.2}' text-anchor='end' fill='{REFERENCE_COLOR}'>1e{decade}</text>",
            axes.x0 - 5.0,
            axes.x0,
            axes.x0 - 8.0,
            y + 4.0
        );
    }
    for decade in (err_range.0 as i32)..=(err_range.1 as i32) {
        let y = axes.y(10f64.powi(decade), err_range);
        let _ = write!(
            svg,
            "<line x1='{:.2}' y1='{y:.2}' x2='{:.2}' y2='{y:.2}' stroke='{ERROR_COLOR}' /><text x='{:.2}' y='{:.2}' fill='{ERROR_COLOR}'>1e{decade}</text>",
            axes.x1,
            axes.x1 + 5.0,
            axes.x1 + 8.0,
            y + 4.0
        );
    }

    polylines(
        &mut svg,
        &axes,
        request.energy,
        request.candidate,
        xs_range,
        &format!("stroke='{CANDIDATE_COLOR}'"),
    );
    polylines(
        &mut svg,
        &axes,
        request.energy,
        request.reference,
        xs_range,
        &format!("stroke='{REFERENCE_COLOR}'"),
    );
    polylines(
        &mut svg,
        &axes,
        request.energy,
        request.relative,
        err_range,
        &format!("stroke='{ERROR_COLOR}' stroke-opacity='0.5'"),
    );

    let _ = write!(
        svg,
        "<text x='{:.2}' y='{:.2}' text-anchor='middle'>energy (eV)</text>",
        (axes.x0 + axes.x1) / 2.0,
        height - 16.0
    );
    let mid_y = (axes.y0 + axes.y1) / 2.0;
    let _ = write!(
        svg,
        "<text transform='translate(18 {mid_y:.2}) rotate(-90)' text-anchor='middle' fill='{REFERENCE_COLOR}'>cross section (b)</text>"
    );
    let _ = write!(
        svg,
        "<text transform='translate({:.2} {mid_y:.2}) rotate(90)' text-anchor='middle' fill='{ERROR_COLOR}'>relative error</text>",
        width - 18.0
    );

    let legend = [
        ("WMP xs", CANDIDATE_COLOR),
        ("ACE xs", REFERENCE_COLOR),
        ("rel. err.", ERROR_COLOR),
    ];
    for (idx, (label, color)) in legend.iter().enumerate() {
        let y = axes.y0 + 16.0 + idx as f64 * 16.0;
        let x = axes.x1 - 90.0;
        let _ = write!(
            svg,
            "<line x1='{x:.2}' y1='{y:.2}' x2='{:.2}' y2='{y:.2}' stroke='{color}' /><text x='{:.2}' y='{:.2}'>{label}</text>",
            x + 20.0,
            x + 26.0,
            y + 4.0
        );
    }
    svg.push_str("</svg>");
    svg
}
