//! SVG charts of sector return distributions
//!
//! Drawing only: every number plotted comes from a [`SectorDistribution`]
//! computed by the analysis pipeline.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use ag_sector_risk::{SectorDistribution, VarMarker, VarMethod};

const PANEL_WIDTH: f64 = 576.0;
const PANEL_HEIGHT: f64 = 288.0;
const PADDING: f64 = 36.0;
const X_TICKS: usize = 5;

const HIST_FILL: &str = "#9ecae1";
const PDF_COLOR: &str = "#348dc1";
const CDF_COLOR: &str = "#348dc1";
const VAR95_COLOR: &str = "#ff9933";
const VAR99_COLOR: &str = "#d62728";
const OTHER_LEVEL_COLOR: &str = "#8c8c8c";
const AXIS_COLOR: &str = "#cccccc";
const SECTOR_COLORS: [&str; 6] = ["#348dc1", "#ff9933", "#2ca02c", "#9467bd", "#8c564b", "#e377c2"];

pub const DISTRIBUTIONS_FILE: &str = "distributions.svg";
pub const COMPARISON_FILE: &str = "var_comparison.svg";

/// Plot area of one panel inside a larger document
struct Panel {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Panel {
    fn at(column: usize, row: usize, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            left: column as f64 * PANEL_WIDTH,
            top: row as f64 * PANEL_HEIGHT,
            width: PANEL_WIDTH,
            height: PANEL_HEIGHT,
            x_range: widen(x_range),
            y_range: widen(y_range),
        }
    }

    fn x(&self, value: f64) -> f64 {
        let (lo, hi) = self.x_range;
        self.left + PADDING + (value - lo) / (hi - lo) * (self.width - 2.0 * PADDING)
    }

    fn y(&self, value: f64) -> f64 {
        let (lo, hi) = self.y_range;
        self.top + PADDING + (1.0 - (value - lo) / (hi - lo)) * (self.height - 2.0 * PADDING)
    }

    fn bottom(&self) -> f64 {
        self.top + self.height - PADDING
    }

    fn title(&self, svg: &mut String, text: &str) {
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="12" fill="#333">{text}</text>"##,
            x = self.left + self.width / 2.0,
            y = self.top + PADDING / 2.0,
            text = escape(text)
        ));
    }

    fn x_axis(&self, svg: &mut String) {
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1" />"#,
            x1 = self.left + PADDING,
            x2 = self.left + self.width - PADDING,
            y = self.bottom(),
            color = AXIS_COLOR
        ));
        let (lo, hi) = self.x_range;
        for i in 0..=X_TICKS {
            let value = lo + (hi - lo) * i as f64 / X_TICKS as f64;
            svg.push_str(&format!(
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
                x = self.x(value),
                y = self.bottom() + 14.0,
                label = format_percentage(value)
            ));
        }
    }

    fn vertical_line(&self, svg: &mut String, value: f64, color: &str, width: f64, dash: &str) {
        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{color}" stroke-width="{width}" stroke-dasharray="{dash}" />"#,
            x = self.x(value),
            y1 = self.top + PADDING,
            y2 = self.bottom(),
            color = color,
            width = width,
            dash = dash
        ));
    }

    fn curve(&self, svg: &mut String, xs: &[f64], ys: &[f64], color: &str) {
        let points: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (self.x(x), self.y(y)))
            .collect();
        svg.push_str(&polyline(&points, color));
    }
}

struct LegendEntry {
    label: String,
    color: &'static str,
    width: f64,
    dash: &'static str,
}

fn svg_header(width: f64, height: f64) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style><rect width="100%" height="100%" fill="white" />"#,
        w = width,
        h = height
    )
}

fn svg_footer() -> &'static str {
    "</svg>"
}

fn polyline(points: &[(f64, f64)], stroke: &str) -> String {
    if points.is_empty() {
        return String::new();
    }

    let coords: Vec<String> = points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect();
    format!(
        r#"<polyline fill="none" stroke="{stroke}" stroke-width="1.5" points="{points}" />"#,
        stroke = stroke,
        points = coords.join(" ")
    )
}

fn draw_legend(svg: &mut String, panel: &Panel, entries: &[LegendEntry]) {
    let x = panel.left + PADDING + 10.0;
    let mut y = panel.top + PADDING + 14.0;
    for entry in entries {
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="{width}" stroke-dasharray="{dash}" />"#,
            x1 = x,
            x2 = x + 20.0,
            y = y - 4.0,
            color = entry.color,
            width = entry.width,
            dash = entry.dash
        ));
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="start" fill="#333">{label}</text>"##,
            x = x + 26.0,
            y = y,
            label = escape(&entry.label)
        ));
        y += 14.0;
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        let adjust = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        (lo - adjust, hi + adjust)
    }
}

fn level_color(confidence_level: f64) -> &'static str {
    if (confidence_level - 0.95).abs() < 1e-9 {
        VAR95_COLOR
    } else if (confidence_level - 0.99).abs() < 1e-9 {
        VAR99_COLOR
    } else {
        OTHER_LEVEL_COLOR
    }
}

fn method_dash(method: VarMethod) -> &'static str {
    match method {
        VarMethod::Parametric => "6 3",
        VarMethod::Historical => "6 3 1 3",
    }
}

fn method_label(method: VarMethod) -> &'static str {
    match method {
        VarMethod::Parametric => "normal",
        VarMethod::Historical => "historical",
    }
}

fn marker_label(marker: &VarMarker) -> String {
    format!(
        "VaR {:.0}% {} ({})",
        marker.confidence_level * 100.0,
        method_label(marker.method),
        format_percentage(marker.value)
    )
}

fn histogram_panel(svg: &mut String, dist: &SectorDistribution, column: usize) {
    let hist = &dist.histogram;
    let y_max = hist
        .density
        .iter()
        .chain(dist.curves.pdf.iter())
        .fold(0.0_f64, |acc, &v| acc.max(v));
    let panel = Panel::at(column, 0, dist.x_range(), (0.0, y_max * 1.05));

    panel.title(svg, &format!("{} daily log returns", dist.sector));
    for (density, edge) in hist.density.iter().zip(hist.edges.windows(2)) {
        if *density <= 0.0 {
            continue;
        }
        let x0 = panel.x(edge[0]);
        let y0 = panel.y(*density);
        svg.push_str(&format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" fill-opacity="0.7" />"#,
            x = x0,
            y = y0,
            w = (panel.x(edge[1]) - x0).max(0.5),
            h = panel.bottom() - y0,
            fill = HIST_FILL
        ));
    }
    panel.curve(svg, &dist.curves.x, &dist.curves.pdf, PDF_COLOR);
    panel.x_axis(svg);
    draw_legend(
        svg,
        &panel,
        &[
            LegendEntry {
                label: "empirical density".to_string(),
                color: HIST_FILL,
                width: 6.0,
                dash: "0",
            },
            LegendEntry {
                label: "normal PDF".to_string(),
                color: PDF_COLOR,
                width: 1.5,
                dash: "0",
            },
        ],
    );
}

fn cdf_panel(svg: &mut String, dist: &SectorDistribution, column: usize) {
    let panel = Panel::at(column, 1, dist.x_range(), (0.0, 1.0));

    panel.title(svg, &format!("{} normal CDF and VaR", dist.sector));
    panel.curve(svg, &dist.curves.x, &dist.curves.cdf, CDF_COLOR);

    let mut legend = vec![LegendEntry {
        label: "normal CDF".to_string(),
        color: CDF_COLOR,
        width: 1.5,
        dash: "0",
    }];
    for marker in dist.markers.iter() {
        let color = level_color(marker.confidence_level);
        let dash = method_dash(marker.method);
        panel.vertical_line(svg, marker.value, color, 1.5, dash);
        legend.push(LegendEntry {
            label: marker_label(marker),
            color,
            width: 1.5,
            dash,
        });
    }
    panel.x_axis(svg);
    draw_legend(svg, &panel, &legend);
}

/// Two rows per sector column: histogram with normal PDF, normal CDF with VaR lines
pub fn render_distributions(distributions: &[SectorDistribution]) -> String {
    let columns = distributions.len().max(1);
    let mut svg = svg_header(PANEL_WIDTH * columns as f64, PANEL_HEIGHT * 2.0);
    for (column, dist) in distributions.iter().enumerate() {
        histogram_panel(&mut svg, dist, column);
        cdf_panel(&mut svg, dist, column);
    }
    svg.push_str(svg_footer());
    svg
}

/// Every sector's normal CDF overlaid with its VaR lines
pub fn render_comparison(distributions: &[SectorDistribution]) -> String {
    let x_range = distributions
        .iter()
        .map(SectorDistribution::x_range)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
            (lo.min(a), hi.max(b))
        });
    let x_range = if x_range.0.is_finite() { x_range } else { (0.0, 0.0) };

    let mut svg = svg_header(PANEL_WIDTH * 1.5, PANEL_HEIGHT * 1.5);
    let panel = Panel {
        left: 0.0,
        top: 0.0,
        width: PANEL_WIDTH * 1.5,
        height: PANEL_HEIGHT * 1.5,
        x_range: widen(x_range),
        y_range: (0.0, 1.0),
    };
    panel.title(&mut svg, "Value at Risk comparison");

    let mut legend = Vec::new();
    for (i, dist) in distributions.iter().enumerate() {
        let color = SECTOR_COLORS[i % SECTOR_COLORS.len()];
        panel.curve(&mut svg, &dist.curves.x, &dist.curves.cdf, color);
        legend.push(LegendEntry {
            label: format!("{} normal CDF", dist.sector),
            color,
            width: 1.5,
            dash: "0",
        });

        for marker in dist.markers.iter() {
            let width = if marker.confidence_level >= 0.99 { 2.0 } else { 1.0 };
            let dash = method_dash(marker.method);
            panel.vertical_line(&mut svg, marker.value, color, width, dash);
            legend.push(LegendEntry {
                label: format!("{} {}", dist.sector, marker_label(marker)),
                color,
                width,
                dash,
            });
        }
    }
    panel.x_axis(&mut svg);
    draw_legend(&mut svg, &panel, &legend);
    svg.push_str(svg_footer());
    svg
}

/// Write both charts into `dir`, creating it if needed
pub fn write_charts(dir: &Path, distributions: &[SectorDistribution]) -> Result<Vec<PathBuf>> {
    if distributions.is_empty() {
        bail!("no sector distributions to draw");
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let charts = [
        (DISTRIBUTIONS_FILE, render_distributions(distributions)),
        (COMPARISON_FILE, render_comparison(distributions)),
    ];
    let mut written = Vec::with_capacity(charts.len());
    for (name, svg) in charts {
        let path = dir.join(name);
        fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
