use serde::Serialize;

use crate::color::{PointColor, legend_rank};
use crate::config::{PipelineConfig, Thresholds};
use crate::data::model::{Category, ClassifiedGene, SampleLabel};

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// One (gene, sample) point: x = CV, y = range, plus hover metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub gene: String,
    pub sample: SampleLabel,
    pub mean: Option<f64>,
    pub sd: Option<f64>,
    pub cv: Option<f64>,
    pub range: Option<f64>,
    pub category: Category,
    pub color: PointColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSymbol {
    Circle,
    Square,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: f64,
    pub opacity: f64,
    pub symbol: MarkerSymbol,
    /// `#rrggbb`.
    pub color: String,
}

/// All points of one color, drawn as one scatter series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Legend label.
    pub name: String,
    pub color: PointColor,
    pub legend_rank: u32,
    pub render_priority: u8,
    pub marker: Marker,
    pub points: Vec<PlotPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub title_font_size: u32,
    pub tick_font_size: u32,
    pub show_grid: bool,
    pub grid_color: String,
    pub grid_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub x_anchor: String,
    pub y_anchor: String,
    pub background: String,
    pub font_size: u32,
    pub trace_order: String,
}

/// Dashed guide line at a threshold value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideLine {
    /// `"x"` for a vertical line, `"y"` for a horizontal one.
    pub axis: String,
    pub value: f64,
    pub dash: String,
    pub color: String,
    pub annotation: String,
    pub annotation_font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub title_font_size: u32,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub legend: Legend,
    pub paper_background: String,
    pub plot_background: String,
}

/// Everything the presentation layer needs to draw the scatter plot.
/// Traces are in draw order: later traces render on top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPayload {
    pub layout: Layout,
    pub guides: Vec<GuideLine>,
    pub hover_template: String,
    pub traces: Vec<Trace>,
}

impl PlotPayload {
    pub fn points(&self) -> impl Iterator<Item = &PlotPoint> {
        self.traces.iter().flat_map(|t| t.points.iter())
    }
}

/// Plot settings taken from the pipeline configuration.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub gene_label: String,
    pub thresholds: Thresholds,
}

impl From<&PipelineConfig> for PlotOptions {
    fn from(cfg: &PipelineConfig) -> Self {
        PlotOptions {
            title: cfg.plot_title.clone(),
            gene_label: cfg.gene_label.clone(),
            thresholds: cfg.thresholds,
        }
    }
}

// ---------------------------------------------------------------------------
// Styling tables
// ---------------------------------------------------------------------------

/// Static marker style keyed by legend label.
pub fn marker_style(label: &str) -> (f64, f64, MarkerSymbol) {
    match label {
        "Below Threshold" => (5.0, 0.7, MarkerSymbol::Circle),
        "Mfd<sup>−</sup>" | "YB955" => (10.0, 1.0, MarkerSymbol::Circle),
        "Common Genes" => (7.0, 1.0, MarkerSymbol::Square),
        _ => (5.0, 0.9, MarkerSymbol::Circle),
    }
}

fn axis(title: &str) -> Axis {
    Axis {
        title: title.to_string(),
        title_font_size: 22,
        tick_font_size: 20,
        show_grid: true,
        grid_color: "whitesmoke".to_string(),
        grid_width: 0.5,
    }
}

fn hover_template(gene_label: &str) -> String {
    format!(
        "<b>{gene_label}:</b> %{{customdata[0]}}<br>\
         <b>Sample:</b> %{{customdata[1]}}<br>\
         <b>Mean:</b> %{{customdata[2]:.2f}}<br>\
         <b>SD:</b> %{{customdata[3]:.2f}}<br>\
         <b>CV:</b> %{{x:.3f}}<br>\
         <b>Range:</b> %{{y:.0f}}<extra></extra>"
    )
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Partition every classified row into per-color traces, in draw order.
pub fn build_payload(genes: &[ClassifiedGene], opts: &PlotOptions) -> PlotPayload {
    let mut traces: Vec<Trace> = PointColor::TRACE_ORDER
        .into_iter()
        .filter_map(|color| {
            let points: Vec<PlotPoint> = genes
                .iter()
                .flat_map(|g| g.rows().map(move |(stat, c)| (g, stat, c)))
                .filter(|(_, _, c)| *c == color)
                .map(|(g, stat, c)| PlotPoint {
                    gene: stat.gene.clone(),
                    sample: stat.sample,
                    mean: stat.mean,
                    sd: stat.sd,
                    cv: stat.cv,
                    range: stat.range,
                    category: g.category,
                    color: c,
                })
                .collect();
            if points.is_empty() {
                return None;
            }
            let name = color.legend_label();
            let (size, opacity, symbol) = marker_style(name);
            Some(Trace {
                name: name.to_string(),
                color,
                legend_rank: legend_rank(name),
                render_priority: color.render_priority(),
                marker: Marker {
                    size,
                    opacity,
                    symbol,
                    color: color.hex(),
                },
                points,
            })
        })
        .collect();

    // Stable: equal priorities keep the initial trace order.
    traces.sort_by_key(|t| t.render_priority);

    let th = opts.thresholds;
    PlotPayload {
        layout: Layout {
            title: opts.title.clone(),
            title_font_size: 24,
            x_axis: axis("Coefficient of Variation (CV)"),
            y_axis: axis("Number of Reads (Range)"),
            legend: Legend {
                x: 0.95,
                y: 0.35,
                x_anchor: "right".to_string(),
                y_anchor: "bottom".to_string(),
                background: "rgba(255,255,255,0.8)".to_string(),
                font_size: 20,
                trace_order: "normal".to_string(),
            },
            paper_background: "rgba(0,0,0,0)".to_string(),
            plot_background: "rgba(0,0,0,0)".to_string(),
        },
        guides: vec![
            GuideLine {
                axis: "x".to_string(),
                value: th.cv,
                dash: "dash".to_string(),
                color: "black".to_string(),
                annotation: format!(" CV ≥ {}", th.cv),
                annotation_font_size: 15,
            },
            GuideLine {
                axis: "y".to_string(),
                value: th.range,
                dash: "dash".to_string(),
                color: "black".to_string(),
                annotation: format!("Range ≥ {}", th.range),
                annotation_font_size: 15,
            },
        ],
        hover_template: hover_template(&opts.gene_label),
        traces,
    }
}
