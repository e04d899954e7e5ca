use serde_json::{Value, json};

use crate::site_analysis::SiteResult;
use crate::variability::TemporalOutcome;

const LINE_COLOR: &str = "#0E5A8A";

fn axis_title(text: &str) -> Value {
    json!({ "text": text, "font": { "size": 12 } })
}

/// Plotly figure description with the correlation field on top and the
/// lag autocorrelation below. Failed results have nothing to draw.
pub fn figure_spec(result: &SiteResult) -> Option<Value> {
    let analysis = result.analysis()?;

    let spatial = json!({
        "type": "contour",
        "z": analysis.spatial_corr,
        "x": analysis.longitudes,
        "y": analysis.latitudes,
        "xaxis": "x1",
        "yaxis": "y1",
        "colorscale": "plasma",
        "zmin": 0.5,
        "zmax": 1,
        "colorbar": { "title": "Corr", "thickness": 10 },
        "showlegend": false,
        "contours": {
            "showlabels": true,
            "labelfont": { "size": 6, "color": "black" }
        }
    });

    let (lags, corr) = match &analysis.temporal_corr {
        TemporalOutcome::Available { lags, corr, .. } => (lags.clone(), corr.clone()),
        TemporalOutcome::Unavailable { lags, .. } => (lags.clone(), Vec::new()),
    };
    let temporal = json!({
        "x": lags,
        "y": corr,
        "marker": { "color": LINE_COLOR },
        "xaxis": "x2",
        "yaxis": "y2",
        "showlegend": false
    });

    let title = format!("<b>{}</b>", result.site_name().replace('_', " "));

    Some(json!({
        "data": [spatial, temporal],
        "config": { "responsive": true },
        "layout": {
            "title": title,
            "grid": { "rows": 2, "columns": 1, "pattern": "independent" },
            "showlegend": false,
            "autosize": true,
            "width": 400,
            "xaxis": {
                "anchor": "y1",
                "nticks": 5,
                "tickfont": { "size": 10 },
                "title": axis_title("Longitude")
            },
            "yaxis": {
                "anchor": "x1",
                "domain": [0.4, 1],
                "nticks": 5,
                "scaleratio": 1,
                "tickfont": { "size": 10 },
                "title": axis_title("Latitude")
            },
            "xaxis2": {
                "anchor": "y2",
                "tickfont": { "size": 10 },
                "title": axis_title("Lag (Minutes)")
            },
            "yaxis2": {
                "domain": [0, 0.2],
                "rangemode": "tozero",
                "tickfont": { "size": 10 },
                "title": axis_title("Correlation")
            }
        }
    }))
}
