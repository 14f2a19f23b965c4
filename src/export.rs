use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::step_fusion::{DisplaySink, FusionSnapshot};
use crate::types::{Position, PositionSource};

/// Display sink that keeps everything it is shown.
#[derive(Debug, Clone, Default)]
pub struct TrackRecorder {
    points: Vec<Position>,
    step_label: Option<u64>,
}

impl TrackRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    /// Last step count shown, `None` before the first committed step.
    pub fn step_label(&self) -> Option<u64> {
        self.step_label
    }

    pub fn into_points(self) -> Vec<Position> {
        self.points
    }
}

impl DisplaySink for TrackRecorder {
    fn set_user_position(&mut self, position: Position) {
        self.points.push(position);
    }

    fn set_step_counter_label(&mut self, count: u64) {
        self.step_label = Some(count);
    }
}

/// Complete track export (JSON-serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackExport {
    pub name: String,
    pub exported_at: String,
    pub summary: FusionSnapshot,
    pub points: Vec<Position>,
}

impl TrackExport {
    pub fn new(name: &str, summary: FusionSnapshot, points: Vec<Position>) -> Self {
        Self {
            name: name.to_string(),
            exported_at: Utc::now().to_rfc3339(),
            summary,
            points,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// GPX track format for mapping applications
#[derive(Debug, Serialize)]
pub struct GpxTrack {
    pub name: String,
    pub description: String,
    pub track_points: Vec<GpxPoint>,
}

#[derive(Debug, Serialize)]
pub struct GpxPoint {
    pub lat: f64,
    pub lon: f64,
    pub time: String,
    pub kind: &'static str,
    pub hdop: Option<f64>,
}

impl GpxTrack {
    /// Generate GPX 1.1 document XML string
    pub fn to_gpx_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<gpx version=\"1.1\" creator=\"StrideTracker\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n");
        xml.push_str("  <metadata>\n");
        xml.push_str(&format!("    <name>{}</name>\n", escape(&self.name)));
        xml.push_str(&format!("    <desc>{}</desc>\n", escape(&self.description)));
        xml.push_str("  </metadata>\n");
        xml.push_str("  <trk>\n");
        xml.push_str(&format!("    <name>{}</name>\n", escape(&self.name)));
        xml.push_str("    <trkseg>\n");

        for point in &self.track_points {
            xml.push_str(&format!("      <trkpt lat=\"{}\" lon=\"{}\">\n", point.lat, point.lon));
            xml.push_str(&format!("        <time>{}</time>\n", point.time));
            xml.push_str(&format!("        <type>{}</type>\n", point.kind));
            if let Some(hdop) = point.hdop {
                xml.push_str(&format!("        <hdop>{hdop:.1}</hdop>\n"));
            }
            xml.push_str("      </trkpt>\n");
        }

        xml.push_str("    </trkseg>\n");
        xml.push_str("  </trk>\n");
        xml.push_str("</gpx>\n");

        xml
    }
}

/// Create a GPX track from displayed positions.
///
/// Position timestamps are monotonic milliseconds; they are placed on the wall
/// clock relative to `start`, which stands for the first point. Points whose
/// offset cannot be represented as a wall-clock time are skipped.
pub fn create_gpx_track(name: &str, start: DateTime<Utc>, positions: &[Position]) -> GpxTrack {
    let first_ts = positions.first().map(|p| p.timestamp_ms).unwrap_or(0);
    let track_points: Vec<GpxPoint> = positions
        .iter()
        .filter_map(|position| {
            let offset = position
                .timestamp_ms
                .checked_sub(first_ts)
                .and_then(Duration::try_milliseconds)?;
            let time = start.checked_add_signed(offset)?.to_rfc3339();
            let (kind, hdop) = match position.source {
                // Approximate HDOP from accuracy
                PositionSource::Gps { accuracy_m } => ("gps", Some(accuracy_m / 2.0)),
                PositionSource::Reckoned => ("reckoned", None),
            };
            Some(GpxPoint {
                lat: position.coordinate.latitude,
                lon: position.coordinate.longitude,
                time,
                kind,
                hdop,
            })
        })
        .collect();

    let skipped = positions.len() - track_points.len();
    if skipped > 0 {
        log::warn!("skipped {skipped} positions with out-of-range timestamps in GPX track {name}");
    }

    GpxTrack {
        name: name.to_string(),
        description: format!("{} positions from {}", track_points.len(), start.to_rfc3339()),
        track_points,
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
