//! SUMO additional-file writer
//!
//! Emits the collected points as `<containerStop>` and
//! `<chargingStation>` elements in registry insertion order. Field
//! order and numeric formatting are fixed so downstream consumers can
//! diff the output.

use chrono::Local;

use crate::registry::{Point, PointKind};

/// Fixed power attribute written for every charging station, in watts
const CHARGING_POWER: &str = "200000.00";

/// Renders the facility file with the current local time in the
/// generation comment.
pub fn write_facilities(points: &[Point]) -> String {
    render(points, &Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

fn render(points: &[Point], generated_at: &str) -> String {
    let mut output = String::new();
    output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    output.push_str(
        "<additional xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:noNamespaceSchemaLocation=\"http://sumo.dlr.de/xsd/additional_file.xsd\">\n",
    );
    output.push_str(&format!(
        "    <!-- Generated by lanesnap on {generated_at} -->\n"
    ));

    let mut stop_serial = 1u32;
    let mut charge_serial = 1u32;
    for point in points {
        match point.kind {
            PointKind::Stop => {
                output.push_str(&format!("    <containerStop id=\"{stop_serial}\""));
                stop_serial += 1;
            }
            PointKind::Charge => {
                output.push_str(&format!("    <chargingStation id=\"cs{charge_serial}\""));
                charge_serial += 1;
            }
        }
        if let Some(name) = &point.name {
            output.push_str(&format!(" name=\"{}\"", escape_xml(name)));
        }
        output.push_str(&format!(
            " lane=\"{}_0\" startPos=\"{}\" endPos=\"{}\"",
            escape_xml(&point.edge_id),
            format_pos(point.start_offset),
            format_pos(point.end_offset),
        ));
        if point.kind == PointKind::Charge {
            output.push_str(&format!(" power=\"{CHARGING_POWER}\""));
        }
        output.push_str("/>\n");
    }

    output.push_str("</additional>\n");
    output
}

fn format_pos(value: f64) -> String {
    format!("{value:.2}")
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
