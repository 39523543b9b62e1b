//! Parser for the structured trajectory block embedded in a report.
//!
//! The block feeds plotting front-ends, which are decoupled from the
//! protocol: they only ever see the parsed data. Partial fragment
//! reassembly can truncate the block anywhere, so parsing is best-effort
//! throughout: missing lines leave fields unset and malformed point
//! triples are skipped.

use shared::protocol::{TRAJECTORY_DATA_END, TRAJECTORY_DATA_START};
use shared::ProjectileParams;

/// One plotted point of the trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

/// Headline numbers from the `RESULTS:` line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySummary {
    pub max_range: f64,
    pub max_height: f64,
    pub flight_time: f64,
}

/// Parsed structured block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrajectoryData {
    pub params: Option<ProjectileParams>,
    pub summary: Option<TrajectorySummary>,
    pub points: Vec<TrajectoryPoint>,
}

/// Extracts and parses the structured block from a full report.
///
/// Returns `None` only when the start marker is absent; a missing end
/// marker means the block was cut in transit and whatever survived is
/// parsed anyway.
pub fn parse(report: &str) -> Option<TrajectoryData> {
    let start = report.find(TRAJECTORY_DATA_START)?;
    let block = &report[start + TRAJECTORY_DATA_START.len()..];
    let block = match block.find(TRAJECTORY_DATA_END) {
        Some(end) => &block[..end],
        None => block,
    };

    let mut data = TrajectoryData::default();
    for line in block.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("PARAMS:") {
            if let Some([speed, angle_deg, mass, drag_coeff]) = parse_numbers::<4>(rest) {
                data.params = Some(ProjectileParams::new(speed, angle_deg, mass, drag_coeff));
            }
        } else if let Some(rest) = line.strip_prefix("RESULTS:") {
            if let Some([max_range, max_height, flight_time]) = parse_numbers::<3>(rest) {
                data.summary = Some(TrajectorySummary {
                    max_range,
                    max_height,
                    flight_time,
                });
            }
        } else if let Some(rest) = line.strip_prefix("POINTS:") {
            for triple in rest.split(';') {
                if let Some([x, y, t]) = parse_numbers::<3>(triple) {
                    data.points.push(TrajectoryPoint { x, y, t });
                }
            }
        }
    }

    Some(data)
}

/// Parses exactly `N` comma-separated numbers.
fn parse_numbers<const N: usize>(csv: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut fields = csv.split(',');
    for slot in &mut out {
        *slot = fields.next()?.trim().parse().ok()?;
    }
    if fields.next().is_some() {
        return None;
    }
    Some(out)
}
