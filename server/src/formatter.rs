//! Report rendering for simulation results.
//!
//! Produces the human-readable report (parameter echo, headline numbers,
//! ASCII plot, sampled points) followed by the machine-parsable trajectory
//! block consumed by plotting front-ends. The whole report is a pure
//! function of the result, reproducible byte-for-byte.

use crate::calculator::{SimulationResult, TrajectorySample};
use shared::protocol::{TRAJECTORY_DATA_END, TRAJECTORY_DATA_START};

const GRAPH_WIDTH: usize = 60;
const GRAPH_HEIGHT: usize = 20;

/// Renders the full text report for one simulation result.
pub fn format_report(result: &SimulationResult) -> String {
    let mut report = String::new();

    report.push_str("===== RISULTATI SIMULAZIONE =====\n\n");

    report.push_str(&format!(
        "PARAMETRI: v0={:.1} m/s, angle={:.1}°, mass={:.3} kg, Cd={:.3}\n\n",
        result.params.speed, result.params.angle_deg, result.params.mass, result.params.drag_coeff
    ));

    report.push_str("RISULTATI:\n");
    report.push_str(&format!("  - Gittata:      {:.2} m\n", result.max_range));
    report.push_str(&format!("  - Altezza max:  {:.2} m\n", result.max_height));
    report.push_str(&format!("  - Tempo volo:   {:.2} s\n\n", result.flight_time));

    report.push_str("TRAIETTORIA:\n");
    report.push_str(&ascii_graph(
        &result.samples,
        result.max_range,
        result.max_height,
    ));
    report.push('\n');

    report.push_str("PUNTI CAMPIONATI:\n");
    let count = result.samples.len();
    for (i, sample) in result.samples.iter().enumerate() {
        if i < 10 || i >= count.saturating_sub(3) || i % 5 == 0 {
            report.push_str(&format!(
                "  t={:.1}s: ({:.2}, {:.2})\n",
                sample.t, sample.x, sample.y
            ));
        }
    }

    report.push_str("\n==================================\n");

    report.push_str(TRAJECTORY_DATA_START);
    report.push('\n');
    report.push_str(&format!(
        "PARAMS:{:.2},{:.2},{:.3},{:.3}\n",
        result.params.speed, result.params.angle_deg, result.params.mass, result.params.drag_coeff
    ));
    report.push_str(&format!(
        "RESULTS:{:.2},{:.2},{:.2}\n",
        result.max_range, result.max_height, result.flight_time
    ));
    report.push_str("POINTS:");
    let points: Vec<String> = result
        .samples
        .iter()
        .map(|s| format!("{:.2},{:.2},{:.2}", s.x, s.y, s.t))
        .collect();
    report.push_str(&points.join(";"));
    report.push('\n');
    report.push_str(TRAJECTORY_DATA_END);

    report
}

/// Draws the trajectory onto a fixed-size character grid with axes and
/// scale labels.
fn ascii_graph(samples: &[TrajectorySample], max_range: f64, max_height: f64) -> String {
    let mut grid = vec![vec![' '; GRAPH_WIDTH]; GRAPH_HEIGHT];

    let x_scale = if max_range > 0.0 {
        (GRAPH_WIDTH as f64 - 5.0) / max_range
    } else {
        1.0
    };
    let y_scale = if max_height > 0.0 {
        (GRAPH_HEIGHT as f64 - 3.0) / max_height
    } else {
        1.0
    };

    // Axes: vertical at column 3, horizontal on the penultimate row.
    for row in grid.iter_mut().take(GRAPH_HEIGHT - 1) {
        row[3] = '|';
    }
    for col in 3..GRAPH_WIDTH {
        grid[GRAPH_HEIGHT - 2][col] = '-';
    }
    grid[GRAPH_HEIGHT - 2][3] = '+';

    for sample in samples {
        let gx = 4 + (sample.x * x_scale) as i64;
        let gy = GRAPH_HEIGHT as i64 - 3 - (sample.y * y_scale) as i64;

        if (4..GRAPH_WIDTH as i64).contains(&gx) && (0..GRAPH_HEIGHT as i64 - 2).contains(&gy) {
            grid[gy as usize][gx as usize] = '*';
        }
    }

    let max_y_label = format!("{:.0}", max_height);
    if max_y_label.len() <= 3 {
        for (i, ch) in max_y_label.chars().enumerate() {
            grid[1][i] = ch;
        }
    }

    let max_x_label = format!("{:.0}m", max_range);
    let label_col = (GRAPH_WIDTH.saturating_sub(max_x_label.len())).min(GRAPH_WIDTH - 5);
    for (i, ch) in max_x_label.chars().enumerate() {
        if label_col + i < GRAPH_WIDTH {
            grid[GRAPH_HEIGHT - 1][label_col + i] = ch;
        }
    }

    grid[GRAPH_HEIGHT - 1][3] = '0';

    for (i, ch) in "Y(m".chars().enumerate() {
        grid[0][i] = ch;
    }
    for (i, ch) in "X(m)".chars().enumerate() {
        grid[GRAPH_HEIGHT - 1][5 + i] = ch;
    }

    let mut out = String::new();
    for row in &grid {
        out.extend(row.iter());
        out.push('\n');
    }
    out
}
