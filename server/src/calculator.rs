//! Trajectory integration under gravity and quadratic drag.
//!
//! Fixed-step Euler integration of 2D projectile motion. The drag force is
//! `0.5 * rho * Cd * A * v^2` opposing the velocity vector, with fixed air
//! density and frontal area. Samples are recorded on a coarser interval
//! than the integration step so reports stay readable.

use shared::ProjectileParams;

const GRAVITY: f64 = 9.81; // m/s^2
const AIR_DENSITY: f64 = 1.225; // kg/m^3 at sea level
const FRONTAL_AREA: f64 = 0.01; // m^2
const TIME_STEP: f64 = 0.01; // s
const SAMPLE_INTERVAL: f64 = 0.1; // s

/// Runaway guard: simulated seconds after which integration stops.
const MAX_SIM_TIME: f64 = 1000.0;

/// One recorded point of the flight path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// Horizontal distance from the launch point, in meters.
    pub x: f64,
    /// Height above ground, in meters.
    pub y: f64,
    /// Elapsed simulated time, in seconds.
    pub t: f64,
}

/// Outcome of one simulation run.
///
/// Derived per request and owned by it; results are never cached or shared
/// across sessions.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub max_range: f64,
    pub max_height: f64,
    pub flight_time: f64,
    pub samples: Vec<TrajectorySample>,
    pub params: ProjectileParams,
}

/// Integrates the flight path for already-validated parameters.
///
/// The sample sequence starts at the origin, carries time-increasing
/// points clamped to non-negative height, and ends with a point at ground
/// level.
pub fn simulate(params: &ProjectileParams) -> SimulationResult {
    let angle_rad = params.angle_deg.to_radians();
    let mut vx = params.speed * angle_rad.cos();
    let mut vy = params.speed * angle_rad.sin();

    let mut x = 0.0;
    let mut y: f64 = 0.0;
    let mut t = 0.0;

    let mut max_height: f64 = 0.0;
    let mut last_sample_time = 0.0;
    let mut samples = vec![TrajectorySample {
        x: 0.0,
        y: 0.0,
        t: 0.0,
    }];

    while y >= 0.0 {
        let speed = (vx * vx + vy * vy).sqrt();

        if speed > 0.0 {
            let drag_force = 0.5 * AIR_DENSITY * params.drag_coeff * FRONTAL_AREA * speed * speed;
            let ax = -(drag_force * vx / speed) / params.mass;
            let ay = -GRAVITY - (drag_force * vy / speed) / params.mass;
            vx += ax * TIME_STEP;
            vy += ay * TIME_STEP;
        } else {
            vy -= GRAVITY * TIME_STEP;
        }

        x += vx * TIME_STEP;
        y += vy * TIME_STEP;
        t += TIME_STEP;

        max_height = max_height.max(y);

        if t - last_sample_time >= SAMPLE_INTERVAL {
            samples.push(TrajectorySample {
                x,
                y: y.max(0.0),
                t,
            });
            last_sample_time = t;
        }

        if t > MAX_SIM_TIME {
            break;
        }
    }

    // Close the path at ground level if the last sample predates impact.
    let needs_closing = samples.last().map_or(true, |s| s.t < t - TIME_STEP);
    if needs_closing {
        samples.push(TrajectorySample { x, y: 0.0, t });
    }

    SimulationResult {
        max_range: x,
        max_height,
        flight_time: t,
        samples,
        params: *params,
    }
}
