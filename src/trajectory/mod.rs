//! Display-only projectile arcs. Each solution's elevation and range are
//! turned into a vacuum parabola; nothing here feeds back into solving.

use crate::config::{GRAVITY, TRAJECTORY_SAMPLES};
use crate::solution::FiringSolution;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryArc {
    pub charge: Option<u32>,
    pub label: String,
    /// Back-solved launch speed, m/s.
    pub launch_speed: f64,
    /// `[horizontal distance, height above gun]` pairs, meters.
    pub points: Vec<[f64; 2]>,
    pub max_height: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryPlot {
    pub arcs: Vec<TrajectoryArc>,
    pub max_height: f64,
    pub max_range: f64,
}

/// Launch speed that puts a projectile fired at `elevation_rad` through the
/// point `(range, height)`. `None` when no real speed exists.
pub fn launch_speed(elevation_rad: f64, range: f64, height: f64) -> Option<f64> {
    let cos = elevation_rad.cos();
    if range <= 0.0 || cos <= 0.0 {
        return None;
    }
    let disc = range * elevation_rad.tan() - height;
    if disc <= 0.0 {
        return None;
    }
    let v2 = GRAVITY * range * range / (2.0 * cos * cos * disc);
    if v2.is_finite() && v2 > 0.0 {
        Some(v2.sqrt())
    } else {
        None
    }
}

fn sample_arc(solution: &FiringSolution, samples: usize) -> Option<TrajectoryArc> {
    if !solution.in_range || samples == 0 {
        return None;
    }
    let theta = solution.elevation_degrees.to_radians();
    let range = solution.distance;
    let v = launch_speed(theta, range, solution.height_difference)?;
    let (vx, vy) = (v * theta.cos(), v * theta.sin());
    let t_range = range / vx;
    let horizon = if solution.time_of_flight > 0.0 {
        solution.time_of_flight.min(t_range)
    } else {
        t_range
    };
    let dt = horizon / samples as f64;
    let mut max_height = 0.0f64;
    let points: Vec<[f64; 2]> = (0..=samples)
        .map(|i| {
            let t = i as f64 * dt;
            let y = vy * t - 0.5 * GRAVITY * t * t;
            max_height = max_height.max(y);
            [vx * t, y]
        })
        .collect();
    let label = match (&solution.variant, solution.charge) {
        (Some(v), _) => v.clone(),
        (None, Some(c)) => format!("Charge {}", c),
        (None, None) => "Unknown".to_string(),
    };
    Some(TrajectoryArc {
        charge: solution.charge,
        label,
        launch_speed: v,
        points,
        max_height,
    })
}

/// Sample one arc per solvable solution with the default sample count.
pub fn generate_trajectory_points(solutions: &[FiringSolution]) -> TrajectoryPlot {
    generate_trajectory_points_with(solutions, TRAJECTORY_SAMPLES)
}

pub fn generate_trajectory_points_with(solutions: &[FiringSolution], samples: usize) -> TrajectoryPlot {
    let mut plot = TrajectoryPlot::default();
    for s in solutions {
        match sample_arc(s, samples) {
            Some(arc) => {
                plot.max_height = plot.max_height.max(arc.max_height);
                let reach = arc.points.last().map(|p| p[0]).unwrap_or(0.0);
                plot.max_range = plot.max_range.max(reach);
                plot.arcs.push(arc);
            }
            None => tracing::debug!("no trajectory for charge {:?}, skipped", s.charge),
        }
    }
    plot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(charge: u32, elevation_degrees: f64, distance: f64, height: f64, tof: f64) -> FiringSolution {
        FiringSolution {
            in_range: true,
            charge: Some(charge),
            variant: None,
            elevation: 0.0,
            elevation_degrees,
            azimuth: 0.0,
            azimuth_mils: 0.0,
            time_of_flight: tof,
            min_range: 0.0,
            max_range: 10_000.0,
            distance,
            height_difference: height,
            error: None,
            miss: None,
        }
    }

    #[test]
    fn flat_arc_lands_at_range() {
        let plot = generate_trajectory_points(&[solution(0, 45.0, 1000.0, 0.0, 60.0)]);
        assert_eq!(plot.arcs.len(), 1);
        let arc = &plot.arcs[0];
        assert_eq!(arc.points.len(), TRAJECTORY_SAMPLES + 1);
        assert_eq!(arc.points[0], [0.0, 0.0]);
        let last = arc.points.last().unwrap();
        assert!((last[0] - 1000.0).abs() < 1e-6);
        assert!(last[1].abs() < 1e-6);
        // apex of a 45 degree shot is range / 4
        assert!(arc.max_height <= 250.0 + 1e-9 && arc.max_height > 249.0);
        assert!((plot.max_range - 1000.0).abs() < 1e-6);
        assert_eq!(arc.label, "Charge 0");
    }

    #[test]
    fn short_time_of_flight_truncates() {
        let plot = generate_trajectory_points(&[solution(1, 45.0, 1000.0, 0.0, 10.0)]);
        let last = plot.arcs[0].points.last().unwrap();
        let vx = plot.arcs[0].launch_speed * 45f64.to_radians().cos();
        assert!((last[0] - vx * 10.0).abs() < 1e-6);
        assert!(last[0] < 1000.0);
    }

    #[test]
    fn unreachable_geometry_skipped() {
        let mut out_of_range = solution(2, 45.0, 1000.0, 0.0, 10.0);
        out_of_range.in_range = false;
        let plot = generate_trajectory_points(&[
            solution(0, 45.0, 1000.0, 2000.0, 10.0),
            out_of_range,
            solution(1, 60.0, 800.0, 0.0, 30.0),
        ]);
        assert_eq!(plot.arcs.len(), 1);
        assert_eq!(plot.arcs[0].charge, Some(1));
    }

    #[test]
    fn launch_speed_cases() {
        assert!(launch_speed(0.0, 100.0, 0.0).is_none());
        assert!(launch_speed(45f64.to_radians(), 0.0, 0.0).is_none());
        let v = launch_speed(45f64.to_radians(), 1000.0, 0.0).unwrap();
        assert!((v * v - GRAVITY * 1000.0).abs() < 1e-6);
    }
}
