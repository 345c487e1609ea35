//! JSON output and plain-text rendering of solutions.

use crate::correction::CorrectionOutcome;
use crate::dataset::WeaponSystem;
use crate::ffe::FfeSolution;
use crate::solution::FiringSolution;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn write_json_report<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    fs::write(path, json).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn charge_label(s: &FiringSolution) -> String {
    match (&s.variant, s.charge) {
        (Some(v), _) => v.clone(),
        (None, Some(c)) => format!("Charge {}", c),
        (None, None) => "-".to_string(),
    }
}

/// One line per solution, e.g. `Charge 1  EL 1145 mils (64.41°)  AZ 0 mils (0.00°)  TOF 22.4s`.
pub fn render_solution(s: &FiringSolution) -> String {
    if !s.in_range {
        return format!(
            "OUT OF RANGE  {}  (distance {:.0}m, range {:.0}-{:.0}m)",
            s.error.as_deref().unwrap_or(""),
            s.distance,
            s.min_range,
            s.max_range
        );
    }
    format!(
        "{:<10}  EL {:>5.0} mils ({:.2}°)  AZ {:>5.0} mils ({:.2}°)  TOF {:.1}s",
        charge_label(s),
        s.elevation,
        s.elevation_degrees,
        s.azimuth_mils,
        s.azimuth,
        s.time_of_flight
    )
}

pub fn render_solutions(solutions: &[FiringSolution]) -> String {
    let mut out = String::new();
    if let Some(first) = solutions.first() {
        out.push_str(&format!(
            "Distance {:.0}m  height difference {:+.0}m\n",
            first.distance, first.height_difference
        ));
    }
    for s in solutions {
        out.push_str(&render_solution(s));
        out.push('\n');
    }
    out
}

pub fn render_correction(o: &CorrectionOutcome) -> String {
    let mut out = format!(
        "New target {:.1}/{:.1} (z {:.1}), corrected on {:?} line at {:.1}°\n",
        o.new_target.x, o.new_target.y, o.new_target.z, o.reference, o.reference_bearing
    );
    if let Some(t) = o.charge_transition {
        out.push_str(&format!("CHARGE CHANGE: {} -> {}\n", t.from, t.to));
    }
    out.push_str(&format!("Azimuth change {:+.0} mils\n", o.azimuth_delta_mils));
    out.push_str(&render_solution(&o.solution));
    out.push('\n');
    out
}

pub fn render_ffe(f: &FfeSolution) -> String {
    let mut out = format!(
        "FFE {} round(s) on charge {} ({} dropped)\n",
        f.rounds.len(),
        f.charge,
        f.dropped
    );
    for r in &f.rounds {
        out.push_str(&format!("#{:<3} {}\n", r.index + 1, render_solution(&r.solution)));
    }
    out
}

pub fn render_weapons(weapons: &[&WeaponSystem]) -> String {
    let mut out = String::new();
    for w in weapons {
        out.push_str(&format!(
            "{}  {}  [{}]  {} ({} mils)\n",
            w.id, w.name, w.system_type, w.mil_system.name, w.mil_system.mils_per_circle
        ));
        for a in &w.ammunition {
            let (min, max) = a.range_envelope();
            out.push_str(&format!(
                "    {}  {}  {} charge(s)  {:.0}-{:.0}m\n",
                a.id,
                a.name,
                a.charges.len(),
                min,
                max
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::test_dataset;
    use crate::geometry::Position3D;
    use crate::solution::{calculate, prepare_input};

    fn solve(y: f64) -> FiringSolution {
        let d = test_dataset();
        let input = prepare_input(
            &d,
            Position3D::default(),
            Position3D::new(0.0, y, 0.0),
            "M1",
            "HE",
        )
        .unwrap();
        calculate(&d, &input).unwrap()
    }

    #[test]
    fn renders_in_and_out_of_range() {
        let line = render_solution(&solve(200.0));
        assert!(line.starts_with("Charge 0"));
        assert!(line.contains("EL  1400 mils"));
        let line = render_solution(&solve(9000.0));
        assert!(line.starts_with("OUT OF RANGE"));
    }

    #[test]
    fn json_report_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("solution.json");
        write_json_report(&vec![solve(200.0)], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v[0]["charge"], serde_json::json!(0));
    }

    #[test]
    fn weapons_listing() {
        let d = test_dataset();
        let text = render_weapons(&d.get_all_weapon_systems(None));
        assert!(text.contains("M1  Test Mortar  [mortar]"));
        assert!(text.contains("100-1200m"));
    }
}
