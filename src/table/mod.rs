//! Range-table interpolation and charge selection.

use crate::dataset::{Charge, RangeTableEntry};

/// Look up `distance` in a range table sorted ascending by range.
/// Exact matches are returned verbatim; anything between two rows is linearly
/// interpolated. Outside the table's span there is no data.
pub fn interpolate_from_table(table: &[RangeTableEntry], distance: f64) -> Option<RangeTableEntry> {
    if !distance.is_finite() {
        return None;
    }
    let first = table.first()?;
    let last = table.last()?;
    if distance < first.range || distance > last.range {
        return None;
    }
    // index of the first row with range >= distance
    let upper_idx = table.partition_point(|e| e.range < distance);
    let upper = table.get(upper_idx)?;
    if upper.range == distance {
        return Some(*upper);
    }
    let lower = table.get(upper_idx.checked_sub(1)?)?;
    let t = (distance - lower.range) / (upper.range - lower.range);
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    Some(RangeTableEntry {
        range: distance,
        elevation: lerp(lower.elevation, upper.elevation),
        tof: lerp(lower.tof, upper.tof),
        d_elev: lerp(lower.d_elev, upper.d_elev),
    })
}

/// First charge, in ascending level order, whose envelope contains `distance`.
/// Lower charges are preferred.
pub fn find_optimal_charge(charges: &[Charge], distance: f64) -> Option<&Charge> {
    charges.iter().find(|c| c.contains(distance))
}

/// How a charge was picked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargeSelection<'a> {
    Auto(&'a Charge),
    /// Requested by the caller; used even if a lower charge also fits or
    /// the distance is outside this charge's nominal envelope.
    Forced(&'a Charge),
    NoneInRange,
    UnknownLevel(u32),
}

/// Pick the forced charge when one is given, otherwise the optimal charge.
pub fn select_charge(charges: &[Charge], distance: f64, forced: Option<u32>) -> ChargeSelection<'_> {
    match forced {
        Some(level) => match charges.iter().find(|c| c.level == level) {
            Some(c) => ChargeSelection::Forced(c),
            None => ChargeSelection::UnknownLevel(level),
        },
        None => match find_optimal_charge(charges, distance) {
            Some(c) => ChargeSelection::Auto(c),
            None => ChargeSelection::NoneInRange,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(range: f64, elevation: f64) -> RangeTableEntry {
        RangeTableEntry {
            range,
            elevation,
            tof: range / 100.0,
            d_elev: 10.0,
        }
    }

    fn charge(level: u32, min: f64, max: f64) -> Charge {
        Charge {
            level,
            variant: None,
            projectile_id: None,
            min_range: min,
            max_range: max,
            range_table: vec![entry(min, 1000.0), entry(max, 800.0)],
        }
    }

    #[test]
    fn interpolates_midpoint() {
        let table = vec![entry(1000.0, 1000.0), entry(1200.0, 1200.0)];
        let e = interpolate_from_table(&table, 1100.0).unwrap();
        assert!((e.elevation - 1100.0).abs() < 1e-9);
        assert!((e.tof - 11.0).abs() < 1e-9);
        assert_eq!(e.range, 1100.0);
    }

    #[test]
    fn never_extrapolates() {
        let table = vec![entry(1000.0, 1000.0), entry(1200.0, 1200.0)];
        assert!(interpolate_from_table(&table, 900.0).is_none());
        assert!(interpolate_from_table(&table, 1200.5).is_none());
        assert!(interpolate_from_table(&[], 1000.0).is_none());
        assert!(interpolate_from_table(&table, f64::NAN).is_none());
    }

    #[test]
    fn exact_match_is_verbatim() {
        let mut table = vec![entry(100.0, 1500.0), entry(200.0, 1400.0), entry(300.0, 1250.0)];
        table[1].d_elev = 7.25;
        assert_eq!(interpolate_from_table(&table, 200.0), Some(table[1]));
        assert_eq!(interpolate_from_table(&table, 100.0), Some(table[0]));
        assert_eq!(interpolate_from_table(&table, 300.0), Some(table[2]));
    }

    #[test]
    fn single_row_table() {
        let table = vec![entry(500.0, 900.0)];
        assert_eq!(interpolate_from_table(&table, 500.0), Some(table[0]));
        assert!(interpolate_from_table(&table, 501.0).is_none());
    }

    #[test]
    fn lowest_fitting_charge_wins() {
        let charges = vec![charge(0, 100.0, 500.0), charge(1, 400.0, 1200.0)];
        assert_eq!(find_optimal_charge(&charges, 450.0).unwrap().level, 0);
        assert_eq!(find_optimal_charge(&charges, 800.0).unwrap().level, 1);
        assert!(find_optimal_charge(&charges, 50.0).is_none());
    }

    #[test]
    fn forced_charge_honoured() {
        let charges = vec![charge(0, 100.0, 500.0), charge(1, 400.0, 1200.0)];
        assert!(matches!(
            select_charge(&charges, 450.0, Some(1)),
            ChargeSelection::Forced(c) if c.level == 1
        ));
        assert!(matches!(
            select_charge(&charges, 450.0, None),
            ChargeSelection::Auto(c) if c.level == 0
        ));
        assert_eq!(
            select_charge(&charges, 450.0, Some(7)),
            ChargeSelection::UnknownLevel(7)
        );
        assert_eq!(select_charge(&charges, 5000.0, None), ChargeSelection::NoneInRange);
    }
}
