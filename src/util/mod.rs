//! Shared utilities: logging, id normalization, rounding.

use tracing::Level;

/// Initialize tracing with env filter. Safe to call once at startup.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Normalize weapon or ammunition id for lookup (lowercase, trim).
pub fn normalize_id(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Round to a fixed number of decimal places (display values).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_trim_lower() {
        assert_eq!(normalize_id("  BM-21  "), "bm-21");
        assert_eq!(normalize_id("He"), "he");
    }

    #[test]
    fn round_to_places() {
        assert!((round_to(12.34567, 2) - 12.35).abs() < 1e-9);
        assert!((round_to(-0.125, 1) - -0.1).abs() < 1e-9);
    }
}
