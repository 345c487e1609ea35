//! Indirect-fire ballistic calculator: library entry point.
//!
//! Exposes geometry, dataset registry, range-table solver, fire correction,
//! FFE patterns and trajectory sampling for use by the CLI and tests.

pub mod angles;
pub mod config;
pub mod correction;
pub mod dataset;
pub mod error;
pub mod ffe;
pub mod geometry;
pub mod report;
pub mod solution;
pub mod table;
pub mod trajectory;
pub mod util;

pub use error::{CalcError, Result};
