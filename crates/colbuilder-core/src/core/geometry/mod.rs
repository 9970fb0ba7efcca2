//! Crystallographic transformations between lattice shifts and Cartesian placements.
//!
//! - [`crystal`]: the rotation matrix `R` derived from unit-cell parameters and the
//!   conversions `T = R·S` / `S = R⁻¹·T` between translation and shift matrices.
//! - [`lattice`]: z-layer planes of a shift matrix and their extension when gaps in
//!   the fibril mesh need to be filled.

pub mod crystal;
pub mod lattice;
