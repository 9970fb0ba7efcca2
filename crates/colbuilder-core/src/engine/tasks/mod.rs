//! Computational tasks run by the workflows.
//!
//! - [`contact_graph`] decides which placed copies touch through their cross-link
//!   markers and merges the pairwise relation into connected components.
//! - [`crosslink_optimization`] refines a structure until its cross-link distances
//!   fall below the acceptance threshold.

pub mod contact_graph;
pub mod crosslink_optimization;
