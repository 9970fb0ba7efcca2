//! # Core Module
//!
//! Stateless building blocks of the microfibril builder.
//!
//! - **Models** ([`models`]) - Unit cells, copy identifiers, marker atoms, placed copies
//!   and cross-link definitions
//! - **Geometry** ([`geometry`]) - Conversions between translation and lattice-shift
//!   matrices, and lattice plane extension
//! - **File I/O** ([`io`]) - Coordinate, contacts, connect and cross-link table formats
//!
//! Nothing in this layer keeps state between calls. Derived matrices are returned as
//! values and passed explicitly to whoever needs them.

pub mod geometry;
pub mod io;
pub mod models;
pub mod utils;
