//! # Workflows Module
//!
//! End-to-end procedures built on the engine.
//!
//! - **Geometry** ([`geometry`]) - From an asymmetric unit and its contacts file to the
//!   placed copy system, its contact graph and connected components
//! - **Cross-link optimization** ([`optimize`]) - Refinement of one structure's cross-link
//!   geometry using a pluggable candidate generator

pub mod geometry;
pub mod optimize;
