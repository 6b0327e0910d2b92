//! Color-transform math core for color-vision-deficiency display filters.
//!
//! Computes the 3x3 matrices (and, for the iterative opponent-space
//! corrector, the coefficient set) that a rendering backend applies per
//! pixel to correct or simulate protanopia, deuteranopia and tritanopia,
//! plus a handful of non-color-blindness effects. [`FilterState`] holds a
//! validated description of the active filter and round-trips it to the
//! dash-token text form the settings store persists.
//!
//! The host side is expected to:
//! 1. parse the stored configuration with [`FilterState::from_string`]
//!    (keeping its previous state when that fails),
//! 2. ask the state for its transform via [`FilterState::compute_transform`]
//!    (or [`cache::matrix_cached`] for single-matrix configurations), and
//! 3. hand the result to its rendering pipeline, re-running step 2 whenever
//!    a field or the strength changes.
//!
//! Everything here is synchronous and pure; see the module docs for the
//! individual algorithms.

pub mod apply;
pub mod cache;
pub mod colorspace;
pub mod daltonizer;
pub mod effects;
pub mod filter;
pub mod gdh;
pub mod math;
pub mod opponent;

// Re-export the types the host layer actually touches.
pub use colorspace::{Cone, ConeSensitivityModel, TransformFamily};
pub use filter::{
    Algorithm, ColorBlindnessType, Colorspace, FilterMode, FilterProperties, FilterState,
    HighContrast, Transform, TransformOp, TritanHack,
};
pub use math::{Matrix3, Vector3};
pub use opponent::{SolverCoefficients, SolverWeights};
