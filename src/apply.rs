//! CPU application of filter transforms to pixel buffers.
//!
//! The production path uploads matrices or solver coefficients as shader
//! uniforms; this module runs the same math over an RGBA f32 buffer so
//! filters can be exercised and verified without a GPU. Pixels are split
//! across threads in disjoint chunks; alpha passes through untouched.

use rayon::prelude::*;

use crate::effects;
use crate::filter::{Colorspace, Transform, TransformOp};
use crate::math::Vector3;
use crate::opponent;

// The shader layer's highly scientific colorspace conversion: assume sRGB
// in and out, and use the x^2.2 approximation for gamma.
#[inline]
fn srgb_to_linear(c: f64) -> f64 {
    c.max(0.0).powf(2.2)
}

#[inline]
fn linear_to_srgb(c: f64) -> f64 {
    c.max(0.0).powf(1.0 / 2.2)
}

/// Applies `transform` in place to an RGBA f32 buffer (4 floats per pixel,
/// sRGB-encoded). Trailing floats that don't form a whole pixel are left
/// untouched.
pub fn apply_transform(pixels: &mut [f32], transform: &Transform) {
    let linear = transform.colorspace == Colorspace::Linear;

    pixels.par_chunks_exact_mut(4).for_each(|px| {
        let mut rgb = Vector3::new(px[0] as f64, px[1] as f64, px[2] as f64);
        if linear {
            rgb = Vector3::new(
                srgb_to_linear(rgb.x),
                srgb_to_linear(rgb.y),
                srgb_to_linear(rgb.z),
            );
        }

        rgb = match &transform.op {
            TransformOp::Matrix(m) => *m * rgb,
            TransformOp::Solver(co) => opponent::solve_rgb(co, rgb),
            TransformOp::Inversion(mode) => effects::invert(*mode, rgb),
        };

        if linear {
            rgb = Vector3::new(
                linear_to_srgb(rgb.x),
                linear_to_srgb(rgb.y),
                linear_to_srgb(rgb.z),
            );
        }
        px[0] = rgb.x as f32;
        px[1] = rgb.y as f32;
        px[2] = rgb.z as f32;
    });
}
