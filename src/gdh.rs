//! GdH's filters: the correction and simulation transforms from G-dH's
//! ColorBlind Filters, collapsed into a single matrix per configuration.
//! The upstream shaders evaluate these per pixel; everything here is linear,
//! so the whole chain folds into one transform on the CPU.
//!
//! Unlike the other algorithm families these operate directly on sRGB
//! values, and the correction side has dedicated high-contrast variants for
//! protanopia and deuteranopia.

use crate::colorspace::Cone;
use crate::math::Matrix3;

/// Parameters for one GdH filter matrix.
#[derive(Debug, Clone, Copy)]
pub struct GdhParams {
    pub cone: Cone,
    pub is_correction: bool,
    /// High-contrast correction variant; only exists for Protan and Deutan.
    pub high_contrast: bool,
    /// Blend strength in [0, 1].
    pub factor: f64,
}

const RGB2LMS: Matrix3 = Matrix3::from_row_major([
    17.8824, 43.5161, 4.11935, //
    3.45565, 27.1554, 3.86714, //
    0.0299566, 0.184309, 1.46709,
]);

const LMS2ERROR: Matrix3 = Matrix3::from_row_major([
    0.0809444479, -0.130504409, 0.116721066, //
    -0.0102485335, 0.0540193266, -0.113614708, //
    -0.000365296938, -0.00412161469, 0.693511405,
]);

fn lms_simulation(cone: Cone) -> Matrix3 {
    cone.pick(
        Matrix3::from_row_major([
            0.0, 2.02344, -2.52581, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ]),
        Matrix3::from_row_major([
            1.0, 0.0, 0.0, //
            0.494207, 0.0, 1.24827, //
            0.0, 0.0, 1.0,
        ]),
        Matrix3::from_row_major([
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            -0.012491378299329402, 0.07203451899279534, 0.0,
        ]),
    )
}

fn correction_spread(cone: Cone, high_contrast: bool) -> Matrix3 {
    // There is no tritanopia high-contrast variant; it falls through to the
    // normal spread.
    match (high_contrast, cone) {
        (true, Cone::Long) => Matrix3::from_row_major([
            2.56667, 0.43333, 0.00000, //
            1.55833, 0.44267, 0.00000, //
            0.00000, 0.24167, 0.75833,
        ]),
        (true, Cone::Medium) => Matrix3::from_row_major([
            -1.5, 1.5, 0.0, //
            -1.5, 1.5, 0.0, //
            1.5, 0.0, 0.0,
        ]),
        _ => cone.pick(
            Matrix3::from_row_major([
                0.56667, 0.43333, 0.00000, //
                0.55833, 0.44267, 0.00000, //
                0.00000, 0.24167, 0.75833,
            ]),
            Matrix3::from_row_major([
                -0.8, 0.0, 0.0, //
                0.0, 0.0, 0.0, //
                -0.2, 0.8, 0.8,
            ]),
            Matrix3::from_row_major([
                0.3, 0.5, 0.4, //
                0.5, 0.7, 0.3, //
                0.0, 0.0, 1.0,
            ]),
        ),
    }
}

/// Computes the sRGB-space filter matrix for one parameter set.
pub fn matrix(params: &GdhParams) -> Matrix3 {
    let GdhParams {
        cone,
        is_correction,
        high_contrast,
        factor,
    } = *params;

    let rgb2error = LMS2ERROR * lms_simulation(cone) * RGB2LMS;

    if !is_correction {
        // Simulation shifts lightness back toward the green channel:
        // prot doubles the difference, deuter takes 0.7 of it, tritan none,
        // then blends with the unfiltered color by strength.
        let lightness_diff = cone.pick(
            Matrix3::from_col_major([
                0.0, 0.0, 0.0, //
                2.0, 2.0, 0.0, //
                0.0, 0.0, 0.0,
            ]),
            Matrix3::from_col_major([
                0.0, 0.0, 0.0, //
                0.7, 0.7, 0.0, //
                0.0, 0.0, 0.0,
            ]),
            Matrix3::ZERO,
        );
        let rgb2ld = lightness_diff * (Matrix3::IDENTITY - rgb2error);

        Matrix3::IDENTITY * (1.0 - factor) + (rgb2ld + rgb2error) * factor
    } else {
        // error = strength * (color - simulated error), redistributed by the
        // per-cone correction matrix and added back onto the color.
        let rgb2diff = Matrix3::IDENTITY - rgb2error;
        let correction = correction_spread(cone, high_contrast);

        Matrix3::IDENTITY + correction * (rgb2diff * factor)
    }
}
