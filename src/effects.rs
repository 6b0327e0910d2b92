//! Non-color-blindness effects: channel mixers, desaturation and the two
//! inversion modes. The mixers and desaturation are linear and expose a
//! [`Matrix3`]; the inversions depend on per-pixel min/max and gamma, so
//! they stay as functions.

use crate::math::{Matrix3, Vector3};

/// Channel rotation order for the mixer effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixOrder {
    /// r,g,b <- b,r,g
    Gbr,
    /// r,g,b <- g,b,r
    Brg,
}

/// Inversion flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InversionMode {
    /// Inverts lightness while keeping hue: shifts each channel by the
    /// difference between the pixel's min and max.
    Lightness,
    /// Plain per-channel color inversion.
    Color,
}

/// Rec. 601 luma weights, matching the desktop compositor's desaturation.
const LUMA: Vector3 = Vector3::new(0.299, 0.587, 0.114);

/// Gamma compensation applied after inversion to keep perceived lightness
/// differences on both ends of the scale.
const INVERSION_GAMMA: f64 = 1.8;

/// Blend of the identity with a channel permutation: `(1-s)*I + s*P`.
pub fn channel_mix_matrix(order: MixOrder, factor: f64) -> Matrix3 {
    let permutation = match order {
        MixOrder::Gbr => Matrix3::from_rows(
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ),
        MixOrder::Brg => Matrix3::from_rows(
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        ),
    };
    Matrix3::IDENTITY * (1.0 - factor) + permutation * factor
}

/// Blend toward the luma gray of the pixel: `(1-s)*I + s*luma`.
pub fn desaturate_matrix(factor: f64) -> Matrix3 {
    let gray = Matrix3::from_rows(LUMA, LUMA, LUMA);
    Matrix3::IDENTITY * (1.0 - factor) + gray * factor
}

/// Applies an inversion to one sRGB pixel.
pub fn invert(mode: InversionMode, rgb: Vector3) -> Vector3 {
    let inverted = match mode {
        InversionMode::Lightness => {
            let min = rgb.x.min(rgb.y).min(rgb.z);
            let max = rgb.x.max(rgb.y).max(rgb.z);
            let shift = 1.0 - min - max;
            Vector3::new(shift + rgb.x, shift + rgb.y, shift + rgb.z)
        }
        InversionMode::Color => Vector3::ONE - rgb,
    };

    // Gamma has to be compensated to maintain perceived differences in
    // lightness on dark and light ends of the lightness scale.
    let g = 1.0 / INVERSION_GAMMA;
    Vector3::new(
        inverted.x.max(0.0).powf(g),
        inverted.y.max(0.0).powf(g),
        inverted.z.max(0.0).powf(g),
    )
}
