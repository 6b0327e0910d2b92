use std::sync::LazyLock;

use crate::math::Matrix3;

// NB: all reference matrices below are written column-major.

/// sRGB to XYZ from https://en.wikipedia.org/wiki/SRGB#Primaries
pub const SRGB2XYZ: Matrix3 = Matrix3::from_col_major([
    0.4124, 0.2126, 0.0193, //
    0.3576, 0.7152, 0.1192, //
    0.1805, 0.0722, 0.9505,
]);

/// CIECAM02 transformation
/// (https://en.wikipedia.org/wiki/LMS_color_space#Later_CIECAMs).
///
/// Used by AOSP's filters. It converts to spectrally-sharpened LMS that
/// doesn't reflect actual cone sensitivity, yet the AOSP algorithm relies on
/// it to infer the sensitivity of the unaffected cones. This is why AOSP's
/// filters don't look right.
pub const CIECAM02_XYZ_TO_LMS: Matrix3 = Matrix3::from_col_major([
    0.7328, -0.7036, 0.003, //
    0.4296, 1.6975, 0.0136, //
    -0.1624, 0.0061, 0.9834,
]);

/// From http://brucelindbloom.com/index.html?Eqn_RGB_XYZ_Matrix.html
///
/// Effectively the same as the matrix given by Wikipedia, but with the
/// advantage that this matrix is given with an explicitly stated
/// illuminant: D65.
pub const SRGB_TO_D65_XYZ: Matrix3 = Matrix3::from_col_major([
    0.4124564, 0.2126729, 0.0193339, //
    0.3575761, 0.7151522, 0.1191920, //
    0.1804375, 0.0721750, 0.9503041,
]);

/// Hunt-Pointer-Estevez transformation
/// (https://en.wikipedia.org/wiki/LMS_color_space#Hunt,_RLAB), normalized
/// to D65.
pub const HPE_D65_XYZ_TO_LMS: Matrix3 = Matrix3::from_col_major([
    0.4002, -0.2263, 0.0000, //
    0.7076, 1.1653, 0.0000, //
    -0.0808, 0.0457, 0.9182,
]);

/// One retinal photoreceptor response channel. "Which cone" identifies the
/// deficient channel: Protan = Long, Deutan = Medium, Tritan = Short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cone {
    Long,
    Medium,
    Short,
}

impl Cone {
    pub const ALL: [Cone; 3] = [Cone::Long, Cone::Medium, Cone::Short];

    /// Row/column index of this cone in LMS-ordered matrices.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Cone::Long => 0,
            Cone::Medium => 1,
            Cone::Short => 2,
        }
    }

    /// Selects one of three values by the affected cone.
    #[inline]
    pub fn pick<T>(self, long: T, medium: T, short: T) -> T {
        match self {
            Cone::Long => long,
            Cone::Medium => medium,
            Cone::Short => short,
        }
    }
}

/// The cone-response model a daltonizer transform is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformFamily {
    /// Hunt-Pointer-Estevez under D65; models physiological cone response.
    Hpe,
    /// The CIECAM02-based transform used by AOSP's accessibility filters.
    Aosp,
}

/// A named RGB-to-LMS transform and its inverse.
#[derive(Debug, Clone, Copy)]
pub struct ConeSensitivityModel {
    pub rgb2lms: Matrix3,
    pub lms2rgb: Matrix3,
}

// Composed once per process from the constants above; both compositions are
// invertible by construction, so the expect() is an initialization invariant
// rather than a reachable failure.
static MODELS: LazyLock<[ConeSensitivityModel; 2]> = LazyLock::new(|| {
    let build = |rgb2lms: Matrix3| ConeSensitivityModel {
        rgb2lms,
        lms2rgb: rgb2lms
            .inverse()
            .expect("reference rgb2lms matrices are invertible"),
    };
    [
        build(HPE_D65_XYZ_TO_LMS * SRGB_TO_D65_XYZ),
        build(CIECAM02_XYZ_TO_LMS * SRGB2XYZ),
    ]
});

impl TransformFamily {
    pub const ALL: [TransformFamily; 2] = [TransformFamily::Hpe, TransformFamily::Aosp];

    /// The memoized cone-sensitivity model for this family.
    pub fn model(self) -> &'static ConeSensitivityModel {
        match self {
            TransformFamily::Hpe => &MODELS[0],
            TransformFamily::Aosp => &MODELS[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::tests::max_diff;
    use crate::math::Vector3;

    #[test]
    fn test_models_invert_cleanly() {
        for family in TransformFamily::ALL {
            let m = family.model();
            let product = m.rgb2lms * m.lms2rgb;
            assert!(
                max_diff(&product, &Matrix3::IDENTITY) < 1e-9,
                "rgb2lms * lms2rgb should be the identity for {:?}",
                family
            );
        }
    }

    #[test]
    fn test_model_table_is_stable() {
        // Two lookups must observe the same memoized data.
        let a = TransformFamily::Hpe.model().rgb2lms;
        let b = TransformFamily::Hpe.model().rgb2lms;
        assert_eq!(a, b);
    }

    #[test]
    fn test_lms_white_is_positive() {
        for family in TransformFamily::ALL {
            let w = family.model().rgb2lms * Vector3::ONE;
            assert!(
                w.x > 0.0 && w.y > 0.0 && w.z > 0.0,
                "white must stimulate all cones under {:?}",
                family
            );
        }
    }

    #[test]
    fn test_cone_pick_matches_index() {
        for cone in Cone::ALL {
            assert_eq!(cone.pick(0, 1, 2), cone.index());
        }
    }
}
