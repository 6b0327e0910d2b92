//! Plane-projection correction and simulation transforms.
//!
//! The algorithm follows AOSP's Daltonizer: assume a dichromat cannot
//! distinguish colors along the affected cone's axis, project LMS colors
//! onto a plane that preserves the colors a dichromat is assumed to see
//! accurately, and either present that projection (simulation) or spread
//! the lost difference across the working cones (correction).

use crate::colorspace::{Cone, TransformFamily};
use crate::math::{Matrix3, Vector3};

/// Parameters for one plane-projection transform.
#[derive(Debug, Clone, Copy)]
pub struct DaltonizeParams {
    /// The deficient cone.
    pub cone: Cone,
    /// Cone-response model to project in.
    pub family: TransformFamily,
    /// Correct toward full color vision, or simulate the deficiency.
    pub is_correction: bool,
    /// Blend strength in [0, 1].
    pub factor: f64,
    /// For tritanopia, project along the achromatic/red-green plane instead
    /// of anchoring the red primary.
    pub tritan_hack: bool,
    /// For correction, rotate the error toward a steering target instead of
    /// spreading it across the unaffected cones.
    pub error_steering: bool,
}

/// Steering targets per cone, in RGB. These are heuristic: white improves
/// visibility for tritans; the magenta/cyan-ish targets at least make
/// confused colors more distinct for prot/deuterans. Treat as tunable, not
/// as physically derived values.
pub const STEERING_TARGETS: [Vector3; 3] = [
    Vector3::new(0.5, 0.0, 1.0),
    Vector3::new(0.0, 0.5, 1.0),
    Vector3::new(1.0, 1.0, 1.0),
];

/// Rotation that steers the LMS error vector produced from a simulated RGB
/// primary towards `direction`, scaled so the worst-case error maps onto the
/// full `-direction`.
///
/// Rodrigues-style construction from https://math.stackexchange.com/a/476311.
/// Nearly antiparallel vectors have no unique rotation; the `1/(1 + cos)`
/// term blows up there, so that case degrades to "no correction" instead of
/// emitting non-finite coefficients.
fn steering_matrix(direction: Vector3, primary_error: Vector3, factor: f64) -> Matrix3 {
    let direction_mag = direction.magnitude();
    let error_mag = primary_error.magnitude();

    let norm_dir = direction * (1.0 / direction_mag);
    let norm_err = primary_error * (1.0 / error_mag);

    let v = norm_err.cross(norm_dir);
    let c = norm_err.dot(norm_dir);

    if (1.0 + c).abs() < 1e-9 {
        log::debug!("steering vectors are antiparallel; skipping correction");
        return Matrix3::ZERO;
    }

    let cp = Matrix3::from_col_major([
        0.0, v.z, -v.y, //
        -v.z, 0.0, v.x, //
        v.y, -v.x, 0.0,
    ]);
    let rotation = Matrix3::IDENTITY + cp + (1.0 / (1.0 + c)) * (cp * cp);

    rotation * (factor * direction_mag / error_mag)
}

/// Computes the correction or simulation matrix for one parameter set.
///
/// The result maps linear RGB to linear RGB; a pure function of its inputs.
pub fn matrix(params: &DaltonizeParams) -> Matrix3 {
    let DaltonizeParams {
        cone,
        family,
        is_correction,
        factor,
        tritan_hack,
        error_steering,
    } = *params;
    let model = family.model();
    let (rgb2lms, lms2rgb) = (model.rgb2lms, model.lms2rgb);

    // Calculate an error projection in LMS space.
    //
    // For protanopia and deuteranopia, assume that the blue sRGB primary is
    // unaffected. That gives us 3 points in RGB space that mustn't be
    // affected by the projection in LMS space. Project along the normal of
    // the plane that includes all three points. For tritanopia, make the
    // same assumption about the red primary and proceed similarly.
    //
    // Optionally, for tritanopia, assume that *two* primaries are
    // unaffected, red and green: project along the normal of the plane
    // parallel to the lines between black and white, and between red and
    // green.
    let anchor = if tritan_hack {
        Vector3::new(1.0, -1.0, 0.0)
    } else {
        cone.pick(
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
    };
    let lms_bw = rgb2lms * Vector3::ONE;
    let lms_ab = rgb2lms * anchor;
    let soln = lms_bw.cross(lms_ab);

    // Project the affected cone's response onto the invariant plane: the
    // simulated view of a dichromat.
    let simulation = cone.pick(
        Matrix3::from_col_major([
            0.0, 0.0, 0.0, //
            -soln.y / soln.x, 1.0, 0.0, //
            -soln.z / soln.x, 0.0, 1.0,
        ]),
        Matrix3::from_col_major([
            1.0, -soln.x / soln.y, 0.0, //
            0.0, 0.0, 0.0, //
            0.0, -soln.z / soln.y, 1.0,
        ]),
        Matrix3::from_col_major([
            1.0, 0.0, -soln.x / soln.z, //
            0.0, 1.0, -soln.y / soln.z, //
            0.0, 0.0, 0.0,
        ]),
    );

    // Error: difference between simulated vision and ideal vision.
    let error = simulation - Matrix3::IDENTITY;

    // If correcting, negate the error and spread it across the other cones
    // (or steer it toward the per-cone target). If simulating, scale it and
    // leave it on the same cone.
    let spread = if !is_correction {
        Matrix3::diagonal(Vector3::splat(factor))
    } else if error_steering {
        steering_matrix(
            rgb2lms * cone.pick(STEERING_TARGETS[0], STEERING_TARGETS[1], STEERING_TARGETS[2]),
            error * rgb2lms.col(cone.index()),
            factor,
        )
    } else {
        cone.pick(
            Matrix3::from_col_major([
                0.0, -factor, -factor, //
                0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0,
            ]),
            Matrix3::from_col_major([
                0.0, 0.0, 0.0, //
                -factor, 0.0, -factor, //
                0.0, 0.0, 0.0,
            ]),
            Matrix3::from_col_major([
                0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, //
                -factor, -factor, 0.0,
            ]),
        )
    };

    let adjustment = Matrix3::IDENTITY + spread * error;
    // Taken together: go to LMS, apply the adjusted error, return to RGB.
    lms2rgb * adjustment * rgb2lms
}
