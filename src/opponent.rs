//! Opponent Color Solver.
//!
//! Instead of prescribing a specific transformation to correct for reduced
//! sensitivity of a cone, this filter searches for a color that will look
//! the way it was intended to, to a viewer with reduced cone sensitivity.
//! The color blindness model used here is more or less the one described by
//! Machado et al. Its use of opponent color provides a concrete point of
//! reference for how colors are meant to be perceived.
//!
//! A color's position in opponent color space tells us how it will look to
//! the brain. The more closely the filter can match the stimulus that a
//! colorblind person's brain receives to what a trichromat's brain would
//! receive, the more accurately the color will be perceived. Machado et al.
//! use the reverse of this to simulate color blindness. That works well for
//! simulation because color blindness reduces the color gamut, so the result
//! is always within the RGB gamut; reversing the transformation to correct
//! would widen the gamut and require colors displays can't produce. So the
//! corrector instead minimizes (the square of) the distance in opponent
//! color space between the intended appearance of the original color and the
//! simulated appearance of the new color, by gradient descent near the
//! original color.
//!
//! Most of the actual magic is in the conditioning of the RGB-to-opponent
//! transforms; see [`transforms`]. Without it, simulating a difference in
//! sensitivity would introduce chroma errors on grayscale colors and luma
//! errors on most colors.
//!
//! Valuable reading:
//!
//! Machado et al, 2009:
//! https://www.inf.ufrgs.br/~oliveira/pubs_files/CVD_Simulation/CVD_Simulation.html
//!
//! Wandell:
//! https://foundationsofvision.stanford.edu/chapter-9-color/#Opponent-Colors

use anyhow::{Context, Result};

use crate::colorspace::{Cone, TransformFamily};
use crate::math::{Matrix3, Vector3};

/// Convert L, M, S into V, R-G, Y-B (green, blue positive).
///
/// From Wandell, who very deliberately says that this is just one data
/// point, not an absolute, general truth. We'll use it that way anyway.
pub const LMS2OPP: Matrix3 = Matrix3::from_col_major([
    1.00, -0.59, -0.34, //
    0.00, 0.80, -0.11, //
    0.00, -0.12, 0.93,
]);

/// Empirical L/M sensitivity ratio in the cone-loss blend. Tuned by visual
/// inspection, not derived from a cited model.
pub const SENSITIVITY_BLEND: f64 = 0.96;

/// Fixed number of steepest-descent steps; matches the shader loop.
pub const SOLVER_STEPS: usize = 5;

/// Conditioned RGB-to-opponent transforms for ideal and simulated vision.
#[derive(Debug, Clone, Copy)]
pub struct OpponentTransforms {
    /// Full-sensitivity appearance.
    pub ideal: Matrix3,
    /// Appearance with the affected cone's sensitivity reduced by `factor`.
    pub sim: Matrix3,
}

/// Cost weights for the gradient-descent correction. Empirical tuning
/// values: luma errors are much more visible than chroma errors, so the
/// luma weight dominates. The RGB-proximity weights penalize solutions far
/// from the original color (mostly relevant at high factors); they default
/// to zero.
#[derive(Debug, Clone, Copy)]
pub struct SolverWeights {
    /// Cost of the opponent-space errors; first component is luma.
    pub opponent: Vector3,
    /// Cost of adjustment away from the original RGB value.
    pub rgb_proximity: Vector3,
}

impl Default for SolverWeights {
    fn default() -> Self {
        Self {
            opponent: Vector3::new(5.0, 1.0, 1.0),
            rgb_proximity: Vector3::ZERO,
        }
    }
}

/// The precomputed coefficient set the iterative correction loop consumes,
/// on the GPU or via [`solve_rgb`].
#[derive(Debug, Clone, Copy)]
pub struct SolverCoefficients {
    pub rgb2ideal: Matrix3,
    pub rgb2sim: Matrix3,
    /// Constant half of the cost gradient: applied once to the input color.
    pub rgb2const: Matrix3,
    /// Variable half of the cost gradient: applied to the current estimate
    /// on every iteration.
    pub rgb2var: Matrix3,
    pub opp_weights: Vector3,
    pub rgb_weights: Vector3,
    /// Per-chroma-channel saturation-limiting coefficients, if enabled.
    pub chroma_damping: Option<[f64; 2]>,
}

fn row_abs_sum(m: &Matrix3, r: usize) -> f64 {
    m.row(r).abs_sum()
}

/// Builds the conditioned ideal and simulated RGB-to-opponent transforms
/// for one deficiency.
pub fn transforms(cone: Cone, factor: f64) -> OpponentTransforms {
    let rgb2lms = TransformFamily::Hpe.model().rgb2lms;

    // Alter rgb2lms according to Machado et al.'s model for cone
    // sensitivity: the affected cone's response is re-blended from the
    // remaining rows.
    let i = cone.index();
    let blended = cone.pick(
        rgb2lms.row(0) * (1.0 - factor) + rgb2lms.row(1) * (factor * SENSITIVITY_BLEND),
        rgb2lms.row(0) * (factor / SENSITIVITY_BLEND) + rgb2lms.row(1) * (1.0 - factor),
        rgb2lms.row(2) * (1.0 - factor),
    );
    let sim_rgb2lms = rgb2lms.with_row(i, blended);

    // Use L+M+S for luminance. With factor = 0 the conditioning below
    // normalizes this to the equivalent of R+G+B, but it lets the simulated
    // change in sensitivity apply to luminance as well.
    let lms2opp = LMS2OPP.with_row(0, Vector3::ONE);
    let both = |f: &dyn Fn(Matrix3) -> Matrix3, t: OpponentTransforms| OpponentTransforms {
        ideal: f(t.ideal),
        sim: f(t.sim),
    };

    let rgb2opp = both(
        &|m| lms2opp * m,
        OpponentTransforms {
            ideal: rgb2lms,
            sim: sim_rgb2lms,
        },
    );

    // Scale luma so that #ffffff has ideal and simulated luma of 1. This
    // avoids spurious corrections of grayscale.
    let luma_norm = both(
        &|m| m.with_row(0, m.row(0) * (1.0 / row_abs_sum(&m, 0))),
        rgb2opp,
    );

    // Align chroma values so that gray colors have zero chroma components,
    // by adding a small offset proportional to luma. This prevents a chroma
    // error from appearing on grays due to the different sensitivity,
    // avoiding spurious "correction".
    let chroma_offset = |m: &Matrix3, component: usize| {
        let row = m.row(component);
        let error = row.dot(Vector3::ONE);
        row - m.row(0) * error
    };
    let zero_aligned = both(
        &|m| Matrix3::from_rows(m.row(0), chroma_offset(&m, 1), chroma_offset(&m, 2)),
        luma_norm,
    );

    // Scale rows so that the ideal chroma components have a range of 1.
    // Apply the same scaling to the simulated components so the reduction in
    // color sensitivity stays visible.
    both(
        &|m| {
            Matrix3::from_rows(
                m.row(0),
                m.row(1) * (1.0 / row_abs_sum(&zero_aligned.ideal, 1)),
                m.row(2) * (1.0 / row_abs_sum(&zero_aligned.ideal, 2)),
            )
        },
        zero_aligned,
    )
}

/// Precomputes the coefficient set for the iterative correction.
///
/// To correct for reduced cone sensitivity, the loop searches for an RGB
/// value that produces a point in opponent-color space for a colorblind
/// viewer that is close to the intended point, minimizing
///
/// ```text
/// c(rgb) = sum_i rgb_w[i] * (rgb[i] - rgb0[i])^2
///        + sum_i opp_w[i] * (opp_sim(rgb)[i] - opp_ideal(rgb0)[i])^2
/// ```
///
/// The derivative of the cost function splits in half, with one half based
/// on the initial RGB value (`rgb2const`, applied once) and the other on
/// the current estimate (`rgb2var`, applied every iteration).
pub fn correction_coefficients(
    cone: Cone,
    factor: f64,
    weights: &SolverWeights,
) -> SolverCoefficients {
    let OpponentTransforms { ideal, sim } = transforms(cone, factor);
    let opp_w = Matrix3::diagonal(weights.opponent);
    let rgb_w = Matrix3::diagonal(weights.rgb_proximity);

    SolverCoefficients {
        rgb2ideal: ideal,
        rgb2sim: sim,
        rgb2const: -2.0 * (rgb_w + sim.transpose() * (opp_w * ideal)),
        rgb2var: 2.0 * (rgb_w + sim.transpose() * (opp_w * sim)),
        opp_weights: weights.opponent,
        rgb_weights: weights.rgb_proximity,
        chroma_damping: None,
    }
}

impl SolverCoefficients {
    /// Enables saturation limiting: damps target chroma so the solve aims
    /// inside the gamut the reduced sensitivity can actually reach.
    pub fn with_chroma_damping(mut self) -> Self {
        self.chroma_damping = Some(chroma_damping(&OpponentTransforms {
            ideal: self.rgb2ideal,
            sim: self.rgb2sim,
        }));
        self
    }
}

/// Per-channel damping coefficients `k` for [`damp_chroma`], mapping the
/// ideal chroma range onto the range the simulated transform can reach.
/// Floored at -0.5 so the damping curve stays monotonic over the unit
/// chroma range.
pub fn chroma_damping(t: &OpponentTransforms) -> [f64; 2] {
    let k = |r| (row_abs_sum(&t.sim, r) / row_abs_sum(&t.ideal, r) - 1.0).max(-0.5);
    [k(1), k(2)]
}

/// Monotonic quadratic damping: `k*c*|c| + c`.
#[inline]
pub fn damp_chroma(k: f64, c: f64) -> f64 {
    k * c * c.abs() + c
}

/// The gradient-descent loop, mirroring the shader exactly. Runs a fixed
/// number of steepest-descent steps; each picks its step size by solving
/// the 1-D minimization along the gradient in closed form. A zero
/// denominator means the descent has converged (or the direction is
/// degenerate), so the loop ends early with the current estimate.
pub fn solve_rgb(co: &SolverCoefficients, rgb0: Vector3) -> Vector3 {
    let opp_ideal = match co.chroma_damping {
        None => co.rgb2ideal * rgb0,
        Some([k_rg, k_yb]) => {
            let opp = co.rgb2ideal * rgb0;
            Vector3::new(opp.x, damp_chroma(k_rg, opp.y), damp_chroma(k_yb, opp.z))
        }
    };
    // With an undamped target this is exactly the shader's
    // `rgb2const * rgb`; with damping the constant gradient half has to be
    // rebuilt from the damped target.
    let grad_const = match co.chroma_damping {
        None => co.rgb2const * rgb0,
        Some(_) => {
            -2.0 * (co.rgb_weights * rgb0
                + co.rgb2sim.transpose() * (co.opp_weights * opp_ideal))
        }
    };

    let mut rgb = rgb0;
    for _ in 0..SOLVER_STEPS {
        // Evaluate the gradient at the current rgb coordinates.
        let grad = co.rgb2var * rgb + grad_const;

        // Line search for zero derivative of cost.
        let sim_grad = co.rgb2sim * grad;
        let num = co.rgb_weights.dot((rgb - rgb0) * grad)
            + (co.opp_weights * sim_grad).dot(co.rgb2sim * rgb - opp_ideal);
        let den = co.rgb_weights.dot(grad * grad) + co.opp_weights.dot(sim_grad * sim_grad);
        if den == 0.0 {
            break;
        }
        rgb = rgb - grad * (num / den);
    }
    rgb
}

/// Color blindness only reduces the gamut, so there's no need for cost
/// function shenanigans when simulating: a plain linear transform is
/// sufficient. When `is_correction` is set the transform is oriented the
/// other way, mapping simulated appearance back to ideal.
///
/// Fails when the source transform is singular for the requested
/// parameters; callers must treat that as "unsupported", not substitute a
/// default.
pub fn simulation_matrix(cone: Cone, factor: f64, is_correction: bool) -> Result<Matrix3> {
    let OpponentTransforms { ideal, sim } = transforms(cone, factor);
    let m = if is_correction {
        sim.inverse()
            .with_context(|| format!("simulated opponent transform for {:?} at factor {} is singular", cone, factor))?
            * ideal
    } else {
        ideal
            .inverse()
            .with_context(|| format!("ideal opponent transform for {:?} is singular", cone))?
            * sim
    };
    Ok(m)
}

/// Weighted opponent-space cost of presenting `rgb` to the simulated viewer
/// when `rgb0` was intended. Exposed for tests and diagnostics.
pub fn cost(co: &SolverCoefficients, rgb: Vector3, rgb0: Vector3) -> f64 {
    let opp_err = co.rgb2sim * rgb - co.rgb2ideal * rgb0;
    let rgb_err = rgb - rgb0;
    co.opp_weights.dot(opp_err * opp_err) + co.rgb_weights.dot(rgb_err * rgb_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::tests::max_diff;

    #[test]
    fn test_gray_has_zero_chroma() {
        for cone in Cone::ALL {
            let t = transforms(cone, 0.6);
            for m in [t.ideal, t.sim] {
                assert!(m.row(1).dot(Vector3::ONE).abs() < 1e-9);
                assert!(m.row(2).dot(Vector3::ONE).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_white_luma_is_one() {
        for cone in Cone::ALL {
            let t = transforms(cone, 0.8);
            for m in [t.ideal, t.sim] {
                let luma = m.row(0).dot(Vector3::ONE);
                assert!((luma - 1.0).abs() < 1e-9, "white luma was {}", luma);
            }
        }
    }

    #[test]
    fn test_factor_zero_simulates_nothing() {
        for cone in Cone::ALL {
            let t = transforms(cone, 0.0);
            assert!(max_diff(&t.ideal, &t.sim) < 1e-12);
        }
    }

    #[test]
    fn test_simulation_and_correction_matrices_are_inverse() {
        for cone in Cone::ALL {
            let correct = simulation_matrix(cone, 0.7, true).unwrap();
            let simulate = simulation_matrix(cone, 0.7, false).unwrap();
            assert!(
                max_diff(&(correct * simulate), &Matrix3::IDENTITY) < 1e-9,
                "correction and simulation should undo each other for {:?}",
                cone
            );
        }
    }

    #[test]
    fn test_simulation_matrix_keeps_gray() {
        let gray = Vector3::splat(0.3);
        for cone in Cone::ALL {
            let m = simulation_matrix(cone, 0.9, false).unwrap();
            assert!((m * gray - gray).magnitude() < 1e-9);
        }
    }

    #[test]
    fn test_solver_keeps_gray() {
        let gray = Vector3::splat(0.4);
        for cone in Cone::ALL {
            let co = correction_coefficients(cone, 1.0, &SolverWeights::default());
            let out = solve_rgb(&co, gray);
            assert!(
                (out - gray).magnitude() < 1e-9,
                "solver recolored gray to {:?} for {:?}",
                out,
                cone
            );
        }
    }

    #[test]
    fn test_solver_reduces_cost() {
        let input = Vector3::new(0.8, 0.2, 0.3);
        for cone in Cone::ALL {
            let co = correction_coefficients(cone, 0.8, &SolverWeights::default());
            let out = solve_rgb(&co, input);
            let before = cost(&co, input, input);
            let after = cost(&co, out, input);
            assert!(
                after < before,
                "descent did not improve the {:?} cost: {} -> {}",
                cone,
                before,
                after
            );
        }
    }

    #[test]
    fn test_solver_mirrors_shader_constant_path() {
        // Without damping, the constant gradient half must go through
        // rgb2const exactly as the shader does.
        let co = correction_coefficients(Cone::Medium, 0.8, &SolverWeights::default());
        let rgb0 = Vector3::new(0.8, 0.2, 0.3);
        let direct = co.rgb2const * rgb0;
        let rebuilt = -2.0
            * (co.rgb_weights * rgb0
                + co.rgb2sim.transpose() * (co.opp_weights * (co.rgb2ideal * rgb0)));
        assert!((direct - rebuilt).magnitude() < 1e-12);
    }

    #[test]
    fn test_rgb_proximity_weights_pull_toward_input() {
        let input = Vector3::new(0.9, 0.1, 0.1);
        let plain = correction_coefficients(Cone::Long, 0.9, &SolverWeights::default());
        let anchored = correction_coefficients(
            Cone::Long,
            0.9,
            &SolverWeights {
                opponent: Vector3::new(5.0, 1.0, 1.0),
                rgb_proximity: Vector3::splat(10.0),
            },
        );
        let free = solve_rgb(&plain, input);
        let pulled = solve_rgb(&anchored, input);
        assert!(
            (pulled - input).magnitude() <= (free - input).magnitude() + 1e-12,
            "heavier rgb weights should not wander further from the input"
        );
    }

    #[test]
    fn test_damping_preserves_chroma_order() {
        let t = transforms(Cone::Medium, 1.0);
        let [k_rg, k_yb] = chroma_damping(&t);
        for k in [k_rg, k_yb] {
            assert!(k >= -0.5);
            let mut prev = damp_chroma(k, 0.0);
            for i in 1..=100 {
                let c = i as f64 / 100.0;
                let cur = damp_chroma(k, c);
                assert!(
                    cur >= prev,
                    "damping inverted chroma order at c={} (k={})",
                    c,
                    k
                );
                prev = cur;
            }
        }
    }

    #[test]
    fn test_damping_is_odd_and_anchored() {
        let k = -0.3;
        assert_eq!(damp_chroma(k, 0.0), 0.0);
        assert!((damp_chroma(k, 1.0) - (1.0 + k)).abs() < 1e-12);
        assert!((damp_chroma(k, -0.5) + damp_chroma(k, 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_damped_solver_keeps_gray() {
        let gray = Vector3::splat(0.5);
        let co = correction_coefficients(Cone::Long, 1.0, &SolverWeights::default())
            .with_chroma_damping();
        let out = solve_rgb(&co, gray);
        assert!((out - gray).magnitude() < 1e-9);
    }
}
