//! The validated filter configuration.
//!
//! [`FilterState`] always describes a legal filter: every field change goes
//! through a find-first-valid resolver, so an upstream change (say, a new
//! mode) can never strand an illegal downstream value. Configurations
//! serialize to dash-joined lowercase tokens (`correction-ocs-deuteranopia`);
//! that text is the settings-store contract and round-trips byte for byte.

use std::fmt;

use anyhow::{Context, Result};
use itertools::iproduct;

use crate::colorspace::{Cone, TransformFamily};
use crate::daltonizer::{self, DaltonizeParams};
use crate::effects::{self, InversionMode, MixOrder};
use crate::gdh::{self, GdhParams};
use crate::math::Matrix3;
use crate::opponent::{self, SolverCoefficients, SolverWeights};

/// Default strength for a freshly constructed configuration.
pub const DEFAULT_STRENGTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Correction,
    Simulation,
    Effect,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] =
        [FilterMode::Correction, FilterMode::Simulation, FilterMode::Effect];

    pub fn cfg_string(self) -> &'static str {
        match self {
            FilterMode::Correction => "correction",
            FilterMode::Simulation => "simulation",
            FilterMode::Effect => "effect",
        }
    }

    pub fn is_color_blindness(self) -> bool {
        !matches!(self, FilterMode::Effect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorBlindnessType {
    Protan,
    Deutan,
    Tritan,
}

impl ColorBlindnessType {
    pub const ALL: [ColorBlindnessType; 3] = [
        ColorBlindnessType::Protan,
        ColorBlindnessType::Deutan,
        ColorBlindnessType::Tritan,
    ];

    pub fn cfg_string(self) -> &'static str {
        match self {
            ColorBlindnessType::Protan => "protanopia",
            ColorBlindnessType::Deutan => "deuteranopia",
            ColorBlindnessType::Tritan => "tritanopia",
        }
    }

    /// The deficient cone.
    pub fn cone(self) -> Cone {
        match self {
            ColorBlindnessType::Protan => Cone::Long,
            ColorBlindnessType::Deutan => Cone::Medium,
            ColorBlindnessType::Tritan => Cone::Short,
        }
    }
}

/// Which space a transform operates in. Linear-space transforms need the
/// rendering side to undo the sRGB encoding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colorspace {
    Linear,
    Srgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Opponent Color Solver.
    Ocs,
    /// GdH's filters.
    Gdh,
    /// Error steering.
    Es,
    /// Daltonize on the Hunt-Pointer-Estevez model.
    Hpe,
    /// Daltonize on the AOSP model.
    Aosp,
    /// Channel mixer, GBR order.
    MixGbr,
    /// Channel mixer, BRG order.
    MixBrg,
    Desaturate,
    LightInvert,
    ColorInvert,
}

impl Algorithm {
    /// Algorithms valid for Correction mode, in presentation order.
    pub const COLOR_BLINDNESS: [Algorithm; 5] = [
        Algorithm::Ocs,
        Algorithm::Gdh,
        Algorithm::Es,
        Algorithm::Hpe,
        Algorithm::Aosp,
    ];
    /// Algorithms valid for Simulation mode: the subset with a simulation
    /// form (error steering has none).
    pub const SIMULATION: [Algorithm; 4] =
        [Algorithm::Ocs, Algorithm::Gdh, Algorithm::Hpe, Algorithm::Aosp];
    /// Algorithms valid for Effect mode.
    pub const EFFECTS: [Algorithm; 5] = [
        Algorithm::MixGbr,
        Algorithm::MixBrg,
        Algorithm::Desaturate,
        Algorithm::LightInvert,
        Algorithm::ColorInvert,
    ];

    pub fn cfg_string(self) -> &'static str {
        match self {
            Algorithm::Ocs => "ocs",
            Algorithm::Gdh => "gdh",
            Algorithm::Es => "es",
            Algorithm::Hpe => "hpe",
            Algorithm::Aosp => "aosp",
            Algorithm::MixGbr => "mixgbr",
            Algorithm::MixBrg => "mixbrg",
            Algorithm::Desaturate => "desaturate",
            Algorithm::LightInvert => "lightinvert",
            Algorithm::ColorInvert => "colorinvert",
        }
    }

    pub fn is_color_blindness(self) -> bool {
        Self::COLOR_BLINDNESS.contains(&self)
    }

    pub fn uses_factor(self) -> bool {
        !matches!(self, Algorithm::LightInvert | Algorithm::ColorInvert)
    }

    pub fn uses_tritan_hack(self) -> bool {
        matches!(self, Algorithm::Es | Algorithm::Hpe | Algorithm::Aosp)
    }

    pub fn uses_high_contrast(self) -> bool {
        matches!(self, Algorithm::Gdh)
    }

    pub fn supports_simulation(self) -> bool {
        self.is_color_blindness() && !matches!(self, Algorithm::Es)
    }

    /// The cone-response model a daltonize-family algorithm projects in.
    pub fn transform_family(self) -> Option<TransformFamily> {
        match self {
            Algorithm::Es | Algorithm::Hpe => Some(TransformFamily::Hpe),
            Algorithm::Aosp => Some(TransformFamily::Aosp),
            _ => None,
        }
    }

    pub fn colorspace(self) -> Colorspace {
        match self {
            // GdH's filters were written against sRGB values, and the
            // inversions do their own gamma shenanigans.
            Algorithm::Gdh | Algorithm::LightInvert | Algorithm::ColorInvert => Colorspace::Srgb,
            _ => Colorspace::Linear,
        }
    }
}

/// Alternate projection plane for tritanopia.
///
/// NB: the token pairing looks crossed (`typical` enables the modified
/// plane), but the tokens are the persisted-format contract, so they stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TritanHack {
    Enabled,
    Disabled,
}

impl TritanHack {
    pub const ALL: [TritanHack; 2] = [TritanHack::Enabled, TritanHack::Disabled];

    pub fn cfg_string(self) -> &'static str {
        match self {
            TritanHack::Enabled => "typical",
            TritanHack::Disabled => "modified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighContrast {
    Enabled,
    Disabled,
}

impl HighContrast {
    pub const ALL: [HighContrast; 2] = [HighContrast::Enabled, HighContrast::Disabled];

    pub fn cfg_string(self) -> &'static str {
        match self {
            HighContrast::Enabled => "high",
            HighContrast::Disabled => "normal",
        }
    }
}

/// Algorithms selectable under `mode`.
pub fn algorithms_for(mode: FilterMode) -> &'static [Algorithm] {
    match mode {
        FilterMode::Correction => &Algorithm::COLOR_BLINDNESS,
        FilterMode::Simulation => &Algorithm::SIMULATION,
        FilterMode::Effect => &Algorithm::EFFECTS,
    }
}

/// Color-blindness types selectable under `mode`, if the mode has any.
pub fn types_for(mode: FilterMode) -> Option<&'static [ColorBlindnessType]> {
    mode.is_color_blindness().then_some(&ColorBlindnessType::ALL)
}

pub fn tritan_hack_allowed(
    mode: FilterMode,
    algorithm: Algorithm,
    cbt: Option<ColorBlindnessType>,
) -> bool {
    mode.is_color_blindness()
        && algorithm.uses_tritan_hack()
        && cbt == Some(ColorBlindnessType::Tritan)
}

pub fn high_contrast_allowed(
    mode: FilterMode,
    algorithm: Algorithm,
    cbt: Option<ColorBlindnessType>,
) -> bool {
    mode == FilterMode::Correction
        && algorithm.uses_high_contrast()
        && matches!(
            cbt,
            Some(ColorBlindnessType::Protan) | Some(ColorBlindnessType::Deutan)
        )
}

fn tritan_hack_options(
    mode: FilterMode,
    algorithm: Algorithm,
    cbt: Option<ColorBlindnessType>,
) -> Option<&'static [TritanHack]> {
    tritan_hack_allowed(mode, algorithm, cbt).then_some(&TritanHack::ALL)
}

fn high_contrast_options(
    mode: FilterMode,
    algorithm: Algorithm,
    cbt: Option<ColorBlindnessType>,
) -> Option<&'static [HighContrast]> {
    high_contrast_allowed(mode, algorithm, cbt).then_some(&HighContrast::ALL)
}

/// Find-first-valid resolution, shared by every field setter: the first of
/// {requested, current, fallback, first legal choice} that is actually in
/// `choices`. `None` choices means the field does not apply at all.
pub fn resolve<T: Copy + PartialEq>(
    choices: Option<&[T]>,
    requested: Option<T>,
    current: Option<T>,
    fallback: Option<T>,
) -> Option<T> {
    let choices = choices?;
    let find = |v: Option<T>| v.filter(|v| choices.contains(v));
    find(requested)
        .or_else(|| find(current))
        .or_else(|| find(fallback))
        .or_else(|| choices.first().copied())
}

fn lookup<T: Copy>(choices: Option<&[T]>, token: &str, cfg: impl Fn(T) -> &'static str) -> Option<T> {
    choices?.iter().copied().find(|&c| cfg(c) == token)
}

/// The merged parameter bag a transform component consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterProperties {
    pub mode: FilterMode,
    pub algorithm: Algorithm,
    pub is_correction: bool,
    pub which_cone: Option<Cone>,
    pub transform: Option<TransformFamily>,
    pub error_steering: bool,
    pub tritan_hack: bool,
    pub high_contrast: bool,
    /// Blend strength; populated only when the algorithm uses one.
    pub factor: Option<f64>,
}

/// What the rendering side has to run for a configuration.
#[derive(Debug, Clone)]
pub enum TransformOp {
    /// A single 3x3 transform.
    Matrix(Matrix3),
    /// The iterative opponent-space correction.
    Solver(SolverCoefficients),
    /// A non-linear per-pixel effect.
    Inversion(InversionMode),
}

#[derive(Debug, Clone)]
pub struct Transform {
    pub colorspace: Colorspace,
    pub op: TransformOp,
}

/// Always describes a valid filter and can be used to authoritatively
/// validate a filter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    mode: FilterMode,
    algorithm: Algorithm,
    color_blindness_type: Option<ColorBlindnessType>,
    tritan_hack: Option<TritanHack>,
    high_contrast: Option<HighContrast>,
    strength: f64,
}

impl Default for FilterState {
    /// The known-good default configuration.
    fn default() -> Self {
        Self {
            mode: FilterMode::Correction,
            algorithm: Algorithm::Ocs,
            color_blindness_type: Some(ColorBlindnessType::Deutan),
            tritan_hack: None,
            high_contrast: None,
            strength: DEFAULT_STRENGTH,
        }
    }
}

impl FilterState {
    /// Builds a configuration, validating each requested field in
    /// dependency order against the (already validated) fields before it.
    /// Illegal requests degrade to the default configuration's values.
    pub fn new(
        mode: Option<FilterMode>,
        algorithm: Option<Algorithm>,
        color_blindness_type: Option<ColorBlindnessType>,
        tritan_hack: Option<TritanHack>,
        high_contrast: Option<HighContrast>,
    ) -> Self {
        let mut state = Self::default();
        state.apply(mode, algorithm, color_blindness_type, tritan_hack, high_contrast);
        state
    }

    /// Re-resolves every field in dependency order. Fields with a `Some`
    /// request prefer the requested value; all others re-validate their
    /// current value, falling back when an upstream change made it illegal.
    fn apply(
        &mut self,
        mode: Option<FilterMode>,
        algorithm: Option<Algorithm>,
        color_blindness_type: Option<ColorBlindnessType>,
        tritan_hack: Option<TritanHack>,
        high_contrast: Option<HighContrast>,
    ) {
        self.mode = resolve(Some(&FilterMode::ALL), mode, Some(self.mode), None)
            .unwrap_or(FilterMode::Correction);
        self.algorithm = resolve(
            Some(algorithms_for(self.mode)),
            algorithm,
            Some(self.algorithm),
            None,
        )
        .unwrap_or(Algorithm::Ocs);
        self.color_blindness_type = resolve(
            types_for(self.mode),
            color_blindness_type,
            self.color_blindness_type,
            Some(ColorBlindnessType::Deutan),
        );
        self.tritan_hack = resolve(
            tritan_hack_options(self.mode, self.algorithm, self.color_blindness_type),
            tritan_hack,
            self.tritan_hack,
            None,
        );
        self.high_contrast = resolve(
            high_contrast_options(self.mode, self.algorithm, self.color_blindness_type),
            high_contrast,
            self.high_contrast,
            Some(HighContrast::Disabled),
        );
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn color_blindness_type(&self) -> Option<ColorBlindnessType> {
        self.color_blindness_type
    }

    pub fn tritan_hack(&self) -> Option<TritanHack> {
        self.tritan_hack
    }

    pub fn high_contrast(&self) -> Option<HighContrast> {
        self.high_contrast
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.apply(Some(mode), None, None, None, None);
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.apply(None, Some(algorithm), None, None, None);
    }

    pub fn set_color_blindness_type(&mut self, cbt: ColorBlindnessType) {
        self.apply(None, None, Some(cbt), None, None);
    }

    pub fn set_tritan_hack(&mut self, tritan_hack: TritanHack) {
        self.apply(None, None, None, Some(tritan_hack), None);
    }

    pub fn set_high_contrast(&mut self, high_contrast: HighContrast) {
        self.apply(None, None, None, None, Some(high_contrast));
    }

    /// Out-of-range strengths are rejected; the previous value stays.
    pub fn set_strength(&mut self, strength: f64) {
        if (0.0..=1.0).contains(&strength) {
            self.strength = strength;
        }
    }

    /// Parses the dash-token form. Returns `None` for unknown tokens,
    /// missing required fields, optional fields present when inapplicable,
    /// or leftover tokens; the exact inverse of [`fmt::Display`].
    pub fn from_string(s: &str) -> Option<Self> {
        let mut fields = s.split('-');

        let mode = lookup(Some(&FilterMode::ALL[..]), fields.next()?, FilterMode::cfg_string)?;
        let algorithm = lookup(
            Some(algorithms_for(mode)),
            fields.next()?,
            Algorithm::cfg_string,
        )?;

        let mut color_blindness_type = None;
        let mut tritan_hack = None;
        let mut high_contrast = None;
        if mode.is_color_blindness() {
            color_blindness_type = Some(lookup(
                types_for(mode),
                fields.next()?,
                ColorBlindnessType::cfg_string,
            )?);

            if tritan_hack_allowed(mode, algorithm, color_blindness_type) {
                tritan_hack = Some(lookup(
                    tritan_hack_options(mode, algorithm, color_blindness_type),
                    fields.next()?,
                    TritanHack::cfg_string,
                )?);
            }
            if high_contrast_allowed(mode, algorithm, color_blindness_type) {
                high_contrast = Some(lookup(
                    high_contrast_options(mode, algorithm, color_blindness_type),
                    fields.next()?,
                    HighContrast::cfg_string,
                )?);
            }
        }

        if fields.next().is_some() {
            return None;
        }

        Some(Self::new(
            Some(mode),
            Some(algorithm),
            color_blindness_type,
            tritan_hack,
            high_contrast,
        ))
    }

    /// The merged parameter bag for the transform components.
    pub fn properties(&self) -> FilterProperties {
        FilterProperties {
            mode: self.mode,
            algorithm: self.algorithm,
            is_correction: self.mode == FilterMode::Correction,
            which_cone: self.color_blindness_type.map(ColorBlindnessType::cone),
            transform: self.algorithm.transform_family(),
            error_steering: self.algorithm == Algorithm::Es,
            tritan_hack: self.tritan_hack == Some(TritanHack::Enabled),
            high_contrast: self.high_contrast == Some(HighContrast::Enabled),
            factor: self.algorithm.uses_factor().then_some(self.strength),
        }
    }

    /// Computes the transform the rendering side should run for this
    /// configuration. Fails only when the underlying math does (singular
    /// transform for the requested parameters).
    pub fn compute_transform(&self) -> Result<Transform> {
        let p = self.properties();
        let cone = || p.which_cone.context("color blindness type not resolved");
        let factor = || p.factor.context("algorithm carries no strength");

        let op = match self.algorithm {
            Algorithm::Ocs => {
                if p.is_correction {
                    TransformOp::Solver(opponent::correction_coefficients(
                        cone()?,
                        factor()?,
                        &SolverWeights::default(),
                    ))
                } else {
                    TransformOp::Matrix(opponent::simulation_matrix(cone()?, factor()?, false)?)
                }
            }
            Algorithm::Gdh => TransformOp::Matrix(gdh::matrix(&GdhParams {
                cone: cone()?,
                is_correction: p.is_correction,
                high_contrast: p.high_contrast,
                factor: factor()?,
            })),
            Algorithm::Es | Algorithm::Hpe | Algorithm::Aosp => {
                TransformOp::Matrix(daltonizer::matrix(&DaltonizeParams {
                    cone: cone()?,
                    family: p.transform.context("daltonizer needs a transform family")?,
                    is_correction: p.is_correction,
                    factor: factor()?,
                    tritan_hack: p.tritan_hack,
                    error_steering: p.error_steering,
                }))
            }
            Algorithm::MixGbr => {
                TransformOp::Matrix(effects::channel_mix_matrix(MixOrder::Gbr, factor()?))
            }
            Algorithm::MixBrg => {
                TransformOp::Matrix(effects::channel_mix_matrix(MixOrder::Brg, factor()?))
            }
            Algorithm::Desaturate => {
                TransformOp::Matrix(effects::desaturate_matrix(factor()?))
            }
            Algorithm::LightInvert => TransformOp::Inversion(InversionMode::Lightness),
            Algorithm::ColorInvert => TransformOp::Inversion(InversionMode::Color),
        };

        Ok(Transform {
            colorspace: self.algorithm.colorspace(),
            op,
        })
    }

    /// Every reachable configuration, at the default strength. Drives the
    /// host's menu construction and the exhaustive round-trip tests.
    pub fn all_reachable() -> Vec<FilterState> {
        fn expand<T: Copy>(choices: Option<&[T]>) -> Vec<Option<T>> {
            match choices {
                None => vec![None],
                Some(cs) => cs.iter().copied().map(Some).collect(),
            }
        }

        let mut out = Vec::new();
        for mode in FilterMode::ALL {
            for &algorithm in algorithms_for(mode) {
                for cbt in expand(types_for(mode)) {
                    let hacks = expand(tritan_hack_options(mode, algorithm, cbt));
                    let contrasts = expand(high_contrast_options(mode, algorithm, cbt));
                    for (th, hc) in iproduct!(hacks, contrasts) {
                        out.push(FilterState::new(Some(mode), Some(algorithm), cbt, th, hc));
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.mode.cfg_string(), self.algorithm.cfg_string())?;
        if self.mode.is_color_blindness() {
            if let Some(cbt) = self.color_blindness_type {
                write!(f, "-{}", cbt.cfg_string())?;
            }
            if tritan_hack_allowed(self.mode, self.algorithm, self.color_blindness_type) {
                if let Some(th) = self.tritan_hack {
                    write!(f, "-{}", th.cfg_string())?;
                }
            }
            if high_contrast_allowed(self.mode, self.algorithm, self.color_blindness_type) {
                if let Some(hc) = self.high_contrast {
                    write!(f, "-{}", hc.cfg_string())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_the_known_good_configuration() {
        let state = FilterState::default();
        assert_eq!(state.mode(), FilterMode::Correction);
        assert_eq!(state.algorithm(), Algorithm::Ocs);
        assert_eq!(state.color_blindness_type(), Some(ColorBlindnessType::Deutan));
        assert_eq!(state.to_string(), "correction-ocs-deuteranopia");
    }

    #[test]
    fn test_every_reachable_state_round_trips() {
        let states = FilterState::all_reachable();
        assert!(states.len() > 20, "expected a meaningful state space");
        for state in states {
            let text = state.to_string();
            let parsed = FilterState::from_string(&text)
                .unwrap_or_else(|| panic!("{} did not parse", text));
            assert_eq!(parsed, state, "round trip changed {}", text);
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn test_invalid_simulation_algorithm_self_repairs() {
        // Error steering has no simulation form, so requesting it under
        // Simulation must resolve to some other valid algorithm.
        let state = FilterState::new(
            Some(FilterMode::Simulation),
            Some(Algorithm::Es),
            None,
            None,
            None,
        );
        assert_eq!(state.mode(), FilterMode::Simulation);
        assert_ne!(state.algorithm(), Algorithm::Es);
        assert!(algorithms_for(FilterMode::Simulation).contains(&state.algorithm()));
    }

    #[test]
    fn test_mode_change_revalidates_downstream_fields() {
        let mut state = FilterState::new(
            Some(FilterMode::Correction),
            Some(Algorithm::Es),
            Some(ColorBlindnessType::Tritan),
            Some(TritanHack::Enabled),
            None,
        );
        assert_eq!(state.tritan_hack(), Some(TritanHack::Enabled));

        // Es is illegal under Simulation; the algorithm must repair and the
        // now-inapplicable tritan hack must clear.
        state.set_mode(FilterMode::Simulation);
        assert_ne!(state.algorithm(), Algorithm::Es);
        assert_eq!(state.tritan_hack(), None);

        // Effect mode drops the color-blindness fields entirely.
        state.set_mode(FilterMode::Effect);
        assert!(Algorithm::EFFECTS.contains(&state.algorithm()));
        assert_eq!(state.color_blindness_type(), None);
    }

    #[test]
    fn test_previous_value_survives_invalid_request() {
        let mut state = FilterState::default();
        state.set_algorithm(Algorithm::Hpe);
        // An effect algorithm is illegal in Correction mode; the previous
        // algorithm stays.
        state.set_algorithm(Algorithm::Desaturate);
        assert_eq!(state.algorithm(), Algorithm::Hpe);
    }

    #[test]
    fn test_tritan_hack_requires_tritan() {
        let mut state = FilterState::new(
            Some(FilterMode::Correction),
            Some(Algorithm::Hpe),
            Some(ColorBlindnessType::Tritan),
            Some(TritanHack::Disabled),
            None,
        );
        assert_eq!(state.tritan_hack(), Some(TritanHack::Disabled));

        state.set_color_blindness_type(ColorBlindnessType::Protan);
        assert_eq!(state.tritan_hack(), None, "hack only applies to tritanopia");
    }

    #[test]
    fn test_high_contrast_defaults_to_disabled() {
        let state = FilterState::new(
            Some(FilterMode::Correction),
            Some(Algorithm::Gdh),
            Some(ColorBlindnessType::Protan),
            None,
            None,
        );
        assert_eq!(state.high_contrast(), Some(HighContrast::Disabled));
        assert_eq!(state.to_string(), "correction-gdh-protanopia-normal");
    }

    #[test]
    fn test_strength_setter_rejects_out_of_range() {
        let mut state = FilterState::default();
        state.set_strength(0.75);
        assert_eq!(state.strength(), 0.75);
        state.set_strength(1.5);
        assert_eq!(state.strength(), 0.75);
        state.set_strength(-0.1);
        assert_eq!(state.strength(), 0.75);
    }

    #[test]
    fn test_from_string_end_to_end_deutan() {
        let state = FilterState::from_string("correction-ocs-deuteranopia").unwrap();
        let p = state.properties();
        assert!(p.is_correction);
        assert_eq!(p.which_cone, Some(Cone::Medium));
        assert_eq!(p.factor, Some(DEFAULT_STRENGTH));
    }

    #[test]
    fn test_from_string_tritan_hack_round_trip() {
        let text = "correction-hpe-tritanopia-typical";
        let state = FilterState::from_string(text).unwrap();
        assert_eq!(state.to_string(), text);
        assert!(state.properties().tritan_hack);

        assert_eq!(
            FilterState::from_string("correction-hpe-tritanopia-typical-extra"),
            None,
            "trailing tokens must be rejected"
        );
    }

    #[test]
    fn test_from_string_rejects_malformed_input() {
        for bad in [
            "",
            "correction",
            "correction-ocs",
            "nonsense-ocs-deuteranopia",
            "correction-mixgbr",
            "effect-ocs",
            "correction-ocs-deuteranopia-typical",
            "correction-gdh-tritanopia-high",
            "simulation-es-deuteranopia",
            "correction-hpe-tritanopia",
        ] {
            assert_eq!(FilterState::from_string(bad), None, "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_effect_states_have_no_color_blindness_fields() {
        let state = FilterState::from_string("effect-desaturate").unwrap();
        let p = state.properties();
        assert_eq!(p.which_cone, None);
        assert!(!p.is_correction);
        assert_eq!(p.factor, Some(DEFAULT_STRENGTH));

        let inv = FilterState::from_string("effect-lightinvert").unwrap();
        assert_eq!(inv.properties().factor, None, "inversions take no strength");
    }

    #[test]
    fn test_compute_transform_covers_every_state() {
        for state in FilterState::all_reachable() {
            let transform = state
                .compute_transform()
                .unwrap_or_else(|e| panic!("{}: {}", state, e));
            match (state.algorithm(), &transform.op) {
                (Algorithm::Ocs, TransformOp::Solver(_)) => {
                    assert_eq!(state.mode(), FilterMode::Correction)
                }
                (Algorithm::Ocs, TransformOp::Matrix(_)) => {
                    assert_eq!(state.mode(), FilterMode::Simulation)
                }
                (Algorithm::LightInvert | Algorithm::ColorInvert, TransformOp::Inversion(_)) => {}
                (_, TransformOp::Matrix(_)) => {}
                (alg, op) => panic!("unexpected op {:?} for {:?}", op, alg),
            }
        }
    }

    #[test]
    fn test_gdh_runs_in_srgb_space() {
        let state = FilterState::from_string("correction-gdh-deuteranopia-normal").unwrap();
        assert_eq!(state.compute_transform().unwrap().colorspace, Colorspace::Srgb);
        let state = FilterState::from_string("correction-hpe-deuteranopia").unwrap();
        assert_eq!(state.compute_transform().unwrap().colorspace, Colorspace::Linear);
    }
}
