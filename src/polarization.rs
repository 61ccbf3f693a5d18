//! Jones-calculus polarization kernel: vector state and the handful of pure
//! transformation functions each element kind in `elements` composes from.
//!
//! A `Jones` vector's two components are always expressed in the same fixed
//! lab-frame basis the rest of the engine uses for `Vec2` (the scene's x/y
//! axes) — they are not attached to a ray's direction of travel. Functions
//! here that need an interface-local frame (tangent/normal) project into it,
//! transform, and project back out, rather than mutating a rotating frame.

use crate::geometry::Vec2;
use num::complex::Complex64;

/// A Jones vector `(Ex, Ey)`. Intensity is `|Ex|^2 + |Ey|^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jones {
    pub ex: Complex64,
    pub ey: Complex64,
}

impl Jones {
    pub const fn new(ex: Complex64, ey: Complex64) -> Self {
        Self { ex, ey }
    }

    pub fn intensity(self) -> f64 {
        self.ex.norm_sqr() + self.ey.norm_sqr()
    }

    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.ex - other.ex).norm() < epsilon && (self.ey - other.ey).norm() < epsilon
    }

    pub fn horizontal() -> Self {
        Self::new(Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0))
    }

    pub fn vertical() -> Self {
        Self::new(Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0))
    }

    pub fn diagonal_plus45() -> Self {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        Self::new(Complex64::new(s, 0.0), Complex64::new(s, 0.0))
    }

    pub fn diagonal_minus45() -> Self {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        Self::new(Complex64::new(s, 0.0), Complex64::new(-s, 0.0))
    }

    pub fn right_circular() -> Self {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        Self::new(Complex64::new(s, 0.0), Complex64::new(0.0, s))
    }

    pub fn left_circular() -> Self {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        Self::new(Complex64::new(s, 0.0), Complex64::new(0.0, -s))
    }

    /// Linear polarization at `angle_deg` from the x-axis: `[cos θ, sin θ]`.
    pub fn linear_at(angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self::new(Complex64::new(rad.cos(), 0.0), Complex64::new(rad.sin(), 0.0))
    }

    /// Projects onto a real unit axis: `Ex axis.x + Ey axis.y`.
    fn project(self, axis: Vec2) -> Complex64 {
        self.ex * axis.x + self.ey * axis.y
    }

    /// Recomposes a Jones vector from components along an orthonormal pair
    /// `(axis_a, comp_a)`, `(axis_b, comp_b)` back into the lab x/y basis.
    fn recompose(axis_a: Vec2, comp_a: Complex64, axis_b: Vec2, comp_b: Complex64) -> Self {
        Self::new(
            comp_a * axis_a.x + comp_b * axis_b.x,
            comp_a * axis_a.y + comp_b * axis_b.y,
        )
    }

    /// Rotates the vector's lab-frame representation by `angle_rad`, i.e.
    /// re-expresses it in a basis rotated by `angle_rad` from the lab x/y axes.
    fn rotated(self, angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        Self::new(self.ex * c + self.ey * s, -self.ex * s + self.ey * c)
    }
}

/// The tangent consistent with `normal = tangent.perp()` (i.e. `tangent`
/// rotated by +90° yields `normal`).
fn tangent_from_normal(normal: Vec2) -> Vec2 {
    Vec2::new(normal.y, -normal.x)
}

/// Reflection off a perfectly conducting surface: the s-component (along the
/// surface tangent) is unchanged, the p-component (along the normal) picks up
/// a π phase shift.
pub fn transform_mirror(jones: Jones, _direction_in: Vec2, normal: Vec2) -> Jones {
    let tangent = tangent_from_normal(normal);
    let es = jones.project(tangent);
    let ep = jones.project(normal);
    Jones::recompose(tangent, es, normal, -ep)
}

/// Thin-lens refraction does not touch polarization at the paraxial level.
pub fn transform_lens(jones: Jones) -> Jones {
    jones
}

/// Which branch of a beamsplitter (or PBS) an outgoing ray took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbsBranch {
    Transmitted,
    Reflected,
}

/// Computes the outgoing Jones vector and intensity factor for one branch of
/// a beamsplitter interaction.
///
/// `split_t`/`split_r` are only consulted on the non-polarizing path;
/// `pbs_axis_deg` only on the polarizing path.
#[allow(clippy::too_many_arguments)]
pub fn transform_beamsplitter(
    jones: Jones,
    direction_in: Vec2,
    normal: Vec2,
    is_polarizing: bool,
    pbs_axis_deg: f64,
    split_t: f64,
    split_r: f64,
    branch: PbsBranch,
) -> (Jones, f64) {
    if !is_polarizing {
        return match branch {
            PbsBranch::Transmitted => (jones, split_t),
            PbsBranch::Reflected => (transform_mirror(jones, direction_in, normal), split_r),
        };
    }

    let axis_rad = pbs_axis_deg.to_radians();
    let p_axis = Vec2::new(axis_rad.cos(), axis_rad.sin());
    let s_axis = p_axis.perp();
    let ep = jones.project(p_axis);
    let es = jones.project(s_axis);
    let total = ep.norm_sqr() + es.norm_sqr();

    match branch {
        PbsBranch::Transmitted => {
            let factor = if total > 0.0 { ep.norm_sqr() / total } else { 0.0 };
            (Jones::recompose(p_axis, ep, s_axis, Complex64::new(0.0, 0.0)), factor)
        }
        PbsBranch::Reflected => {
            let factor = if total > 0.0 { es.norm_sqr() / total } else { 0.0 };
            (Jones::recompose(p_axis, Complex64::new(0.0, 0.0), s_axis, es), factor)
        }
    }
}

/// Retarder transform: rotate into the fast-axis frame, apply the phase
/// shift to the slow-axis component, rotate back.
pub fn transform_waveplate(jones: Jones, phase_shift_deg: f64, fast_axis_deg: f64) -> Jones {
    let fast_rad = fast_axis_deg.to_radians();
    let local = jones.rotated(-fast_rad);
    let phase = Complex64::from_polar(1.0, phase_shift_deg.to_radians());
    let shifted = Jones::new(local.ex, local.ey * phase);
    shifted.rotated(fast_rad)
}

/// Wavelength-dependent pass type for `Dichroic` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassType {
    Longpass,
    Shortpass,
}

/// Fraction of intensity transmitted through a dichroic interface at
/// `wavelength_nm`, using a smooth tanh ramp centered on `cutoff_nm`.
pub fn dichroic_transmission(
    wavelength_nm: f64,
    cutoff_nm: f64,
    transition_width_nm: f64,
    pass_type: PassType,
) -> f64 {
    let longpass = if transition_width_nm.abs() < 1e-12 {
        if wavelength_nm >= cutoff_nm {
            1.0
        } else {
            0.0
        }
    } else {
        0.5 * (1.0 + ((wavelength_nm - cutoff_nm) / (transition_width_nm / 2.0)).tanh())
    };
    match pass_type {
        PassType::Longpass => longpass,
        PassType::Shortpass => 1.0 - longpass,
    }
}

/// Amplitude and power Fresnel coefficients for an interface with indices
/// `n1` (incident side) / `n2` (transmitted side), given the cosines of the
/// incident and transmitted angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FresnelCoefficients {
    pub r_s: f64,
    pub r_p: f64,
    pub big_r_s: f64,
    pub big_r_p: f64,
    pub big_t_s: f64,
    pub big_t_p: f64,
}

pub fn fresnel_coefficients(
    n1: f64,
    n2: f64,
    cos_theta_i: f64,
    cos_theta_t: f64,
) -> FresnelCoefficients {
    let r_s = (n1 * cos_theta_i - n2 * cos_theta_t) / (n1 * cos_theta_i + n2 * cos_theta_t);
    let r_p = (n2 * cos_theta_i - n1 * cos_theta_t) / (n2 * cos_theta_i + n1 * cos_theta_t);
    let big_r_s = r_s * r_s;
    let big_r_p = r_p * r_p;
    FresnelCoefficients {
        r_s,
        r_p,
        big_r_s,
        big_r_p,
        big_t_s: 1.0 - big_r_s,
        big_t_p: 1.0 - big_r_p,
    }
}

/// Splits a Jones vector into its (s, p) complex amplitudes given the
/// interface `normal` — the s-axis is the surface tangent, the p-axis the
/// normal, matching the convention `transform_mirror` uses.
pub fn project_s_p(jones: Jones, normal: Vec2) -> (Complex64, Complex64) {
    let tangent = tangent_from_normal(normal);
    (jones.project(tangent), jones.project(normal))
}

/// Recomposes (s, p) amplitudes back into the lab frame for the given normal.
pub fn recompose_s_p(normal: Vec2, es: Complex64, ep: Complex64) -> Jones {
    let tangent = tangent_from_normal(normal);
    Jones::recompose(tangent, es, normal, ep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn horizontal_intensity_is_one() {
        assert_abs_diff_eq!(Jones::horizontal().intensity(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mirror_flips_p_keeps_s() {
        // Normal along +x, tangent along +y: horizontal light is entirely
        // along the normal (p), vertical entirely along the tangent (s).
        let normal = Vec2::new(1.0, 0.0);
        let out = transform_mirror(Jones::horizontal(), Vec2::new(-1.0, 0.0), normal);
        assert_abs_diff_eq!(out.ex.re, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.ex.im, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out.ey.re, 0.0, epsilon = 1e-12);

        let out_v = transform_mirror(Jones::vertical(), Vec2::new(-1.0, 0.0), normal);
        assert!(out_v.approx_eq(Jones::vertical(), 1e-12));
    }

    #[test]
    fn mirror_preserves_intensity() {
        let normal = Vec2::new(1.0, 0.0);
        let input = Jones::diagonal_plus45();
        let out = transform_mirror(input, Vec2::new(-1.0, 0.0), normal);
        assert_abs_diff_eq!(out.intensity(), input.intensity(), epsilon = 1e-12);
    }

    #[test]
    fn two_quarter_wave_plates_at_45_make_half_wave() {
        let h = Jones::horizontal();
        let once = transform_waveplate(h, 90.0, 45.0);
        let twice = transform_waveplate(once, 90.0, 45.0);
        assert!(twice.approx_eq(Jones::vertical(), 1e-9));
    }

    #[test]
    fn waveplate_preserves_intensity() {
        let input = Jones::linear_at(17.0);
        let out = transform_waveplate(input, 37.0, 12.0);
        assert_abs_diff_eq!(out.intensity(), input.intensity(), epsilon = 1e-12);
    }

    #[test]
    fn pbs_malus_law() {
        let axis_deg = 20.0;
        let phi_deg = 65.0;
        let input = Jones::linear_at(phi_deg);
        let (_, t_factor) = transform_beamsplitter(
            input,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            true,
            axis_deg,
            0.0,
            0.0,
            PbsBranch::Transmitted,
        );
        let (_, r_factor) = transform_beamsplitter(
            input,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            true,
            axis_deg,
            0.0,
            0.0,
            PbsBranch::Reflected,
        );
        let expected_t = ((phi_deg - axis_deg).to_radians()).cos().powi(2);
        let expected_r = ((phi_deg - axis_deg).to_radians()).sin().powi(2);
        assert_abs_diff_eq!(t_factor, expected_t, epsilon = 1e-6);
        assert_abs_diff_eq!(r_factor, expected_r, epsilon = 1e-6);
        assert_abs_diff_eq!(t_factor + r_factor, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn non_polarizing_beamsplitter_uses_split_ratios() {
        let input = Jones::horizontal();
        let (t_jones, t_factor) = transform_beamsplitter(
            input,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            false,
            0.0,
            0.6,
            0.4,
            PbsBranch::Transmitted,
        );
        assert_abs_diff_eq!(t_factor, 0.6, epsilon = 1e-12);
        assert!(t_jones.approx_eq(input, 1e-12));

        let (_, r_factor) = transform_beamsplitter(
            input,
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            false,
            0.0,
            0.6,
            0.4,
            PbsBranch::Reflected,
        );
        assert_abs_diff_eq!(r_factor, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn dichroic_transmission_monotonic_and_crosses_half_at_cutoff() {
        let t_at_cutoff = dichroic_transmission(550.0, 550.0, 20.0, PassType::Longpass);
        assert_abs_diff_eq!(t_at_cutoff, 0.5, epsilon = 1e-12);
        let below = dichroic_transmission(400.0, 550.0, 20.0, PassType::Longpass);
        let above = dichroic_transmission(700.0, 550.0, 20.0, PassType::Longpass);
        assert!(below < t_at_cutoff && t_at_cutoff < above);

        let shortpass_at_cutoff = dichroic_transmission(550.0, 550.0, 20.0, PassType::Shortpass);
        assert_abs_diff_eq!(shortpass_at_cutoff, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn fresnel_normal_incidence_matches_closed_form() {
        let n1 = 1.0;
        let n2 = 1.5;
        let coeffs = fresnel_coefficients(n1, n2, 1.0, 1.0);
        let expected_r = ((n1 - n2) / (n1 + n2)).powi(2);
        assert_abs_diff_eq!(coeffs.big_r_s, expected_r, epsilon = 1e-12);
        assert_abs_diff_eq!(coeffs.big_r_p, expected_r, epsilon = 1e-12);
        assert_abs_diff_eq!(coeffs.big_t_s, 1.0 - expected_r, epsilon = 1e-12);
    }
}
