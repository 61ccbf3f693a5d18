//! The element library: one `interact` implementation per optical-element
//! kind, dispatched through a single tagged enum rather than a trait object
//! hierarchy, since the set of kinds is closed and small.

use crate::geometry::{GeometrySegment, Hit, Vec2};
use crate::polarization::{
    dichroic_transmission, fresnel_coefficients, project_s_p, recompose_s_p,
    transform_beamsplitter, transform_lens, transform_mirror, transform_waveplate, Jones,
    PassType, PbsBranch,
};
use crate::ray::{ElementId, Ray};

/// The physical behavior attached to one interface. Each variant's fields
/// match the JSON vocabulary an enclosing application would serialize.
#[derive(Debug, Clone, PartialEq)]
pub enum OpticalProperties {
    Lens {
        efl_mm: f64,
    },
    Mirror {
        /// Fraction in `[0, 1]`, not a percent (`1.0` is a perfect mirror).
        reflectivity: f64,
    },
    Refractive {
        n1: f64,
        n2: f64,
    },
    Beamsplitter {
        split_t: f64,
        split_r: f64,
        is_polarizing: bool,
        pbs_transmission_axis_deg: f64,
    },
    Waveplate {
        phase_shift_deg: f64,
        fast_axis_deg: f64,
    },
    Dichroic {
        cutoff_nm: f64,
        transition_width_nm: f64,
        pass_type: PassType,
    },
}

/// An interface in the scene: where it is, and what it does to a ray that
/// hits it. Read-only for the duration of `trace_rays`.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalElement {
    pub geometry: GeometrySegment,
    pub properties: OpticalProperties,
}

/// A child ray produced by an interaction, paired with the scalar intensity
/// factor applied to get here (useful for energy-conservation tests).
struct Candidate {
    direction: Vec2,
    polarization: Jones,
    factor: f64,
}

impl OpticalProperties {
    /// The single polymorphic dispatch point: given the ray that hit this
    /// element and the intersection record, returns zero or more outgoing
    /// rays. An empty result means the ray is absorbed here.
    pub fn interact(
        &self,
        ray: &Ray,
        hit: &Hit,
        element_id: ElementId,
        epsilon_advance: f64,
        min_intensity_threshold: f64,
    ) -> Vec<Ray> {
        // `ray.path_points` is expected to already include `hit.point` — the
        // propagation engine appends it before calling `interact`, since that
        // append must also happen when the element absorbs the ray outright
        // (empty return).
        let base = ray.clone();

        let candidates = match self {
            OpticalProperties::Mirror { reflectivity } => mirror_candidates(ray, hit, *reflectivity),
            OpticalProperties::Lens { efl_mm } => lens_candidates(ray, hit, *efl_mm),
            OpticalProperties::Refractive { n1, n2 } => refractive_candidates(ray, hit, *n1, *n2),
            OpticalProperties::Beamsplitter {
                split_t,
                split_r,
                is_polarizing,
                pbs_transmission_axis_deg,
            } => beamsplitter_candidates(
                ray,
                hit,
                *split_t,
                *split_r,
                *is_polarizing,
                *pbs_transmission_axis_deg,
            ),
            OpticalProperties::Waveplate { phase_shift_deg, fast_axis_deg } => {
                waveplate_candidates(ray, *phase_shift_deg, *fast_axis_deg)
            }
            OpticalProperties::Dichroic { cutoff_nm, transition_width_nm, pass_type } => {
                dichroic_candidates(ray, hit, *cutoff_nm, *transition_width_nm, *pass_type)
            }
        };

        candidates
            .into_iter()
            .filter_map(|c| {
                let new_intensity = ray.intensity * c.factor;
                if new_intensity < min_intensity_threshold {
                    return None;
                }
                let position = hit.point + c.direction * epsilon_advance;
                Some(base.split(position, c.direction, c.polarization, c.factor, hit.t, element_id))
            })
            .collect()
    }

    /// True only for `Waveplate`: the single continuing ray's own
    /// polarization changes mid-flight, so its path must be split into a
    /// pre-transform segment and a post-transform segment (see
    /// `engine::trace_rays`'s path-segment-splitting rule). A polarizing
    /// beamsplitter does not need this — it produces two *separate* rays,
    /// each with its own constant polarization for the rest of its path, so
    /// there is no single path whose polarization varies along its length.
    pub fn changes_polarization_frame(&self) -> bool {
        matches!(self, OpticalProperties::Waveplate { .. })
    }
}

fn mirror_candidates(ray: &Ray, hit: &Hit, reflectivity: f64) -> Vec<Candidate> {
    vec![Candidate {
        direction: ray.direction.reflect(hit.normal),
        polarization: transform_mirror(ray.polarization, ray.direction, hit.normal),
        factor: reflectivity,
    }]
}

fn lens_candidates(ray: &Ray, hit: &Hit, efl_mm: f64) -> Vec<Candidate> {
    let y = (hit.point - hit.center_of_segment).dot(hit.tangent);
    let forward = if ray.direction.dot(hit.normal) >= 0.0 {
        hit.normal
    } else {
        -hit.normal
    };
    let theta_in = ray.direction.dot(hit.tangent).atan2(ray.direction.dot(forward));
    let theta_out = theta_in - y / efl_mm;
    let direction = forward * theta_out.cos() + hit.tangent * theta_out.sin();
    vec![Candidate {
        direction,
        polarization: transform_lens(ray.polarization),
        factor: 1.0,
    }]
}

fn refractive_candidates(ray: &Ray, hit: &Hit, n1: f64, n2: f64) -> Vec<Candidate> {
    let cos_i_signed = ray.direction.dot(hit.normal);
    // `n1` is the medium on the interface's `+normal` side, `n2` the medium
    // on its `-normal` side. `cos_i_signed > 0` means the ray travels along
    // `+normal`, i.e. it is currently in the `n2` side and entering `n1`.
    let (n_incident, n_transmitted) = if cos_i_signed > 0.0 { (n2, n1) } else { (n1, n2) };

    let sin_i = ray.direction.dot(hit.tangent);
    let cos_i_abs = cos_i_signed.abs();
    let sin_t = n_incident / n_transmitted * sin_i;

    if sin_t.abs() > 1.0 {
        // Total internal reflection: only the reflected branch survives, at
        // full intensity.
        return vec![Candidate {
            direction: ray.direction.reflect(hit.normal),
            polarization: transform_mirror(ray.polarization, ray.direction, hit.normal),
            factor: 1.0,
        }];
    }

    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    let coeffs = fresnel_coefficients(n_incident, n_transmitted, cos_i_abs, cos_t);

    let direction_reflected = ray.direction.reflect(hit.normal);
    let direction_transmitted =
        hit.tangent * sin_t + hit.normal * cos_i_signed.signum() * cos_t;

    let (es, ep) = project_s_p(ray.polarization, hit.normal);
    let total = es.norm_sqr() + ep.norm_sqr();

    let reflected_jones = recompose_s_p(hit.normal, es * coeffs.r_s, ep * coeffs.r_p);
    let transmitted_jones = recompose_s_p(
        hit.normal,
        es * coeffs.big_t_s.sqrt(),
        ep * coeffs.big_t_p.sqrt(),
    );

    let factor_r = if total > 0.0 { reflected_jones.intensity() / total } else { 0.0 };
    let factor_t = if total > 0.0 { transmitted_jones.intensity() / total } else { 0.0 };

    vec![
        Candidate { direction: direction_transmitted, polarization: transmitted_jones, factor: factor_t },
        Candidate { direction: direction_reflected, polarization: reflected_jones, factor: factor_r },
    ]
}

fn beamsplitter_candidates(
    ray: &Ray,
    hit: &Hit,
    split_t: f64,
    split_r: f64,
    is_polarizing: bool,
    pbs_transmission_axis_deg: f64,
) -> Vec<Candidate> {
    let (t_jones, t_factor) = transform_beamsplitter(
        ray.polarization,
        ray.direction,
        hit.normal,
        is_polarizing,
        pbs_transmission_axis_deg,
        split_t,
        split_r,
        PbsBranch::Transmitted,
    );
    let (r_jones, r_factor) = transform_beamsplitter(
        ray.polarization,
        ray.direction,
        hit.normal,
        is_polarizing,
        pbs_transmission_axis_deg,
        split_t,
        split_r,
        PbsBranch::Reflected,
    );
    vec![
        Candidate { direction: ray.direction, polarization: t_jones, factor: t_factor },
        Candidate { direction: ray.direction.reflect(hit.normal), polarization: r_jones, factor: r_factor },
    ]
}

fn waveplate_candidates(ray: &Ray, phase_shift_deg: f64, fast_axis_deg: f64) -> Vec<Candidate> {
    vec![Candidate {
        direction: ray.direction,
        polarization: transform_waveplate(ray.polarization, phase_shift_deg, fast_axis_deg),
        factor: 1.0,
    }]
}

fn dichroic_candidates(
    ray: &Ray,
    hit: &Hit,
    cutoff_nm: f64,
    transition_width_nm: f64,
    pass_type: PassType,
) -> Vec<Candidate> {
    let t = dichroic_transmission(ray.wavelength_nm, cutoff_nm, transition_width_nm, pass_type);
    let r = 1.0 - t;
    vec![
        Candidate { direction: ray.direction, polarization: ray.polarization, factor: t },
        Candidate {
            direction: ray.direction.reflect(hit.normal),
            polarization: transform_mirror(ray.polarization, ray.direction, hit.normal),
            factor: r,
        },
    ]
}
