//! The ray working record, its terminal output form, and source
//! configuration/sampling.

use crate::geometry::{rotate2, Vec2};
use crate::polarization::Jones;

/// Identifies an element by its index into the scene's element slice.
/// Deliberately small and `Copy` so it can live on the hot-path `Ray` record
/// without any aliasing concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

/// A ray in flight. Mutated only through `Ray::split`, which produces a
/// fresh descendant rather than mutating a ray already on the work stack.
#[derive(Debug, Clone)]
pub struct Ray {
    pub position: Vec2,
    pub direction: Vec2,
    pub remaining_length: f64,
    pub intensity: f64,
    pub polarization: Jones,
    pub wavelength_nm: f64,
    pub base_rgb: (u8, u8, u8),
    pub events: u32,
    pub path_points: Vec<Vec2>,
    pub last_hit: Option<ElementId>,
}

impl Ray {
    /// Builds a descendant of `self` at a new position/direction/polarization
    /// with intensity scaled by `intensity_factor`, one more event than the
    /// parent, and `remaining_length` reduced by the distance travelled to
    /// reach the hit point (`hit_t`). `path_points` is inherited verbatim —
    /// the caller is responsible for having already appended the hit point to
    /// it before calling `split`.
    #[allow(clippy::too_many_arguments)]
    pub fn split(
        &self,
        position: Vec2,
        direction: Vec2,
        polarization: Jones,
        intensity_factor: f64,
        hit_t: f64,
        last_hit: ElementId,
    ) -> Ray {
        Ray {
            position,
            direction,
            remaining_length: self.remaining_length - hit_t,
            intensity: self.intensity * intensity_factor,
            polarization,
            wavelength_nm: self.wavelength_nm,
            base_rgb: self.base_rgb,
            events: self.events + 1,
            path_points: self.path_points.clone(),
            last_hit: Some(last_hit),
        }
    }

    /// Advances `position` in place by `distance` along `direction`, for the
    /// "ray escapes the scene" termination path, which extends the ray
    /// straight rather than dispatching to an element.
    pub fn advance_straight(&mut self, distance: f64) {
        self.position += self.direction * distance;
        self.path_points.push(self.position);
    }
}

/// A completed, emitted ray path.
#[derive(Debug, Clone, PartialEq)]
pub struct RayPath {
    pub points: Vec<Vec2>,
    pub rgba: (u8, u8, u8, u8),
    pub polarization: Jones,
    pub wavelength_nm: f64,
}

impl RayPath {
    /// Builds the terminal output record from a ray that has just been
    /// retired from the work stack. The alpha channel encodes terminal
    /// intensity: `round(255 * clamp(intensity, 0, 1))`.
    pub fn from_terminated(ray: &Ray) -> RayPath {
        let clamped = ray.intensity.clamp(0.0, 1.0);
        let alpha = (clamped * 255.0).round() as u8;
        RayPath {
            points: ray.path_points.clone(),
            rgba: (ray.base_rgb.0, ray.base_rgb.1, ray.base_rgb.2, alpha),
            polarization: ray.polarization,
            wavelength_nm: ray.wavelength_nm,
        }
    }
}

/// Describes one emitter: a fan of rays distributed over a transverse
/// aperture, all sharing wavelength, color, and initial polarization.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub position: Vec2,
    pub angle_deg: f64,
    pub spread_deg: f64,
    pub n_rays: u32,
    pub size_mm: f64,
    pub ray_length_mm: f64,
    pub wavelength_nm: f64,
    pub base_rgb: (u8, u8, u8),
    pub polarization: Jones,
}

impl Source {
    /// Deterministically samples `n_rays` starting rays: positions evenly
    /// spaced across `size_mm` (collapsing to `position` when `size_mm ==
    /// 0`), directions fanned evenly across `[-spread_deg/2, +spread_deg/2]`
    /// relative to `angle_deg` (collapsing to a single direction when
    /// `spread_deg == 0`). No randomness is involved, so repeated calls with
    /// the same `Source` produce bit-identical rays.
    pub fn sample(&self) -> Vec<Ray> {
        let n = self.n_rays.max(1) as usize;
        let base_dir = rotate2(Vec2::new(1.0, 0.0), self.angle_deg.to_radians());
        // Transverse axis for spreading starting positions: perpendicular to
        // the emission direction, i.e. the direction itself rotated +90°.
        let transverse = base_dir.perp();

        (0..n)
            .map(|i| {
                let position = if self.size_mm == 0.0 || n == 1 {
                    self.position
                } else {
                    let t = i as f64 / (n - 1) as f64 - 0.5; // in [-0.5, 0.5]
                    self.position + transverse * (t * self.size_mm)
                };
                let direction = if self.spread_deg == 0.0 || n == 1 {
                    base_dir
                } else {
                    let frac = i as f64 / (n - 1) as f64 - 0.5; // in [-0.5, 0.5]
                    let angle_offset_deg = frac * self.spread_deg;
                    rotate2(
                        Vec2::new(1.0, 0.0),
                        (self.angle_deg + angle_offset_deg).to_radians(),
                    )
                };
                Ray {
                    position,
                    direction,
                    remaining_length: self.ray_length_mm,
                    intensity: 1.0,
                    polarization: self.polarization,
                    wavelength_nm: self.wavelength_nm,
                    base_rgb: self.base_rgb,
                    events: 0,
                    path_points: vec![position],
                    last_hit: None,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_source() -> Source {
        Source {
            position: Vec2::new(0.0, 0.0),
            angle_deg: 0.0,
            spread_deg: 0.0,
            n_rays: 1,
            size_mm: 0.0,
            ray_length_mm: 200.0,
            wavelength_nm: 633.0,
            base_rgb: (255, 0, 0),
            polarization: Jones::horizontal(),
        }
    }

    #[test]
    fn zero_spread_single_ray_source_produces_exactly_one_ray() {
        let src = dummy_source();
        let rays = src.sample();
        assert_eq!(rays.len(), 1);
        assert_eq!(rays[0].position, Vec2::new(0.0, 0.0));
        assert_eq!(rays[0].direction, Vec2::new(1.0, 0.0));
        assert_eq!(rays[0].path_points, vec![Vec2::new(0.0, 0.0)]);
    }

    #[test]
    fn sampling_is_deterministic() {
        let mut src = dummy_source();
        src.n_rays = 5;
        src.spread_deg = 10.0;
        src.size_mm = 4.0;
        let a = src.sample();
        let b = src.sample();
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.position, rb.position);
            assert_eq!(ra.direction, rb.direction);
        }
    }

    #[test]
    fn fan_directions_span_the_requested_spread() {
        let mut src = dummy_source();
        src.n_rays = 3;
        src.spread_deg = 20.0;
        let rays = src.sample();
        let first_angle = rays[0].direction.angle().to_degrees();
        let last_angle = rays[2].direction.angle().to_degrees();
        assert!((first_angle - (-10.0)).abs() < 1e-9);
        assert!((last_angle - 10.0).abs() < 1e-9);
    }

    #[test]
    fn ray_path_alpha_encodes_intensity() {
        let mut ray = dummy_source().sample().remove(0);
        ray.intensity = 0.5;
        let path = RayPath::from_terminated(&ray);
        assert_eq!(path.rgba.3, 128);
    }
}
