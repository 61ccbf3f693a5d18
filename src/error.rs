//! Up-front structured validation. `trace_rays` calls `validate` once before
//! doing any work and collects every violation rather than stopping at the
//! first one, so the caller sees the whole picture in one error.

use std::fmt;

use crate::elements::{OpticalElement, OpticalProperties};
use crate::ray::Source;

/// One specific way a scene description can be malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    CoincidentEndpoints { element_index: usize },
    ImpossibleArcRadius { element_index: usize, radius_mm: f64, half_chord_mm: f64 },
    ZeroRays { source_index: usize },
    BeamsplitterRatioExceedsOne { element_index: usize, split_t: f64, split_r: f64 },
    ZeroNormJones { source_index: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::CoincidentEndpoints { element_index } => write!(
                f,
                "element {element_index}: geometry endpoints are coincident"
            ),
            Violation::ImpossibleArcRadius { element_index, radius_mm, half_chord_mm } => write!(
                f,
                "element {element_index}: curved radius {radius_mm} mm is smaller than half the chord length {half_chord_mm} mm"
            ),
            Violation::ZeroRays { source_index } => {
                write!(f, "source {source_index}: n_rays must be at least 1")
            }
            Violation::BeamsplitterRatioExceedsOne { element_index, split_t, split_r } => write!(
                f,
                "element {element_index}: split_t ({split_t}) + split_r ({split_r}) exceeds 1"
            ),
            Violation::ZeroNormJones { source_index } => {
                write!(f, "source {source_index}: polarization Jones vector has zero norm")
            }
        }
    }
}

/// The only error `trace_rays` can return: a non-empty list of violations
/// found before any ray was traced.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceError {
    InvalidInput(Vec<Violation>),
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::InvalidInput(violations) => {
                writeln!(f, "invalid scene input ({} violation(s)):", violations.len())?;
                for v in violations {
                    writeln!(f, "  - {v}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for TraceError {}

const RATIO_EPSILON: f64 = 1e-9;

/// Validates elements and sources, collecting every violation. Returns
/// `Ok(())` only if the scene is entirely well-formed.
pub fn validate(elements: &[OpticalElement], sources: &[Source]) -> Result<(), TraceError> {
    let mut violations = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        let (p1, p2) = element.geometry.endpoints();
        if p1 == p2 {
            violations.push(Violation::CoincidentEndpoints { element_index: index });
            continue;
        }
        if let crate::geometry::GeometrySegment::Curved(curved) = &element.geometry {
            if curved.radius_mm != 0.0 {
                let half_chord = curved.chord().length() / 2.0;
                if curved.radius_mm.abs() < half_chord {
                    violations.push(Violation::ImpossibleArcRadius {
                        element_index: index,
                        radius_mm: curved.radius_mm,
                        half_chord_mm: half_chord,
                    });
                }
            }
        }
        if let OpticalProperties::Beamsplitter { split_t, split_r, is_polarizing, .. } =
            &element.properties
        {
            if !is_polarizing && split_t + split_r > 1.0 + RATIO_EPSILON {
                violations.push(Violation::BeamsplitterRatioExceedsOne {
                    element_index: index,
                    split_t: *split_t,
                    split_r: *split_r,
                });
            }
        }
    }

    for (index, source) in sources.iter().enumerate() {
        if source.n_rays < 1 {
            violations.push(Violation::ZeroRays { source_index: index });
        }
        if source.polarization.intensity() < RATIO_EPSILON {
            violations.push(Violation::ZeroNormJones { source_index: index });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(TraceError::InvalidInput(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::OpticalProperties;
    use crate::geometry::{GeometrySegment, LineSegment, Vec2};
    use crate::polarization::Jones;

    fn mirror_at(p1: Vec2, p2: Vec2) -> OpticalElement {
        OpticalElement {
            geometry: GeometrySegment::Line(LineSegment::new(p1, p2)),
            properties: OpticalProperties::Mirror { reflectivity: 1.0 },
        }
    }

    fn source() -> Source {
        Source {
            position: Vec2::new(0.0, 0.0),
            angle_deg: 0.0,
            spread_deg: 0.0,
            n_rays: 1,
            size_mm: 0.0,
            ray_length_mm: 100.0,
            wavelength_nm: 550.0,
            base_rgb: (255, 255, 255),
            polarization: Jones::horizontal(),
        }
    }

    #[test]
    fn well_formed_scene_passes() {
        let elements = vec![mirror_at(Vec2::new(50.0, -10.0), Vec2::new(50.0, 10.0))];
        let sources = vec![source()];
        assert!(validate(&elements, &sources).is_ok());
    }

    #[test]
    fn coincident_endpoints_rejected() {
        let elements = vec![mirror_at(Vec2::new(50.0, 10.0), Vec2::new(50.0, 10.0))];
        let result = validate(&elements, &[source()]);
        assert!(matches!(
            result,
            Err(TraceError::InvalidInput(v)) if matches!(v[0], Violation::CoincidentEndpoints { .. })
        ));
    }

    #[test]
    fn zero_rays_rejected() {
        let mut bad_source = source();
        bad_source.n_rays = 0;
        let result = validate(&[], &[bad_source]);
        assert!(matches!(
            result,
            Err(TraceError::InvalidInput(v)) if matches!(v[0], Violation::ZeroRays { .. })
        ));
    }

    #[test]
    fn beamsplitter_ratio_over_one_rejected() {
        let elements = vec![OpticalElement {
            geometry: GeometrySegment::Line(LineSegment::new(
                Vec2::new(50.0, -10.0),
                Vec2::new(50.0, 10.0),
            )),
            properties: OpticalProperties::Beamsplitter {
                split_t: 0.7,
                split_r: 0.7,
                is_polarizing: false,
                pbs_transmission_axis_deg: 0.0,
            },
        }];
        let result = validate(&elements, &[source()]);
        assert!(matches!(
            result,
            Err(TraceError::InvalidInput(v)) if matches!(v[0], Violation::BeamsplitterRatioExceedsOne { .. })
        ));
    }

    #[test]
    fn impossible_arc_radius_rejected() {
        let elements = vec![OpticalElement {
            geometry: GeometrySegment::Curved(crate::geometry::CurvedSegment::new(
                Vec2::new(50.0, -10.0),
                Vec2::new(50.0, 10.0),
                5.0, // smaller than half-chord (10)
            )),
            properties: OpticalProperties::Mirror { reflectivity: 1.0 },
        }];
        let result = validate(&elements, &[source()]);
        assert!(matches!(
            result,
            Err(TraceError::InvalidInput(v)) if matches!(v[0], Violation::ImpossibleArcRadius { .. })
        ));
    }
}
