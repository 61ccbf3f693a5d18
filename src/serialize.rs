//! JSON-shaped DTOs for the enclosing application. The core engine never
//! serializes anything itself; this module is the only place `serde` appears.

use serde::{Deserialize, Serialize};

use crate::elements::{OpticalElement, OpticalProperties};
use crate::error::Violation;
use crate::geometry::{CurvedSegment, GeometrySegment, LineSegment, Vec2};
use crate::polarization::{Jones, PassType};
use crate::ray::{RayPath, Source};
use num::complex::Complex64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "element_type", rename_all = "snake_case")]
pub enum ElementDto {
    Lens {
        x1_mm: f64,
        y1_mm: f64,
        x2_mm: f64,
        y2_mm: f64,
        is_curved: bool,
        radius_of_curvature_mm: f64,
        efl_mm: f64,
    },
    Mirror {
        x1_mm: f64,
        y1_mm: f64,
        x2_mm: f64,
        y2_mm: f64,
        is_curved: bool,
        radius_of_curvature_mm: f64,
        /// Fraction in `[0, 1]`, matching `OpticalProperties::Mirror`'s
        /// convention, not a percent.
        reflectivity: f64,
    },
    #[serde(rename = "refractive_interface")]
    RefractiveInterface {
        x1_mm: f64,
        y1_mm: f64,
        x2_mm: f64,
        y2_mm: f64,
        is_curved: bool,
        radius_of_curvature_mm: f64,
        n1: f64,
        n2: f64,
    },
    Beamsplitter {
        x1_mm: f64,
        y1_mm: f64,
        x2_mm: f64,
        y2_mm: f64,
        is_curved: bool,
        radius_of_curvature_mm: f64,
        #[serde(rename = "split_T")]
        split_t: f64,
        #[serde(rename = "split_R")]
        split_r: f64,
        is_polarizing: bool,
        pbs_transmission_axis_deg: f64,
    },
    Waveplate {
        x1_mm: f64,
        y1_mm: f64,
        x2_mm: f64,
        y2_mm: f64,
        is_curved: bool,
        radius_of_curvature_mm: f64,
        phase_shift_deg: f64,
        fast_axis_deg: f64,
    },
    Dichroic {
        x1_mm: f64,
        y1_mm: f64,
        x2_mm: f64,
        y2_mm: f64,
        is_curved: bool,
        radius_of_curvature_mm: f64,
        cutoff_wavelength_nm: f64,
        transition_width_nm: f64,
        pass_type: PassTypeDto,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassTypeDto {
    Longpass,
    Shortpass,
}

impl From<PassType> for PassTypeDto {
    fn from(p: PassType) -> Self {
        match p {
            PassType::Longpass => PassTypeDto::Longpass,
            PassType::Shortpass => PassTypeDto::Shortpass,
        }
    }
}

impl From<PassTypeDto> for PassType {
    fn from(p: PassTypeDto) -> Self {
        match p {
            PassTypeDto::Longpass => PassType::Longpass,
            PassTypeDto::Shortpass => PassType::Shortpass,
        }
    }
}

/// A DTO field combination that cannot be assembled into a valid geometry —
/// currently just a curved flag paired with a zero radius is accepted (it
/// collapses to flat), so the only failure is from `validate` downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct DtoConversionError(pub String);

impl std::fmt::Display for DtoConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DtoConversionError {}

fn geometry_from_fields(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    is_curved: bool,
    radius_of_curvature_mm: f64,
) -> GeometrySegment {
    let p1 = Vec2::new(x1, y1);
    let p2 = Vec2::new(x2, y2);
    if is_curved {
        GeometrySegment::Curved(CurvedSegment::new(p1, p2, radius_of_curvature_mm))
    } else {
        GeometrySegment::Line(LineSegment::new(p1, p2))
    }
}

fn fields_from_geometry(geometry: &GeometrySegment) -> (f64, f64, f64, f64, bool, f64) {
    let (p1, p2) = geometry.endpoints();
    match geometry {
        GeometrySegment::Line(_) => (p1.x, p1.y, p2.x, p2.y, false, 0.0),
        GeometrySegment::Curved(c) => (p1.x, p1.y, p2.x, p2.y, !c.is_flat(), c.radius_mm),
    }
}

impl TryFrom<ElementDto> for OpticalElement {
    type Error = DtoConversionError;

    fn try_from(dto: ElementDto) -> Result<Self, Self::Error> {
        let element = match dto {
            ElementDto::Lens { x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm, efl_mm } => {
                OpticalElement {
                    geometry: geometry_from_fields(x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm),
                    properties: OpticalProperties::Lens { efl_mm },
                }
            }
            ElementDto::Mirror { x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm, reflectivity } => {
                OpticalElement {
                    geometry: geometry_from_fields(x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm),
                    properties: OpticalProperties::Mirror { reflectivity },
                }
            }
            ElementDto::RefractiveInterface { x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm, n1, n2 } => {
                OpticalElement {
                    geometry: geometry_from_fields(x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm),
                    properties: OpticalProperties::Refractive { n1, n2 },
                }
            }
            ElementDto::Beamsplitter {
                x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm,
                split_t, split_r, is_polarizing, pbs_transmission_axis_deg,
            } => OpticalElement {
                geometry: geometry_from_fields(x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm),
                properties: OpticalProperties::Beamsplitter {
                    split_t,
                    split_r,
                    is_polarizing,
                    pbs_transmission_axis_deg,
                },
            },
            ElementDto::Waveplate { x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm, phase_shift_deg, fast_axis_deg } => {
                OpticalElement {
                    geometry: geometry_from_fields(x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm),
                    properties: OpticalProperties::Waveplate { phase_shift_deg, fast_axis_deg },
                }
            }
            ElementDto::Dichroic {
                x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm,
                cutoff_wavelength_nm, transition_width_nm, pass_type,
            } => OpticalElement {
                geometry: geometry_from_fields(x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm),
                properties: OpticalProperties::Dichroic {
                    cutoff_nm: cutoff_wavelength_nm,
                    transition_width_nm,
                    pass_type: pass_type.into(),
                },
            },
        };
        Ok(element)
    }
}

impl From<&OpticalElement> for ElementDto {
    fn from(element: &OpticalElement) -> Self {
        let (x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm) =
            fields_from_geometry(&element.geometry);
        match &element.properties {
            OpticalProperties::Lens { efl_mm } => ElementDto::Lens {
                x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm,
                efl_mm: *efl_mm,
            },
            OpticalProperties::Mirror { reflectivity } => ElementDto::Mirror {
                x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm,
                reflectivity: *reflectivity,
            },
            OpticalProperties::Refractive { n1, n2 } => ElementDto::RefractiveInterface {
                x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm,
                n1: *n1, n2: *n2,
            },
            OpticalProperties::Beamsplitter { split_t, split_r, is_polarizing, pbs_transmission_axis_deg } => {
                ElementDto::Beamsplitter {
                    x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm,
                    split_t: *split_t,
                    split_r: *split_r,
                    is_polarizing: *is_polarizing,
                    pbs_transmission_axis_deg: *pbs_transmission_axis_deg,
                }
            }
            OpticalProperties::Waveplate { phase_shift_deg, fast_axis_deg } => ElementDto::Waveplate {
                x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm,
                phase_shift_deg: *phase_shift_deg,
                fast_axis_deg: *fast_axis_deg,
            },
            OpticalProperties::Dichroic { cutoff_nm, transition_width_nm, pass_type } => ElementDto::Dichroic {
                x1_mm, y1_mm, x2_mm, y2_mm, is_curved, radius_of_curvature_mm,
                cutoff_wavelength_nm: *cutoff_nm,
                transition_width_nm: *transition_width_nm,
                pass_type: (*pass_type).into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JonesDto {
    pub jones: [[f64; 2]; 2],
}

impl From<Jones> for JonesDto {
    fn from(j: Jones) -> Self {
        JonesDto {
            jones: [[j.ex.re, j.ex.im], [j.ey.re, j.ey.im]],
        }
    }
}

impl From<JonesDto> for Jones {
    fn from(dto: JonesDto) -> Self {
        Jones {
            ex: Complex64::new(dto.jones[0][0], dto.jones[0][1]),
            ey: Complex64::new(dto.jones[1][0], dto.jones[1][1]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDto {
    pub x_mm: f64,
    pub y_mm: f64,
    pub angle_deg: f64,
    pub spread_deg: f64,
    pub n_rays: u32,
    pub size_mm: f64,
    pub ray_length_mm: f64,
    pub wavelength_nm: f64,
    pub base_rgb: [u8; 3],
    pub polarization: JonesDto,
}

impl From<&Source> for SourceDto {
    fn from(source: &Source) -> Self {
        SourceDto {
            x_mm: source.position.x,
            y_mm: source.position.y,
            angle_deg: source.angle_deg,
            spread_deg: source.spread_deg,
            n_rays: source.n_rays,
            size_mm: source.size_mm,
            ray_length_mm: source.ray_length_mm,
            wavelength_nm: source.wavelength_nm,
            base_rgb: [source.base_rgb.0, source.base_rgb.1, source.base_rgb.2],
            polarization: source.polarization.into(),
        }
    }
}

impl From<SourceDto> for Source {
    fn from(dto: SourceDto) -> Self {
        Source {
            position: Vec2::new(dto.x_mm, dto.y_mm),
            angle_deg: dto.angle_deg,
            spread_deg: dto.spread_deg,
            n_rays: dto.n_rays,
            size_mm: dto.size_mm,
            ray_length_mm: dto.ray_length_mm,
            wavelength_nm: dto.wavelength_nm,
            base_rgb: (dto.base_rgb[0], dto.base_rgb[1], dto.base_rgb[2]),
            polarization: dto.polarization.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RayPathDto {
    pub points: Vec<[f64; 2]>,
    pub rgba: [u8; 4],
    pub polarization: JonesDto,
    pub wavelength_nm: f64,
}

impl From<&RayPath> for RayPathDto {
    fn from(path: &RayPath) -> Self {
        RayPathDto {
            points: path.points.iter().map(|p| [p.x, p.y]).collect(),
            rgba: [path.rgba.0, path.rgba.1, path.rgba.2, path.rgba.3],
            polarization: path.polarization.into(),
            wavelength_nm: path.wavelength_nm,
        }
    }
}

/// A full scene file: elements, sources, and trace tunables (the latter
/// optional — `TraceConfig::default()` is used when absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDto {
    pub elements: Vec<ElementDto>,
    pub sources: Vec<SourceDto>,
}

impl SceneDto {
    pub fn into_scene(self) -> Result<(Vec<OpticalElement>, Vec<Source>), DtoConversionError> {
        let elements = self
            .elements
            .into_iter()
            .map(OpticalElement::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let sources = self.sources.into_iter().map(Source::from).collect();
        Ok((elements, sources))
    }
}

/// Renders a batch of validation violations in the JSON shape a caller-facing
/// API would report them in (list of human-readable strings).
pub fn violations_to_strings(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn mirror_dto_round_trips_through_core_type() {
        let element = OpticalElement {
            geometry: GeometrySegment::Line(LineSegment::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0))),
            properties: OpticalProperties::Mirror { reflectivity: 0.95 },
        };
        let dto = ElementDto::from(&element);
        let back = OpticalElement::try_from(dto).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn beamsplitter_dto_uses_exact_json_field_names() {
        let element = OpticalElement {
            geometry: GeometrySegment::Line(LineSegment::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0))),
            properties: OpticalProperties::Beamsplitter {
                split_t: 0.5,
                split_r: 0.5,
                is_polarizing: false,
                pbs_transmission_axis_deg: 0.0,
            },
        };
        let dto = ElementDto::from(&element);
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.contains("\"split_T\""));
        assert!(json.contains("\"split_R\""));
        assert!(json.contains("\"beamsplitter\""));
    }

    #[test]
    fn curved_mirror_dto_round_trips() {
        let element = OpticalElement {
            geometry: GeometrySegment::Curved(CurvedSegment::new(
                Vec2::new(50.0, -10.0),
                Vec2::new(50.0, 10.0),
                50.0,
            )),
            properties: OpticalProperties::Mirror { reflectivity: 1.0 },
        };
        let dto = ElementDto::from(&element);
        let back = OpticalElement::try_from(dto).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn source_dto_round_trips() {
        let source = Source {
            position: Vec2::new(1.0, 2.0),
            angle_deg: 15.0,
            spread_deg: 5.0,
            n_rays: 3,
            size_mm: 2.0,
            ray_length_mm: 100.0,
            wavelength_nm: 532.0,
            base_rgb: (10, 20, 30),
            polarization: Jones::horizontal(),
        };
        let dto = SourceDto::from(&source);
        let back = Source::from(dto);
        assert_eq!(back, source);
    }

    #[test]
    fn scene_dto_deserializes_from_json() {
        let json = r#"{
            "elements": [
                { "element_type": "mirror", "x1_mm": 50.0, "y1_mm": -10.0, "x2_mm": 50.0, "y2_mm": 10.0, "is_curved": false, "radius_of_curvature_mm": 0.0, "reflectivity": 1.0 }
            ],
            "sources": [
                { "x_mm": 0.0, "y_mm": 0.0, "angle_deg": 0.0, "spread_deg": 0.0, "n_rays": 1, "size_mm": 0.0, "ray_length_mm": 100.0, "wavelength_nm": 550.0, "base_rgb": [255, 255, 255], "polarization": { "jones": [[1.0, 0.0], [0.0, 0.0]] } }
            ]
        }"#;
        let scene: SceneDto = serde_json::from_str(json).unwrap();
        let (elements, sources) = scene.into_scene().unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(sources.len(), 1);
    }
}
