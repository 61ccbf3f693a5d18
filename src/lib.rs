//! A 2D geometric ray-tracing engine for optical systems.
//!
//! Given a set of light sources and a scene of optical interfaces (flat or
//! spherically curved line segments, each carrying one of six optical
//! behaviors), [`engine::trace_rays`] propagates every ray through the scene —
//! refraction, reflection, Jones-calculus polarization, wavelength-dependent
//! dichroic transmission, and beam splitting — and returns the resulting
//! polyline ray paths.
//!
//! The engine is read-only over its inputs, holds no hidden global state, and
//! is deterministic: identical elements, sources, and config always produce a
//! bit-identical set of ray paths, since source sampling has no randomness
//! and the propagation traversal is an explicit depth-first work stack rather
//! than anything execution-order-dependent.

pub mod elements;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod polarization;
pub mod presets;
pub mod ray;
pub mod serialize;

pub use elements::{OpticalElement, OpticalProperties};
pub use engine::{trace_rays, TraceConfig};
pub use error::{TraceError, Violation};
pub use geometry::{CurvedSegment, GeometrySegment, LineSegment, Vec2};
pub use polarization::Jones;
pub use ray::{RayPath, Source};
