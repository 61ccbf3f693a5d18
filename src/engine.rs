//! The propagation engine: source sampling, nearest-intersection search,
//! dispatch to the element library, and the beam-splitting work stack.

use crate::elements::OpticalElement;
use crate::error::{validate, TraceError};
use crate::geometry::{Hit, EPSILON};
use crate::ray::{ElementId, Ray, RayPath, Source};

/// Tunables for one call to `trace_rays`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceConfig {
    pub max_events: u32,
    pub epsilon_advance: f64,
    pub min_intensity: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_events: 80,
            epsilon_advance: 1e-3,
            min_intensity: 0.02,
        }
    }
}

/// `u` strictly inside `(0, 1)` is an interior hit; `u` at (or within
/// `EPSILON` of) `0` or `1` is a boundary one — exactly grazing an endpoint.
fn is_interior(u: f64) -> bool {
    u > EPSILON && u < 1.0 - EPSILON
}

/// Linear scan for the nearest element the ray hits, excluding its own
/// `last_hit` (to avoid a zero-distance re-hit on the interface it just left).
///
/// Among hits tied at the minimum `t` (the ray exactly grazes a shared
/// endpoint of two interfaces), the interior-parameter hit is preferred over
/// a boundary one, per the geometry kernel's tie-break rule.
fn nearest_hit(ray: &Ray, elements: &[OpticalElement]) -> Option<(ElementId, Hit)> {
    let mut hits: Vec<(ElementId, Hit)> = elements
        .iter()
        .enumerate()
        .filter(|(index, _)| ray.last_hit != Some(ElementId(*index as u32)))
        .filter_map(|(index, element)| {
            element
                .geometry
                .ray_hit(ray.position, ray.direction)
                .map(|hit| (ElementId(index as u32), hit))
        })
        .collect();

    let min_t = hits
        .iter()
        .map(|(_, hit)| hit.t)
        .fold(f64::INFINITY, f64::min);

    hits.retain(|(_, hit)| (hit.t - min_t).abs() < EPSILON);
    let rank = |u: f64| u8::from(!is_interior(u)); // interior (0) sorts before boundary (1)
    hits.sort_by(|(_, a), (_, b)| {
        rank(a.u)
            .cmp(&rank(b.u))
            .then(a.t.partial_cmp(&b.t).expect("hit distances are never NaN"))
    });
    hits.into_iter().next()
}

/// Traces every source through the scene and returns the resulting ray
/// paths. Deterministic: identical inputs produce a bit-identical output,
/// since source sampling has no randomness and the work stack is an explicit
/// depth-first traversal rather than anything execution-order-dependent.
pub fn trace_rays(
    elements: &[OpticalElement],
    sources: &[Source],
    config: &TraceConfig,
) -> Result<Vec<RayPath>, TraceError> {
    validate(elements, sources)?;

    let mut paths = Vec::new();

    for source in sources {
        let mut initial = source.sample();
        initial.reverse(); // so popping the stack yields sources in sampled order
        let mut stack: Vec<Ray> = initial;

        while let Some(mut ray) = stack.pop() {
            if ray.events >= config.max_events
                || ray.intensity < config.min_intensity
                || ray.remaining_length <= 0.0
            {
                paths.push(RayPath::from_terminated(&ray));
                continue;
            }

            match nearest_hit(&ray, elements) {
                None => {
                    ray.advance_straight(ray.remaining_length);
                    paths.push(RayPath::from_terminated(&ray));
                }
                Some((element_id, hit)) => {
                    ray.path_points.push(hit.point);
                    let element = &elements[element_id.0 as usize];
                    let outgoing = element.properties.interact(
                        &ray,
                        &hit,
                        element_id,
                        config.epsilon_advance,
                        config.min_intensity,
                    );

                    if outgoing.is_empty() {
                        paths.push(RayPath::from_terminated(&ray));
                        continue;
                    }

                    if element.properties.changes_polarization_frame() {
                        paths.push(RayPath::from_terminated(&ray));
                    }

                    for child in outgoing.into_iter().rev() {
                        stack.push(child);
                    }
                }
            }
        }
    }

    Ok(paths)
}
