//! # optikit
//!
//! A 2D geometric ray-tracing engine for optical systems: refraction,
//! reflection, Jones-calculus polarization, and beam splitting over line/arc
//! interfaces, rendered as a colored polyline plot in the terminal.
//!
//! ## Architecture
//!
//! - **Geometry kernel**: `Vec2` arithmetic, line/arc intersection with
//!   correct surface normals at the hit point.
//! - **Polarization kernel**: Jones-vector transforms for mirrors, lenses,
//!   beamsplitters (polarizing and non-polarizing), waveplates, and dichroics.
//! - **Element library**: one `interact` per optical-element kind, dispatched
//!   through a closed tagged enum.
//! - **Propagation engine**: an explicit work-stack traversal (not recursive
//!   on the host call stack) that handles beam splitting, re-hit avoidance,
//!   and termination conditions.

use clap::Parser;
use crossterm::style::{self, Stylize};
use optikit::{elements, engine, presets, ray};
use presets::ScenePreset;
use optikit::serialize::SceneDto;
use std::time::Instant;

/// optikit — trace 2D optical systems in your terminal
#[derive(Parser, Debug)]
#[command(
    name = "optikit",
    version,
    about = "A 2D geometric ray-tracing engine for optical systems",
    long_about = "Propagates rays through a 2D scene of optical interfaces (flat or \
                  curved line segments), handling refraction, reflection, Jones-calculus \
                  polarization, and beam splitting, then plots the resulting ray paths \
                  directly in the terminal.",
    after_help = "EXAMPLES:\n  \
                  optikit --scene concave-mirror\n  \
                  optikit --scene achromatic-doublet --width 160\n  \
                  optikit --json my_scene.json"
)]
struct Cli {
    /// Built-in scene preset to trace
    #[arg(short, long, value_enum, default_value_t = ScenePreset::MirrorBounce)]
    scene: ScenePreset,

    /// Load a scene from a JSON file instead of a built-in preset (see the
    /// `serialize` module for the field vocabulary)
    #[arg(long)]
    json: Option<String>,

    /// Plot width in terminal columns
    #[arg(short = 'W', long, default_value_t = 100)]
    width: u32,

    /// Plot height in terminal rows
    #[arg(short = 'H', long, default_value_t = 40)]
    height: u32,

    /// Maximum ray events before forced termination
    #[arg(long, default_value_t = 80)]
    max_events: u32,

    /// Minimum intensity a ray must retain to keep propagating
    #[arg(long, default_value_t = 0.02)]
    min_intensity: f64,
}

fn print_header(scene_name: &str, n_elements: usize, n_sources: usize, config: &engine::TraceConfig) {
    eprintln!();
    eprintln!("  ╔═══════════════════════════════════════════════╗");
    eprintln!("  ║  optikit — 2D optical ray tracer               ║");
    eprintln!("  ╚═══════════════════════════════════════════════╝");
    eprintln!();
    eprintln!("  Scene:      {scene_name}");
    eprintln!("  Elements:   {n_elements}");
    eprintln!("  Sources:    {n_sources}");
    eprintln!("  Max events: {}", config.max_events);
    eprintln!();
}

/// A simple column-major ASCII/braille-adjacent plot: each ray path is drawn
/// as a sequence of straight segments between its points, rasterized onto a
/// `width`x`height` character grid and colored with the path's own `rgba`.
fn plot_paths(paths: &[ray::RayPath], width: u32, height: u32) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for path in paths {
        for p in &path.points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
    }
    if !min_x.is_finite() || !min_y.is_finite() {
        println!("(no ray paths to plot)");
        return;
    }
    // Pad the bounding box slightly so paths don't touch the border.
    let pad_x = (max_x - min_x).max(1.0) * 0.05;
    let pad_y = (max_y - min_y).max(1.0) * 0.05;
    min_x -= pad_x;
    max_x += pad_x;
    min_y -= pad_y;
    max_y += pad_y;

    let mut grid: Vec<Option<(u8, u8, u8)>> = vec![None; (width * height) as usize];
    let to_cell = |x: f64, y: f64| -> (i64, i64) {
        let u = (x - min_x) / (max_x - min_x) * (width as f64 - 1.0);
        // Flip vertically so +y plots upward.
        let v = (1.0 - (y - min_y) / (max_y - min_y)) * (height as f64 - 1.0);
        (u.round() as i64, v.round() as i64)
    };

    for path in paths {
        let color = (path.rgba.0, path.rgba.1, path.rgba.2);
        for window in path.points.windows(2) {
            let (x0, y0) = to_cell(window[0].x, window[0].y);
            let (x1, y1) = to_cell(window[1].x, window[1].y);
            let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
            for s in 0..=steps {
                let t = s as f64 / steps as f64;
                let cx = x0 + ((x1 - x0) as f64 * t).round() as i64;
                let cy = y0 + ((y1 - y0) as f64 * t).round() as i64;
                if cx >= 0 && cx < width as i64 && cy >= 0 && cy < height as i64 {
                    grid[(cy as u32 * width + cx as u32) as usize] = Some(color);
                }
            }
        }
    }

    for row in 0..height {
        for col in 0..width {
            match grid[(row * width + col) as usize] {
                Some((r, g, b)) => print!("{}", "●".with(style::Color::Rgb { r, g, b })),
                None => print!(" "),
            }
        }
        println!();
    }
}

fn main() {
    let cli = Cli::parse();

    let (scene_name, scene_elements, scene_sources): (
        String,
        Vec<elements::OpticalElement>,
        Vec<ray::Source>,
    ) = if let Some(path) = &cli.json {
        let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("error reading {path}: {e}");
            std::process::exit(1);
        });
        let dto: SceneDto = serde_json::from_str(&text).unwrap_or_else(|e| {
            eprintln!("error parsing {path}: {e}");
            std::process::exit(1);
        });
        let (scene_elements, scene_sources) = dto.into_scene().unwrap_or_else(|e| {
            eprintln!("error converting scene: {e}");
            std::process::exit(1);
        });
        (path.clone(), scene_elements, scene_sources)
    } else {
        let scene = cli.scene.build();
        (scene.name.to_string(), scene.elements, scene.sources)
    };

    let config = engine::TraceConfig {
        max_events: cli.max_events,
        epsilon_advance: engine::TraceConfig::default().epsilon_advance,
        min_intensity: cli.min_intensity,
    };

    print_header(&scene_name, scene_elements.len(), scene_sources.len(), &config);

    let t0 = Instant::now();
    let paths = engine::trace_rays(&scene_elements, &scene_sources, &config).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });
    let elapsed = t0.elapsed();

    let total_points: usize = paths.iter().map(|p| p.points.len()).sum();
    eprintln!(
        "  Time: {:.3}ms | {} ray paths | {} total path points",
        elapsed.as_secs_f64() * 1000.0,
        paths.len(),
        total_points
    );
    eprintln!();

    plot_paths(&paths, cli.width, cli.height);

    eprintln!();
    eprintln!("  Traced with optikit v{}", env!("CARGO_PKG_VERSION"));
}
