// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshslice CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use meshslice::{analyze, io, slice_with_options, ExportFormat, Mesh, MeshStats, Plane, SideReport, SliceConfig};
use nalgebra::{Point3, Vector3};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "meshslice")]
#[command(about = "Meshslice - split triangle meshes by a plane and cap the cut", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Slice a mesh into front and back halves
    Slice {
        /// Input STL file
        input: PathBuf,

        /// Plane normal as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        normal: Vector3<f64>,

        /// Signed offset of the plane along its normal
        #[arg(long, allow_hyphen_values = true, conflicts_with = "point")]
        distance: Option<f64>,

        /// A point on the plane as x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        point: Option<Vector3<f64>>,

        /// Output file for the front half
        #[arg(long, value_name = "FILE")]
        front: Option<PathBuf>,

        /// Output file for the back half
        #[arg(long, value_name = "FILE")]
        back: Option<PathBuf>,

        /// Output format when it cannot be taken from the file extension
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Leave the cut open
        #[arg(long)]
        no_caps: bool,

        /// Half-width of the band treated as on the plane
        #[arg(long)]
        tolerance: Option<f64>,

        /// Configuration file (defaults to meshslice.toml when present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Print the slice report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print statistics for a mesh file
    Info {
        /// Input STL file
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Slice {
            input,
            normal,
            distance,
            point,
            front,
            back,
            format,
            no_caps,
            tolerance,
            config,
            json,
        } => {
            let mut config = match config {
                Some(path) => {
                    let mut config = SliceConfig::from_file(&path)?;
                    config.apply_env(|key| std::env::var(key).ok())?;
                    config
                }
                None => SliceConfig::load()?,
            };
            if no_caps {
                config.options.close_holes = false;
            }
            if let Some(tolerance) = tolerance {
                config.options.on_plane_tolerance = tolerance;
            }
            if let Some(format) = format {
                config.format = format;
            }

            let plane = match point {
                Some(point) => Plane::from_normal_and_point(normal, &Point3::from(point)),
                None => Plane::new(normal, -distance.unwrap_or(0.0)),
            };

            let outputs = Outputs {
                front: front.unwrap_or_else(|| default_output(&input, "front", &config)),
                back: back.unwrap_or_else(|| default_output(&input, "back", &config)),
            };
            let verbose = cli.verbose || config.verbose;
            slice_command(&input, &plane, &outputs, &config, json, verbose)?;
        }
        Commands::Info { input, json } => {
            info_command(&input, json)?;
        }
        Commands::Version => {
            println!("Meshslice v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Parse `x,y,z`
fn parse_vector(s: &str) -> std::result::Result<Vector3<f64>, String> {
    let components: Vec<f64> = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("invalid component '{}': {}", c, e)))
        .collect::<std::result::Result<_, _>>()?;

    match components.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got {} components", components.len())),
    }
}

struct Outputs {
    front: PathBuf,
    back: PathBuf,
}

fn default_output(input: &Path, half: &str, config: &SliceConfig) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("mesh");
    config
        .output_dir
        .join(format!("{}_{}.{}", stem, half, config.format.extension()))
}

fn slice_command(input: &Path, plane: &Plane, outputs: &Outputs, config: &SliceConfig, json: bool, verbose: bool) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {:?}", input);
    }

    let mesh = io::import_stl(input)?;

    let start = Instant::now();
    let output = slice_with_options(&mesh, plane, &config.options)
        .with_context(|| format!("Failed to slice {:?}", input))?;
    let slice_time = start.elapsed();

    for (half, path) in [(&output.front, &outputs.front), (&output.back, &outputs.back)] {
        write_half(half, path, config.format)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&output.report)?);
        return Ok(());
    }

    println!("\n{}", "━".repeat(60).bright_black());
    println!("{} {}", "Input:".bold(), input.display().to_string().cyan());
    println!(
        "{} {} vertices, {} triangles",
        "Mesh:".bold(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    println!("{}", "━".repeat(60).bright_black());

    println!("{} {}", "Intersections:".bold(), output.report.intersections);
    print_side("Front", &output.front, &output.report.front, &outputs.front);
    print_side("Back", &output.back, &output.report.back, &outputs.back);

    if verbose {
        println!("\n{} {:.2?}", "Sliced in".bright_black(), slice_time);
    }

    Ok(())
}

fn write_half(mesh: &Mesh, path: &Path, fallback: ExportFormat) -> Result<()> {
    if mesh.is_empty() {
        log::warn!("skipping {:?}: half is empty", path);
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let format = ExportFormat::from_path(path).unwrap_or(fallback);
    io::export(mesh, path, format).with_context(|| format!("Failed to export {:?}", path))
}

fn print_side(name: &str, mesh: &Mesh, report: &SideReport, path: &Path) {
    println!("\n{}", format!("{}:", name).bold());
    if mesh.is_empty() {
        println!("  {}", "empty".yellow());
        return;
    }

    println!("  {:<16} {}", "Triangles:", mesh.triangle_count());
    println!(
        "  {:<16} {} loops {:?}, {} triangles, area {:.4}",
        "Caps:",
        report.loop_lengths.len(),
        report.loop_lengths,
        report.cap_triangles,
        report.cap_area
    );
    if report.open_chains > 0 || report.degenerate_loops > 0 {
        println!(
            "  {} {} open chains, {} degenerate loops left uncapped",
            "⚠".yellow(),
            report.open_chains,
            report.degenerate_loops
        );
    }
    println!("  {:<16} {}", "Written to:", path.display().to_string().green());
}

fn info_command(input: &Path, json: bool) -> Result<()> {
    let mesh = io::import_stl(input)?;
    let stats = analyze(&mesh);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_stats(input, &stats);
    Ok(())
}

fn print_stats(input: &Path, stats: &MeshStats) {
    println!("\n{}", "━".repeat(60).bright_black());
    println!("{} {}", "File:".bold(), input.display().to_string().cyan());
    println!("{}", "━".repeat(60).bright_black());

    println!("  {:<16} {}", "Vertices:", stats.vertex_count);
    println!("  {:<16} {}", "Triangles:", stats.triangle_count);
    println!("  {:<16} {:.4}", "Surface area:", stats.surface_area);
    println!("  {:<16} {:.4}", "Volume:", stats.volume());
    println!(
        "  {:<16} [{:.3}, {:.3}, {:.3}] - [{:.3}, {:.3}, {:.3}]",
        "Bounds:", stats.bbox[0], stats.bbox[1], stats.bbox[2], stats.bbox[3], stats.bbox[4], stats.bbox[5]
    );

    let closed = if stats.is_watertight {
        "yes".green()
    } else {
        format!("no ({} boundary edges)", stats.boundary_edge_count).yellow()
    };
    println!("  {:<16} {}", "Watertight:", closed);
}
