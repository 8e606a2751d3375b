// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! pyrocsg CLI - boolean mesh operations over STL/OBJ.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pyrocsg::{difference, intersection, io, union, Mesh, Tolerance};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "csg")]
#[command(about = "Boolean CSG kernel for closed polyhedral meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a Tolerance TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the union of two meshes
    Union {
        a: PathBuf,
        b: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Compute the intersection of two meshes
    Intersect {
        a: PathBuf,
        b: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Compute the difference a \ b
    Difference {
        a: PathBuf,
        b: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Weld duplicate vertices and write the result back out
    Weld {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Check a mesh for loose vertices, degenerate faces and open borders
    Check { input: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tol = match &cli.config {
        Some(path) => Tolerance::load(path)?,
        None => Tolerance::default(),
    };

    let result = match &cli.command {
        Commands::Union { a, b, output } => binary_op(a, b, output, &tol, cli.verbose, union),
        Commands::Intersect { a, b, output } => {
            binary_op(a, b, output, &tol, cli.verbose, intersection)
        }
        Commands::Difference { a, b, output } => {
            binary_op(a, b, output, &tol, cli.verbose, difference)
        }
        Commands::Weld { input, output } => weld_command(input, output, &tol, cli.verbose),
        Commands::Check { input } => check_command(input, &tol),
    };

    if let Err(e) = &result {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
    Ok(())
}

fn binary_op(
    a: &Path,
    b: &Path,
    output: &Path,
    tol: &Tolerance,
    verbose: bool,
    op: fn(&Mesh, &Mesh, &Tolerance) -> Result<Mesh, pyrocsg::CsgError>,
) -> Result<()> {
    let spinner = progress_spinner(verbose, "running boolean operation");

    let mesh_a = read_mesh(a, 0, tol)?;
    let mesh_b = read_mesh(b, 1, tol)?;

    let start = Instant::now();
    let result = op(&mesh_a, &mesh_b, tol).context("boolean operation failed")?;
    let elapsed = start.elapsed();

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    if verbose {
        println!(
            "{} {} polygons in {:.2?}",
            "computed".green(),
            result.get_npolygons(),
            elapsed
        );
    }

    write_mesh(&result, output)?;
    println!(
        "{} {} -> {}",
        "ok:".green().bold(),
        output.display(),
        format!("{} polygons", result.get_npolygons()).dimmed()
    );
    Ok(())
}

fn weld_command(input: &Path, output: &Path, tol: &Tolerance, verbose: bool) -> Result<()> {
    let mut mesh = read_mesh(input, 0, tol)?;
    let removed = mesh.merge_duplicated_verts(tol);
    if verbose {
        println!("welded {removed} duplicate vertices");
    }
    write_mesh(&mesh, output)?;
    println!("{} {}", "ok:".green().bold(), output.display());
    Ok(())
}

fn check_command(input: &Path, tol: &Tolerance) -> Result<()> {
    let mesh = read_mesh(input, 0, tol)?;
    mesh.check_geom_sanity().context("mesh failed sanity check")?;
    println!(
        "{} {} is a closed, manifold solid ({} polygons)",
        "ok:".green().bold(),
        input.display(),
        mesh.get_npolygons()
    );
    Ok(())
}

fn read_mesh(path: &Path, surfid: u32, tol: &Tolerance) -> Result<Mesh> {
    match extension_of(path).as_str() {
        "stl" => io::read_stl(path, surfid, tol),
        ext => anyhow::bail!("unsupported input format: .{ext} (expected .stl)"),
    }
}

fn write_mesh(mesh: &Mesh, path: &Path) -> Result<()> {
    match extension_of(path).as_str() {
        "stl" => io::write_stl(mesh, path),
        "obj" => io::write_obj(mesh, path),
        ext => anyhow::bail!("unsupported output format: .{ext} (expected .stl or .obj)"),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn progress_spinner(verbose: bool, message: &str) -> Option<ProgressBar> {
    if !verbose {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}").unwrap());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(pb)
}
