//! Scene editor command-line driver
//!
//! Runs the engine headless: leak and clear diagnostics, and scripted editing
//! sessions that load, edit and save a scene file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scene_engine::config::Config;
use scene_engine::core::EditorConfig;
use scene_engine::debug::{run_clear_test, run_leak_cycle};
use scene_engine::foundation::logging;
use scene_engine::scene::PrimitiveKind;
use scene_engine::Engine;

#[derive(Debug, Parser)]
#[command(name = "scene_editor", about = "Headless driver for the scene editor core")]
struct Cli {
    /// Configuration file (.toml, .ron or .json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add and remove one entity per cycle and check the counters converge
    Leak {
        /// Number of cycles
        #[arg(long)]
        iterations: Option<usize>,
        /// Pause after each add and each remove, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Primitive kind to cycle
        #[arg(long)]
        kind: Option<String>,
        /// Write the JSON report here
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Add several entities, clear, and compare the counters
    ClearTest {
        /// Entities to add
        #[arg(long)]
        count: Option<usize>,
        /// Pause before each sample, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Write the JSON report here
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Load a scene if present, apply edits and save it back
    Session {
        /// Scene file; defaults to the configured path
        #[arg(long, value_name = "FILE")]
        scene: Option<PathBuf>,
        /// Add an entity of this kind (repeatable)
        #[arg(long = "add", value_name = "KIND")]
        add: Vec<String>,
        /// Remove the first entity before adding
        #[arg(long)]
        remove_first: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    logging::init_with_level(&config.engine.log_level);
    log::info!("scene_editor starting");

    match cli.command {
        Command::Leak { iterations, delay_ms, kind, out } => {
            leak(config, iterations, delay_ms, kind.as_deref(), out.as_deref())
        }
        Command::ClearTest { count, delay_ms, out } => clear_test(config, count, delay_ms, out.as_deref()),
        Command::Session { scene, add, remove_first } => session(config, scene, &add, remove_first),
    }
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let config = match path {
        Some(path) => EditorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn leak(
    config: EditorConfig,
    iterations: Option<usize>,
    delay_ms: Option<u64>,
    kind: Option<&str>,
    out: Option<&Path>,
) -> Result<ExitCode> {
    let settings = config.leak_test.clone();
    let iterations = iterations.unwrap_or(settings.iterations);
    let delay = Duration::from_millis(delay_ms.unwrap_or(settings.delay_ms));
    let kind = kind.map_or(settings.kind, PrimitiveKind::from_name);

    let mut engine = Engine::headless(config).context("Failed to start engine")?;
    let report = run_leak_cycle(&mut engine, iterations, delay, kind);

    let path = out.map_or_else(|| PathBuf::from(report.file_name()), Path::to_path_buf);
    report
        .write_json(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let converged = report.converged_for(&settings);
    println!(
        "leak test: {} cycles of {}, geometries {} -> {}, growth {}, converged: {}",
        iterations,
        kind,
        report.baseline.memory.geometries,
        report.final_info.memory.geometries,
        report.net_geometry_growth(),
        converged
    );
    println!("report written to {}", path.display());

    let shutdown = engine.dispose();
    log::info!("Shutdown with {} resources still tracked", shutdown.still_tracked);

    Ok(if converged && report.net_geometry_growth() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn clear_test(config: EditorConfig, count: Option<usize>, delay_ms: Option<u64>, out: Option<&Path>) -> Result<ExitCode> {
    let count = count.unwrap_or(config.leak_test.clear_count);
    let delay = Duration::from_millis(delay_ms.unwrap_or(config.leak_test.delay_ms));

    let mut engine = Engine::headless(config).context("Failed to start engine")?;
    let report = run_clear_test(&mut engine, count, delay);
    println!(
        "clear test: added {}, geometries before {}, after {}",
        report.added, report.before.memory.geometries, report.after.memory.geometries
    );

    if let Some(path) = out {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("report written to {}", path.display());
    }

    engine.dispose();
    Ok(if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn session(config: EditorConfig, scene: Option<PathBuf>, add: &[String], remove_first: bool) -> Result<ExitCode> {
    let path = scene.unwrap_or_else(|| PathBuf::from(&config.persistence.scene_path));
    let mut engine = Engine::headless(config).context("Failed to start engine")?;

    if path.exists() {
        engine
            .load_scene(&path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?;
        println!("loaded {} entities from {}", engine.state().len(), path.display());
    }

    if remove_first {
        if let Some(first) = engine.scene_manager().entity_ids().into_iter().next() {
            engine.remove_object(&first);
            println!("removed {first}");
        }
    }

    for name in add {
        let kind = PrimitiveKind::from_name(name);
        let id = engine.add_primitive(kind);
        println!("added {kind} {id}");
    }

    engine.tick();
    engine
        .save_scene(&path)
        .with_context(|| format!("Failed to save scene {}", path.display()))?;
    println!("saved {} entities to {}", engine.state().len(), path.display());

    engine.dispose();
    Ok(ExitCode::SUCCESS)
}
