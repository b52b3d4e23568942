//! Ember CLI - Headless driver for the particle engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, render, simulate};

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Render and simulate canvas particle effects without a browser", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a number of frames and write the last one to a PNG image
    Render {
        /// Built-in preset (loader or background)
        #[arg(long, default_value = "background")]
        preset: String,

        /// TOML config file; its own `preset` key replaces --preset
        #[arg(long)]
        config: Option<String>,

        /// Output image path
        #[arg(short, long, default_value = "ember.png")]
        output: String,

        /// Viewport width in logical pixels
        #[arg(long, default_value = "800")]
        width: f32,

        /// Viewport height in logical pixels
        #[arg(long, default_value = "600")]
        height: f32,

        /// Device pixel ratio of the backing store
        #[arg(long, default_value = "1.0")]
        dpr: f32,

        /// Number of refreshes to run before capturing
        #[arg(long, default_value = "120")]
        frames: usize,

        /// Milliseconds between refreshes
        #[arg(long, default_value = "16.67")]
        frame_ms: f64,

        /// Pointer position as a fraction of the viewport (comma-separated x,y)
        #[arg(long, value_parser = parse_vec2)]
        pointer: Option<[f32; 2]>,

        /// Random seed for a reproducible image
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Run the engine at a fixed frame interval and report its events
    Simulate {
        /// Built-in preset (loader or background)
        #[arg(long, default_value = "loader")]
        preset: String,

        /// TOML config file; its own `preset` key replaces --preset
        #[arg(long)]
        config: Option<String>,

        /// Viewport width in logical pixels
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Viewport height in logical pixels
        #[arg(long, default_value = "720")]
        height: f32,

        /// Device pixel ratio of the backing store
        #[arg(long, default_value = "1.0")]
        dpr: f32,

        /// Milliseconds between refreshes
        #[arg(long, default_value = "16.67")]
        frame_ms: f64,

        /// Give up after this many refreshes
        #[arg(long, default_value = "10000")]
        max_frames: usize,

        /// Pointer position as a fraction of the viewport (comma-separated x,y)
        #[arg(long, value_parser = parse_vec2)]
        pointer: Option<[f32; 2]>,

        /// Random seed
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Print a configuration as TOML
    Config {
        /// Built-in preset (loader or background)
        #[arg(long, default_value = "background")]
        preset: String,

        /// TOML config file to resolve against its preset and validate
        #[arg(long)]
        config: Option<String>,
    },
}

fn parse_vec2(s: &str) -> Result<[f32; 2], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("expected 2 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    Ok([x, y])
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    match cli.command {
        Commands::Render {
            preset,
            config,
            output,
            width,
            height,
            dpr,
            frames,
            frame_ms,
            pointer,
            seed,
        } => render::run(render::RenderArgs {
            preset,
            config,
            output,
            width,
            height,
            dpr,
            frames,
            frame_ms,
            pointer,
            seed,
        }),
        Commands::Simulate {
            preset,
            config,
            width,
            height,
            dpr,
            frame_ms,
            max_frames,
            pointer,
            seed,
        } => simulate::run(simulate::SimulateArgs {
            preset,
            config,
            width,
            height,
            dpr,
            frame_ms,
            max_frames,
            pointer,
            seed,
        }),
        Commands::Config {
            preset,
            config: path,
        } => config::run(&preset, path.as_deref()),
    }
}
