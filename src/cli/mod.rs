//! CLI module for Scrubcut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Scrubcut
///
/// Drives an editing session from the command line: extract a thumbnail
/// strip, chain edits through ffmpeg, assemble slideshows and inspect the
/// timeline mapping.
#[derive(Parser, Debug)]
#[command(name = "scrubcut")]
#[command(about = "Scrubcut - scrub, cut and transcode video through ffmpeg")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: scrubcut.toml, then config/scrubcut.toml)
    #[arg(long, global = true, env = "SCRUBCUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Temp directory for every file the session produces
    #[arg(long, global = true)]
    pub scope_dir: Option<PathBuf>,

    /// Directory shared assets are copied to
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the thumbnail strip of a video and print the frame paths
    Frames(args::FramesArgs),
    /// Apply a chain of edits to a video and share the result
    Edit(args::EditArgs),
    /// Build a slideshow from photos and an audio track
    Slideshow(args::SlideshowArgs),
    /// Map a scrub offset to playback times
    Timeline(args::TimelineArgs),
    /// Print or write the effective configuration
    Config(args::ConfigArgs),
}
