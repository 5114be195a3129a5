//! Command-line interface for strictly_towers.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use strictly_towers::OracleProvider;

/// Strictly Towers - Tower of Hanoi played by hand, by the planner, or by an LLM
#[derive(Parser, Debug)]
#[command(name = "strictly_towers")]
#[command(about = "Tower of Hanoi with an untrusted move oracle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Number of disks
    #[arg(short, long, default_value_t = 3)]
    pub disks: u32,

    /// What drives the moves
    #[arg(short, long, value_enum, default_value_t = Mode::Manual)]
    pub mode: Mode,

    /// Oracle model name (overrides the config file)
    #[arg(long)]
    pub model: Option<String>,

    /// Oracle provider (overrides the config file)
    #[arg(long, value_enum)]
    pub provider: Option<OracleProvider>,

    /// Maximum oracle iterations (overrides the config file, default 100)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub iterations: Option<u32>,

    /// Path to oracle configuration
    #[arg(short, long, default_value = "towers.toml")]
    pub config: PathBuf,

    /// Delay between moves when the algorithm plays
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Don't draw the board after every oracle move
    #[arg(short, long)]
    pub quiet: bool,
}

/// Available play modes
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Enter moves at the prompt
    Manual,
    /// Watch the optimal solution
    Algorithm,
    /// Let the oracle solve it
    #[value(alias = "ai")]
    Oracle,
    /// Run the algorithm and the oracle and compare
    Compare,
}
