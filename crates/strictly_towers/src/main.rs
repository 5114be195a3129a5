//! Strictly Towers - Unified CLI
//!
//! Play the Tower of Hanoi by hand, watch the optimal solution, or let an
//! oracle try and compare it against the minimum.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Mode};
use std::io::Write;
use std::time::Duration;
use strictly_hanoi::{Peg, Plan, Puzzle, optimal_move_count};
use strictly_towers::{
    ManualCommand, Oracle, OracleConfig, OracleSession, SessionConfig, SessionEvent, SessionReport,
    build_oracle, parse_command, render,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

const START: Peg = Peg::A;
const AUXILIARY: Peg = Peg::B;
const GOAL: Peg = Peg::C;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so boards on stdout stay readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,strictly_towers=info,strictly_hanoi=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.disks < 1 {
        println!("Number of disks must be at least 1.");
        return Ok(());
    }

    match cli.mode {
        Mode::Manual => run_manual(cli.disks).await,
        Mode::Algorithm => run_algorithm(cli.disks, Duration::from_millis(cli.delay_ms)).await,
        Mode::Oracle => {
            let config = resolve_config(&cli)?;
            run_oracle(cli.disks, &config, cli.quiet).await
        }
        Mode::Compare => {
            let config = resolve_config(&cli)?;
            run_compare(cli.disks, &config).await
        }
    }
}

/// Loads the config file and applies CLI overrides.
fn resolve_config(cli: &Cli) -> Result<OracleConfig> {
    let mut config = OracleConfig::load_or_default(&cli.config)?;
    if let Some(provider) = cli.provider {
        config = config.with_provider(provider);
    }
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    if let Some(iterations) = cli.iterations {
        config = config.with_max_iterations(iterations);
    }
    Ok(config)
}

fn minimum_moves(num_disks: u32) -> u64 {
    optimal_move_count(num_disks).unwrap_or(u64::MAX)
}

/// Interactive play from stdin.
#[instrument]
async fn run_manual(num_disks: u32) -> Result<()> {
    let mut puzzle = Puzzle::with_start(num_disks, START)?;
    print!("{}", render(&puzzle.snapshot(), GOAL));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !puzzle.is_solved(GOAL) {
        println!("Enter your move (e.g., 'A C' to move from A to C, or 'q' to quit):");
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!("Exiting game.");
            return Ok(());
        };

        match parse_command(&line) {
            Ok(ManualCommand::Quit) => {
                println!("Exiting game.");
                return Ok(());
            }
            Ok(ManualCommand::Move(mv)) => match puzzle.apply_move(mv) {
                Ok(_) => print!("{}", render(&puzzle.snapshot(), GOAL)),
                Err(e) => println!("Invalid move {mv}: {e}. Try again."),
            },
            Err(e) => println!("{e}"),
        }
    }

    println!(
        "Congratulations! You solved the puzzle in {} moves.",
        puzzle.moves()
    );
    println!(
        "The minimum possible moves for {num_disks} disks is {}.",
        minimum_moves(num_disks)
    );
    Ok(())
}

/// Plays the optimal solution with a pause between moves.
#[instrument]
async fn run_algorithm(num_disks: u32, delay: Duration) -> Result<()> {
    let mut puzzle = Puzzle::with_start(num_disks, START)?;
    println!("Solving {num_disks}-disk Tower of Hanoi puzzle with recursive algorithm...");
    print!("{}", render(&puzzle.snapshot(), GOAL));

    for (i, mv) in Plan::new(num_disks, START, AUXILIARY, GOAL).enumerate() {
        println!("Move {}: {}", i + 1, mv);
        puzzle.apply_move(mv)?;
        print!("{}", render(&puzzle.snapshot(), GOAL));
        tokio::time::sleep(delay).await;
    }

    println!("Puzzle solved in {} moves (optimal).", puzzle.moves());
    Ok(())
}

/// Runs a full oracle session, optionally printing progress as it happens.
#[instrument(skip(config), fields(provider = %config.provider(), model = %config.model()))]
async fn solve_with_oracle(
    num_disks: u32,
    config: &OracleConfig,
    verbose: bool,
) -> Result<SessionReport> {
    let puzzle = Puzzle::with_start(num_disks, START)?;
    let oracle = build_oracle(config, &puzzle, GOAL)?;
    info!(oracle = oracle.name(), "Starting oracle session");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut session = OracleSession::new(
        puzzle,
        oracle,
        SessionConfig::new(*config.max_iterations(), GOAL),
    )?
    .with_events(event_tx);

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if verbose {
                print_event(&event);
            }
        }
    });

    let report = session.run().await;
    // Closes the channel so the printer drains and exits
    drop(session);
    printer.await?;
    Ok(report)
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::IterationStarted { iteration } => println!("Iteration {iteration}..."),
        SessionEvent::Accepted { mv, disk, state, .. } => {
            println!("Moved disk {disk}: {mv}");
            print!("{}", render(state, GOAL));
        }
        SessionEvent::Rejected { mv, reason, .. } => println!("Invalid move {mv}: {reason}"),
        SessionEvent::NoProposal { reason, .. } => println!("No move proposed: {reason}"),
        SessionEvent::Finished { .. } => {}
    }
}

async fn run_oracle(num_disks: u32, config: &OracleConfig, quiet: bool) -> Result<()> {
    println!("Oracle attempting to solve {num_disks}-disk Tower of Hanoi puzzle...");
    let report = solve_with_oracle(num_disks, config, !quiet).await?;

    if report.is_solved() {
        println!(
            "Oracle solved the puzzle in {} moves and {:.2} seconds.",
            report.moves(),
            report.elapsed().as_secs_f64()
        );
        println!(
            "The optimal solution requires {} moves.",
            minimum_moves(num_disks)
        );
    } else {
        println!(
            "Oracle failed to solve the puzzle in {} iterations.",
            report.iterations()
        );
    }
    if *report.rejections() > 0 || *report.declined() > 0 {
        println!(
            "Rejected proposals: {}, missing proposals: {}",
            report.rejections(),
            report.declined()
        );
    }
    Ok(())
}

async fn run_compare(num_disks: u32, config: &OracleConfig) -> Result<()> {
    let optimal = minimum_moves(num_disks);
    println!("Comparing methods for solving {num_disks}-disk Tower of Hanoi puzzle...");
    println!("Optimal solution requires {optimal} moves.\n");

    let algorithm = Plan::new(num_disks, START, AUXILIARY, GOAL);
    println!(
        "Algorithm solution: {} moves (optimal)\n",
        algorithm.remaining().unwrap_or(u64::MAX)
    );

    println!("Oracle solution ({}):", config.provider());
    let report = solve_with_oracle(num_disks, config, false).await?;
    match report.efficiency() {
        Some(efficiency) if report.is_solved() => {
            println!(
                "  - Moves: {} (Efficiency: {:.2}%)",
                report.moves(),
                efficiency
            );
            println!(
                "  - Time taken: {:.2} seconds",
                report.elapsed().as_secs_f64()
            );
        }
        _ => println!("  - Failed to solve the puzzle"),
    }

    println!("\nComparison complete.");
    Ok(())
}
