//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Ministry portal data layer - schema and seed tooling
#[derive(Parser, Debug)]
#[command(name = "ministry-data")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database URL, overriding DATABASE_URL and .env
    #[arg(short, long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    /// Insert demo data through the unit of work
    Seed(SeedArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the seed command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Organization name
    #[arg(long, default_value = "Ministry A")]
    pub organization: String,

    /// Organization code
    #[arg(long, default_value = "MOA")]
    pub code: String,

    /// Number of demo users to create and assign to the segment
    #[arg(long, default_value_t = 3)]
    pub users: usize,
}
