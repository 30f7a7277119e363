//! Command-line surface for the fichador binary.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Records Adrenalin HR clock-in/clock-out attendance
#[derive(Debug, Parser)]
#[command(name = "fichador", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one attendance cycle with bounded retries
    Run(RunArgs),
    /// Keep running, firing clock-in and clock-out at their daily times
    Schedule,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Action to perform; inferred from the local hour when absent
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// CLI spelling of the attendance action
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Morning punch-in
    Clockin,
    /// Evening punch-out
    Clockout,
}

impl From<ModeArg> for fichar::Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Clockin => Self::ClockIn,
            ModeArg::Clockout => Self::ClockOut,
        }
    }
}
