//! Configuration loading from the command line and environment.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use parking_hex::inbound::Command;
use parking_types::{
    CheckInRequest, ParkingConfig, TicketId,
    domain::tariff::{DEFAULT_DAILY_RATE, DEFAULT_HOURLY_RATE, DEFAULT_MAX_CAPACITY},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser)]
#[command(name = "parking")]
#[command(author, version, about = "Parking lot ticket service", long_about = None)]
pub struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://parking.db?mode=rwc")]
    pub database_url: String,

    /// Hourly rate; each started half hour costs half of it
    #[arg(long, env = "PARKING_HOURLY_RATE", default_value_t = DEFAULT_HOURLY_RATE)]
    pub hourly_rate: Decimal,

    /// Flat rate for stays of twelve hours or more
    #[arg(long, env = "PARKING_DAILY_RATE", default_value_t = DEFAULT_DAILY_RATE)]
    pub daily_rate: Decimal,

    /// Maximum number of vehicles parked at once
    #[arg(long, env = "PARKING_MAX_CAPACITY", default_value_t = DEFAULT_MAX_CAPACITY)]
    pub max_capacity: u32,

    /// Log output format (logs go to stderr)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Park a vehicle and open a ticket
    CheckIn {
        #[arg(long)]
        plate: String,
        #[arg(long, default_value = "")]
        model: String,
        #[arg(long, default_value = "")]
        color: String,
        #[arg(long)]
        slot: String,
    },
    /// Close a ticket and charge for the stay
    CheckOut {
        /// Ticket ID (UUID)
        id: TicketId,
    },
    /// Show a ticket
    Get {
        /// Ticket ID (UUID)
        id: TicketId,
    },
    /// List the vehicles currently parked
    ListOpen,
    /// Price a stay without recording anything
    Quote {
        /// Entry time (RFC 3339)
        #[arg(long)]
        entry: DateTime<Utc>,
        /// Exit time (RFC 3339)
        #[arg(long)]
        exit: DateTime<Utc>,
        /// Override the hourly rate for this quote
        #[arg(long)]
        hourly_rate: Option<Decimal>,
    },
    /// Show the rates and capacity in force
    Tariff,
}

impl Cli {
    pub fn parking_config(&self) -> ParkingConfig {
        ParkingConfig {
            hourly_rate: self.hourly_rate,
            daily_rate: self.daily_rate,
            max_capacity: self.max_capacity,
        }
    }
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::CheckIn {
                plate,
                model,
                color,
                slot,
            } => Command::CheckIn(CheckInRequest {
                plate,
                model,
                color,
                slot,
            }),
            Commands::CheckOut { id } => Command::CheckOut { ticket_id: id },
            Commands::Get { id } => Command::Get { ticket_id: id },
            Commands::ListOpen => Command::ListOpen,
            Commands::Quote {
                entry,
                exit,
                hourly_rate,
            } => Command::Quote {
                entry,
                exit,
                hourly_rate,
            },
            Commands::Tariff => Command::Tariff,
        }
    }
}
