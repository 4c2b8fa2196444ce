//! Command handlers.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use parking_types::{AppError, CheckInRequest, ParkingRepository, TicketId};

use crate::TicketService;

/// An operation requested by the operator.
#[derive(Debug, Clone)]
pub enum Command {
    CheckIn(CheckInRequest),
    CheckOut {
        ticket_id: TicketId,
    },
    Get {
        ticket_id: TicketId,
    },
    ListOpen,
    /// Price a stay without touching any ticket; `hourly_rate` overrides the
    /// configured rate for the rest of the process.
    Quote {
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
        hourly_rate: Option<Decimal>,
    },
    Tariff,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::CheckIn(_) => "check-in",
            Command::CheckOut { .. } => "check-out",
            Command::Get { .. } => "get",
            Command::ListOpen => "list-open",
            Command::Quote { .. } => "quote",
            Command::Tariff => "tariff",
        }
    }
}

/// Wrapper giving an `AppError` an exit code and a JSON body.
#[derive(Debug)]
pub struct CommandError(pub AppError);

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        CommandError(err)
    }
}

impl CommandError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match &self.0 {
            AppError::Internal(_) => 1,
            AppError::BadRequest(_) => 2,
            AppError::NotFound(_) => 3,
            AppError::Conflict(_) => 4,
            AppError::CapacityExceeded { .. } => 5,
        }
    }

    pub fn kind(&self) -> &'static str {
        match &self.0 {
            AppError::Internal(_) => "internal",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::CapacityExceeded { .. } => "capacity_exceeded",
        }
    }

    pub fn to_json(&self) -> Value {
        let message = match &self.0 {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::CapacityExceeded { open, capacity } => format!(
                "Parking lot is full: {} of {} spaces occupied",
                open, capacity
            ),
        };

        serde_json::json!({
            "error": message,
            "kind": self.kind(),
            "code": self.exit_code()
        })
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for CommandError {}

fn render<T: Serialize>(value: T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError(AppError::Internal(e.to_string())))
}

/// Runs one command against the service.
#[tracing::instrument(skip(service, command), fields(command = command.name()))]
pub async fn execute<R: ParkingRepository>(
    service: &TicketService<R>,
    command: Command,
) -> Result<Value, CommandError> {
    tracing::debug!("executing command");

    match command {
        Command::CheckIn(req) => render(service.check_in(req).await?),
        Command::CheckOut { ticket_id } => render(service.check_out(ticket_id).await?),
        Command::Get { ticket_id } => render(service.get(ticket_id).await?),
        Command::ListOpen => render(service.list_open().await?),
        Command::Quote {
            entry,
            exit,
            hourly_rate,
        } => {
            if let Some(rate) = hourly_rate {
                service.set_hourly_rate(rate)?;
            }
            render(service.quote(entry, exit)?)
        }
        Command::Tariff => render(service.config()),
    }
}
