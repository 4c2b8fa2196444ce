//! Ticket domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vehicle::VehicleId;
use crate::error::DomainError;

/// Unique identifier for a Ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random TicketId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TicketId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TicketId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Vehicle is currently parked
    Open,
    /// Vehicle has left; exit time and fee are recorded
    Closed,
}

impl TicketStatus {
    /// Returns the storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(TicketStatus::Open),
            "CLOSED" => Ok(TicketStatus::Closed),
            other => Err(DomainError::ValidationError(format!(
                "Unknown ticket status: {}",
                other
            ))),
        }
    }
}

/// A parking ticket.
///
/// Opened at check-in, closed exactly once at check-out. A closed ticket is
/// never modified again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,
    /// The parked vehicle
    pub vehicle_id: VehicleId,
    /// Physical parking space
    pub slot: String,
    pub entry_at: DateTime<Utc>,
    pub exit_at: Option<DateTime<Utc>>,
    /// Amount charged, set on check-out
    pub fee: Option<Decimal>,
    pub status: TicketStatus,
}

impl Ticket {
    /// Opens a new ticket for a vehicle entering the lot.
    pub fn open(
        vehicle_id: VehicleId,
        slot: impl Into<String>,
        entry_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let slot = slot.into().trim().to_string();
        if slot.is_empty() {
            return Err(DomainError::ValidationError(
                "Slot cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: TicketId::new(),
            vehicle_id,
            slot,
            entry_at,
            exit_at: None,
            fee: None,
            status: TicketStatus::Open,
        })
    }

    /// Reconstructs a ticket from database fields.
    pub fn from_parts(
        id: TicketId,
        vehicle_id: VehicleId,
        slot: String,
        entry_at: DateTime<Utc>,
        exit_at: Option<DateTime<Utc>>,
        fee: Option<Decimal>,
        status: TicketStatus,
    ) -> Self {
        Self {
            id,
            vehicle_id,
            slot,
            entry_at,
            exit_at,
            fee,
            status,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }

    /// Closes the ticket, recording the exit time and the fee charged.
    pub fn close(&mut self, exit_at: DateTime<Utc>, fee: Decimal) -> Result<(), DomainError> {
        if !self.is_open() {
            return Err(DomainError::TicketAlreadyClosed(self.id));
        }
        if exit_at < self.entry_at {
            return Err(DomainError::InvalidInterval {
                entry: self.entry_at,
                exit: exit_at,
            });
        }
        if fee < Decimal::ZERO {
            return Err(DomainError::NegativeAmount);
        }

        self.exit_at = Some(exit_at);
        self.fee = Some(fee);
        self.status = TicketStatus::Closed;
        Ok(())
    }
}
