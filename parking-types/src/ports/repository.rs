//! Repository port traits.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (SQLite, Postgres, in-memory) implement these traits.
//!
//! Every store operation runs inside a unit of work obtained from
//! [`ParkingRepository::begin`]. A unit of work sees its own writes, and
//! nothing it wrote is visible to others until [`ParkingUnitOfWork::commit`].
//! Dropping it without committing discards its writes.

use crate::domain::{Ticket, TicketId, TicketStatus, Vehicle, VehicleId};
use crate::error::RepoError;

/// Ticket store.
#[async_trait::async_trait]
pub trait TicketRepository: Send {
    /// Gets a ticket by ID.
    async fn find_ticket_by_id(&mut self, id: TicketId) -> Result<Option<Ticket>, RepoError>;

    /// Lists tickets with the given status, oldest entry first.
    async fn find_tickets_by_status(
        &mut self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, RepoError>;

    /// Returns true if the vehicle currently holds an open ticket.
    async fn exists_open_ticket_for_vehicle(
        &mut self,
        vehicle_id: VehicleId,
    ) -> Result<bool, RepoError>;

    /// Returns true if the slot is currently occupied by an open ticket.
    async fn exists_open_ticket_for_slot(&mut self, slot: &str) -> Result<bool, RepoError>;

    /// Counts tickets with the given status.
    async fn count_by_status(&mut self, status: TicketStatus) -> Result<i64, RepoError>;

    /// Inserts the ticket, or updates it if the ID is already stored.
    async fn save_ticket(&mut self, ticket: Ticket) -> Result<Ticket, RepoError>;
}

/// Vehicle store.
#[async_trait::async_trait]
pub trait VehicleRepository: Send {
    /// Finds a vehicle by its plate.
    async fn find_vehicle_by_plate(&mut self, plate: &str) -> Result<Option<Vehicle>, RepoError>;

    /// Inserts the vehicle, or updates it if the ID is already stored.
    async fn save_vehicle(&mut self, vehicle: Vehicle) -> Result<Vehicle, RepoError>;

    /// Stores the vehicle unless its plate is already known.
    ///
    /// Returns the stored record either way; an existing record is never
    /// overwritten.
    async fn upsert_vehicle(&mut self, vehicle: Vehicle) -> Result<Vehicle, RepoError>;
}

/// A single atomic read-validate-write unit against the store.
#[async_trait::async_trait]
pub trait ParkingUnitOfWork: TicketRepository + VehicleRepository {
    /// Makes every write of this unit durable and visible.
    ///
    /// Calling any store method after a successful commit fails with
    /// [`RepoError::Transaction`].
    async fn commit(&mut self) -> Result<(), RepoError>;
}

/// Entry point to the parking store.
///
/// Units of work handed out by one repository must not interleave in a way
/// that lets two of them both pass the same occupancy check.
#[async_trait::async_trait]
pub trait ParkingRepository: Send + Sync + 'static {
    /// Starts a new unit of work.
    async fn begin(&self) -> Result<Box<dyn ParkingUnitOfWork>, RepoError>;
}
