//! Domain models for the parking ticket service.

pub mod tariff;
pub mod ticket;
pub mod vehicle;

pub use tariff::{ParkingConfig, Tariff};
pub use ticket::{Ticket, TicketId, TicketStatus};
pub use vehicle::{Vehicle, VehicleId};
