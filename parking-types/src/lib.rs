//! # Parking Types
//!
//! Domain types and port traits for the parking ticket service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Vehicle, Ticket, Tariff)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for the inbound boundary
//! - `error/` - Domain, repository and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{ParkingConfig, Tariff, Ticket, TicketId, TicketStatus, Vehicle, VehicleId};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    Clock, ParkingRepository, ParkingUnitOfWork, SystemClock, TicketRepository,
    VehicleRepository,
};
