//! # Parking Hex
//!
//! Application service layer and command adapter for the parking ticket service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (check-in, check-out, fee computation)
//! - `inbound/` - Command adapter (drives the service from the CLI)
//!
//! The service is generic over `R: ParkingRepository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod service;


pub use service::TicketService;
