//! Ticket Application Service
//!
//! Orchestrates domain operations through the repository port.
//! Contains NO infrastructure logic - pure business orchestration.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use parking_types::{
    AppError, CheckInRequest, Clock, FeeQuote, ParkingConfig, ParkingRepository,
    ParkingUnitOfWork, SystemClock, Tariff, Ticket, TicketId, TicketRepository, TicketStatus,
    Vehicle, VehicleRepository,
};

/// Application service for parking operations.
///
/// Generic over `R: ParkingRepository` - the adapter is injected at compile time.
/// Check-in and check-out each run inside one unit of work: every check is
/// made against the same snapshot the write lands in, and nothing is
/// committed unless the whole operation succeeds.
pub struct TicketService<R: ParkingRepository> {
    repo: R,
    tariff: RwLock<Tariff>,
    max_capacity: u32,
    clock: Arc<dyn Clock>,
}

impl<R: ParkingRepository> TicketService<R> {
    /// Creates a new ticket service using the wall clock.
    pub fn new(repo: R, config: ParkingConfig) -> Result<Self, AppError> {
        Self::with_clock(repo, config, Arc::new(SystemClock))
    }

    /// Creates a new ticket service reading time from `clock`.
    pub fn with_clock(
        repo: R,
        config: ParkingConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let tariff = config.tariff()?;
        Ok(Self {
            repo,
            tariff: RwLock::new(tariff),
            max_capacity: config.max_capacity,
            clock,
        })
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────────

    /// Returns the rates currently in force.
    pub fn tariff(&self) -> Tariff {
        *self.tariff.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Returns the configuration currently in force.
    pub fn config(&self) -> ParkingConfig {
        let tariff = self.tariff();
        ParkingConfig {
            hourly_rate: tariff.hourly_rate,
            daily_rate: tariff.daily_rate,
            max_capacity: self.max_capacity,
        }
    }

    /// Overrides the hourly rate for every fee computed from now on.
    #[tracing::instrument(skip(self))]
    pub fn set_hourly_rate(&self, rate: Decimal) -> Result<Tariff, AppError> {
        let mut tariff = self.tariff.write().unwrap_or_else(PoisonError::into_inner);
        *tariff = tariff.with_hourly_rate(rate)?;
        tracing::info!(hourly_rate = %rate, "hourly rate overridden");
        Ok(*tariff)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Fees
    // ─────────────────────────────────────────────────────────────────────────────

    /// Computes the fee for a stay with the current rates. Has no side effects.
    pub fn compute_fee(
        &self,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    ) -> Result<Decimal, AppError> {
        self.tariff().compute_fee(entry, exit).map_err(Into::into)
    }

    /// Prices a stay without touching any ticket.
    pub fn quote(&self, entry: DateTime<Utc>, exit: DateTime<Utc>) -> Result<FeeQuote, AppError> {
        let fee = self.compute_fee(entry, exit)?;
        Ok(FeeQuote {
            entry,
            exit,
            elapsed_minutes: (exit - entry).num_minutes(),
            fee,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Tickets
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a ticket by ID.
    pub async fn get(&self, id: TicketId) -> Result<Ticket, AppError> {
        let mut uow = self.repo.begin().await?;
        uow.find_ticket_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {}", id)))
    }

    /// Lists every open ticket.
    pub async fn list_open(&self) -> Result<Vec<Ticket>, AppError> {
        let mut uow = self.repo.begin().await?;
        uow.find_tickets_by_status(TicketStatus::Open)
            .await
            .map_err(Into::into)
    }

    /// Parks a vehicle in a slot and opens a ticket for it.
    ///
    /// A plate seen for the first time creates a vehicle record; a known
    /// plate reuses the stored record as is.
    ///
    /// The vehicle upsert runs before the occupancy checks so they can key on
    /// the stored vehicle ID. It stays inside the unit of work, so a rejected
    /// check-in drops the unit uncommitted and leaves no vehicle behind.
    #[tracing::instrument(skip(self, req), fields(plate = %req.plate, slot = %req.slot))]
    pub async fn check_in(&self, req: CheckInRequest) -> Result<Ticket, AppError> {
        // Validate before touching the store
        let candidate = Vehicle::new(req.plate, req.model, req.color)?;
        let slot = req.slot.trim();
        if slot.is_empty() {
            return Err(AppError::BadRequest("Slot cannot be empty".into()));
        }

        let mut uow = self.repo.begin().await?;

        let vehicle = uow.upsert_vehicle(candidate).await?;

        if uow.exists_open_ticket_for_vehicle(vehicle.id).await? {
            tracing::warn!(vehicle_id = %vehicle.id, "vehicle already parked");
            return Err(AppError::Conflict(format!(
                "Vehicle {} already has an open ticket",
                vehicle.plate
            )));
        }

        if uow.exists_open_ticket_for_slot(slot).await? {
            tracing::warn!("slot already occupied");
            return Err(AppError::Conflict(format!("Slot {} is already occupied", slot)));
        }

        let open = uow.count_by_status(TicketStatus::Open).await?;
        if open >= i64::from(self.max_capacity) {
            tracing::warn!(open, capacity = self.max_capacity, "parking lot is full");
            return Err(AppError::CapacityExceeded {
                open,
                capacity: self.max_capacity,
            });
        }

        let ticket = Ticket::open(vehicle.id, slot, self.clock.now())?;
        let ticket = uow.save_ticket(ticket).await?;
        uow.commit().await?;

        tracing::info!(ticket_id = %ticket.id, vehicle_id = %vehicle.id, "checked in");
        Ok(ticket)
    }

    /// Closes an open ticket, charging for the time parked.
    #[tracing::instrument(skip(self), fields(ticket_id = %id))]
    pub async fn check_out(&self, id: TicketId) -> Result<Ticket, AppError> {
        let mut uow = self.repo.begin().await?;

        let mut ticket = uow
            .find_ticket_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {}", id)))?;

        if !ticket.is_open() {
            tracing::warn!("ticket already closed");
            return Err(AppError::Conflict(format!("Ticket {} is already closed", id)));
        }

        // A clock that stepped backwards must not produce exit < entry.
        let exit = self.clock.now().max(ticket.entry_at);
        let fee = self.tariff().compute_fee(ticket.entry_at, exit)?;
        ticket.close(exit, fee)?;

        let ticket = uow.save_ticket(ticket).await?;
        uow.commit().await?;

        tracing::info!(fee = %fee, "checked out");
        Ok(ticket)
    }
}
