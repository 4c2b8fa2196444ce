//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use parking_types::{
    ParkingRepository, ParkingUnitOfWork, RepoError, Ticket, TicketId, TicketRepository,
    TicketStatus, Vehicle, VehicleId, VehicleRepository,
};

use crate::types::{db_error, parse_status, tx_error};

/// Advisory lock key taken by every unit of work ("PARK" in ASCII).
const PARKING_LOCK_KEY: i64 = 0x5041_524B;

// ─────────────────────────────────────────────────────────────────────────────
// Database rows
// ─────────────────────────────────────────────────────────────────────────────

/// Vehicle row from database.
#[derive(FromRow)]
struct DbVehicle {
    id: Uuid,
    plate: String,
    model: String,
    color: String,
    created_at: DateTime<Utc>,
}

impl DbVehicle {
    fn into_domain(self) -> Vehicle {
        Vehicle::from_parts(
            VehicleId::from_uuid(self.id),
            self.plate,
            self.model,
            self.color,
            self.created_at,
        )
    }
}

/// Ticket row from database.
#[derive(FromRow)]
struct DbTicket {
    id: Uuid,
    vehicle_id: Uuid,
    slot: String,
    entry_at: DateTime<Utc>,
    exit_at: Option<DateTime<Utc>>,
    fee: Option<Decimal>,
    status: String,
}

impl DbTicket {
    fn into_domain(self) -> Result<Ticket, RepoError> {
        Ok(Ticket::from_parts(
            TicketId::from_uuid(self.id),
            VehicleId::from_uuid(self.vehicle_id),
            self.slot,
            self.entry_at,
            self.exit_at,
            self.fee,
            parse_status(&self.status)?,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository.
///
/// Units of work are serialized with a transaction-scoped advisory lock, and
/// partial unique indexes on open tickets back the occupancy invariants.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    tracing::debug!(migration = name, "applied postgres migration");
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ParkingRepository for PostgresRepo {
    async fn begin(&self) -> Result<Box<dyn ParkingUnitOfWork>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(tx_error)?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(PARKING_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(tx_error)?;

        Ok(Box::new(PostgresUnitOfWork { tx: Some(tx) }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit of work
// ─────────────────────────────────────────────────────────────────────────────

/// A PostgreSQL transaction holding the parking advisory lock.
pub struct PostgresUnitOfWork {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresUnitOfWork {
    fn conn(&mut self) -> Result<&mut PgConnection, RepoError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| RepoError::Transaction("Unit of work already committed".into()))
    }
}

#[async_trait]
impl TicketRepository for PostgresUnitOfWork {
    async fn find_ticket_by_id(&mut self, id: TicketId) -> Result<Option<Ticket>, RepoError> {
        let row: Option<DbTicket> = sqlx::query_as(
            r#"SELECT id, vehicle_id, slot, entry_at, exit_at, fee, status
               FROM tickets WHERE id = $1"#,
        )
        .bind(id.as_uuid())
        .fetch_optional(self.conn()?)
        .await
        .map_err(db_error)?;

        row.map(DbTicket::into_domain).transpose()
    }

    async fn find_tickets_by_status(
        &mut self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, RepoError> {
        let rows: Vec<DbTicket> = sqlx::query_as(
            r#"SELECT id, vehicle_id, slot, entry_at, exit_at, fee, status
               FROM tickets WHERE status = $1
               ORDER BY entry_at ASC"#,
        )
        .bind(status.as_str())
        .fetch_all(self.conn()?)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(DbTicket::into_domain).collect()
    }

    async fn exists_open_ticket_for_vehicle(
        &mut self,
        vehicle_id: VehicleId,
    ) -> Result<bool, RepoError> {
        sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM tickets WHERE vehicle_id = $1 AND status = 'OPEN')"#,
        )
        .bind(vehicle_id.as_uuid())
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)
    }

    async fn exists_open_ticket_for_slot(&mut self, slot: &str) -> Result<bool, RepoError> {
        sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM tickets WHERE slot = $1 AND status = 'OPEN')"#,
        )
        .bind(slot)
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)
    }

    async fn count_by_status(&mut self, status: TicketStatus) -> Result<i64, RepoError> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM tickets WHERE status = $1"#)
            .bind(status.as_str())
            .fetch_one(self.conn()?)
            .await
            .map_err(db_error)
    }

    async fn save_ticket(&mut self, ticket: Ticket) -> Result<Ticket, RepoError> {
        // Vehicle, slot and entry time are fixed once the ticket exists.
        let row: DbTicket = sqlx::query_as(
            r#"INSERT INTO tickets (id, vehicle_id, slot, entry_at, exit_at, fee, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (id) DO UPDATE SET
                   exit_at = EXCLUDED.exit_at,
                   fee = EXCLUDED.fee,
                   status = EXCLUDED.status
               RETURNING id, vehicle_id, slot, entry_at, exit_at, fee, status"#,
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.vehicle_id.as_uuid())
        .bind(&ticket.slot)
        .bind(ticket.entry_at)
        .bind(ticket.exit_at)
        .bind(ticket.fee)
        .bind(ticket.status.as_str())
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)?;

        row.into_domain()
    }
}

#[async_trait]
impl VehicleRepository for PostgresUnitOfWork {
    async fn find_vehicle_by_plate(&mut self, plate: &str) -> Result<Option<Vehicle>, RepoError> {
        let row: Option<DbVehicle> = sqlx::query_as(
            r#"SELECT id, plate, model, color, created_at FROM vehicles WHERE plate = $1"#,
        )
        .bind(plate)
        .fetch_optional(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(row.map(DbVehicle::into_domain))
    }

    async fn save_vehicle(&mut self, vehicle: Vehicle) -> Result<Vehicle, RepoError> {
        let row: DbVehicle = sqlx::query_as(
            r#"INSERT INTO vehicles (id, plate, model, color, created_at)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (id) DO UPDATE SET
                   plate = EXCLUDED.plate,
                   model = EXCLUDED.model,
                   color = EXCLUDED.color
               RETURNING id, plate, model, color, created_at"#,
        )
        .bind(vehicle.id.as_uuid())
        .bind(&vehicle.plate)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(vehicle.created_at)
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(row.into_domain())
    }

    async fn upsert_vehicle(&mut self, vehicle: Vehicle) -> Result<Vehicle, RepoError> {
        // The no-op update makes RETURNING yield the existing row as well.
        let row: DbVehicle = sqlx::query_as(
            r#"INSERT INTO vehicles (id, plate, model, color, created_at)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (plate) DO UPDATE SET plate = vehicles.plate
               RETURNING id, plate, model, color, created_at"#,
        )
        .bind(vehicle.id.as_uuid())
        .bind(&vehicle.plate)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(vehicle.created_at)
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(row.into_domain())
    }
}

#[async_trait]
impl ParkingUnitOfWork for PostgresUnitOfWork {
    async fn commit(&mut self) -> Result<(), RepoError> {
        match self.tx.take() {
            Some(tx) => tx.commit().await.map_err(tx_error),
            None => Err(RepoError::Transaction(
                "Unit of work already committed".into(),
            )),
        }
    }
}
