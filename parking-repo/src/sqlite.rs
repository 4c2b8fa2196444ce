//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::str::FromStr;

use parking_types::{
    ParkingRepository, ParkingUnitOfWork, RepoError, Ticket, TicketId, TicketRepository,
    TicketStatus, Vehicle, VehicleId, VehicleRepository,
};

use crate::types::{
    db_error, format_timestamp, parse_decimal, parse_status, parse_timestamp, parse_uuid,
    tx_error,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database rows
// ─────────────────────────────────────────────────────────────────────────────

/// Vehicle row from database.
#[derive(FromRow)]
struct DbVehicle {
    id: String,
    plate: String,
    model: String,
    color: String,
    created_at: String,
}

impl DbVehicle {
    fn into_domain(self) -> Result<Vehicle, RepoError> {
        Ok(Vehicle::from_parts(
            VehicleId::from_uuid(parse_uuid(&self.id)?),
            self.plate,
            self.model,
            self.color,
            parse_timestamp(&self.created_at)?,
        ))
    }
}

/// Ticket row from database.
#[derive(FromRow)]
struct DbTicket {
    id: String,
    vehicle_id: String,
    slot: String,
    entry_at: String,
    exit_at: Option<String>,
    fee: Option<String>,
    status: String,
}

impl DbTicket {
    fn into_domain(self) -> Result<Ticket, RepoError> {
        Ok(Ticket::from_parts(
            TicketId::from_uuid(parse_uuid(&self.id)?),
            VehicleId::from_uuid(parse_uuid(&self.vehicle_id)?),
            self.slot,
            parse_timestamp(&self.entry_at)?,
            self.exit_at.as_deref().map(parse_timestamp).transpose()?,
            self.fee.as_deref().map(parse_decimal).transpose()?,
            parse_status(&self.status)?,
        ))
    }
}

const TICKET_COLUMNS: &str = "id, vehicle_id, slot, entry_at, exit_at, fee, status";
const VEHICLE_COLUMNS: &str = "id, plate, model, color, created_at";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
///
/// The pool holds a single connection, so units of work run one at a time.
pub struct SqliteRepo {
    pool: SqlitePool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &SqlitePool, sql: &str, name: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    tracing::debug!(migration = name, "applied sqlite migration");
    Ok(())
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives exactly as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        execute_migration(&pool, include_str!("../migrations/0001_create_tables.sql"), "0001")
            .await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ParkingRepository for SqliteRepo {
    async fn begin(&self) -> Result<Box<dyn ParkingUnitOfWork>, RepoError> {
        let tx = self.pool.begin().await.map_err(tx_error)?;
        Ok(Box::new(SqliteUnitOfWork { tx: Some(tx) }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit of work
// ─────────────────────────────────────────────────────────────────────────────

/// A SQLite transaction. Rolled back on drop unless committed.
pub struct SqliteUnitOfWork {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteUnitOfWork {
    fn conn(&mut self) -> Result<&mut SqliteConnection, RepoError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| RepoError::Transaction("Unit of work already committed".into()))
    }
}

#[async_trait]
impl TicketRepository for SqliteUnitOfWork {
    async fn find_ticket_by_id(&mut self, id: TicketId) -> Result<Option<Ticket>, RepoError> {
        let sql = format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS);
        let row: Option<DbTicket> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(self.conn()?)
            .await
            .map_err(db_error)?;

        row.map(DbTicket::into_domain).transpose()
    }

    async fn find_tickets_by_status(
        &mut self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, RepoError> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE status = ? ORDER BY entry_at ASC",
            TICKET_COLUMNS
        );
        let rows: Vec<DbTicket> = sqlx::query_as(&sql)
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
        let found: i64 = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM tickets WHERE vehicle_id = ? AND status = 'OPEN')"#,
        )
        .bind(vehicle_id.to_string())
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(found != 0)
    }

    async fn exists_open_ticket_for_slot(&mut self, slot: &str) -> Result<bool, RepoError> {
        let found: i64 = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM tickets WHERE slot = ? AND status = 'OPEN')"#,
        )
        .bind(slot)
        .fetch_one(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(found != 0)
    }

    async fn count_by_status(&mut self, status: TicketStatus) -> Result<i64, RepoError> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM tickets WHERE status = ?"#)
            .bind(status.as_str())
            .fetch_one(self.conn()?)
            .await
            .map_err(db_error)
    }

    async fn save_ticket(&mut self, ticket: Ticket) -> Result<Ticket, RepoError> {
        // Vehicle, slot and entry time are fixed once the ticket exists.
        sqlx::query(
            r#"INSERT INTO tickets (id, vehicle_id, slot, entry_at, exit_at, fee, status)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   exit_at = excluded.exit_at,
                   fee = excluded.fee,
                   status = excluded.status"#,
        )
        .bind(ticket.id.to_string())
        .bind(ticket.vehicle_id.to_string())
        .bind(&ticket.slot)
        .bind(format_timestamp(&ticket.entry_at))
        .bind(ticket.exit_at.as_ref().map(format_timestamp))
        .bind(ticket.fee.map(|fee| fee.to_string()))
        .bind(ticket.status.as_str())
        .execute(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(ticket)
    }
}

#[async_trait]
impl VehicleRepository for SqliteUnitOfWork {
    async fn find_vehicle_by_plate(&mut self, plate: &str) -> Result<Option<Vehicle>, RepoError> {
        let sql = format!("SELECT {} FROM vehicles WHERE plate = ?", VEHICLE_COLUMNS);
        let row: Option<DbVehicle> = sqlx::query_as(&sql)
            .bind(plate)
            .fetch_optional(self.conn()?)
            .await
            .map_err(db_error)?;

        row.map(DbVehicle::into_domain).transpose()
    }

    async fn save_vehicle(&mut self, vehicle: Vehicle) -> Result<Vehicle, RepoError> {
        sqlx::query(
            r#"INSERT INTO vehicles (id, plate, model, color, created_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   plate = excluded.plate,
                   model = excluded.model,
                   color = excluded.color"#,
        )
        .bind(vehicle.id.to_string())
        .bind(&vehicle.plate)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(format_timestamp(&vehicle.created_at))
        .execute(self.conn()?)
        .await
        .map_err(db_error)?;

        Ok(vehicle)
    }

    async fn upsert_vehicle(&mut self, vehicle: Vehicle) -> Result<Vehicle, RepoError> {
        sqlx::query(
            r#"INSERT INTO vehicles (id, plate, model, color, created_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(plate) DO NOTHING"#,
        )
        .bind(vehicle.id.to_string())
        .bind(&vehicle.plate)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(format_timestamp(&vehicle.created_at))
        .execute(self.conn()?)
        .await
        .map_err(db_error)?;

        self.find_vehicle_by_plate(&vehicle.plate)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Vehicle {} vanished", vehicle.plate)))
    }
}

#[async_trait]
impl ParkingUnitOfWork for SqliteUnitOfWork {
    async fn commit(&mut self) -> Result<(), RepoError> {
        match self.tx.take() {
            Some(tx) => tx.commit().await.map_err(tx_error),
            None => Err(RepoError::Transaction(
                "Unit of work already committed".into(),
            )),
        }
    }
}
