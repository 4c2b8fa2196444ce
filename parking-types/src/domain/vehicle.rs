//! Vehicle domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Unique identifier for a Vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(Uuid);

impl VehicleId {
    /// Creates a new random VehicleId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a VehicleId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VehicleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VehicleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A vehicle known to the parking lot.
///
/// The plate is the vehicle's identity: a later check-in with the same plate
/// reuses this record, keeping the model and color it was first stored with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier
    pub id: VehicleId,
    /// License plate (unique)
    pub plate: String,
    pub model: String,
    pub color: String,
    /// When the vehicle was first seen
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Creates a new vehicle with validation.
    ///
    /// Surrounding whitespace is stripped from every field.
    pub fn new(
        plate: impl Into<String>,
        model: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let plate = plate.into().trim().to_string();
        if plate.is_empty() {
            return Err(DomainError::ValidationError(
                "Plate cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: VehicleId::new(),
            plate,
            model: model.into().trim().to_string(),
            color: color.into().trim().to_string(),
            created_at: Utc::now(),
        })
    }

    /// Creates a vehicle with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: VehicleId,
        plate: String,
        model: String,
        color: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            plate,
            model,
            color,
            created_at,
        }
    }
}
