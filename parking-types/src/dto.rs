//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Ticket DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to check a vehicle into the lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// License plate; identifies the vehicle
    pub plate: String,
    /// Only used when the plate has never been seen before
    #[serde(default)]
    pub model: String,
    /// Only used when the plate has never been seen before
    #[serde(default)]
    pub color: String,
    /// Parking space to occupy
    pub slot: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Fee DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// A priced stay, without touching any ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeQuote {
    pub entry: DateTime<Utc>,
    pub exit: DateTime<Utc>,
    /// Whole minutes between entry and exit
    pub elapsed_minutes: i64,
    pub fee: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_request_defaults_descriptive_fields() {
        let req: CheckInRequest =
            serde_json::from_str(r#"{"plate": "ABC1D23", "slot": "B-07"}"#).unwrap();
        assert_eq!(req.plate, "ABC1D23");
        assert_eq!(req.slot, "B-07");
        assert!(req.model.is_empty());
        assert!(req.color.is_empty());
    }
}
