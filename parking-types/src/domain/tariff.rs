//! Parking rates and the fee rule.
//!
//! All amounts are exact decimals. Every explicit rounding step keeps two
//! decimal places and rounds half-up, and the half-hour rate is rounded
//! before it is multiplied.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Stays of at least this many minutes are charged the daily rate.
pub const DAILY_RATE_THRESHOLD_MINUTES: i64 = 12 * 60;

/// Billing granularity below the daily threshold; partial units count as whole.
pub const BILLING_UNIT_MINUTES: i64 = 30;

/// Default hourly rate (8.00).
pub const DEFAULT_HOURLY_RATE: Decimal = Decimal::from_parts(800, 0, 0, false, 2);

/// Default daily rate (60.00).
pub const DEFAULT_DAILY_RATE: Decimal = Decimal::from_parts(6000, 0, 0, false, 2);

/// Default maximum number of simultaneously open tickets.
pub const DEFAULT_MAX_CAPACITY: u32 = 100;

/// Rounds to cents, half-up, always carrying exactly two decimal places.
fn to_cents(value: Decimal) -> Decimal {
    let mut cents = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(2);
    cents
}

/// The rates used to price a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tariff {
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
}

impl Tariff {
    /// Creates a tariff, rejecting negative rates.
    pub fn new(hourly_rate: Decimal, daily_rate: Decimal) -> Result<Self, DomainError> {
        if hourly_rate < Decimal::ZERO || daily_rate < Decimal::ZERO {
            return Err(DomainError::NegativeAmount);
        }
        Ok(Self {
            hourly_rate,
            daily_rate,
        })
    }

    /// Returns a copy of this tariff with a different hourly rate.
    pub fn with_hourly_rate(self, hourly_rate: Decimal) -> Result<Self, DomainError> {
        Self::new(hourly_rate, self.daily_rate)
    }

    /// Price of one half-hour billing unit.
    pub fn half_hour_rate(&self) -> Decimal {
        to_cents(self.hourly_rate / Decimal::TWO)
    }

    /// Fee for a stay of `minutes` whole minutes.
    pub fn fee_for_minutes(&self, minutes: i64) -> Result<Decimal, DomainError> {
        if minutes < 0 {
            return Err(DomainError::ValidationError(format!(
                "Elapsed time cannot be negative: {} minutes",
                minutes
            )));
        }

        if minutes >= DAILY_RATE_THRESHOLD_MINUTES {
            return Ok(to_cents(self.daily_rate));
        }

        let units = (minutes + BILLING_UNIT_MINUTES - 1) / BILLING_UNIT_MINUTES;
        self.half_hour_rate()
            .checked_mul(Decimal::from(units))
            .map(to_cents)
            .ok_or(DomainError::AmountOverflow)
    }

    /// Fee for a stay from `entry` to `exit`.
    ///
    /// Elapsed time is counted in whole minutes; leftover seconds are not billed.
    pub fn compute_fee(
        &self,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    ) -> Result<Decimal, DomainError> {
        if exit < entry {
            return Err(DomainError::InvalidInterval { entry, exit });
        }
        self.fee_for_minutes((exit - entry).num_minutes())
    }
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            hourly_rate: DEFAULT_HOURLY_RATE,
            daily_rate: DEFAULT_DAILY_RATE,
        }
    }
}

/// Runtime configuration of the parking lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingConfig {
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    /// Maximum number of simultaneously open tickets
    pub max_capacity: u32,
}

impl ParkingConfig {
    /// Checks the configured values and returns the tariff they describe.
    pub fn tariff(&self) -> Result<Tariff, DomainError> {
        Tariff::new(self.hourly_rate, self.daily_rate)
    }
}

impl Default for ParkingConfig {
    fn default() -> Self {
        Self {
            hourly_rate: DEFAULT_HOURLY_RATE,
            daily_rate: DEFAULT_DAILY_RATE,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_fee_overflow_is_an_error() {
        let tariff = Tariff::new(Decimal::MAX, dec!(60.00)).unwrap();

        assert!(matches!(
            tariff.fee_for_minutes(719),
            Err(DomainError::AmountOverflow)
        ));
        // The daily rate path never multiplies
        assert_eq!(tariff.fee_for_minutes(720).unwrap(), dec!(60.00));
    }

    #[test]
    fn test_defaults() {
        let config = ParkingConfig::default();
        assert_eq!(config.hourly_rate, dec!(8.00));
        assert_eq!(config.daily_rate, dec!(60.00));
        assert_eq!(config.max_capacity, 100);
        assert_eq!(config.tariff().unwrap(), Tariff::default());
    }

    #[test]
    fn test_thirty_one_minutes_is_two_units() {
        let fee = Tariff::default().compute_fee(at(10, 0), at(10, 31)).unwrap();
        assert_eq!(fee, dec!(8.00));
    }

    #[test]
    fn test_long_stay_charges_daily_rate() {
        let fee = Tariff::default().compute_fee(at(8, 0), at(20, 5)).unwrap();
        assert_eq!(fee, dec!(60.00));
    }

    #[test]
    fn test_unit_boundaries() {
        let tariff = Tariff::default();
        assert_eq!(tariff.fee_for_minutes(0).unwrap(), dec!(0.00));
        assert_eq!(tariff.fee_for_minutes(1).unwrap(), dec!(4.00));
        assert_eq!(tariff.fee_for_minutes(30).unwrap(), dec!(4.00));
        assert_eq!(tariff.fee_for_minutes(31).unwrap(), dec!(8.00));
        assert_eq!(tariff.fee_for_minutes(60).unwrap(), dec!(8.00));
    }

    #[test]
    fn test_daily_threshold_is_inclusive() {
        let tariff = Tariff::default();
        // 24 half-hour units at 4.00 is above the daily rate; the rule still
        // only switches at the threshold.
        assert_eq!(tariff.fee_for_minutes(719).unwrap(), dec!(96.00));
        assert_eq!(tariff.fee_for_minutes(720).unwrap(), dec!(60.00));
        assert_eq!(tariff.fee_for_minutes(3000).unwrap(), dec!(60.00));
    }

    #[test]
    fn test_below_threshold_matches_unit_formula() {
        let tariff = Tariff::new(dec!(10.00), dec!(75.00)).unwrap();
        for minutes in 0..DAILY_RATE_THRESHOLD_MINUTES {
            let units = Decimal::from((minutes + 29) / 30);
            assert_eq!(tariff.fee_for_minutes(minutes).unwrap(), units * dec!(5.00));
        }
    }

    #[test]
    fn test_leftover_seconds_are_not_billed() {
        let entry = at(10, 0);
        let exit = entry + Duration::seconds(30 * 60 + 59);
        let fee = Tariff::default().compute_fee(entry, exit).unwrap();
        assert_eq!(fee, dec!(4.00));
    }

    #[test]
    fn test_half_hour_rate_is_rounded_before_multiplying() {
        let tariff = Tariff::new(dec!(8.01), dec!(60.00)).unwrap();
        assert_eq!(tariff.half_hour_rate(), dec!(4.01));
        // 4.005 * 3 would round to 12.02
        assert_eq!(tariff.fee_for_minutes(90).unwrap(), dec!(12.03));
    }

    #[test]
    fn test_daily_rate_rounded_half_up() {
        let tariff = Tariff::new(dec!(8.00), dec!(59.995)).unwrap();
        assert_eq!(tariff.fee_for_minutes(720).unwrap(), dec!(60.00));
    }

    #[test]
    fn test_exit_before_entry_fails() {
        let result = Tariff::default().compute_fee(at(10, 0), at(9, 59));
        assert!(matches!(result, Err(DomainError::InvalidInterval { .. })));
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(
            Tariff::new(dec!(-1), dec!(60)),
            Err(DomainError::NegativeAmount)
        ));
        assert!(Tariff::default().with_hourly_rate(dec!(-0.01)).is_err());
    }

    #[test]
    fn test_hourly_override_keeps_daily_rate() {
        let tariff = Tariff::default().with_hourly_rate(dec!(12.00)).unwrap();
        assert_eq!(tariff.daily_rate, dec!(60.00));
        assert_eq!(tariff.fee_for_minutes(45).unwrap(), dec!(12.00));
    }
}
