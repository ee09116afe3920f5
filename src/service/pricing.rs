//! Amount and schedule resolution for new bookings.
//!
//! Two request shapes reach the booking endpoint. The direct shape carries a
//! client computed `totalAmount` which is stored as given. The legacy shape is
//! priced here from the catalog entry's base price, the plan type, the
//! duration and any selected factor surcharges.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::model::order::{PlanType, SelectedFactor};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PricingError {
    #[error("Service has no base price")]
    MissingBasePrice,
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingShape {
    Direct {
        total_amount: f64,
        preferred_date: Option<String>,
        preferred_time: Option<String>,
    },
    Legacy {
        plan_type: PlanType,
        duration_minutes: u32,
        selected_factors: Vec<SelectedFactor>,
        scheduled_date: Option<String>,
        scheduled_time: Option<String>,
    },
}

/// Amount, in major currency units, the customer is charged.
pub fn resolve_amount(shape: &BookingShape, base_price: Option<f64>) -> Result<f64, PricingError> {
    match shape {
        BookingShape::Direct { total_amount, .. } => {
            if !total_amount.is_finite() || *total_amount < 0.0 {
                return Err(PricingError::InvalidAmount(*total_amount));
            }
            Ok(*total_amount)
        }
        BookingShape::Legacy { plan_type, duration_minutes, selected_factors, .. } => {
            let base = base_price.ok_or(PricingError::MissingBasePrice)?;
            let mut amount = match plan_type {
                PlanType::Hourly => base * billable_hours(*duration_minutes),
                _ => base,
            };
            // Surcharges are flat, never scaled by hours.
            amount += selected_factors
                .iter()
                .map(|f| f.additional_cost.unwrap_or(0.0))
                .sum::<f64>();
            Ok(amount)
        }
    }
}

fn billable_hours(duration_minutes: u32) -> f64 {
    (f64::from(duration_minutes) / 60.0).ceil()
}

/// Scheduled instant plus the display time string stored with the order.
pub fn resolve_schedule(shape: &BookingShape) -> Result<(DateTime<Utc>, String), PricingError> {
    match shape {
        BookingShape::Direct { preferred_date, preferred_time, .. } => {
            let date = required(preferred_date, "preferredDate")?;
            let time = required(preferred_time, "preferredTime")?;
            let combined = format!("{}T{}", date, time);
            let instant = parse_local_datetime(&combined)
                .ok_or_else(|| PricingError::InvalidSchedule(format!("Unrecognised date/time: {}", combined)))?;
            Ok((instant, time.to_string()))
        }
        BookingShape::Legacy { scheduled_date, scheduled_time, .. } => {
            let date = required(scheduled_date, "scheduledDate")?;
            let instant = parse_instant(date)
                .ok_or_else(|| PricingError::InvalidSchedule(format!("Unrecognised date: {}", date)))?;
            Ok((instant, scheduled_time.clone().unwrap_or_default()))
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, PricingError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PricingError::InvalidSchedule(format!("{} is required", field)))
}

/// Wall-clock date and time without offset, read as UTC.
fn parse_local_datetime(raw: &str) -> Option<DateTime<Utc>> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_local_datetime(raw) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Canonical pricing line amount. Older documents carry the figure under
/// `price`, `baseRate` or `basePrice`; the first one present wins.
pub fn canonical_price(price: Option<f64>, base_rate: Option<f64>, base_price: Option<f64>) -> Option<f64> {
    price.or(base_rate).or(base_price)
}

/// Gateway amounts are integral minor units (paise).
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn format_order_number(epoch_millis: i64, sequence: i64) -> String {
    format!("WOS{}{}", epoch_millis, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn legacy(plan_type: PlanType, duration: u32, costs: &[Option<f64>]) -> BookingShape {
        BookingShape::Legacy {
            plan_type,
            duration_minutes: duration,
            selected_factors: costs
                .iter()
                .map(|c| SelectedFactor {
                    factor_name: "bhk".to_string(),
                    selected_option: "2bhk".to_string(),
                    additional_cost: *c,
                })
                .collect(),
            scheduled_date: Some("2025-03-01".to_string()),
            scheduled_time: Some("10:00 AM".to_string()),
        }
    }

    #[test]
    fn test_hourly_rounds_duration_up() {
        let shape = legacy(PlanType::Hourly, 150, &[Some(50.0)]);
        assert_eq!(resolve_amount(&shape, Some(200.0)), Ok(650.0));
    }

    #[test]
    fn test_factors_are_not_multiplied_by_hours() {
        let shape = legacy(PlanType::Hourly, 120, &[Some(30.0), None, Some(20.0)]);
        assert_eq!(resolve_amount(&shape, Some(100.0)), Ok(250.0));
    }

    #[test]
    fn test_fixed_plan_ignores_duration() {
        let shape = legacy(PlanType::Fixed, 600, &[]);
        assert_eq!(resolve_amount(&shape, Some(499.0)), Ok(499.0));
    }

    #[test]
    fn test_legacy_without_base_price() {
        let shape = legacy(PlanType::Fixed, 60, &[]);
        assert_eq!(resolve_amount(&shape, None), Err(PricingError::MissingBasePrice));
    }

    #[test]
    fn test_direct_amount_is_taken_verbatim() {
        let shape = BookingShape::Direct {
            total_amount: 949.0,
            preferred_date: Some("2025-03-01".to_string()),
            preferred_time: Some("09:30".to_string()),
        };
        assert_eq!(resolve_amount(&shape, Some(1.0)), Ok(949.0));
        let (at, time) = resolve_schedule(&shape).unwrap();
        assert_eq!((at.year(), at.month(), at.day()), (2025, 3, 1));
        assert_eq!((at.hour(), at.minute()), (9, 30));
        assert_eq!(time, "09:30");
    }

    #[test]
    fn test_direct_negative_amount_rejected() {
        let shape = BookingShape::Direct {
            total_amount: -1.0,
            preferred_date: None,
            preferred_time: None,
        };
        assert_eq!(resolve_amount(&shape, None), Err(PricingError::InvalidAmount(-1.0)));
    }

    #[test]
    fn test_direct_schedule_requires_both_parts() {
        let shape = BookingShape::Direct {
            total_amount: 10.0,
            preferred_date: Some("2025-03-01".to_string()),
            preferred_time: None,
        };
        assert!(matches!(resolve_schedule(&shape), Err(PricingError::InvalidSchedule(_))));
    }

    #[test]
    fn test_legacy_schedule_keeps_time_string() {
        let shape = legacy(PlanType::Fixed, 60, &[]);
        let (at, time) = resolve_schedule(&shape).unwrap();
        assert_eq!((at.year(), at.month(), at.day()), (2025, 3, 1));
        assert_eq!(time, "10:00 AM");
    }

    #[test]
    fn test_legacy_schedule_accepts_rfc3339() {
        let mut shape = legacy(PlanType::Fixed, 60, &[]);
        if let BookingShape::Legacy { scheduled_date, .. } = &mut shape {
            *scheduled_date = Some("2025-03-01T04:30:00.000Z".to_string());
        }
        let (at, _) = resolve_schedule(&shape).unwrap();
        assert_eq!((at.hour(), at.minute()), (4, 30));
    }

    #[test]
    fn test_canonical_price_precedence() {
        assert_eq!(canonical_price(Some(1.0), Some(2.0), Some(3.0)), Some(1.0));
        assert_eq!(canonical_price(None, Some(2.0), Some(3.0)), Some(2.0));
        assert_eq!(canonical_price(None, None, Some(3.0)), Some(3.0));
        assert_eq!(canonical_price(None, None, None), None);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(949.0), 94900);
        assert_eq!(to_minor_units(19.99), 1999);
    }

    #[test]
    fn test_order_number_format() {
        assert_eq!(format_order_number(1700000000000, 42), "WOS170000000000042");
    }
}
