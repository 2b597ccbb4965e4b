// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::*;

/// Fuel value counted by the electric-vehicle tally. Matched exactly.
pub const ELECTRIC_FUEL: &str = "Electric";

/// Placeholder shown when a purchase year cannot be parsed.
pub const YEARS_OWNED_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub model: String,
    pub brand: String,
    pub number: String,
    pub fuel: String,
    pub year: String,
    pub owner_name: String,
    pub purchase_timestamp: i64,
}

impl Vehicle {
    pub fn is_electric(&self) -> bool {
        self.fuel == ELECTRIC_FUEL
    }

    pub fn years_owned(&self, current_year: i32) -> String {
        years_owned_text(&self.year, current_year)
    }
}

/// Insert payload; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVehicle {
    pub model: String,
    pub brand: String,
    pub number: String,
    pub fuel: String,
    pub year: String,
    pub owner_name: String,
    pub purchase_timestamp: i64,
}

impl NewVehicle {
    pub fn with_id(self, id: VehicleId) -> Vehicle {
        Vehicle {
            id,
            model: self.model,
            brand: self.brand,
            number: self.number,
            fuel: self.fuel,
            year: self.year,
            owner_name: self.owner_name,
            purchase_timestamp: self.purchase_timestamp,
        }
    }
}

/// Display text for how long a vehicle has been owned.
///
/// A purchase year at or after `current_year` reads as "New"; anything that is
/// not an integer reads as [`YEARS_OWNED_PLACEHOLDER`].
pub fn years_owned_text(year: &str, current_year: i32) -> String {
    let Ok(year) = year.parse::<i64>() else {
        return YEARS_OWNED_PLACEHOLDER.to_owned();
    };
    let diff = i64::from(current_year) - year;
    if diff <= 0 {
        "New".to_owned()
    } else {
        format!("{diff} years")
    }
}

pub fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{NewVehicle, YEARS_OWNED_PLACEHOLDER, now_millis, years_owned_text};
    use crate::VehicleId;

    #[test]
    fn years_owned_counts_whole_years() {
        assert_eq!(years_owned_text("2020", 2025), "5 years");
        assert_eq!(years_owned_text("2024", 2025), "1 years");
    }

    #[test]
    fn years_owned_is_new_for_current_or_future_year() {
        assert_eq!(years_owned_text("2025", 2025), "New");
        assert_eq!(years_owned_text("2030", 2025), "New");
    }

    #[test]
    fn years_owned_falls_back_to_placeholder() {
        assert_eq!(years_owned_text("abcd", 2025), YEARS_OWNED_PLACEHOLDER);
        assert_eq!(years_owned_text("", 2025), YEARS_OWNED_PLACEHOLDER);
        assert_eq!(years_owned_text("20.5", 2025), YEARS_OWNED_PLACEHOLDER);
    }

    #[test]
    fn with_id_keeps_every_field() {
        let vehicle = NewVehicle {
            model: "Activa 6G".to_owned(),
            brand: "Honda".to_owned(),
            number: "MH 12 AB 1234".to_owned(),
            fuel: "Petrol".to_owned(),
            year: "2021".to_owned(),
            owner_name: "Asha Rao".to_owned(),
            purchase_timestamp: 1_700_000_000_000,
        }
        .with_id(VehicleId::new(7));

        assert_eq!(vehicle.id.get(), 7);
        assert_eq!(vehicle.brand, "Honda");
        assert_eq!(vehicle.purchase_timestamp, 1_700_000_000_000);
        assert!(!vehicle.is_electric());
    }

    #[test]
    fn now_millis_is_after_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }
}
