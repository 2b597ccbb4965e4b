// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use garage_app::NewVehicle;
use garage_app::catalog::{FORM_BRANDS, FUEL_TYPES, MODELS};
use std::path::PathBuf;
use time::{Date, Month, OffsetDateTime, Time};

const FIRST_NAMES: [&str; 16] = [
    "Aarav", "Diya", "Ishaan", "Meera", "Kabir", "Ananya", "Rohan", "Priya", "Vikram", "Sneha",
    "Arjun", "Kavya", "Nikhil", "Pooja", "Rahul", "Tara",
];
const LAST_NAMES: [&str; 14] = [
    "Sharma", "Iyer", "Reddy", "Patel", "Nair", "Gupta", "Rao", "Menon", "Singh", "Das",
    "Joshi", "Kulkarni", "Bose", "Verma",
];

const STATE_CODES: [&str; 12] = [
    "MH", "KA", "TN", "DL", "GJ", "KL", "TS", "AP", "RJ", "UP", "WB", "PB",
];

const REFERENCE_YEAR: i32 = 2026;
const EARLIEST_YEAR: i32 = 2000;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic generator of plausible vehicles for tests and demo mode.
#[derive(Debug, Clone)]
pub struct VehicleFaker {
    rng: DeterministicRng,
}

impl VehicleFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn vehicle(&mut self) -> NewVehicle {
        let fuel = self.pick(&FUEL_TYPES);
        self.vehicle_with_fuel(fuel)
    }

    pub fn vehicle_with_fuel(&mut self, fuel: &str) -> NewVehicle {
        let year = self.int_range_i32(EARLIEST_YEAR, REFERENCE_YEAR);
        NewVehicle {
            model: self.pick(&MODELS).to_owned(),
            brand: self.pick(&FORM_BRANDS).to_owned(),
            number: self.registration_number(),
            fuel: fuel.to_owned(),
            year: year.to_string(),
            owner_name: format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES)),
            purchase_timestamp: purchase_millis(year),
        }
    }

    pub fn fleet(&mut self, count: usize) -> Vec<NewVehicle> {
        (0..count).map(|_| self.vehicle()).collect()
    }

    fn registration_number(&mut self) -> String {
        let series: String = (0..2)
            .map(|_| char::from(b'A' + self.rng.int_n(26) as u8))
            .collect();
        format!(
            "{} {:02} {} {:04}",
            self.pick(&STATE_CODES),
            self.int_range_i32(1, 99),
            series,
            self.int_range_i32(1, 9999),
        )
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = i64::from(max) - i64::from(min) + 1;
        let offset = (self.rng.next_u64() % (span as u64)) as i64;
        (i64::from(min) + offset) as i32
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("garage.db");
    Ok((dir, db_path))
}

/// A fixed, fully-populated vehicle for assertions that need exact values.
pub fn sample_vehicle(brand: &str, fuel: &str) -> NewVehicle {
    NewVehicle {
        model: "Activa 6G".to_owned(),
        brand: brand.to_owned(),
        number: "MH 12 AB 1234".to_owned(),
        fuel: fuel.to_owned(),
        year: "2021".to_owned(),
        owner_name: "Asha Rao".to_owned(),
        purchase_timestamp: purchase_millis(2021),
    }
}

fn purchase_millis(year: i32) -> i64 {
    let Ok(date) = Date::from_calendar_date(year, Month::January, 1) else {
        return 0;
    };
    let noon = Time::from_hms(12, 0, 0).unwrap_or(Time::MIDNIGHT);
    let moment: OffsetDateTime = date.with_time(noon).assume_utc();
    moment.unix_timestamp() * 1_000
}
