// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Choice lists offered by the add-vehicle form and the filter sheet.

pub const FORM_BRANDS: [&str; 8] = [
    "Honda",
    "Tata",
    "Hero",
    "Bajaj",
    "Yamaha",
    "TVS",
    "Suzuki",
    "Royal Enfield",
];

pub const FILTER_BRANDS: [&str; 9] = [
    "Honda",
    "Tata",
    "Hero",
    "Bajaj",
    "Yamaha",
    "TVS",
    "Suzuki",
    "Royal Enfield",
    "Other",
];

pub const FUEL_TYPES: [&str; 4] = ["Petrol", "Diesel", "Electric", "CNG"];

pub const MODELS: [&str; 7] = [
    "Activa 4G",
    "Activa 5G",
    "Activa 6G",
    "Activa 125",
    "Nexon XM",
    "Pulsar 150",
    "Jupiter",
];

pub const EARLIEST_PURCHASE_YEAR: i32 = 2000;

/// Purchase years from `current_year` back to [`EARLIEST_PURCHASE_YEAR`], newest first.
pub fn purchase_years(current_year: i32) -> Vec<String> {
    (EARLIEST_PURCHASE_YEAR..=current_year)
        .rev()
        .map(|year| year.to_string())
        .collect()
}
