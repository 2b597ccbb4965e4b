// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::NewVehicle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleField {
    Brand,
    Model,
    FuelType,
    VehicleNumber,
    Year,
    OwnerName,
}

impl VehicleField {
    pub const ALL: [Self; 6] = [
        Self::Brand,
        Self::Model,
        Self::FuelType,
        Self::VehicleNumber,
        Self::Year,
        Self::OwnerName,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Model => "model",
            Self::FuelType => "fuel type",
            Self::VehicleNumber => "vehicle number",
            Self::Year => "year of purchase",
            Self::OwnerName => "owner name",
        }
    }

    const fn hint(self) -> &'static str {
        match self {
            Self::Brand => "choose a brand",
            Self::Model => "choose a model",
            Self::FuelType => "choose a fuel type",
            Self::VehicleNumber => "enter the registration number",
            Self::Year => "choose the year of purchase",
            Self::OwnerName => "enter the owner's full name",
        }
    }
}

/// Input accumulated for a new vehicle.
///
/// `is_valid` is recomputed after every update and is true only when all six
/// fields hold something other than whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleForm {
    brand: String,
    model: String,
    fuel_type: String,
    vehicle_number: String,
    year: String,
    owner_name: String,
    is_valid: bool,
}

impl VehicleForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: VehicleField) -> &str {
        match field {
            VehicleField::Brand => &self.brand,
            VehicleField::Model => &self.model,
            VehicleField::FuelType => &self.fuel_type,
            VehicleField::VehicleNumber => &self.vehicle_number,
            VehicleField::Year => &self.year,
            VehicleField::OwnerName => &self.owner_name,
        }
    }

    pub fn update(&mut self, field: VehicleField, value: impl Into<String>) {
        let value = value.into();
        match field {
            VehicleField::Brand => self.brand = value,
            VehicleField::Model => self.model = value,
            VehicleField::FuelType => self.fuel_type = value,
            VehicleField::VehicleNumber => self.vehicle_number = value,
            VehicleField::Year => self.year = value,
            VehicleField::OwnerName => self.owner_name = value,
        }
        self.is_valid = self.first_blank_field().is_none();
    }

    pub fn set_brand(&mut self, brand: impl Into<String>) {
        self.update(VehicleField::Brand, brand);
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.update(VehicleField::Model, model);
    }

    pub fn set_fuel_type(&mut self, fuel_type: impl Into<String>) {
        self.update(VehicleField::FuelType, fuel_type);
    }

    pub fn set_vehicle_number(&mut self, number: impl Into<String>) {
        self.update(VehicleField::VehicleNumber, number);
    }

    pub fn set_year(&mut self, year: impl Into<String>) {
        self.update(VehicleField::Year, year);
    }

    pub fn set_owner_name(&mut self, name: impl Into<String>) {
        self.update(VehicleField::OwnerName, name);
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(field) = self.first_blank_field() {
            bail!(
                "vehicle {} is required -- {} and retry",
                field.label(),
                field.hint()
            );
        }
        Ok(())
    }

    /// Builds the insert payload from the current field values as entered.
    pub fn to_new_vehicle(&self, purchase_timestamp: i64) -> NewVehicle {
        NewVehicle {
            model: self.model.clone(),
            brand: self.brand.clone(),
            number: self.vehicle_number.clone(),
            fuel: self.fuel_type.clone(),
            year: self.year.clone(),
            owner_name: self.owner_name.clone(),
            purchase_timestamp,
        }
    }

    fn first_blank_field(&self) -> Option<VehicleField> {
        VehicleField::ALL
            .into_iter()
            .find(|field| self.value(*field).trim().is_empty())
    }
}
