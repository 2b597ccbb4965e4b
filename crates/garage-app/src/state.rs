// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::Vehicle;

/// In-memory brand and fuel selections. An empty set places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub brands: BTreeSet<String>,
    pub fuels: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCommand {
    ToggleBrand { brand: String, selected: bool },
    ToggleFuel { fuel: String, selected: bool },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    BrandsChanged(BTreeSet<String>),
    FuelsChanged(BTreeSet<String>),
    Cleared,
}

impl FilterSelection {
    pub fn is_active(&self) -> bool {
        !self.brands.is_empty() || !self.fuels.is_empty()
    }

    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        (self.brands.is_empty() || self.brands.contains(&vehicle.brand))
            && (self.fuels.is_empty() || self.fuels.contains(&vehicle.fuel))
    }

    /// Applies a command; returns no events when nothing changed.
    pub fn dispatch(&mut self, command: FilterCommand) -> Vec<FilterEvent> {
        match command {
            FilterCommand::ToggleBrand { brand, selected } => {
                if toggle(&mut self.brands, brand, selected) {
                    vec![FilterEvent::BrandsChanged(self.brands.clone())]
                } else {
                    Vec::new()
                }
            }
            FilterCommand::ToggleFuel { fuel, selected } => {
                if toggle(&mut self.fuels, fuel, selected) {
                    vec![FilterEvent::FuelsChanged(self.fuels.clone())]
                } else {
                    Vec::new()
                }
            }
            FilterCommand::Clear => {
                if !self.is_active() {
                    return Vec::new();
                }
                self.brands.clear();
                self.fuels.clear();
                vec![FilterEvent::Cleared]
            }
        }
    }
}

fn toggle(set: &mut BTreeSet<String>, value: String, selected: bool) -> bool {
    if selected {
        set.insert(value)
    } else {
        set.remove(&value)
    }
}

/// Everything the home screen presents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeUiState {
    pub vehicles: Vec<Vehicle>,
    pub total_vehicles: usize,
    pub electric_count: usize,
    pub selected_brands: BTreeSet<String>,
    pub selected_fuels: BTreeSet<String>,
    pub is_filter_active: bool,
}

impl HomeUiState {
    /// Combines the latest list, counts and filters. The counts are passed
    /// through unfiltered; only the list is restricted.
    pub fn derive(
        vehicles: &[Vehicle],
        total_vehicles: usize,
        electric_count: usize,
        filters: &FilterSelection,
    ) -> Self {
        Self {
            vehicles: vehicles
                .iter()
                .filter(|vehicle| filters.matches(vehicle))
                .cloned()
                .collect(),
            total_vehicles,
            electric_count,
            selected_brands: filters.brands.clone(),
            selected_fuels: filters.fuels.clone(),
            is_filter_active: filters.is_active(),
        }
    }
}
