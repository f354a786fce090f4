//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting dataset information in a human-readable format.

use tabled::{Table, Tabled};

use geoupload_core::DatasetInfo;
use geoupload_core::drivers::Driver;

/// Table row representation for displaying field information.
#[derive(Tabled)]
pub struct FieldRow {
    /// Name of the field.
    #[tabled(rename = "Field")]
    pub name: String,
    /// Data type of the field.
    #[tabled(rename = "Type")]
    pub data_type: String,
}

/// Table row representation for displaying driver information.
#[derive(Tabled)]
pub struct DriverRow {
    /// Short identifier for the driver (e.g., `KML`, `GML`).
    #[tabled(rename = "Short Name")]
    pub short_name: String,
    /// Full descriptive name of the driver format.
    #[tabled(rename = "Long Name")]
    pub long_name: String,
    /// Extensions selecting this driver.
    #[tabled(rename = "Extensions")]
    pub extensions: String,
    /// Support status for reading dataset metadata and information.
    #[tabled(rename = "Info")]
    pub info: String,
    /// Support status for reading data from this format.
    #[tabled(rename = "Read")]
    pub read: String,
    /// Support status for writing data to this format.
    #[tabled(rename = "Write")]
    pub write: String,
}

impl From<&Driver> for DriverRow {
    fn from(driver: &Driver) -> Self {
        Self {
            short_name: driver.short_name.to_string(),
            long_name: driver.long_name.to_string(),
            extensions: driver.extensions.join(", "),
            info: driver.capabilities.info.as_str().to_string(),
            read: driver.capabilities.read.as_str().to_string(),
            write: driver.capabilities.write.as_str().to_string(),
        }
    }
}

/// Display dataset information in a formatted table.
pub fn display_dataset_info(info: &DatasetInfo) {
    println!("\nDataset: {}", info.dataset);
    println!("Driver: {} ({})", info.driver, info.driver_long_name);
    println!("Layer: {}", info.type_name);
    println!("Files: {}", info.files.join(", "));
    println!(
        "CRS: {}",
        info.crs
            .map_or_else(|| "N/A".to_string(), |crs| crs.to_string())
    );
    println!("Feature Count: {}", info.feature_count);
    if !info.geometry_types.is_empty() {
        println!("Geometry: {}", info.geometry_types.join(", "));
    }
    if let Some(extent) = info.extent {
        println!(
            "Extent: ({}, {}) - ({}, {})",
            extent.min().x,
            extent.min().y,
            extent.max().x,
            extent.max().y
        );
    }

    if !info.fields.is_empty() {
        println!("\n=== Fields ===");

        let field_rows: Vec<FieldRow> = info
            .fields
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                data_type: f.data_type.clone(),
            })
            .collect();

        let field_table = Table::new(field_rows).to_string();
        println!("{field_table}");
    }
}

/// Display the driver registry as a table.
pub fn display_drivers(drivers: &[Driver]) {
    println!("\nAvailable Drivers ({} total):\n", drivers.len());

    let rows: Vec<DriverRow> = drivers.iter().map(DriverRow::from).collect();
    let table = Table::new(rows).to_string();
    println!("{table}");
}
