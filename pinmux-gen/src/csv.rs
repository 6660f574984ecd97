//! Tabular preprocessor.
//!
//! The input is a sequence of comma-separated rows with no fixed header: a
//! `Key` row describes which columns carry which role, `Device` rows declare
//! the device variants, and the remaining rows carry pin, peripheral, and DMA
//! information. This module splits and trims the rows, discovers the column
//! layout, registers the devices, and hands the rows to the model builder in
//! a deterministic order.

use anyhow::{ensure, Result};
use pinmux_model::{natural_cmp, DeviceModel};
use std::cmp::Ordering;

/// Column roles discovered from the `Key` row.
///
/// Roles are positional indices once resolved; columns not named in the key
/// row keep these defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Column carrying the pin name.
    pub pin_index: usize,
    /// Column carrying the reset function.
    pub reset_index: usize,
    /// Column carrying the default function.
    pub default_index: usize,
    /// First multiplexer function column (`ALT0`).
    pub alt_start: usize,
    /// Last multiplexer function column.
    pub alt_end: usize,
    /// Package columns: (package name, column index).
    pub packages: Vec<(String, usize)>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout {
            pin_index: 1,
            reset_index: 3,
            default_index: 4,
            alt_start: 5,
            alt_end: 5 + 7,
            packages: Vec::new(),
        }
    }
}

impl ColumnLayout {
    /// Assigns column roles by scanning every cell of a `Key` row.
    pub fn from_key_row(cells: &[String]) -> Self {
        let mut layout = ColumnLayout::default();
        for (column, cell) in cells.iter().enumerate() {
            if cell.eq_ignore_ascii_case("Pin") {
                layout.pin_index = column;
            }
            if let Some(name) = cell
                .strip_prefix("Pkg")
                .or_else(|| cell.strip_prefix("pkg"))
            {
                layout.packages.push((name.trim().to_string(), column));
            }
            if cell.eq_ignore_ascii_case("Reset") {
                layout.reset_index = column;
            }
            if cell.eq_ignore_ascii_case("Default") {
                layout.default_index = column;
            }
            if cell.eq_ignore_ascii_case("ALT0") {
                layout.alt_start = column;
                layout.alt_end = column;
            }
            if cell.to_ascii_uppercase().starts_with("ALT") && layout.alt_end < column {
                layout.alt_end = column;
            }
        }
        layout
    }
}

/// The preprocessed table: trimmed rows in deterministic order plus the
/// column layout.
#[derive(Debug)]
pub struct Grid {
    /// All rows, cell-trimmed, stably sorted by the name in column 1.
    pub rows: Vec<Vec<String>>,
    /// Discovered column roles.
    pub layout: ColumnLayout,
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',').map(|cell| cell.trim().to_string()).collect()
}

/// Compares rows by the pin/port name in column 1, treating digit runs as
/// numbers; rows too short to have one sort first.
fn row_order(a: &[String], b: &[String]) -> Ordering {
    match (a.get(1), b.get(1)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => natural_cmp(a, b),
    }
}

/// Scans the raw rows for the `Key` row and the `Device` rows, registering
/// devices (and their packages) on the model.
///
/// At least one `Device` row and at least one package column are required;
/// their absence is a configuration error caught before any pin parsing.
pub fn preliminary_scan(input: &str, model: &mut DeviceModel) -> Result<ColumnLayout> {
    let mut layout = ColumnLayout::default();
    for line in input.lines() {
        let cells = split_row(line);
        let Some(first) = cells.first() else {
            continue;
        };
        if first.eq_ignore_ascii_case("Key") {
            layout = ColumnLayout::from_key_row(&cells);
        }
        if first.eq_ignore_ascii_case("Device") {
            ensure!(cells.len() >= 4, "Illegal Device line: {line}");
            model.create_device(&cells[1], &cells[2], &cells[3]);
        }
    }
    ensure!(!layout.packages.is_empty(), "No packages provided");
    ensure!(!model.devices().is_empty(), "No devices found in file");
    Ok(layout)
}

/// Splits, trims, and reorders the data rows.
///
/// The stable sort keyed on column 1 makes processing order independent of
/// the input row order and groups same-port pins contiguously.
pub fn preprocess(input: &str, layout: ColumnLayout) -> Grid {
    let mut rows: Vec<Vec<String>> = input.lines().map(split_row).collect();
    rows.sort_by(|a, b| row_order(a, b));
    Grid { rows, layout }
}

#[cfg(test)]
mod tests {
    use super::{preliminary_scan, preprocess, ColumnLayout};
    use pinmux_model::DeviceModel;

    fn cells(row: &[&str]) -> Vec<String> {
        row.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn key_row_assigns_column_roles() {
        let layout = ColumnLayout::from_key_row(&cells(&[
            "x", "Pin", "Reset", "Default", "ALT0", "ALT1", "ALT2",
        ]));
        assert_eq!(layout.pin_index, 1);
        assert_eq!(layout.reset_index, 2);
        assert_eq!(layout.default_index, 3);
        assert_eq!(layout.alt_start, 4);
        assert_eq!(layout.alt_end, 6);
    }

    #[test]
    fn package_columns_are_recognized() {
        let layout =
            ColumnLayout::from_key_row(&cells(&["Key", "Pin", "PkgLQFP64", "pkg BGA121"]));
        assert_eq!(
            layout.packages,
            vec![("LQFP64".to_string(), 2), ("BGA121".to_string(), 3)]
        );
    }

    #[test]
    fn missing_roles_keep_defaults() {
        let layout = ColumnLayout::from_key_row(&cells(&["Key", "PkgX"]));
        assert_eq!(layout.pin_index, 1);
        assert_eq!(layout.reset_index, 3);
        assert_eq!(layout.default_index, 4);
        assert_eq!(layout.alt_start, 5);
        assert_eq!(layout.alt_end, 12);
    }

    #[test]
    fn rows_sort_naturally_by_pin_name() {
        let grid = preprocess(
            "Pin,PTA10\nPin,PTA2\nKey,Pin\n",
            ColumnLayout::default(),
        );
        let names: Vec<&str> = grid.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(names, ["PTA2", "PTA10", "Pin"]);
    }

    #[test]
    fn preliminary_scan_requires_devices_and_packages() {
        let mut model = DeviceModel::new("X", "X.csv");
        assert!(preliminary_scan("Key,Pin,PkgLQFP64\n", &mut model).is_err());

        let mut model = DeviceModel::new("X", "X.csv");
        let layout = preliminary_scan(
            "Key,Pin,PkgLQFP64\nDevice,MK20DX128M5,K20P64M50SF0RM,LQFP64\n",
            &mut model,
        )
        .unwrap();
        assert_eq!(layout.packages.len(), 1);
        assert!(model.package("LQFP64").is_some());
    }
}
