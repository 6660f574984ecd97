//! Model builder.
//!
//! Consumes the preprocessed grid in three named passes: all pin rows first
//! (building the complete pin/function graph), then all peripheral metadata
//! rows, then all DMA rows. The later passes assume the function graph is
//! complete, so the pass order is a hard precondition, not a convenience.

use anyhow::{bail, ensure, Context, Result};
use pinmux_model::{DeviceModel, FamilyKind, FunctionId, MuxSelection};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::csv::{self, Grid};
use crate::writers;

/// Builds and validates the model for one family file.
pub fn process_file(path: &Path) -> Result<DeviceModel> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let device_name = source_name.trim_end_matches(".csv").to_string();
    tracing::info!("Processing {}", path.display());
    process_str(&input, &device_name, &source_name)
        .with_context(|| format!("Failed to process {}", path.display()))
}

/// Builds and validates the model from already-loaded input.
pub fn process_str(input: &str, device_name: &str, source_name: &str) -> Result<DeviceModel> {
    let mut model = DeviceModel::new(device_name, source_name);

    let layout = csv::preliminary_scan(input, &mut model)?;
    let grid = csv::preprocess(input, layout);

    parse_pin_rows(&grid, &mut model)?;
    parse_peripheral_rows(&grid, &mut model)?;
    parse_dma_rows(&grid, &mut model)?;

    model.check_consistency()?;
    Ok(model)
}

/// Resolves a cell's functions, entering newly created ones into their
/// family's signal table.
fn resolve_cell(model: &mut DeviceModel, text: &str) -> Result<Vec<FunctionId>> {
    let resolved = model.resolve_functions(text, true)?;
    let mut ids = Vec::with_capacity(resolved.len());
    for (id, created) in resolved {
        if created {
            if let Some(template_id) = model.function(id).template() {
                let template = model.template(template_id);
                if template.family() == FamilyKind::Misc {
                    tracing::warn!(
                        "Signal {} only matched a fallback recognizer",
                        model.function(id).name()
                    );
                }
                if template.has_pattern() {
                    let kind = template.family();
                    let index = writers::writer_for(kind)
                        .signal_index(model.function(id))
                        .with_context(|| {
                            format!(
                                "Function {} does not fit family {}",
                                model.function(id).name(),
                                template.base_name()
                            )
                        })?;
                    model.assign_signal_slot(template_id, index, id)?;
                }
            }
        }
        ids.push(id);
    }
    Ok(ids)
}

fn parse_pin_rows(grid: &Grid, model: &mut DeviceModel) -> Result<()> {
    for row in &grid.rows {
        if row.len() < 2 || row[0] != "Pin" {
            continue;
        }
        parse_pin_row(grid, model, row)
            .with_context(|| format!("Exception @line {}", row[1]))?;
    }
    Ok(())
}

fn parse_pin_row(grid: &Grid, model: &mut DeviceModel, row: &[String]) -> Result<()> {
    let layout = &grid.layout;
    let cell = row
        .get(layout.pin_index)
        .map(String::as_str)
        .unwrap_or_default();
    ensure!(!cell.is_empty(), "No pin name");
    // The first name on the pin is the pin name: PTC4/LLWU_P8 => PTC4.
    let pin_name = cell.split('/').next().unwrap_or(cell).to_string();

    model.create_pin(&pin_name)?;

    let mut pin_is_mapped = false;
    for column in layout.alt_start..=layout.alt_end {
        let Some(cell) = row.get(column) else {
            break;
        };
        if cell.is_empty() {
            // A pin need not be bonded to anything at a given mux setting.
            continue;
        }
        let functions = resolve_cell(model, cell)?;
        if !functions.is_empty() {
            let mux = MuxSelection::Mux((column - layout.alt_start) as u8);
            model.add_mapping(&pin_name, mux, functions)?;
            pin_is_mapped = true;
        }
    }

    let reset_cell = row
        .get(layout.reset_index)
        .map(String::as_str)
        .unwrap_or_default();
    if !reset_cell.is_empty() {
        let functions = resolve_cell(model, reset_cell)?;
        // A pin never mapped through the ALT columns is not multiplexed at
        // all; its sole function is fixed rather than a reset selection.
        let mux = if pin_is_mapped {
            MuxSelection::Reset
        } else {
            MuxSelection::Fixed
        };
        model.add_mapping(&pin_name, mux, functions)?;
        model.set_pin_reset(&pin_name, mux)?;
    } else {
        model.add_mapping(&pin_name, MuxSelection::Reset, vec![FunctionId::DISABLED])?;
        model.set_pin_reset(&pin_name, MuxSelection::Reset)?;
    }

    if let Some(cell) = row.get(layout.default_index) {
        if !cell.is_empty() {
            let default_list = DeviceModel::normalize_name(cell);
            model.set_pin_default(&pin_name, &default_list)?;
        }
    }

    for (package, column) in &layout.packages {
        let cell = row.get(*column).map(String::as_str).unwrap_or_default();
        let location = if cell.is_empty() { &pin_name } else { cell };
        if location == "*" {
            // Explicitly absent from this package.
            continue;
        }
        model.add_placement(package, &pin_name, location)?;
    }
    Ok(())
}

fn clock_reg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^SIM->(SCGC\d?)$").unwrap())
}

fn parse_peripheral_rows(grid: &Grid, model: &mut DeviceModel) -> Result<()> {
    for row in &grid.rows {
        if row.len() < 2 || row[0] != "Peripheral" {
            continue;
        }
        ensure!(row.len() >= 3, "Illegal peripheral clock line");
        let name = &row[1];
        let clock_reg = &row[2];

        let clock_mask = match row.get(3) {
            Some(mask) if !mask.is_empty() => mask.clone(),
            _ => format!("{}_{}_MASK", clock_reg.replace("->", "_"), name),
        };

        let Some(captures) = clock_reg_pattern().captures(clock_reg) else {
            bail!("Unexpected peripheral clock register {clock_reg} for {name}");
        };
        let clock_reg = &captures[1];
        ensure!(
            clock_mask.contains(clock_reg),
            "Clock mask {clock_mask} doesn't match clock register {clock_reg}"
        );

        // Up to ten IRQ numbers follow the mask column.
        let irqs: Vec<String> = row
            .iter()
            .skip(4)
            .take(10)
            .filter(|cell| !cell.is_empty())
            .cloned()
            .collect();

        model.set_peripheral_clock(name, clock_reg, &clock_mask);
        model.set_template_clock_info(name, clock_reg, &clock_mask, &irqs);
    }
    Ok(())
}

fn parse_dma_rows(grid: &Grid, model: &mut DeviceModel) -> Result<()> {
    for row in &grid.rows {
        if row.len() < 2 || row[0] != "DmaMux" {
            continue;
        }
        ensure!(row.len() >= 4, "Illegal DmaMux mapping line");
        let instance: u32 = row[1]
            .parse()
            .with_context(|| format!("Bad DmaMux instance '{}'", row[1]))?;
        let channel: u32 = row[2]
            .parse()
            .with_context(|| format!("Bad DmaMux channel '{}'", row[2]))?;
        model.add_dma_entry(instance, channel, &row[3]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::process_str;
    use pinmux_model::MuxSelection;

    const MINIMAL: &str = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
Pin,PTA0,,,UART0_RX,GPIOA_0,UART0_RX,N12
Peripheral,UART0,SIM->SCGC4,,UART0_RX_IRQ
";

    #[test]
    fn minimal_round_trip() {
        let model = process_str(MINIMAL, "MKxx", "MKxx.csv").unwrap();

        let pin = model.pin("PTA0").unwrap();
        let mux0 = pin.mapping(MuxSelection::Mux(0)).unwrap();
        assert_eq!(model.function_list(mux0), "GPIOA_0");
        let mux1 = pin.mapping(MuxSelection::Mux(1)).unwrap();
        assert_eq!(model.function_list(mux1), "UART0_RX");
        assert_eq!(pin.default_mux(), Some(MuxSelection::Mux(1)));

        // No reset cell: the disabled sentinel fills the reset mapping.
        assert_eq!(pin.reset_mux(), Some(MuxSelection::Reset));
        let reset = pin.mapping(MuxSelection::Reset).unwrap();
        assert_eq!(model.function_list(reset), "Disabled");

        let uart = model
            .templates()
            .iter()
            .find(|t| t.peripheral_name() == "UART0")
            .unwrap();
        assert_eq!(uart.clock_reg(), Some("SCGC4"));
        assert_eq!(uart.clock_mask(), Some("SIM_SCGC4_UART0_MASK"));
        assert_eq!(uart.irq_nums(), ["UART0_RX_IRQ"]);

        assert_eq!(
            model.package("Pkg64").unwrap().location("PTA0"),
            Some("N12")
        );
    }

    #[test]
    fn reset_only_pins_become_fixed() {
        let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
Pin,ADC0_DP0,,ADC0_DP0,,,,
";
        let model = process_str(input, "MKxx", "MKxx.csv").unwrap();
        let pin = model.pin("ADC0_DP0").unwrap();
        assert_eq!(pin.reset_mux(), Some(MuxSelection::Fixed));
        assert!(pin.mapping(MuxSelection::Fixed).is_some());
        // No default declared: default falls back to the reset selection.
        assert_eq!(pin.default_or_reset(), MuxSelection::Fixed);
    }

    #[test]
    fn reset_cell_with_alt_mappings_stays_reset() {
        let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
Pin,PTA4,,PTA4,,PTA4,FTM0_CH1,
";
        let model = process_str(input, "MKxx", "MKxx.csv").unwrap();
        let pin = model.pin("PTA4").unwrap();
        assert_eq!(pin.reset_mux(), Some(MuxSelection::Reset));
        let reset = pin.mapping(MuxSelection::Reset).unwrap();
        assert_eq!(model.function_list(reset), "GPIOA_4");
    }

    #[test]
    fn empty_package_cell_defaults_to_pin_name() {
        let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgBGA121
Device,MKxx,Manual,BGA121
Pin,PTC4,,,,GPIOC_4,,
Pin,PTC5,,,,GPIOC_5,,*
";
        let model = process_str(input, "MKxx", "MKxx.csv").unwrap();
        let package = model.package("BGA121").unwrap();
        assert_eq!(package.location("PTC4"), Some("PTC4"));
        assert_eq!(package.location("PTC5"), None);
    }

    #[test]
    fn aliased_pin_names_truncate_at_slash() {
        let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
Pin,PTC4/LLWU_P8,,,,GPIOC_4/LLWU_P8,,
";
        let model = process_str(input, "MKxx", "MKxx.csv").unwrap();
        assert!(model.pin("PTC4").is_some());
        let mapping = model
            .pin("PTC4")
            .unwrap()
            .mapping(MuxSelection::Mux(0))
            .unwrap();
        assert_eq!(model.function_list(mapping), "GPIOC_4/LLWU_P8");
    }

    #[test]
    fn malformed_clock_register_is_fatal() {
        let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
Peripheral,UART0,SCGC4,,
";
        assert!(process_str(input, "MKxx", "MKxx.csv").is_err());
    }

    #[test]
    fn mismatched_clock_mask_is_fatal() {
        let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
Peripheral,UART0,SIM->SCGC4,SIM_SCGC5_UART0_MASK,
";
        assert!(process_str(input, "MKxx", "MKxx.csv").is_err());
    }

    #[test]
    fn dma_rows_build_the_slot_list() {
        let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
DmaMux,0,2,UART0_Receive
DmaMux,0,3,UART0_Transmit
";
        let model = process_str(input, "MKxx", "MKxx.csv").unwrap();
        assert_eq!(model.dma_entries().len(), 2);
        assert_eq!(model.dma_entries()[0].channel, 2);
        assert_eq!(model.dma_entries()[1].source, "UART0_Transmit");
    }
}
