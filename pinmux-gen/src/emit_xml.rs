//! XML emission.
//!
//! Renders the whole family as one structural document: the device variants,
//! every pin's mux/reset/default selections, the package placements, and the
//! peripheral information (signal-index tables plus the DMA slot list). The
//! symbolic reset/default selections are resolved to the concrete numbered
//! selection carrying the same function before they are written.

use pinmux_model::{DeviceModel, FamilyKind, MuxSelection, PeripheralTemplate, Pin, BANK_SIZE};

use crate::emit_header::{pin_categories, VERSION};
use crate::xml::XmlWriter;

const DTD_FILE: &str = "Pins.dtd";

/// Renders the family description document.
pub fn write_family_xml(model: &DeviceModel) -> String {
    let mut xml = XmlWriter::new();
    let file_name = format!("{}.xml", model.name());
    xml.preamble(
        &file_name,
        DTD_FILE,
        &format!("Generated from {}", model.source_file()),
    );

    xml.open_tag("root");
    xml.attribute("version", VERSION);

    xml.open_tag("family");
    xml.attribute("name", model.name());
    for device in model.devices().values() {
        xml.open_tag("device");
        xml.attribute("name", &device.name);
        xml.attribute("manual", &device.manual);
        xml.attribute("package", &device.package);
        xml.close_tag();
    }
    xml.close_tag();

    write_pins(&mut xml, model);
    write_packages(&mut xml, model);
    write_peripherals(&mut xml, model);

    xml.finish()
}

/// All pins, visited category by category:
///
/// ```text
/// <pins>
///    <pin name="PTD7">
///       <mux sel="mux1" function="GPIOD_7" />
///       <mux sel="mux2" function="CMT_IRO" />
///       <reset sel="disabled" />
///       <default sel="mux1" />
///    </pin>
///    ...
/// </pins>
/// ```
fn write_pins(xml: &mut XmlWriter, model: &DeviceModel) {
    xml.open_tag("pins");
    for (_, pins) in pin_categories(model) {
        for pin in pins {
            write_pin_mapping(xml, model, pin);
        }
    }
    xml.close_tag();
}

fn write_pin_mapping(xml: &mut XmlWriter, model: &DeviceModel, pin: &Pin) {
    xml.open_tag("pin");
    xml.attribute("name", pin.name());

    let mut default_selection = MuxSelection::Reset;
    for selection in pin.mappings().keys() {
        if *selection == MuxSelection::Disabled {
            continue;
        }
        if *selection == MuxSelection::Reset && pin.mappings().len() > 1 {
            continue;
        }
        if *selection == MuxSelection::Fixed {
            default_selection = MuxSelection::Fixed;
        }
        if Some(*selection) == pin.default_mux() {
            default_selection = *selection;
        }
    }
    if default_selection == MuxSelection::Fixed {
        xml.attribute("isFixed", "true");
    }

    // The reset function is declared symbolically; find the numbered
    // selection exposing the same function, if any.
    let mut reset_function: Option<&str> = None;
    let mut reset_selection = MuxSelection::Disabled;
    for (selection, mapping) in pin.mappings() {
        for id in &mapping.functions {
            let function = model.function(*id);
            if *selection == MuxSelection::Reset {
                reset_function = Some(function.name());
                continue;
            }
            if reset_function.is_some_and(|reset| function.name().eq_ignore_ascii_case(reset)) {
                reset_selection = *selection;
            }
            xml.open_tag("mux");
            xml.attribute("sel", selection);
            xml.attribute("function", function.name());
            xml.close_tag();
        }
    }

    // Fixed pins have nothing to select; their reset/default elements are
    // suppressed.
    if default_selection != MuxSelection::Fixed {
        xml.open_tag("reset");
        xml.attribute("sel", reset_selection);
        xml.close_tag();

        if default_selection == MuxSelection::Reset {
            default_selection = reset_selection;
        }
        xml.open_tag("default");
        xml.attribute("sel", default_selection);
        xml.close_tag();
    }
    xml.close_tag();
}

/// Package placement pairs:
///
/// ```text
/// <packages>
///    <package name="BGA_121">
///       <placement pin="ADC0_DM0" location="K2" />
///       ...
///    </package>
/// </packages>
/// ```
fn write_packages(xml: &mut XmlWriter, model: &DeviceModel) {
    xml.open_tag("packages");
    for package in model.packages().values() {
        xml.open_tag("package");
        xml.attribute("name", package.name());
        for (pin, location) in package.placements() {
            xml.open_tag("placement");
            xml.attribute("pin", pin);
            xml.attribute("location", location);
            xml.close_tag();
        }
        xml.close_tag();
    }
    xml.close_tag();
}

/// One information block per peripheral family that accumulated anything,
/// plus the DMA slot list under its multiplexer's block.
fn write_peripherals(xml: &mut XmlWriter, model: &DeviceModel) {
    xml.open_tag("peripherals");
    for template in model.templates() {
        let carries_dma =
            template.family() == FamilyKind::DmaMux && !model.dma_entries().is_empty();
        if !template.class_is_used() && !carries_dma {
            continue;
        }
        xml.open_tag("peripheral");
        xml.attribute("name", template.base_name());
        if let Some(reg) = template.clock_reg() {
            xml.attribute("clockReg", reg);
        }
        if let Some(mask) = template.clock_mask() {
            xml.attribute("clockMask", mask);
        }
        if !template.irq_nums().is_empty() {
            xml.attribute("irqCount", template.irq_nums().len());
        }
        write_signal_table(xml, model, template);
        if carries_dma {
            write_dma_slots(xml, model);
        }
        xml.close_tag();
    }
    xml.close_tag();
}

/// The occupied slots of a family's signal table, by flat index.
fn write_signal_table(xml: &mut XmlWriter, model: &DeviceModel, template: &PeripheralTemplate) {
    if !template.needs_table() {
        return;
    }
    xml.open_tag("pcrs");
    for (bank_index, bank) in template.banks().iter().enumerate() {
        for (slot, entry) in bank.slots().iter().enumerate() {
            let Some(function) = entry else {
                continue;
            };
            xml.open_tag("pcr");
            xml.attribute("index", bank_index * BANK_SIZE + slot);
            xml.attribute("function", model.function(*function).name());
            xml.close_tag();
        }
    }
    xml.close_tag();
}

/// The DMA request slot assignments, in input order.
fn write_dma_slots(xml: &mut XmlWriter, model: &DeviceModel) {
    xml.open_tag("dma");
    for entry in model.dma_entries() {
        xml.open_tag("slot");
        xml.attribute("instance", entry.instance);
        xml.attribute("source", &entry.source);
        xml.attribute("num", entry.channel);
        xml.close_tag();
    }
    xml.close_tag();
}

#[cfg(test)]
mod tests {
    use super::write_family_xml;
    use crate::parser::process_str;

    const FAMILY: &str = "\
Key,Pin,,Reset,Default,ALT0,ALT1,ALT2,PkgLQFP64
Device,MK20DX128M5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,PTA0,FTM0_CH3,ADC0_SE4,PTA0,FTM0_CH3,1
Pin,PTB0,,,,,PTB0,,*
Pin,ADC0_DM0,,ADC0_DM0,,,,,4
Peripheral,FTM0,SIM->SCGC6,,FTM0_IRQn
DmaMux,0,2,UART0_Receive
";

    #[test]
    fn mux_elements_list_every_selection() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let xml = write_family_xml(&model);
        assert!(xml.contains(r#"<mux sel="mux0" function="ADC0_SE4" />"#));
        assert!(xml.contains(r#"<mux sel="mux1" function="GPIOA_0" />"#));
        assert!(xml.contains(r#"<mux sel="mux2" function="FTM0_CH3" />"#));
    }

    #[test]
    fn symbolic_selections_resolve_to_numbered_ones() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let xml = write_family_xml(&model);
        // PTA0 resets to GPIOA_0, exposed at mux1; its default cell names
        // FTM0_CH3 at mux2.
        assert!(xml.contains(r#"<reset sel="mux1" />"#));
        assert!(xml.contains(r#"<default sel="mux2" />"#));
    }

    #[test]
    fn fixed_pins_are_flagged_and_carry_no_reset_element() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let xml = write_family_xml(&model);
        let pin = xml
            .split("<pin ")
            .find(|part| part.starts_with(r#"name="ADC0_DM0""#))
            .unwrap();
        let pin = &pin[..pin.find("</pin>").unwrap()];
        assert!(pin.contains(r#"isFixed="true""#));
        assert!(!pin.contains("<reset"));
        assert!(!pin.contains("<default"));
    }

    #[test]
    fn absent_pins_have_no_placement() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let xml = write_family_xml(&model);
        assert!(xml.contains(r#"<placement pin="PTA0" location="1" />"#));
        assert!(!xml.contains(r#"pin="PTB0""#));
    }

    #[test]
    fn peripheral_blocks_carry_tables_and_dma_slots() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let xml = write_family_xml(&model);
        assert!(xml.contains(r#"<peripheral name="Ftm0" clockReg="SCGC6""#));
        assert!(xml.contains(r#"<pcr index="3" function="FTM0_CH3" />"#));
        // ADC0_SE4 sits in the analog family's primary bank at slot 4.
        assert!(xml.contains(r#"<pcr index="4" function="ADC0_SE4" />"#));
        assert!(xml.contains(r#"<slot instance="0" source="UART0_Receive" num="2" />"#));
    }
}
