//! End-to-end runs of the parse -> validate -> emit pipeline over a small
//! but representative family table.

use pinmux_gen::emit_header::write_device_files;
use pinmux_gen::emit_xml::write_family_xml;
use pinmux_gen::parser::process_str;
use pinmux_model::MuxSelection;
use pretty_assertions::assert_eq;

const MINIMAL: &str = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
Pin,PTA0,,,UART0_RX,GPIOA_0,UART0_RX,N12
Peripheral,UART0,SIM->SCGC4,,UART0_RX_IRQ
";

const FAMILY: &str = "\
Key,Pin,,Reset,Default,ALT0,ALT1,ALT2,ALT3,PkgLQFP48,PkgLQFP64
Device,MK20DX128M5,K20P64M50SF0RM,LQFP64
Device,MK20DX64M5,K20P48M50SF0RM,LQFP48
Pin,PTA1/LLWU_P1,,PTA1,UART0_RX,TSI0_CH2,PTA1/LLWU_P1,UART0_RX,FTM0_CH6,17,23
Pin,PTA2,,PTA2,,ADC0_SE4,PTA2,UART0_TX,FTM0_CH7,18,24
Pin,PTB16,,,FTM0_CH6,,PTB16,SPI1_SOUT,FTM0_CH6,*,39
Pin,ADC0_DP0,,ADC0_DP0,,,,,,5,7
Peripheral,PORTA,SIM->SCGC5,,
Peripheral,PORTB,SIM->SCGC5,,
Peripheral,FTM0,SIM->SCGC6,,FTM0_IRQn
Peripheral,UART0,SIM->SCGC4,,UART0_RX_TX_IRQn,UART0_ERR_IRQn
DmaMux,0,2,UART0_Receive
DmaMux,0,3,UART0_Transmit
";

#[test]
fn minimal_family_round_trips() {
    let model = process_str(MINIMAL, "MKxx", "MKxx.csv").unwrap();

    let pin = model.pin("PTA0").unwrap();
    assert_eq!(
        model.function_list(pin.mapping(MuxSelection::Mux(0)).unwrap()),
        "GPIOA_0"
    );
    assert_eq!(
        model.function_list(pin.mapping(MuxSelection::Mux(1)).unwrap()),
        "UART0_RX"
    );
    assert_eq!(pin.default_mux(), Some(MuxSelection::Mux(1)));

    let uart = model
        .templates()
        .iter()
        .find(|t| t.peripheral_name() == "UART0")
        .unwrap();
    assert_eq!(uart.clock_reg(), Some("SCGC4"));
}

#[test]
fn header_presets_selectors_to_the_declared_defaults() {
    let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
    let files = write_device_files(&model).unwrap();
    assert_eq!(files.len(), 4);

    // Devices are emitted in name order; MK20DX128M5 (LQFP64) comes first.
    assert_eq!(files[0].name, "pin_mapping-MK20DX128M5.h");
    assert_eq!(files[1].name, "gpio-MK20DX128M5.cpp");
    let header = &files[0].contents;

    // PTA1 defaults to its UART0_RX mapping at mux2; PTA2 has no default
    // cell so its selector stays at the reset sentinel.
    assert!(header.contains("#define PTA1_SIG_SEL"));
    let pta1 = header
        .lines()
        .find(|line| line.starts_with("#define PTA1_SIG_SEL"))
        .unwrap();
    assert!(pta1.contains(" 2 "));
    let pta2 = header
        .lines()
        .find(|line| line.starts_with("#define PTA2_SIG_SEL"))
        .unwrap();
    assert!(pta2.contains(" -2 "));

    // The hard-wired analog pin keeps the fixed sentinel.
    let adc = header
        .lines()
        .find(|line| line.starts_with("#define ADC0_DP0_SIG_SEL"))
        .unwrap();
    assert!(adc.contains(" -1 "));

    // UART0_RX is mapped on one pin only; its default choice is that pin.
    let rx = header
        .lines()
        .find(|line| line.starts_with("#define UART0_RX_PIN_SEL"))
        .unwrap();
    assert!(rx.contains(" 1 "));
}

#[test]
fn guarded_table_slots_enumerate_package_present_choices() {
    let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
    let files = write_device_files(&model).unwrap();

    // FTM0_CH6 maps to PTA1 (both packages) and PTB16 (LQFP64 only), in
    // that discovery order.
    let lqfp64 = &files[0].contents;
    assert!(lqfp64.contains("#if (FTM0_CH6_PIN_SEL == 1)"));
    assert!(lqfp64.contains("#elif (FTM0_CH6_PIN_SEL == 2)"));

    // In the 48-pin package PTB16 is absent and consumes no choice number.
    let lqfp48 = &files[2].contents;
    assert!(lqfp48.contains("#if (FTM0_CH6_PIN_SEL == 1)"));
    assert!(!lqfp48.contains("FTM0_CH6_PIN_SEL == 2"));
}

#[test]
fn source_initializes_only_package_present_pins() {
    let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
    let files = write_device_files(&model).unwrap();

    let lqfp64 = &files[1].contents;
    assert!(lqfp64.contains("{ PORT_PCR_MUX(PTB16_SIG_SEL)|hal::DEFAULT_PCR, &PORTB->PCR[16]},"));
    assert_eq!(
        lqfp64
            .matches("SIM->FIXED_PORT_CLOCK_REG |= PORTA_CLOCK_MASK;")
            .count(),
        1
    );

    let lqfp48 = &files[3].contents;
    assert!(!lqfp48.contains("PTB16_SIG_SEL)"));
    assert!(!lqfp48.contains("PORTB_CLOCK_MASK"));
}

#[test]
fn xml_describes_devices_pins_packages_and_peripherals() {
    let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
    let xml = write_family_xml(&model);

    assert!(xml.contains(r#"<family name="MK20D5">"#));
    assert!(xml.contains(
        r#"<device name="MK20DX128M5" manual="K20P64M50SF0RM" package="LQFP64" />"#
    ));
    assert!(xml.contains(r#"<mux sel="mux2" function="UART0_RX" />"#));
    assert!(xml.contains(r#"<placement pin="PTA1" location="23" />"#));
    assert!(xml.contains(r#"<pcr index="6" function="FTM0_CH6" />"#));
    assert!(xml.contains(r#"<slot instance="0" source="UART0_Transmit" num="3" />"#));
    // PTB16 is absent from LQFP48; its LQFP64 placement is still listed.
    assert!(xml.contains(r#"<placement pin="PTB16" location="39" />"#));
}

#[test]
fn colliding_signal_indices_abort_the_run() {
    // PCS with no digit is chip select 0, so these two names compute the
    // same slot of the SPI0 table.
    let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Device,MKxx,Manual,Pkg64
Pin,PTC0,,,,SPI0_PCS,SPI0_PCS0,1
";
    let err = process_str(input, "MKxx", "MKxx.csv").unwrap_err();
    assert!(format!("{err:#}").contains("multiple functions mapped to index"));
}

#[test]
fn missing_device_rows_abort_before_pin_parsing() {
    let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgPkg64
Pin,PTA0,,,,GPIOA_0,,1
";
    let err = process_str(input, "MKxx", "MKxx.csv").unwrap_err();
    assert!(format!("{err:#}").contains("No devices found"));
}
