//! Header/source emission.
//!
//! For each device variant this produces a `pin_mapping-<device>.h` header
//! (selector macros, clock macros, peripheral information classes with
//! guarded lookup tables, guarded alias declarations, DMA slot enums) and a
//! `gpio-<device>.cpp` source carrying the pin-initialization routine. All
//! guards are keyed on the `<PIN>_SIG_SEL` / `<FUNCTION>_PIN_SEL` selector
//! macros so that only the choices made for the active package contribute
//! non-dummy entries.

use anyhow::{bail, Result};
use pinmux_model::{
    DeviceModel, DevicePackage, DeviceVariant, FunctionId, MappingInfo, MuxSelection,
    PeripheralTemplate, Pin, PinName, BANK_SIZE,
};
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::OnceLock;

use crate::doc;
use crate::writers::{self, InstanceWriter, NAMESPACE};

/// Version stamped into generated file headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const PIN_MAPPING_BASE_NAME: &str = "pin_mapping";
const GPIO_BASE_NAME: &str = "gpio";

const DUMMY_ROW: &str = "         /* {index:2} */  { 0, 0, 0, 0, 0 },\n";

/// One generated output file.
#[derive(Debug)]
pub struct GeneratedFile {
    /// File name relative to the output directory.
    pub name: String,
    /// Full file contents.
    pub contents: String,
}

/// Emits the header and source files for every device variant of the family.
pub fn write_device_files(model: &DeviceModel) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();
    for device in model.devices().values() {
        let Some(package) = model.package(&device.package) else {
            bail!("Device {} references unknown package {}", device.name, device.package);
        };
        let mut emitter = HeaderEmitter {
            model,
            device,
            package,
            alias_registry: HashSet::new(),
        };
        files.push(GeneratedFile {
            name: format!("{PIN_MAPPING_BASE_NAME}-{}.h", device.name),
            contents: emitter.write_header()?,
        });
        files.push(GeneratedFile {
            name: format!("{GPIO_BASE_NAME}-{}.cpp", device.name),
            contents: emitter.write_source(),
        });
    }
    Ok(files)
}

/// Pins grouped under "Port X Pins" / "Miscellaneous Pins" headings, in
/// first-seen order over the naturally ordered pin map.
pub(crate) fn pin_categories(model: &DeviceModel) -> Vec<(String, Vec<&Pin>)> {
    static PORT_PATTERN: OnceLock<Regex> = OnceLock::new();
    let port = PORT_PATTERN.get_or_init(|| Regex::new(r"^PT([A-Z]).*$").unwrap());

    let mut titles: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<&Pin>> = Vec::new();
    for pin in model.pins().values() {
        let title = match port.captures(pin.name().as_str()) {
            Some(caps) => format!("Port {} Pins", &caps[1]),
            None => "Miscellaneous Pins".to_string(),
        };
        match titles.iter().position(|t| *t == title) {
            Some(index) => groups[index].push(pin),
            None => {
                titles.push(title);
                groups.push(vec![pin]);
            }
        }
    }
    titles.into_iter().zip(groups).collect()
}

/// Function-category headings, matched first to last.
fn function_category_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"^(ADC\d+).*", "Analogue to Digital ($1)"),
            (r"^(VREF\d*).*", "Voltage Reference ($1)"),
            (r"^(A?CMP\d+).*", "Analogue Comparator ($1)"),
            (r"^(FTM\d+).*", "FlexTimer ($1)"),
            (r"^(TPM\d+).*", "Timer ($1)"),
            (r"^(GPIO[A-Z]+).*", "General Purpose I/O ($1)"),
            (r"^(I2C\d+).*", "Inter-Integrated Circuit ($1)"),
            (r"^(I2S\d+).*", "Integrated Interchip Sound ($1)"),
            (r"^(LLWU\d*).*", "Low-Leakage Wake-up Unit ($1)"),
            (r"^(SPI\d+).*", "Serial Peripheral Interface ($1)"),
            (r"^(TSI\d+).*", "Touch Sense Interface ($1)"),
            (r"^(LPTMR|LPTIM)(\d+)?.*", "Low Power Timer ($1)"),
            (r"^(UART\d+).*", "Universal Asynchronous Rx/Tx ($1)"),
            (r"^(LPUART\d+).*", "Low Power UART ($1)"),
            (r"^(DAC\d*).*", "Digital to Analogue ($1)"),
            (r"^(PDB\d*).*", "Programmable Delay Block ($1)"),
            (r"^(CAN\d*).*", "CAN Bus ($1)"),
            (r"^(SDHC\d*).*", "Secured Digital Host Controller ($1)"),
            (r"^(CMT\d*).*", "Carrier Modulator Transmitter ($1)"),
            (r"^(EWM).*", "External Watchdog Monitor ($1)"),
            (r"^E?XTAL.*", "Clock and Timing"),
            (r"^(JTAG|SWD|NMI|TRACE|RESET).*", "Debug and Control"),
            (r"^(FB_).*", "Flexbus"),
            (r"^.*(USB).*", "Universal Serial Bus"),
            (r"^.*(CLK|EXTRG).*", "Clock and Timing"),
        ]
        .iter()
        .map(|(pattern, title)| (Regex::new(pattern).unwrap(), *title))
        .collect()
    })
}

/// Functions grouped by peripheral category, in first-seen order over the
/// naturally sorted function names.
fn function_categories(model: &DeviceModel) -> Vec<(String, Vec<FunctionId>)> {
    let mut titles: Vec<String> = vec!["Miscellaneous".to_string()];
    let mut groups: Vec<Vec<FunctionId>> = vec![Vec::new()];
    for id in model.functions_sorted() {
        let function = model.function(id);
        if function.is_disabled() {
            continue;
        }
        let mut title = "Miscellaneous".to_string();
        for (pattern, replacement) in function_category_patterns() {
            if pattern.is_match(function.name()) {
                title = pattern
                    .replace(function.name(), *replacement)
                    .into_owned();
                break;
            }
        }
        match titles.iter().position(|t| *t == title) {
            Some(index) => groups[index].push(id),
            None => {
                titles.push(title);
                groups.push(vec![id]);
            }
        }
    }
    titles.into_iter().zip(groups).collect()
}

/// Candidate (pin, selection) choices of a function within one package:
/// numbered selections on package-present pins, in discovery order. Choice
/// `k` in any guard refers to the k-th entry (1-based).
pub(crate) fn function_choices<'a>(
    model: &'a DeviceModel,
    package: &DevicePackage,
    function: FunctionId,
) -> Vec<&'a (PinName, MuxSelection)> {
    model
        .function_pins(function)
        .iter()
        .filter(|(pin, mux)| mux.is_numbered() && package.location(pin.as_str()).is_some())
        .collect()
}

/// Scans all numbered mappings of the given peripheral base name.
///
/// Returns the common mux value and `false`, or the default and `true` when
/// the value varies between pins.
fn mux_uniformity(model: &DeviceModel, base_name: &str, default: u8) -> (u8, bool) {
    let mut values: HashSet<u8> = HashSet::new();
    for pin in model.pins().values() {
        for (mux, mapping) in pin.mappings() {
            let MuxSelection::Mux(value) = mux else {
                continue;
            };
            if mapping
                .functions
                .iter()
                .any(|id| model.function(*id).base_name() == base_name)
            {
                values.insert(*value);
            }
        }
    }
    match values.len() {
        0 => (default, false),
        1 => (values.into_iter().next().unwrap_or(default), false),
        _ => (default, true),
    }
}

/// The common clock register of the PORT peripherals.
///
/// Port clock gating shares one register; conflicting declarations are a
/// fatal input error.
fn port_clock_register(model: &DeviceModel) -> Result<String> {
    let mut register: Option<&str> = None;
    for (name, peripheral) in model.peripherals() {
        if !(name.starts_with("PORT") && name.len() == 5) {
            continue;
        }
        let Some(reg) = peripheral.clock_reg.as_deref() else {
            continue;
        };
        match register {
            None => register = Some(reg),
            Some(existing) if existing != reg => {
                bail!("Multiple port clock registers existing={existing}, new={reg}")
            }
            _ => {}
        }
    }
    Ok(register.unwrap_or("SCGC5").to_string())
}

struct HeaderEmitter<'a> {
    model: &'a DeviceModel,
    device: &'a DeviceVariant,
    package: &'a DevicePackage,
    alias_registry: HashSet<String>,
}

impl HeaderEmitter<'_> {
    /// Pin name with its package location appended, or `None` when the pin
    /// is absent from the active package.
    fn pin_name_with_location(&self, pin: &Pin) -> Option<String> {
        let location = self.package.location(pin.name().as_str())?;
        if location.eq_ignore_ascii_case(pin.name().as_str()) {
            Some(pin.name().to_string())
        } else {
            Some(format!(
                "{} (Alias:{})",
                pin.name(),
                location.replace('/', ", ")
            ))
        }
    }

    fn write_header(&mut self) -> Result<String> {
        self.alias_registry.clear();
        let mut out = String::new();

        let file_name = format!("{PIN_MAPPING_BASE_NAME}-{}.h", self.device.name);
        doc::header_file_preamble(
            &mut out,
            &format!("{PIN_MAPPING_BASE_NAME}.h"),
            &file_name,
            VERSION,
            &format!(
                "Pin declarations for {}, generated from {}",
                self.model.name(),
                self.model.source_file()
            ),
        );
        doc::system_include(&mut out, "stddef.h");
        doc::local_include(&mut out, "derivative.h");
        out.push('\n');

        self.write_mapping_options(&mut out);
        self.write_pin_selector_defaults(&mut out);
        self.write_function_selector_defaults(&mut out);

        let port_clock_reg = port_clock_register(self.model)?;
        self.write_pin_defines(&mut out, &port_clock_reg);
        self.write_clock_macros(&mut out, &port_clock_reg);
        self.write_info_classes(&mut out);

        doc::local_include(&mut out, "gpio_defs.h");
        self.write_declarations(&mut out)?;
        self.write_dma_info(&mut out);

        doc::header_file_postamble(&mut out, &format!("{PIN_MAPPING_BASE_NAME}.h"));
        Ok(out)
    }

    /// Whether pin mappings are applied en bloc at startup or on first use
    /// of each peripheral.
    fn write_mapping_options(&self, out: &mut String) {
        doc::banner(out, "Pin mapping Options");
        doc::macro_define_with_comment(
            out,
            "DO_MAP_PINS_ON_RESET",
            "0",
            " Map all pins during reset initialisation",
        );
        out.push('\n');
    }

    /// One `<PIN>_SIG_SEL` macro per package-present pin, grouped by pin
    /// category, preset to the pin's default selection.
    fn write_pin_selector_defaults(&self, out: &mut String) {
        doc::banner(out, "Pin peripheral signal selection");
        for (title, pins) in pin_categories(self.model) {
            let mut group = String::new();
            for pin in pins {
                let Some(pin_name) = self.pin_name_with_location(pin) else {
                    continue;
                };

                let mut default_selection = MuxSelection::Reset;
                let mut alternatives = String::new();
                for (selection, mapping) in pin.mappings() {
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
                    if !alternatives.is_empty() {
                        alternatives.push_str(", ");
                    }
                    alternatives.push_str(&self.model.function_list(mapping));
                }
                doc::macro_define_with_comment(
                    &mut group,
                    &format!("{}_SIG_SEL", pin.name()),
                    &default_selection.value().to_string(),
                    &format!(" {pin_name} [{alternatives}]"),
                );
            }
            if !group.is_empty() {
                doc::banner(out, &title);
                out.push_str(&group);
            }
        }
        out.push('\n');
    }

    /// One `<FUNCTION>_PIN_SEL` macro per function mapped in the active
    /// package, preset to the pin carrying the function's default mapping.
    fn write_function_selector_defaults(&self, out: &mut String) {
        doc::banner(out, "Pin mapping by peripheral function");
        for (title, functions) in function_categories(self.model) {
            let mut group = String::new();
            for id in functions {
                self.write_function_selector_default(&mut group, id);
            }
            if !group.is_empty() {
                doc::banner(out, &title);
                out.push_str(&group);
            }
        }
        out.push('\n');
    }

    fn write_function_selector_default(&self, out: &mut String, id: FunctionId) {
        let mappings = self.model.function_pins(id);
        if mappings.is_empty() {
            return;
        }
        let mapped_here = mappings
            .iter()
            .any(|(pin, _)| self.package.location(pin.as_str()).is_some());
        if !mapped_here {
            return;
        }
        let name = self.model.function(id).name();

        // A single fixed mapping leaves nothing to select.
        let no_choices = mappings.len() == 1 && mappings[0].1 == MuxSelection::Fixed;
        if no_choices {
            doc::macro_define_with_comment(
                out,
                &format!("{name}_PIN_SEL"),
                "0",
                &format!(" {} (fixed)", mappings[0].0),
            );
            return;
        }

        let choices = function_choices(self.model, self.package, id);
        let mut default_choice = 0;
        let mut candidates = String::new();
        for (index, (pin_name, mux)) in choices.iter().enumerate() {
            if let Some(pin) = self.model.pin(pin_name.as_str()) {
                if pin.default_mux() == Some(*mux) {
                    default_choice = index + 1;
                }
            }
            if !candidates.is_empty() {
                candidates.push_str(", ");
            }
            candidates.push_str(pin_name.as_str());
        }
        doc::macro_define_with_comment(
            out,
            &format!("{name}_PIN_SEL"),
            &default_choice.to_string(),
            &format!(" {name} [{candidates}]"),
        );
    }

    /// Common mux settings: fixed-vs-varying GPIO/ADC mux values and the
    /// shared port clock register.
    fn write_pin_defines(&self, out: &mut String, port_clock_reg: &str) {
        doc::banner(out, "Common Mux settings for PCR");
        doc::macro_undef(out, "FIXED_ADC_FN");
        doc::macro_undef(out, "FIXED_GPIO_FN");
        doc::macro_undef(out, "FIXED_PORT_CLOCK_REG");

        let (adc_fn, adc_changed) = mux_uniformity(self.model, "ADC", 0);
        if adc_changed {
            doc::macro_define_with_comment(
                out,
                "ADC_FN_CHANGES",
                "",
                " Indicates ADC Multiplexing varies with pin",
            );
        } else {
            doc::macro_define_with_comment(
                out,
                "FIXED_ADC_FN",
                &adc_fn.to_string(),
                " Fixed ADC Multiplexing value",
            );
        }
        let (gpio_fn, gpio_changed) = mux_uniformity(self.model, "GPIO", 1);
        if gpio_changed {
            doc::macro_define_with_comment(
                out,
                "GPIO_FN_CHANGES",
                "",
                " Indicates GPIO Multiplexing varies with pin",
            );
        } else {
            doc::macro_define_with_comment(
                out,
                "FIXED_GPIO_FN",
                &gpio_fn.to_string(),
                " Fixed GPIO Multiplexing value",
            );
        }
        doc::macro_define_with_comment(
            out,
            "FIXED_PORT_CLOCK_REG",
            port_clock_reg,
            " Fixed PORT Clock",
        );
        out.push('\n');
    }

    /// `<NAME>_CLOCK_REG` / `<NAME>_CLOCK_MASK` macros for every peripheral
    /// that declared clock gating.
    fn write_clock_macros(&self, out: &mut String, port_clock_reg: &str) {
        doc::banner(out, "Peripheral clock macros");
        for (name, peripheral) in self.model.peripherals() {
            let (Some(reg), Some(mask)) = (
                peripheral.clock_reg.as_deref(),
                peripheral.clock_mask.as_deref(),
            ) else {
                continue;
            };
            doc::macro_define(out, &format!("{name}_CLOCK_REG"), &format!("SIM->{reg}"));
            doc::macro_define(out, &format!("{name}_CLOCK_MASK"), mask);
        }
        doc::macro_define(out, "PORT_CLOCK_REG", port_clock_reg);
        out.push('\n');
    }

    fn write_info_classes(&self, out: &mut String) {
        doc::open_namespace(out, NAMESPACE);
        doc::banner(out, "Peripheral Pin Tables");
        doc::start_group(
            out,
            "PeripheralPinTables",
            "Peripheral Information Classes",
            "Provides instance specific information about a peripheral",
        );
        for template in self.model.templates() {
            self.write_info_class(out, template);
        }
        doc::close_group(out);
        doc::close_namespace(out, NAMESPACE);
        out.push('\n');
    }

    /// One information class, e.g.
    ///
    /// ```text
    ///  class Adc0Info {
    ///  public:
    ///     //! Hardware base pointer
    ///     static constexpr uint32_t basePtr   = ADC0_BasePtr;
    ///     ...
    ///     static constexpr PcrInfo  info[32] = {
    ///  #if (ADC0_SE4_PIN_SEL == 1)
    ///           /*  4 */  { PORTC_CLOCK_MASK, PORTC_BasePtr,  GPIOC_BasePtr,  2,  0 },
    ///  #else
    ///           /*  4 */  { 0, 0, 0, 0, 0 },
    ///  #endif
    ///     ...
    ///     };
    ///  };
    /// ```
    fn write_info_class(&self, out: &mut String, template: &PeripheralTemplate) {
        if !template.class_is_used() {
            return;
        }
        let writer = writers::writer_for(template.family());
        doc::doc_banner(
            out,
            &format!("Peripheral information for {}", writer.group().title),
        );
        let _ = write!(out, "class {}Info {{\npublic:\n", template.base_name());
        out.push_str(&writer.info_constants(self.model, template));

        if template.needs_table() {
            for (bank_index, bank) in template.banks().iter().enumerate() {
                if bank.is_empty() {
                    continue;
                }
                let _ = write!(
                    out,
                    "   //! Information for each pin of peripheral\n   static constexpr PcrInfo  {}[{BANK_SIZE}] = {{\n\n",
                    writer.bank_name(bank_index)
                );
                out.push_str(
                    "         //          clockMask         pcrAddress      gpioAddress gpioBit muxValue\n",
                );
                for (slot, entry) in bank.slots().iter().enumerate() {
                    self.write_table_slot(out, slot, *entry);
                }
                out.push_str("   };\n");
            }
        }
        out.push_str("};\n\n");
    }

    /// One slot of a lookup table: guarded candidates in discovery order,
    /// then the unguarded all-zero fallback.
    fn write_table_slot(&self, out: &mut String, slot: usize, entry: Option<FunctionId>) {
        let dummy = DUMMY_ROW.replace("{index:2}", &format!("{slot:2}"));
        let Some(function) = entry else {
            out.push_str(&dummy);
            return;
        };
        let name = self.model.function(function).name();
        let mut guard_written = false;
        for (index, (pin_name, mux)) in function_choices(self.model, self.package, function)
            .iter()
            .enumerate()
        {
            let Some(pin) = self.model.pin(pin_name.as_str()) else {
                continue;
            };
            doc::conditional(
                out,
                &format!("{name}_PIN_SEL == {}", index + 1),
                guard_written,
            );
            let _ = write!(
                out,
                "         /* {slot:2} */  {{ {}{} }},\n",
                pin.pcr_init_fields(),
                mux.value()
            );
            guard_written = true;
        }
        doc::conditional_else(out, guard_written);
        out.push_str(&dummy);
        doc::conditional_end(out, guard_written);
    }

    /// Guarded `using` declarations for every function a family exposes on a
    /// pin, with aliases for the pin's package locations.
    fn write_declarations(&mut self, out: &mut String) -> Result<()> {
        out.push('\n');
        doc::open_namespace(out, NAMESPACE);
        for template in self.model.templates() {
            if !template.class_is_used() {
                continue;
            }
            let writer = writers::writer_for(template.family());
            if !writer.uses_aliases() {
                continue;
            }
            let mut group_done = false;
            let pins: Vec<&Pin> = self.model.pins().values().collect();
            for pin in pins {
                for (mux, mapping) in pin.mappings() {
                    if *mux == MuxSelection::Reset {
                        continue;
                    }
                    for index in 0..mapping.functions.len() {
                        let function = self.model.function(mapping.functions[index]);
                        if !template.matches(function.name()) {
                            continue;
                        }
                        if !group_done {
                            let group = writer.group();
                            doc::start_group(out, group.name, group.title, group.brief);
                            group_done = true;
                        }
                        self.write_extern_declaration(out, template, writer, pin, mapping, index)?;
                    }
                }
            }
            if group_done {
                doc::close_group(out);
            }
        }
        doc::conditional_start(out, "DO_MAP_PINS_ON_RESET>0");
        doc::doc_banner(out, "Used to configure pin-mapping before 1st use of peripherals");
        out.push_str("extern void mapAllPins();\n");
        doc::conditional_end(out, true);
        doc::close_namespace(out, NAMESPACE);
        Ok(())
    }

    /// One guarded declaration, e.g.
    ///
    /// ```text
    /// #if (PTC18_SIG_SEL == 1)
    /// using gpioC_18           = const hal::GpioC<18>;
    /// using gpio_A5            = const hal::GpioC<18>;
    /// #endif
    /// ```
    fn write_extern_declaration(
        &mut self,
        out: &mut String,
        template: &PeripheralTemplate,
        writer: &dyn InstanceWriter,
        pin: &Pin,
        mapping: &MappingInfo,
        index: usize,
    ) -> Result<()> {
        let Some(declaration) = writer.declaration(self.model, template, mapping, index)? else {
            return Ok(());
        };
        let instance = writer.instance_name(self.model, mapping, index);

        let guard_written = if mapping.mux != MuxSelection::Fixed && writer.uses_guard() {
            doc::conditional_start(
                out,
                &format!("{}_SIG_SEL == {}", pin.name(), mapping.mux.value()),
            );
            true
        } else {
            false
        };

        if !self.alias_registry.insert(instance.clone()) {
            out.push_str("//");
        }
        let _ = writeln!(out, "using {instance:<20} = {declaration};");

        if let Some(locations) = self.package.location(pin.name().as_str()) {
            for location in locations.split('/') {
                if location.eq_ignore_ascii_case(pin.name().as_str()) {
                    continue;
                }
                let Some(alias) = writer.alias_name(&instance, location) else {
                    continue;
                };
                if !self.alias_registry.insert(alias.clone()) {
                    // Comment out repeated aliases.
                    out.push_str("//");
                }
                let _ = writeln!(out, "using {alias:<20} = {declaration};");
            }
        }
        doc::conditional_end(out, guard_written);
        Ok(())
    }

    /// DMA slot enumerations, e.g. `DMA0_SLOT_UART0_Receive = 2,`.
    fn write_dma_info(&self, out: &mut String) {
        if self.model.dma_entries().is_empty() {
            return;
        }
        out.push('\n');
        doc::open_namespace(out, NAMESPACE);
        doc::start_group(
            out,
            "DMA_Group",
            "Direct Memory Access (DMA)",
            "Support for DMA operations",
        );
        for instance in 0..4 {
            let slots: Vec<_> = self
                .model
                .dma_entries()
                .iter()
                .filter(|entry| entry.instance == instance)
                .collect();
            if slots.is_empty() {
                continue;
            }
            out.push_str("enum {\n");
            for entry in slots {
                let _ = writeln!(
                    out,
                    "   {:<35}  = {},",
                    format!("DMA{}_SLOT_{}", entry.instance, entry.source),
                    entry.channel
                );
            }
            out.push_str("};\n");
        }
        doc::close_group(out);
        doc::close_namespace(out, NAMESPACE);
    }

    fn write_source(&self) -> String {
        let mut out = String::new();
        let file_name = format!("{GPIO_BASE_NAME}-{}.cpp", self.device.name);
        doc::cpp_file_preamble(
            &mut out,
            &format!("{GPIO_BASE_NAME}.cpp"),
            &file_name,
            VERSION,
            &format!(
                "Pin declarations for {}, generated from {}",
                self.model.name(),
                self.model.source_file()
            ),
        );
        doc::local_include(&mut out, "gpio.h");
        out.push('\n');
        doc::open_namespace(&mut out, NAMESPACE);
        self.write_pin_init(&mut out);
        doc::close_namespace(&mut out, NAMESPACE);
        out
    }

    /// The pin-initialization routine: a guarded PCR init table plus a
    /// function that enables each port clock exactly once and applies every
    /// selected mux value.
    fn write_pin_init(&self, out: &mut String) {
        doc::conditional_start(out, "DO_MAP_PINS_ON_RESET>0");
        out.push_str(
            "struct PinInit {\n   uint32_t pcrValue;\n   uint32_t volatile *pcr;\n};\n\nstatic constexpr PinInit pinInit[] = {\n",
        );
        for pin in self.model.pins().values() {
            if self.package.location(pin.name().as_str()).is_none() {
                // Discard pins not available on this package.
                continue;
            }
            let Some(pcr) = pin.pcr_register() else {
                continue;
            };
            doc::conditional_start(out, &format!("{}_SIG_SEL>=0", pin.name()));
            let _ = writeln!(
                out,
                "   {{ PORT_PCR_MUX({}_SIG_SEL)|{NAMESPACE}::DEFAULT_PCR, {pcr}}},",
                pin.name()
            );
            doc::conditional_end(out, true);
        }
        out.push_str("};\n\n");

        out.push_str(
            "/**\n * Used to configure pin-mapping before 1st use of peripherals\n */\nvoid mapAllPins() {\n",
        );
        let mut current_port: Option<char> = None;
        let mut conditions: Vec<String> = Vec::new();
        let mut flush = |out: &mut String, port: Option<char>, conditions: &mut Vec<String>| {
            let Some(letter) = port else {
                return;
            };
            if conditions.is_empty() {
                return;
            }
            out.push_str("#if ");
            for (index, condition) in conditions.iter().enumerate() {
                if index > 0 {
                    out.push_str(" || ");
                    if index % 4 == 0 {
                        out.push_str("\\\n    ");
                    }
                }
                out.push_str(condition);
            }
            let _ = write!(
                out,
                "\n   SIM->FIXED_PORT_CLOCK_REG |= PORT{letter}_CLOCK_MASK;\n#endif\n"
            );
            conditions.clear();
        };
        for pin in self.model.pins().values() {
            if self.package.location(pin.name().as_str()).is_none() {
                continue;
            }
            let Some(letter) = pin.port_letter() else {
                continue;
            };
            if current_port != Some(letter) {
                flush(out, current_port, &mut conditions);
                current_port = Some(letter);
            }
            conditions.push(format!("({}_SIG_SEL>=0)", pin.name()));
        }
        flush(out, current_port, &mut conditions);

        out.push_str(
            "\n   for (const PinInit *p=pinInit; p<(pinInit+(sizeof(pinInit)/sizeof(pinInit[0]))); p++) {\n      *(p->pcr) = p->pcrValue;\n   }\n}\n",
        );
        doc::conditional_end(out, true);
    }
}

#[cfg(test)]
mod tests {
    use super::{function_choices, mux_uniformity, pin_categories, write_device_files};
    use crate::parser::process_str;

    const FAMILY: &str = "\
Key,Pin,,Reset,Default,ALT0,ALT1,ALT2,PkgLQFP64
Device,MK20DX128M5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,PTA0,,ADC0_SE4,PTA0,FTM0_CH3,1
Pin,PTA1,,PTA1,FTM0_CH3,,PTA1,FTM0_CH3,2
Pin,PTB0,,,,,PTB0,,3
Pin,ADC0_DM0,,ADC0_DM0,,,,,4
Peripheral,PORTA,SIM->SCGC5,,
Peripheral,FTM0,SIM->SCGC6,,FTM0_IRQn
DmaMux,0,2,UART0_Receive
";

    #[test]
    fn pins_group_by_port_letter() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let categories = pin_categories(&model);
        let titles: Vec<&str> = categories.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            titles,
            ["Miscellaneous Pins", "Port A Pins", "Port B Pins"]
        );
    }

    #[test]
    fn choice_numbering_follows_discovery_order() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let package = model.package("LQFP64").unwrap();
        let id = model.find_function("FTM0_CH3").unwrap();
        let choices = function_choices(&model, package, id);
        let pins: Vec<&str> = choices.iter().map(|(pin, _)| pin.as_str()).collect();
        // PTA0 at mux2 is discovered before PTA1 at mux2.
        assert_eq!(pins, ["PTA0", "PTA1"]);
    }

    #[test]
    fn gpio_mux_uniformity_is_detected() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        // All GPIO functions sit at mux1.
        assert_eq!(mux_uniformity(&model, "GPIO", 1), (1, false));
        assert_eq!(mux_uniformity(&model, "ADC", 0), (0, false));
    }

    #[test]
    fn guarded_table_slots_enumerate_choices() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let files = write_device_files(&model).unwrap();
        let header = &files[0].contents;
        assert!(header.contains("#if (FTM0_CH3_PIN_SEL == 1)"));
        assert!(header.contains("#elif (FTM0_CH3_PIN_SEL == 2)"));
        assert!(header.contains("#else"));
        // The FTM0 table carries the IRQ attached by the peripheral row.
        assert!(header.contains("static constexpr IRQn_Type irqNums[]  = {FTM0_IRQn};"));
    }

    #[test]
    fn dma_slots_render_as_enumerators() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let files = write_device_files(&model).unwrap();
        let header = &files[0].contents;
        assert!(header.contains("DMA0_SLOT_UART0_Receive"));
        assert!(header.contains("= 2,"));
    }

    #[test]
    fn conflicting_port_clock_registers_are_rejected() {
        let input = "\
Key,Pin,,Reset,Default,ALT0,ALT1,PkgLQFP64
Device,MK20DX128M5,K20P64M50SF0RM,LQFP64
Pin,PTA0,,,,,PTA0,1
Peripheral,PORTA,SIM->SCGC5,,
Peripheral,PORTB,SIM->SCGC6,,
";
        let model = process_str(input, "MK20D5", "MK20D5.csv").unwrap();
        let err = write_device_files(&model).unwrap_err();
        assert!(err.to_string().contains("Multiple port clock registers"));
    }

    #[test]
    fn source_enables_each_port_clock_once() {
        let model = process_str(FAMILY, "MK20D5", "MK20D5.csv").unwrap();
        let files = write_device_files(&model).unwrap();
        let source = &files[1].contents;
        assert_eq!(
            source
                .matches("SIM->FIXED_PORT_CLOCK_REG |= PORTA_CLOCK_MASK;")
                .count(),
            1
        );
        assert!(source.contains("#if (PTA0_SIG_SEL>=0) || (PTA1_SIG_SEL>=0)"));
        assert!(source.contains("{ PORT_PCR_MUX(PTA0_SIG_SEL)|hal::DEFAULT_PCR, &PORTA->PCR[0]},"));
    }
}
