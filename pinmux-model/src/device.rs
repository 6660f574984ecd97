use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::dma::DmaMuxInfo;
use crate::error::ModelError;
use crate::mapping::MappingInfo;
use crate::mux::MuxSelection;
use crate::package::{DevicePackage, DeviceVariant};
use crate::pin::{natural_cmp, Pin, PinName};
use crate::signal::{FunctionId, Peripheral, PeripheralFunction};
use crate::template::{misc_patterns, standard_catalog, PeripheralTemplate, TemplateId};

/// The complete model of one device family.
///
/// Owns the interned peripheral functions, all pins with their mapping
/// tables, package placements, device variants, the peripheral-family
/// templates, and the DMA slot list. The model is mutated while the input is
/// parsed; once [`DeviceModel::check_consistency`] has run it is only
/// traversed.
#[derive(Debug)]
pub struct DeviceModel {
    name: String,
    source_file: String,
    functions: Vec<PeripheralFunction>,
    function_ids: HashMap<String, FunctionId>,
    /// Per function: every (pin, selection) it is mapped at, in discovery
    /// order. This order defines "choice" numbering in guarded tables.
    function_pins: Vec<Vec<(PinName, MuxSelection)>>,
    peripherals: BTreeMap<String, Peripheral>,
    pins: BTreeMap<PinName, Pin>,
    packages: BTreeMap<String, DevicePackage>,
    devices: BTreeMap<String, DeviceVariant>,
    templates: Vec<PeripheralTemplate>,
    dma_entries: Vec<DmaMuxInfo>,
    pin_families: BTreeMap<String, BTreeSet<PinName>>,
}

impl DeviceModel {
    /// Creates an empty model with the standard family catalog and the
    /// disabled sentinel function interned.
    pub fn new(name: &str, source_file: &str) -> Self {
        let mut model = DeviceModel {
            name: name.to_string(),
            source_file: source_file.to_string(),
            functions: Vec::new(),
            function_ids: HashMap::new(),
            function_pins: Vec::new(),
            peripherals: BTreeMap::new(),
            pins: BTreeMap::new(),
            packages: BTreeMap::new(),
            devices: BTreeMap::new(),
            templates: standard_catalog(),
            dma_entries: Vec::new(),
            pin_families: BTreeMap::new(),
        };
        model.functions.push(PeripheralFunction::new("Disabled", "", "", "", None));
        model.function_pins.push(Vec::new());
        model
            .function_ids
            .insert("Disabled".to_string(), FunctionId::DISABLED);
        model
    }

    /// Device family name, e.g. `MK20D5`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the file the model was built from.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /*
     * Function registry ====================================================
     */

    /// Applies the fixed legacy-port substitutions, e.g. `PTA4` => `GPIOA_4`.
    pub fn normalize_name(text: &str) -> String {
        let mut text = text.to_string();
        for (from, to) in [
            ("PTA", "GPIOA_"),
            ("PTB", "GPIOB_"),
            ("PTC", "GPIOC_"),
            ("PTD", "GPIOD_"),
            ("PTE", "GPIOE_"),
        ] {
            text = text.replace(from, to);
        }
        text
    }

    /// Resolves a cell's text into the functions it names.
    ///
    /// The text is split on `/` (surrounding whitespace and empty segments
    /// ignored); each name is interned, creating the function on first sight.
    /// Returns the functions in writing order together with a flag telling
    /// whether each one was newly created. Resolving the same text twice
    /// yields the same identities.
    pub fn resolve_functions(
        &mut self,
        text: &str,
        normalize: bool,
    ) -> Result<Vec<(FunctionId, bool)>, ModelError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let text = if normalize {
            DeviceModel::normalize_name(text)
        } else {
            text.to_string()
        };
        let mut resolved = Vec::new();
        for name in text.split('/') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            resolved.push(self.find_or_create_function(name)?);
        }
        Ok(resolved)
    }

    /// Interns one signal name, consulting the template catalog (and the
    /// miscellaneous fallback recognizers) when the name is new.
    pub fn find_or_create_function(
        &mut self,
        name: &str,
    ) -> Result<(FunctionId, bool), ModelError> {
        if name.eq_ignore_ascii_case("Disabled") {
            return Ok((FunctionId::DISABLED, false));
        }
        if let Some(&id) = self.function_ids.get(name) {
            return Ok((id, false));
        }
        for (index, template) in self.templates.iter().enumerate() {
            if let Some((base, instance, signal)) = template.captures(name) {
                let id =
                    self.create_function(name, &base, &instance, &signal, TemplateId(index))?;
                return Ok((id, true));
            }
        }
        // No dedicated family claims the name; try the fallback recognizers
        // bound to the miscellaneous template.
        let misc = TemplateId(self.templates.len() - 1);
        for pattern in misc_patterns() {
            if let Some(caps) = pattern.captures(name) {
                let id = self.create_function(name, &caps[1], &caps[2], &caps[3], misc)?;
                return Ok((id, true));
            }
        }
        Err(ModelError::UnmatchedFunction(name.to_string()))
    }

    fn create_function(
        &mut self,
        name: &str,
        base: &str,
        instance: &str,
        signal: &str,
        template: TemplateId,
    ) -> Result<FunctionId, ModelError> {
        if self.function_ids.contains_key(name) {
            return Err(ModelError::DuplicateFunction(name.to_string()));
        }
        let id = FunctionId(self.functions.len());
        self.functions
            .push(PeripheralFunction::new(name, base, instance, signal, Some(template)));
        self.function_pins.push(Vec::new());
        self.function_ids.insert(name.to_string(), id);
        self.peripherals
            .entry(format!("{base}{instance}"))
            .or_insert_with(|| Peripheral::new(base, instance));
        Ok(id)
    }

    /// The interned function behind a handle.
    pub fn function(&self, id: FunctionId) -> &PeripheralFunction {
        &self.functions[id.0]
    }

    /// Looks up an already interned function by name.
    pub fn find_function(&self, name: &str) -> Option<FunctionId> {
        self.function_ids.get(name).copied()
    }

    /// All function handles, sorted naturally by name.
    pub fn functions_sorted(&self) -> Vec<FunctionId> {
        let mut ids: Vec<FunctionId> = (0..self.functions.len()).map(FunctionId).collect();
        ids.sort_by(|a, b| natural_cmp(self.functions[a.0].name(), self.functions[b.0].name()));
        ids
    }

    /// Every (pin, selection) the function is mapped at, in discovery order.
    pub fn function_pins(&self, id: FunctionId) -> &[(PinName, MuxSelection)] {
        &self.function_pins[id.0]
    }

    /*
     * Pins and mappings ====================================================
     */

    /// Creates a pin; seeing the same pin name twice is fatal.
    pub fn create_pin(&mut self, name: &str) -> Result<(), ModelError> {
        let key = PinName::new(name);
        if self.pins.contains_key(&key) {
            return Err(ModelError::DuplicatePin(name.to_string()));
        }
        self.pins.insert(key, Pin::new(name));
        Ok(())
    }

    /// All pins in natural name order.
    pub fn pins(&self) -> &BTreeMap<PinName, Pin> {
        &self.pins
    }

    /// Looks a pin up by name.
    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.get(&PinName::new(name))
    }

    /// Records the functions active on `pin` at `mux`.
    ///
    /// Within one pin a selection may be declared only once; a duplicate is a
    /// consistency violation, never a silent overwrite.
    pub fn add_mapping(
        &mut self,
        pin: &str,
        mux: MuxSelection,
        functions: Vec<FunctionId>,
    ) -> Result<(), ModelError> {
        let entry = self
            .pins
            .get_mut(&PinName::new(pin))
            .ok_or_else(|| ModelError::UnknownPin(pin.to_string()))?;
        if entry.mappings().contains_key(&mux) {
            return Err(ModelError::DuplicateMapping {
                pin: pin.to_string(),
                mux,
            });
        }
        let pin_name = entry.name().clone();
        entry
            .mappings_mut()
            .insert(mux, MappingInfo::new(mux, functions.clone()));
        for id in functions {
            self.function_pins[id.0].push((pin_name.clone(), mux));
        }
        Ok(())
    }

    /// Records the pin's reset selection; a second declaration is fatal.
    pub fn set_pin_reset(&mut self, pin: &str, mux: MuxSelection) -> Result<(), ModelError> {
        let entry = self
            .pins
            .get_mut(&PinName::new(pin))
            .ok_or_else(|| ModelError::UnknownPin(pin.to_string()))?;
        if entry.reset_mux().is_some() {
            return Err(ModelError::DuplicateReset(pin.to_string()));
        }
        entry.set_reset_mux(mux);
        Ok(())
    }

    /// Resolves a default cell to the pin's matching non-reset mapping and
    /// records it; an unmatched name or a second declaration is fatal.
    pub fn set_pin_default(&mut self, pin: &str, function_list: &str) -> Result<(), ModelError> {
        let key = PinName::new(pin);
        let found = {
            let entry = self
                .pins
                .get(&key)
                .ok_or_else(|| ModelError::UnknownPin(pin.to_string()))?;
            entry
                .mappings()
                .values()
                .find(|mapping| {
                    mapping.mux != MuxSelection::Reset
                        && self
                            .function_list(mapping)
                            .eq_ignore_ascii_case(function_list)
                })
                .map(|mapping| mapping.mux)
        };
        let mux = found.ok_or_else(|| ModelError::DefaultNotMapped {
            pin: pin.to_string(),
            function: function_list.to_string(),
        })?;
        let entry = self
            .pins
            .get_mut(&key)
            .ok_or_else(|| ModelError::UnknownPin(pin.to_string()))?;
        if entry.default_mux().is_some() {
            return Err(ModelError::DuplicateDefault(pin.to_string()));
        }
        entry.set_default_mux(mux);
        Ok(())
    }

    /// Renders a mapping's functions as the slash-joined list they were
    /// declared as, e.g. `GPIOC_6/LLWU_P10`.
    pub fn function_list(&self, mapping: &MappingInfo) -> String {
        let names: Vec<&str> = mapping
            .functions
            .iter()
            .map(|id| self.functions[id.0].name())
            .collect();
        names.join("/")
    }

    /*
     * Devices and packages =================================================
     */

    /// Registers a device variant, creating its package on first sight.
    pub fn create_device(&mut self, name: &str, manual: &str, package: &str) {
        self.packages
            .entry(package.to_string())
            .or_insert_with(|| DevicePackage::new(package));
        self.devices.insert(
            name.to_string(),
            DeviceVariant {
                name: name.to_string(),
                manual: manual.to_string(),
                package: package.to_string(),
            },
        );
    }

    /// All device variants.
    pub fn devices(&self) -> &BTreeMap<String, DeviceVariant> {
        &self.devices
    }

    /// All packages.
    pub fn packages(&self) -> &BTreeMap<String, DevicePackage> {
        &self.packages
    }

    /// Looks a package up by name.
    pub fn package(&self, name: &str) -> Option<&DevicePackage> {
        self.packages.get(name)
    }

    /// Records a pin's physical location within a registered package.
    pub fn add_placement(
        &mut self,
        package: &str,
        pin: &str,
        location: &str,
    ) -> Result<(), ModelError> {
        let package = self
            .packages
            .get_mut(package)
            .ok_or_else(|| ModelError::UnknownPackage(package.to_string()))?;
        package.add_pin(&PinName::new(pin), location);
        Ok(())
    }

    /*
     * Peripheral metadata ==================================================
     */

    /// All peripherals discovered through function interning or clock rows.
    pub fn peripherals(&self) -> &BTreeMap<String, Peripheral> {
        &self.peripherals
    }

    /// Attaches clock gating info to the named peripheral, creating the
    /// entry on demand.
    pub fn set_peripheral_clock(&mut self, name: &str, reg: &str, mask: &str) {
        let (base, instance) = split_peripheral_name(name);
        let peripheral = self
            .peripherals
            .entry(name.to_string())
            .or_insert_with(|| Peripheral::new(base, instance));
        peripheral.clock_reg = Some(reg.to_string());
        peripheral.clock_mask = Some(mask.to_string());
    }

    /// Attaches clock and interrupt info to every template whose peripheral
    /// name matches, case-insensitively.
    pub fn set_template_clock_info(
        &mut self,
        peripheral_name: &str,
        reg: &str,
        mask: &str,
        irqs: &[String],
    ) {
        for template in &mut self.templates {
            if template
                .peripheral_name()
                .eq_ignore_ascii_case(peripheral_name)
            {
                template.set_clock_info(reg, mask);
                for irq in irqs {
                    template.add_irq(irq);
                }
            }
        }
    }

    /*
     * Templates ============================================================
     */

    /// The family catalog, in recognition order.
    pub fn templates(&self) -> &[PeripheralTemplate] {
        &self.templates
    }

    /// One template by handle.
    pub fn template(&self, id: TemplateId) -> &PeripheralTemplate {
        &self.templates[id.0]
    }

    /// Writes a function into its family's signal table.
    ///
    /// Slots are write-once: assigning two different functions to the same
    /// index within one family is fatal.
    pub fn assign_signal_slot(
        &mut self,
        template: TemplateId,
        index: usize,
        function: FunctionId,
    ) -> Result<(), ModelError> {
        let existing = *self.templates[template.0].slot_mut(index)?;
        match existing {
            Some(old) if old != function => Err(ModelError::SignalIndexCollision {
                template: self.templates[template.0].base_name().to_string(),
                index,
                new: self.functions[function.0].name().to_string(),
                old: self.functions[old.0].name().to_string(),
            }),
            _ => {
                *self.templates[template.0].slot_mut(index)? = Some(function);
                Ok(())
            }
        }
    }

    /*
     * DMA ==================================================================
     */

    /// Appends one DMA slot entry.
    pub fn add_dma_entry(&mut self, instance: u32, channel: u32, source: &str) {
        self.dma_entries.push(DmaMuxInfo {
            instance,
            channel,
            source: source.to_string(),
        });
    }

    /// The flat DMA slot list, in input order.
    pub fn dma_entries(&self) -> &[DmaMuxInfo] {
        &self.dma_entries
    }

    /*
     * Consistency ==========================================================
     */

    /// Enforces the model invariants and classifies every pin into the
    /// peripheral families it can serve.
    ///
    /// Must run after parsing completes and before any emission; emission
    /// assumes a validated model.
    pub fn check_consistency(&mut self) -> Result<(), ModelError> {
        if self.packages.is_empty() {
            return Err(ModelError::NoPackages);
        }
        if self.devices.is_empty() {
            return Err(ModelError::NoDevices);
        }
        for pin in self.pins.values() {
            if pin.reset_mux().is_none() {
                return Err(ModelError::MissingReset(pin.name().to_string()));
            }
        }
        self.classify_pins();
        Ok(())
    }

    /// Groups pins by the peripheral family of the functions in their
    /// non-reset mappings.
    fn classify_pins(&mut self) {
        let mut families: BTreeMap<String, BTreeSet<PinName>> = BTreeMap::new();
        for template in &self.templates {
            if !template.has_pattern() {
                continue;
            }
            for pin in self.pins.values() {
                for (mux, mapping) in pin.mappings() {
                    if *mux == MuxSelection::Reset {
                        continue;
                    }
                    for id in &mapping.functions {
                        if template.matches(self.functions[id.0].name()) {
                            families
                                .entry(template.peripheral_name().to_string())
                                .or_default()
                                .insert(pin.name().clone());
                        }
                    }
                }
            }
        }
        self.pin_families = families;
    }

    /// Pins that can serve the named peripheral, per the classification pass.
    pub fn pins_for_family(&self, peripheral_name: &str) -> Option<&BTreeSet<PinName>> {
        self.pin_families.get(peripheral_name)
    }
}

/// Splits a peripheral row name into base name and instance,
/// e.g. `FTM0` => (`FTM`, `0`), `PORTA` => (`PORT`, `A`).
fn split_peripheral_name(name: &str) -> (&str, &str) {
    if let Some(letter) = name.strip_prefix("PORT") {
        if letter.len() == 1 && letter.chars().all(|c| c.is_ascii_uppercase()) {
            return ("PORT", letter);
        }
    }
    let digits_start = name
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(name.len());
    name.split_at(digits_start)
}

#[cfg(test)]
mod tests {
    use super::{split_peripheral_name, DeviceModel};
    use crate::error::ModelError;
    use crate::mux::MuxSelection;
    use crate::pin::PinName;
    use crate::signal::FunctionId;

    fn model() -> DeviceModel {
        DeviceModel::new("MK20D5", "MK20D5.csv")
    }

    #[test]
    fn interning_is_idempotent() {
        let mut model = model();
        let first = model.resolve_functions("FTM0_CH2", true).unwrap();
        let second = model.resolve_functions("FTM0_CH2", true).unwrap();
        assert_eq!(first[0].0, second[0].0);
        assert!(first[0].1);
        assert!(!second[0].1);
    }

    #[test]
    fn slash_lists_resolve_in_writing_order() {
        let mut model = model();
        let ab = model.resolve_functions("GPIOA_0/LLWU_P3", true).unwrap();
        let ba = model.resolve_functions("LLWU_P3/GPIOA_0", true).unwrap();
        assert_eq!(ab.len(), 2);
        assert_eq!(ab[0].0, ba[1].0);
        assert_eq!(ab[1].0, ba[0].0);
    }

    #[test]
    fn normalization_rewrites_legacy_port_names() {
        let mut model = model();
        let ids = model.resolve_functions("PTA4", true).unwrap();
        assert_eq!(model.function(ids[0].0).name(), "GPIOA_4");
    }

    #[test]
    fn disabled_resolves_to_the_sentinel() {
        let mut model = model();
        let ids = model.resolve_functions("Disabled", false).unwrap();
        assert_eq!(ids[0].0, FunctionId::DISABLED);
    }

    #[test]
    fn unknown_signals_are_rejected() {
        let mut model = model();
        assert!(matches!(
            model.resolve_functions("BOGUS_SIGNAL_42x", false),
            Err(ModelError::UnmatchedFunction(_))
        ));
    }

    #[test]
    fn duplicate_mappings_are_fatal() {
        let mut model = model();
        let ids = model.resolve_functions("GPIOA_0", true).unwrap();
        model.create_pin("PTA0").unwrap();
        model
            .add_mapping("PTA0", MuxSelection::Mux(1), vec![ids[0].0])
            .unwrap();
        assert!(matches!(
            model.add_mapping("PTA0", MuxSelection::Mux(1), vec![ids[0].0]),
            Err(ModelError::DuplicateMapping { .. })
        ));
    }

    #[test]
    fn signal_slots_are_write_once() {
        let mut model = model();
        let a = model.resolve_functions("FTM0_CH3", true).unwrap()[0].0;
        let b = model.resolve_functions("FTM0_CH4", true).unwrap()[0].0;
        let template = model.function(a).template().unwrap();
        model.assign_signal_slot(template, 3, a).unwrap();
        // Re-assigning the same function is a no-op.
        model.assign_signal_slot(template, 3, a).unwrap();
        assert!(matches!(
            model.assign_signal_slot(template, 3, b),
            Err(ModelError::SignalIndexCollision { .. })
        ));
    }

    #[test]
    fn consistency_requires_devices_and_packages() {
        let mut model = model();
        assert!(matches!(
            model.check_consistency(),
            Err(ModelError::NoPackages)
        ));
        model.create_device("MK20DX128M5", "K20P64M50SF0RM", "LQFP64");
        model.check_consistency().unwrap();
    }

    #[test]
    fn pins_missing_reset_entries_are_rejected() {
        let mut model = model();
        model.create_device("MK20DX128M5", "K20P64M50SF0RM", "LQFP64");
        model.create_pin("PTA0").unwrap();
        assert!(matches!(
            model.check_consistency(),
            Err(ModelError::MissingReset(_))
        ));
    }

    #[test]
    fn classification_groups_pins_by_family() {
        let mut model = model();
        model.create_device("MK20DX128M5", "K20P64M50SF0RM", "LQFP64");
        model.create_pin("PTA0").unwrap();
        let gpio = model.resolve_functions("GPIOA_0", true).unwrap()[0].0;
        let uart = model.resolve_functions("UART0_RX", true).unwrap()[0].0;
        model
            .add_mapping("PTA0", MuxSelection::Mux(1), vec![gpio])
            .unwrap();
        model
            .add_mapping("PTA0", MuxSelection::Mux(2), vec![uart])
            .unwrap();
        model
            .add_mapping("PTA0", MuxSelection::Reset, vec![FunctionId::DISABLED])
            .unwrap();
        model.set_pin_reset("PTA0", MuxSelection::Reset).unwrap();
        model.check_consistency().unwrap();
        let pta0 = PinName::new("PTA0");
        assert!(model.pins_for_family("PORTA").unwrap().contains(&pta0));
        assert!(model.pins_for_family("UART0").unwrap().contains(&pta0));
        assert!(model.pins_for_family("SPI0").is_none());
    }

    #[test]
    fn default_resolution_matches_function_lists() {
        let mut model = model();
        model.create_pin("PTA1").unwrap();
        let ids: Vec<_> = model
            .resolve_functions("GPIOA_1/LLWU_P2", true)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        model
            .add_mapping("PTA1", MuxSelection::Mux(1), ids)
            .unwrap();
        model.set_pin_default("PTA1", "GPIOA_1/LLWU_P2").unwrap();
        assert_eq!(
            model.pin("PTA1").unwrap().default_mux(),
            Some(MuxSelection::Mux(1))
        );
        assert!(matches!(
            model.set_pin_default("PTA1", "GPIOA_1/LLWU_P2"),
            Err(ModelError::DuplicateDefault(_))
        ));
        assert!(matches!(
            model.set_pin_default("PTA1", "UART0_TX"),
            Err(ModelError::DefaultNotMapped { .. })
        ));
    }

    #[test]
    fn peripheral_names_split_into_base_and_instance() {
        assert_eq!(split_peripheral_name("FTM0"), ("FTM", "0"));
        assert_eq!(split_peripheral_name("PORTA"), ("PORT", "A"));
        assert_eq!(split_peripheral_name("VREF"), ("VREF", ""));
    }
}
