//! Per-family writer strategies.
//!
//! Each peripheral family knows how to compute a family-local signal index
//! from a function's signal name, how to name instances and aliases, and how
//! to render its information class. The family set is closed: a
//! [`FamilyKind`] tag selects the strategy through [`writer_for`].

use anyhow::{bail, Result};
use pinmux_model::{
    DeviceModel, FamilyKind, MappingInfo, PeripheralFunction, PeripheralTemplate, BANK_SIZE,
};
use std::fmt::Write as _;

mod analogue_in;
mod comparator;
mod digital_io;
mod dma_mux;
mod flex_timer;
mod i2c;
mod llwu;
mod lptmr;
mod misc;
mod pit;
mod spi;
mod timer_pwm;
mod tsi;
mod uart;
mod vref;

/// Namespace the generated declarations live in.
pub const NAMESPACE: &str = "hal";

/// Documentation group a family's output is placed under.
pub struct Group {
    /// Group identifier, e.g. `DigitalIO_Group`.
    pub name: &'static str,
    /// Group title.
    pub title: &'static str,
    /// One-line description.
    pub brief: &'static str,
}

/// The capability interface every peripheral family implements.
pub trait InstanceWriter {
    /// Computes the family-local signal index of a function.
    ///
    /// Fails when the signal text does not match the family's signal-name
    /// grammar.
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize>;

    /// Identifier used for declarations and as alias base,
    /// e.g. `gpioA_3`, `ftm0_ch6`.
    fn instance_name(&self, model: &DeviceModel, mapping: &MappingInfo, index: usize) -> String {
        let function = model.function(mapping.functions[index]);
        format!(
            "{}{}_{}",
            self.instance_prefix(),
            function.instance(),
            function.signal()
        )
    }

    /// Lower-case prefix for instance names, e.g. `gpio`.
    fn instance_prefix(&self) -> &'static str;

    /// Type instantiation string for a per-pin declaration, or `None` if this
    /// family emits no per-pin declarations (its usable unit is the whole
    /// peripheral).
    fn declaration(
        &self,
        model: &DeviceModel,
        template: &PeripheralTemplate,
        mapping: &MappingInfo,
        index: usize,
    ) -> Result<Option<String>>;

    /// Alias for a package location, or `None` if this signal is not aliased.
    fn alias_name(&self, _instance_name: &str, alias: &str) -> Option<String> {
        Some(format!("{}_{alias}", self.instance_prefix()))
    }

    /// Whether per-pin declarations are guarded by the pin's selector macro.
    fn uses_guard(&self) -> bool {
        true
    }

    /// Whether package-location aliases are emitted for this family.
    fn uses_aliases(&self) -> bool {
        true
    }

    /// Name of one 32-entry lookup table, by bank number.
    fn bank_name(&self, bank: usize) -> String {
        if bank == 0 {
            "info".to_string()
        } else {
            format!("info{bank}")
        }
    }

    /// Constant section of the family's information class.
    fn info_constants(&self, model: &DeviceModel, template: &PeripheralTemplate) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "   //! Hardware base pointer\n   static constexpr uint32_t basePtr   = {}_BasePtr;\n\n",
            template.peripheral_name()
        );
        out.push_str(
            "   //! Base value for PCR (excluding MUX value)\n   static constexpr uint32_t pcrValue  = DEFAULT_PCR;\n\n",
        );
        out.push_str(&clock_and_irq_constants(model, template));
        out
    }

    /// Documentation group for this family.
    fn group(&self) -> Group;
}

/// Shared tail of the information-class constants: clock gating and IRQs.
pub(crate) fn clock_and_irq_constants(
    _model: &DeviceModel,
    template: &PeripheralTemplate,
) -> String {
    let mut out = String::new();
    if let Some(mask) = template.clock_mask() {
        let _ = write!(
            out,
            "   //! Clock mask for peripheral\n   static constexpr uint32_t clockMask = {mask};\n\n"
        );
    }
    if let Some(reg) = template.clock_reg() {
        let _ = write!(
            out,
            "   //! Address of clock register for peripheral\n   static constexpr uint32_t clockReg  = SIM_BasePtr+offsetof(SIM_Type,{reg});\n\n"
        );
    }
    if let Some(irqs) = template.irqs_as_initializer() {
        let _ = write!(
            out,
            "   //! Number of IRQs for hardware\n   static constexpr uint32_t irqCount  = {};\n\n",
            template.irq_nums().len()
        );
        let _ = write!(
            out,
            "   //! IRQ numbers for hardware\n   static constexpr IRQn_Type irqNums[]  = {{{irqs}}};\n\n"
        );
    }
    out
}

/// Simple type-instantiation declaration shared by the pin-addressed
/// families, e.g. `const hal::Adc0<19>`.
pub(crate) fn indexed_declaration(
    base_name: &str,
    signal_index: usize,
) -> String {
    format!(
        "const {NAMESPACE}::{base_name}<{}>",
        signal_index % BANK_SIZE
    )
}

/// Looks the writer strategy up by family tag.
pub fn writer_for(kind: FamilyKind) -> &'static dyn InstanceWriter {
    match kind {
        FamilyKind::DigitalIo => &digital_io::DigitalIoWriter,
        FamilyKind::AnalogueIn => &analogue_in::AnalogueInWriter,
        FamilyKind::Comparator => &comparator::ComparatorWriter,
        FamilyKind::FlexTimer => &flex_timer::FlexTimerWriter,
        FamilyKind::TimerPwm => &timer_pwm::TimerPwmWriter,
        FamilyKind::I2c => &i2c::I2cWriter,
        FamilyKind::Spi => &spi::SpiWriter,
        FamilyKind::Uart => &uart::UartWriter,
        FamilyKind::Lpuart => &uart::LpuartWriter,
        FamilyKind::Lptmr => &lptmr::LptmrWriter,
        FamilyKind::Pit => &pit::PitWriter,
        FamilyKind::Llwu => &llwu::LlwuWriter,
        FamilyKind::Tsi => &tsi::TsiWriter,
        FamilyKind::Vref => &vref::VrefWriter,
        FamilyKind::DmaMux => &dma_mux::DmaMuxWriter,
        FamilyKind::Misc => &misc::MiscWriter,
    }
}

/// Error for families that have no signal table at all.
pub(crate) fn no_signal_table(function: &PeripheralFunction, family: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Function {}, signal {} does not belong to an indexed family ({family})",
        function.name(),
        function.signal()
    )
}

/// Standard grammar-mismatch error.
pub(crate) fn bad_signal(function: &PeripheralFunction) -> anyhow::Error {
    anyhow::anyhow!(
        "Function {}, signal {} does not match expected pattern",
        function.name(),
        function.signal()
    )
}

/// Parses an ordinal index out of a fixed signal-name list.
pub(crate) fn ordinal_index(
    function: &PeripheralFunction,
    names: &[&str],
) -> Result<usize> {
    for (index, name) in names.iter().enumerate() {
        if name.eq_ignore_ascii_case(function.signal()) {
            return Ok(index);
        }
    }
    bail!(
        "Signal {} does not match expected pattern for {}",
        function.signal(),
        function.name()
    )
}
