use std::sync::OnceLock;

use regex::Regex;

use crate::error::ModelError;
use crate::signal::FunctionId;

/// Number of slots in one signal-index bank (and one emitted lookup table).
pub const BANK_SIZE: usize = 32;

/// Most banks any family splits its signal storage into.
const MAX_BANKS: usize = 4;

/// Handle of a [`PeripheralTemplate`] inside a
/// [`DeviceModel`](crate::DeviceModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateId(pub(crate) usize);

impl TemplateId {
    /// Index into the model's template list.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Tag identifying the peripheral family a template belongs to.
///
/// The set is closed: each tag selects the writer strategy that knows the
/// family's signal-name grammar and rendering rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyKind {
    /// GPIO port pins.
    DigitalIo,
    /// ADC inputs (single-ended and differential).
    AnalogueIn,
    /// Analog comparator inputs.
    Comparator,
    /// FlexTimer (FTM) channels and auxiliary inputs.
    FlexTimer,
    /// TPM timer/PWM channels.
    TimerPwm,
    /// I2C buses.
    I2c,
    /// SPI buses.
    Spi,
    /// UARTs.
    Uart,
    /// Low-power UARTs.
    Lpuart,
    /// Low-power timer inputs.
    Lptmr,
    /// Periodic interrupt timer.
    Pit,
    /// Low-leakage wake-up unit pins.
    Llwu,
    /// Touch-sense interface channels.
    Tsi,
    /// Voltage reference output.
    Vref,
    /// DMA request multiplexer (no pin functions).
    DmaMux,
    /// Fallback for signals no dedicated family recognizes.
    Misc,
}

impl FamilyKind {
    /// Whether this family's information class carries per-signal PCR lookup
    /// tables.
    ///
    /// Families without a table still get an information class when clock or
    /// interrupt metadata was attached to them.
    pub fn has_info_table(&self) -> bool {
        !matches!(
            self,
            FamilyKind::DigitalIo
                | FamilyKind::Pit
                | FamilyKind::Vref
                | FamilyKind::DmaMux
                | FamilyKind::Misc
        )
    }
}

/// One fixed-capacity bank of the signal-index table.
#[derive(Debug, Clone)]
pub struct SignalBank {
    slots: Vec<Option<FunctionId>>,
}

impl SignalBank {
    fn new() -> Self {
        SignalBank {
            slots: vec![None; BANK_SIZE],
        }
    }

    /// The bank's slots; always exactly [`BANK_SIZE`] entries.
    pub fn slots(&self) -> &[Option<FunctionId>] {
        &self.slots
    }

    /// True if no function was assigned to any slot.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Per-family recognition pattern, accumulated clock/interrupt metadata, and
/// the signal-index table used for code emission.
///
/// Templates are constructed once up front (see
/// [`standard_catalog`]), incrementally populated while pin rows are parsed,
/// and consumed read-only during emission.
#[derive(Debug, Clone)]
pub struct PeripheralTemplate {
    base_name: String,
    peripheral_name: String,
    family: FamilyKind,
    pattern: Option<Regex>,
    clock_reg: Option<String>,
    clock_mask: Option<String>,
    irq_nums: Vec<String>,
    banks: Vec<SignalBank>,
}

impl PeripheralTemplate {
    fn new(base_name: &str, peripheral_name: &str, pattern: Option<&str>, family: FamilyKind) -> Self {
        PeripheralTemplate {
            base_name: base_name.to_string(),
            peripheral_name: peripheral_name.to_string(),
            family,
            pattern: pattern.map(|p| Regex::new(p).unwrap()),
            clock_reg: None,
            clock_mask: None,
            irq_nums: Vec::new(),
            banks: Vec::new(),
        }
    }

    /// Mixed-case base name used for generated identifiers, e.g. `Ftm0`.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Peripheral name as it appears in signal names, e.g. `FTM0`.
    pub fn peripheral_name(&self) -> &str {
        &self.peripheral_name
    }

    /// The family tag binding this template to its writer strategy.
    pub fn family(&self) -> FamilyKind {
        self.family
    }

    /// True if this template can recognize functions at all.
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// Whether `name` belongs to this family.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(name))
    }

    /// Splits a matching name into (base name, instance, signal), or `None`
    /// if this template does not recognize it.
    pub fn captures(&self, name: &str) -> Option<(String, String, String)> {
        let caps = self.pattern.as_ref()?.captures(name)?;
        Some((caps[1].to_string(), caps[2].to_string(), caps[3].to_string()))
    }

    /// Clock gating register, e.g. `SCGC6`.
    pub fn clock_reg(&self) -> Option<&str> {
        self.clock_reg.as_deref()
    }

    /// Clock gating mask, e.g. `SIM_SCGC6_FTM0_MASK`.
    pub fn clock_mask(&self) -> Option<&str> {
        self.clock_mask.as_deref()
    }

    pub(crate) fn set_clock_info(&mut self, reg: &str, mask: &str) {
        self.clock_reg = Some(reg.to_string());
        self.clock_mask = Some(mask.to_string());
    }

    /// Interrupt numbers attached to this family.
    pub fn irq_nums(&self) -> &[String] {
        &self.irq_nums
    }

    pub(crate) fn add_irq(&mut self, irq: &str) {
        self.irq_nums.push(irq.to_string());
    }

    /// Interrupt numbers as a brace-initializer body, if any were attached.
    pub fn irqs_as_initializer(&self) -> Option<String> {
        if self.irq_nums.is_empty() {
            None
        } else {
            Some(self.irq_nums.join(", "))
        }
    }

    /// The populated signal banks. Trailing banks never written to are not
    /// materialized.
    pub fn banks(&self) -> &[SignalBank] {
        &self.banks
    }

    /// Function occupying a flat signal index, if any.
    pub fn function_at(&self, index: usize) -> Option<FunctionId> {
        self.banks
            .get(index / BANK_SIZE)
            .and_then(|bank| bank.slots[index % BANK_SIZE])
    }

    /// True iff any function was ever added to this family's table.
    pub fn needs_table(&self) -> bool {
        self.family.has_info_table() && self.banks.iter().any(|bank| !bank.is_empty())
    }

    /// Whether an information class must be emitted for this family: it
    /// either carries clock metadata or a populated signal table.
    pub fn class_is_used(&self) -> bool {
        self.clock_reg.is_some() || self.clock_mask.is_some() || self.needs_table()
    }

    pub(crate) fn slot_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut Option<FunctionId>, ModelError> {
        let bank = index / BANK_SIZE;
        if bank >= MAX_BANKS {
            return Err(ModelError::SignalIndexOutOfRange {
                template: self.base_name.clone(),
                index,
            });
        }
        while self.banks.len() <= bank {
            self.banks.push(SignalBank::new());
        }
        Ok(&mut self.banks[bank].slots[index % BANK_SIZE])
    }
}

/// Builds the family catalog: one template per known peripheral instance, in
/// recognition order, with the miscellaneous fallback last.
pub fn standard_catalog() -> Vec<PeripheralTemplate> {
    let mut templates = Vec::new();

    for port in 'A'..='I' {
        templates.push(PeripheralTemplate::new(
            &format!("Gpio{port}"),
            &format!("PORT{port}"),
            Some(&format!(r"^(GPIO)({port})_(\d+)$")),
            FamilyKind::DigitalIo,
        ));
    }
    for instance in 0..=3 {
        templates.push(PeripheralTemplate::new(
            &format!("Adc{instance}"),
            &format!("ADC{instance}"),
            Some(&format!(r"^(ADC)({instance})_((?:SE|DM|DP)\d+a?)$")),
            FamilyKind::AnalogueIn,
        ));
    }
    for instance in 0..=3 {
        templates.push(PeripheralTemplate::new(
            &format!("Cmp{instance}"),
            &format!("CMP{instance}"),
            Some(&format!(r"^(CMP)({instance})_(IN\d)$")),
            FamilyKind::Comparator,
        ));
    }
    templates.push(PeripheralTemplate::new(
        "DmaMux0",
        "DMAMUX0",
        None,
        FamilyKind::DmaMux,
    ));
    for instance in 0..=3 {
        templates.push(PeripheralTemplate::new(
            &format!("Ftm{instance}"),
            &format!("FTM{instance}"),
            Some(&format!(
                r"^(FTM)({instance})_(CH\d+|QD_PH[AB]|FLT\d|CLKIN\d)$"
            )),
            FamilyKind::FlexTimer,
        ));
    }
    for instance in 0..=3 {
        templates.push(PeripheralTemplate::new(
            &format!("I2c{instance}"),
            &format!("I2C{instance}"),
            Some(&format!(
                r"^(I2C)({instance})_(SCL|SDA|4WSCLOUT|4WSDAOUT)$"
            )),
            FamilyKind::I2c,
        ));
    }
    templates.push(PeripheralTemplate::new(
        "Lptmr0",
        "LPTMR0",
        Some(r"^(LPTMR)(0)_(ALT\d+)$"),
        FamilyKind::Lptmr,
    ));
    templates.push(PeripheralTemplate::new(
        "Pit",
        "PIT",
        Some(r"^(PIT)()(\d+)$"),
        FamilyKind::Pit,
    ));
    templates.push(PeripheralTemplate::new(
        "Llwu",
        "LLWU",
        Some(r"^(LLWU)()_(P\d+)$"),
        FamilyKind::Llwu,
    ));
    for instance in 0..=3 {
        templates.push(PeripheralTemplate::new(
            &format!("Spi{instance}"),
            &format!("SPI{instance}"),
            Some(&format!(
                r"^(SPI)({instance})_(SCK|SIN|SOUT|MISO|MOSI|SS|PCS\d*)$"
            )),
            FamilyKind::Spi,
        ));
    }
    for instance in 0..=3 {
        templates.push(PeripheralTemplate::new(
            &format!("Tpm{instance}"),
            &format!("TPM{instance}"),
            Some(&format!(r"^(TPM)({instance})_(CH\d+|QD_PH[AB])$")),
            FamilyKind::TimerPwm,
        ));
    }
    for instance in 0..=3 {
        templates.push(PeripheralTemplate::new(
            &format!("Tsi{instance}"),
            &format!("TSI{instance}"),
            Some(&format!(r"^(TSI)({instance})_(CH\d+)$")),
            FamilyKind::Tsi,
        ));
    }
    for instance in 0..=5 {
        templates.push(PeripheralTemplate::new(
            &format!("Uart{instance}"),
            &format!("UART{instance}"),
            Some(&format!(
                r"^(UART)({instance})_(TX|RX|CTS_b|RTS_b|COL_b)$"
            )),
            FamilyKind::Uart,
        ));
    }
    for instance in 0..=5 {
        templates.push(PeripheralTemplate::new(
            &format!("Lpuart{instance}"),
            &format!("LPUART{instance}"),
            Some(&format!(r"^(LPUART)({instance})_(TX|RX|CTS_b|RTS_b)$")),
            FamilyKind::Lpuart,
        ));
    }
    templates.push(PeripheralTemplate::new(
        "Vref",
        "VREF",
        Some(r"^(VREF)()_(OUT)$"),
        FamilyKind::Vref,
    ));
    templates.push(PeripheralTemplate::new(
        "Misc",
        "MISC",
        None,
        FamilyKind::Misc,
    ));

    templates
}

/// Recognizers for signal names no dedicated family claims. Each pattern
/// captures (base name, instance, signal).
pub(crate) fn misc_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^(PT)([A-Z])(\d+)$",
            r"^(ADC)(\d+)_((?:DM|DP|SE)\d+[ab]?)$",
            r"^(A?CMP)(\d+)_((?:IN\d*)|(?:OUT\d*))$",
            r"^(JTAG)()_(TCLK|TDI|TDO|TMS|TRST_b)$",
            r"^(SWD)()_(CLK|DIO|IO)$",
            r"^(EZP)()_(CLK|DI|DO|CS_b)$",
            r"^(TRACE)()_(SWO|CLKOUT|D[0-3])$",
            r"^(NMI)()(_[bB])$",
            r"^(USB\d*)()_(CLKIN|SOF_OUT|DP|DM)$",
            r"^(E?XTAL(?:32K?)?)(\d*)()$",
            r"^(EWM)()_(IN|OUT_b|OUT)$",
            r"^(PDB)(\d+)_(EXTRG)$",
            r"^(CMT)(\d*)_(IRO)$",
            r"^(RTC)(\d*)_(CLKOUT|CLKIN|WAKEUP_B)$",
            r"^(DAC)(\d+)_(OUT)$",
            r"^(CLKOUT(?:32K)?)()()$",
            r"^(I2S)(\d+)_(TX_BCLK|TXD[0-1]|RXD[0-1]|TX_FS|RX_BCLK|MCLK|RX_FS)$",
            r"^(SDHC)(\d+)_((?:CLKIN)|(?:D\d)|(?:CMD)|(?:DCLK))$",
            r"^(CAN)(\d+)_(TX|RX)$",
            r"^(R?MII)(\d+)_(RXCLK|RXER|RXD[0-4]|CRS_DV|RXDV|TXEN|TXD[0-4]|TXCLK|CRS|TXER|COL|MDIO|MDC)$",
            r"^(ENET)(\d*)_(1588_TMR[0-3]|CLKIN|1588_CLKIN)$",
            r"^(FB)()_((?:AD?\d+)|OE_b|RW_b|(?:CS[0-5]_b)|(?:TSIZ[0-1])|TBST_b|TA_b|ALE|TS_b)$",
            r"^(IRQ)()()$",
            r"^(RESET_[bB])()()$",
            r"^(EXTRG)()_(IN)$",
            r"^(TCLK)(\d+)()$",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}
