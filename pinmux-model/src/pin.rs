use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::mapping::MappingInfo;
use crate::mux::MuxSelection;

/// Compares names treating embedded digit runs as numbers, so that
/// `PTA2 < PTA10` and `ADC0_SE4 < ADC0_SE18`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn split(s: &str) -> (&str, &str, &str) {
        let digits_start = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (prefix, rest) = s.split_at(digits_start);
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, tail) = rest.split_at(digits_end);
        (prefix, digits, tail)
    }

    if a.is_empty() || b.is_empty() {
        return a.len().cmp(&b.len());
    }
    let (a_prefix, a_digits, a_tail) = split(a);
    let (b_prefix, b_digits, b_tail) = split(b);
    a_prefix
        .cmp(b_prefix)
        .then_with(|| {
            // A missing digit run sorts before any number.
            let a_num: i64 = a_digits.parse().unwrap_or(-1);
            let b_num: i64 = b_digits.parse().unwrap_or(-1);
            a_num.cmp(&b_num)
        })
        .then_with(|| natural_cmp(a_tail, b_tail))
}

/// A pin name ordered by [`natural_cmp`], used as the key of every pin map so
/// that iteration yields `PTA2` before `PTA10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinName(String);

impl PinName {
    /// Wraps a pin name.
    pub fn new(name: &str) -> Self {
        PinName(name.to_string())
    }

    /// The name as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for PinName {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for PinName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PinName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PinName {
    fn from(name: &str) -> Self {
        PinName::new(name)
    }
}

fn port_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*PT([A-Z])(\d+)\s*$").unwrap())
}

/// One physical/logical pin with its complete set of alternative functions.
#[derive(Debug, Clone)]
pub struct Pin {
    name: PinName,
    /// Port letter and bit number for `PT<letter><bit>` pins.
    port: Option<(char, String)>,
    mappings: BTreeMap<MuxSelection, MappingInfo>,
    reset_mux: Option<MuxSelection>,
    default_mux: Option<MuxSelection>,
}

impl Pin {
    pub(crate) fn new(name: &str) -> Self {
        let port = port_pattern()
            .captures(name)
            .map(|c| (c[1].chars().next().unwrap(), c[2].to_string()));
        Pin {
            name: PinName::new(name),
            port,
            mappings: BTreeMap::new(),
            reset_mux: None,
            default_mux: None,
        }
    }

    /// Pin name, e.g. `PTA3`.
    pub fn name(&self) -> &PinName {
        &self.name
    }

    /// Port letter for `PT<letter><bit>` pins.
    pub fn port_letter(&self) -> Option<char> {
        self.port.as_ref().map(|(letter, _)| *letter)
    }

    /// All mappings of this pin, keyed and ordered by mux selection.
    pub fn mappings(&self) -> &BTreeMap<MuxSelection, MappingInfo> {
        &self.mappings
    }

    /// Mapping at one selection, if present.
    pub fn mapping(&self, mux: MuxSelection) -> Option<&MappingInfo> {
        self.mappings.get(&mux)
    }

    pub(crate) fn mappings_mut(&mut self) -> &mut BTreeMap<MuxSelection, MappingInfo> {
        &mut self.mappings
    }

    /// The selection active at hardware reset (`Reset`, `Fixed`, or a
    /// numbered selection).
    pub fn reset_mux(&self) -> Option<MuxSelection> {
        self.reset_mux
    }

    pub(crate) fn set_reset_mux(&mut self, mux: MuxSelection) {
        self.reset_mux = Some(mux);
    }

    /// The explicitly declared default selection, if any.
    pub fn default_mux(&self) -> Option<MuxSelection> {
        self.default_mux
    }

    pub(crate) fn set_default_mux(&mut self, mux: MuxSelection) {
        self.default_mux = Some(mux);
    }

    /// The default selection, falling back to the reset selection when no
    /// default was declared.
    pub fn default_or_reset(&self) -> MuxSelection {
        self.default_mux
            .or(self.reset_mux)
            .unwrap_or(MuxSelection::Reset)
    }

    /// PCR register expression, e.g. `&PORTA->PCR[3]`.
    pub fn pcr_register(&self) -> Option<String> {
        self.port
            .as_ref()
            .map(|(letter, bit)| format!("&PORT{letter}->PCR[{bit}]"))
    }

    /// Base pointer of the owning port, e.g. `PORTC_BasePtr`.
    pub fn port_base_ptr(&self) -> Option<String> {
        self.port
            .as_ref()
            .map(|(letter, _)| format!("PORT{letter}_BasePtr"))
    }

    /// Clock mask of the owning port, e.g. `PORTA_CLOCK_MASK`.
    pub fn port_clock_mask(&self) -> Option<String> {
        self.port
            .as_ref()
            .map(|(letter, _)| format!("PORT{letter}_CLOCK_MASK"))
    }

    /// Base pointer of the associated GPIO, e.g. `GPIOA_BasePtr`.
    pub fn gpio_base_ptr(&self) -> Option<String> {
        self.port
            .as_ref()
            .map(|(letter, _)| format!("GPIO{letter}_BasePtr"))
    }

    /// Bit number within the associated GPIO.
    pub fn gpio_bit(&self) -> Option<&str> {
        self.port.as_ref().map(|(_, bit)| bit.as_str())
    }

    /// Leading columns of a PCR info table row, e.g. for `PTB4`:
    ///
    /// ```text
    /// PORTB_CLOCK_MASK, PORTB_BasePtr,  GPIOB_BasePtr,  4,
    /// ```
    ///
    /// Pins without a PCR (typically analog-only pins) yield `0, 0, 0, 0, `.
    pub fn pcr_init_fields(&self) -> String {
        match &self.port {
            None => "0, 0, 0, 0, ".to_string(),
            Some((letter, bit)) => format!(
                "{:<17} {:<15} {:<15} {:<4}",
                format!("PORT{letter}_CLOCK_MASK,"),
                format!("PORT{letter}_BasePtr,"),
                format!("GPIO{letter}_BasePtr,"),
                format!("{bit},"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{natural_cmp, Pin, PinName};
    use std::cmp::Ordering;

    #[test]
    fn natural_order_treats_digit_runs_as_numbers() {
        assert_eq!(natural_cmp("PTA2", "PTA10"), Ordering::Less);
        assert_eq!(natural_cmp("PTA10", "PTB1"), Ordering::Less);
        assert_eq!(natural_cmp("PTA3", "PTA3"), Ordering::Equal);
        assert_eq!(natural_cmp("ADC0_SE18", "ADC0_SE4"), Ordering::Greater);
    }

    #[test]
    fn missing_digit_run_sorts_first() {
        assert_eq!(natural_cmp("PTA", "PTA0"), Ordering::Less);
    }

    #[test]
    fn pin_names_sort_naturally() {
        let mut names = vec![
            PinName::new("PTA10"),
            PinName::new("PTA2"),
            PinName::new("PTB1"),
        ];
        names.sort();
        let names: Vec<_> = names.iter().map(PinName::as_str).collect();
        assert_eq!(names, ["PTA2", "PTA10", "PTB1"]);
    }

    #[test]
    fn port_pins_expose_pcr_helpers() {
        let pin = Pin::new("PTC4");
        assert_eq!(pin.port_letter(), Some('C'));
        assert_eq!(pin.pcr_register().unwrap(), "&PORTC->PCR[4]");
        assert_eq!(pin.port_clock_mask().unwrap(), "PORTC_CLOCK_MASK");
        assert_eq!(pin.gpio_base_ptr().unwrap(), "GPIOC_BasePtr");
        assert_eq!(pin.gpio_bit(), Some("4"));
    }

    #[test]
    fn non_port_pins_have_no_pcr() {
        let pin = Pin::new("ADC0_DP0");
        assert_eq!(pin.port_letter(), None);
        assert_eq!(pin.pcr_init_fields(), "0, 0, 0, 0, ");
    }
}
