use std::fmt;

/// One multiplexer selection on a pin.
///
/// The numbered selections correspond directly to the `ALT<n>` columns of the
/// input table. The three sentinels describe selections that are not chosen
/// through the multiplexer field: the function active at hardware reset, a
/// hard-wired (non-multiplexed) function, and the disabled state.
///
/// The ordering places the sentinels before the numbered selections, which is
/// the order mapping tables are listed in the emitted artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MuxSelection {
    /// No function is routed to the pin.
    Disabled,
    /// The function active at hardware reset. Not necessarily selectable as a
    /// numbered mux value.
    Reset,
    /// The pin's only function is hard-wired; there is no multiplexer.
    Fixed,
    /// Multiplexer setting `ALT<n>`.
    Mux(u8),
}

impl MuxSelection {
    /// Numeric value used in generated selector macros.
    ///
    /// Sentinels are negative so that `<PIN>_SIG_SEL >= 0` can gate code that
    /// must only run for an explicitly selected multiplexer value.
    pub fn value(&self) -> i32 {
        match self {
            MuxSelection::Disabled => -3,
            MuxSelection::Reset => -2,
            MuxSelection::Fixed => -1,
            MuxSelection::Mux(n) => i32::from(*n),
        }
    }

    /// True for `Mux(n)` selections.
    pub fn is_numbered(&self) -> bool {
        matches!(self, MuxSelection::Mux(_))
    }
}

impl fmt::Display for MuxSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuxSelection::Disabled => write!(f, "disabled"),
            MuxSelection::Reset => write!(f, "reset"),
            MuxSelection::Fixed => write!(f, "fixed"),
            MuxSelection::Mux(n) => write!(f, "mux{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MuxSelection;

    #[test]
    fn sentinels_order_before_numbered_selections() {
        let mut selections = vec![
            MuxSelection::Mux(3),
            MuxSelection::Reset,
            MuxSelection::Mux(0),
            MuxSelection::Disabled,
            MuxSelection::Fixed,
        ];
        selections.sort();
        assert_eq!(
            selections,
            vec![
                MuxSelection::Disabled,
                MuxSelection::Reset,
                MuxSelection::Fixed,
                MuxSelection::Mux(0),
                MuxSelection::Mux(3),
            ]
        );
    }

    #[test]
    fn selector_values() {
        assert_eq!(MuxSelection::Disabled.value(), -3);
        assert_eq!(MuxSelection::Reset.value(), -2);
        assert_eq!(MuxSelection::Fixed.value(), -1);
        assert_eq!(MuxSelection::Mux(5).value(), 5);
    }

    #[test]
    fn display_names() {
        assert_eq!(MuxSelection::Mux(2).to_string(), "mux2");
        assert_eq!(MuxSelection::Reset.to_string(), "reset");
    }
}
