use crate::mux::MuxSelection;
use crate::signal::FunctionId;

/// The association of one pin, one mux selection, and the function(s) active
/// at that selection.
///
/// A single pin position can expose more than one logical function name
/// (e.g. `GPIOC_6/LLWU_P10`); the list preserves the order the names were
/// written in, which becomes display and alias order later.
#[derive(Debug, Clone)]
pub struct MappingInfo {
    /// The multiplexer selection that routes these functions onto the pin.
    pub mux: MuxSelection,
    /// The functions active at this selection, in declaration order.
    pub functions: Vec<FunctionId>,
}

impl MappingInfo {
    pub(crate) fn new(mux: MuxSelection, functions: Vec<FunctionId>) -> Self {
        MappingInfo { mux, functions }
    }
}
