/// One DMA multiplexer slot: which request source is wired to which channel
/// of which DMAMUX instance.
///
/// These entries form a flat auxiliary list; they are not linked into the pin
/// graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmaMuxInfo {
    /// DMAMUX instance number.
    pub instance: u32,
    /// Channel (slot) number within the instance.
    pub channel: u32,
    /// Request source name, e.g. `UART0_Receive`.
    pub source: String,
}
