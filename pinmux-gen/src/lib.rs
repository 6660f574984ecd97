//! Pin-mapping generator.
//!
//! Reads a device family's pin-multiplexing table (comma-separated rows, see
//! [`csv`]), builds and validates a [`pinmux_model::DeviceModel`], and emits
//! the per-family artifacts: an XML description of the family and per-device
//! C++ pin-mapping headers/sources with conditional-compilation guards.

pub mod csv;
pub mod doc;
pub mod emit_header;
pub mod emit_xml;
pub mod parser;
pub mod writers;
pub mod xml;
