//! Device model for MCU pin-multiplexing descriptions
//!
//! A *device family* is described by a table mapping each physical pin to the
//! peripheral signals that can be routed onto it, one column per multiplexer
//! setting, plus the pin's reset and default selections and its location in
//! each physical package variant.
//!
//! This crate contains the in-memory model of such a family: interned
//! peripheral functions, pins with their mux mapping tables, package
//! placements, and the per-peripheral-family templates that accumulate
//! clock/interrupt metadata and the signal-index tables used for code
//! generation. The model is built up by a parser, checked with
//! [`DeviceModel::check_consistency`], and then traversed read-only by the
//! emitters.
//!
#![warn(missing_docs)]

mod device;
mod dma;
mod error;
mod mapping;
mod mux;
mod package;
mod pin;
mod signal;
mod template;

pub use device::DeviceModel;
pub use dma::DmaMuxInfo;
pub use error::ModelError;
pub use mapping::MappingInfo;
pub use mux::MuxSelection;
pub use package::{DevicePackage, DeviceVariant};
pub use pin::{natural_cmp, Pin, PinName};
pub use signal::{FunctionId, Peripheral, PeripheralFunction};
pub use template::{FamilyKind, PeripheralTemplate, SignalBank, TemplateId, BANK_SIZE};
