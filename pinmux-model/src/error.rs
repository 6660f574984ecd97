use thiserror::Error;

/// Fatal model-integrity and consistency violations.
///
/// Every variant carries the identity of the offending pin, function, or
/// package so the operator can locate the input row that caused it. Any of
/// these aborts the whole run; there is no recovery.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A pin row was seen twice.
    #[error("pin already exists: {0}")]
    DuplicatePin(String),

    /// An operation referenced a pin no row declared.
    #[error("no such pin: {0}")]
    UnknownPin(String),

    /// A function with this name was already interned.
    #[error("peripheral function already exists: {0}")]
    DuplicateFunction(String),

    /// A signal name matched no template and no miscellaneous pattern.
    #[error("no pattern matched peripheral function '{0}'")]
    UnmatchedFunction(String),

    /// Two mappings were declared for the same (pin, mux selection) pair.
    #[error("pin {pin} already has a mapping at {mux}")]
    DuplicateMapping {
        /// Pin carrying the duplicate entry.
        pin: String,
        /// The selection declared twice.
        mux: crate::MuxSelection,
    },

    /// A pin declared more than one reset selection.
    #[error("pin {0} already has a reset selection")]
    DuplicateReset(String),

    /// A pin declared more than one default selection.
    #[error("pin {0} already has a default selection")]
    DuplicateDefault(String),

    /// A default cell named a function that is not mapped to the pin.
    #[error("'{function}' is not an option for pin {pin}")]
    DefaultNotMapped {
        /// Pin the default was declared for.
        pin: String,
        /// The function text that did not resolve.
        function: String,
    },

    /// A placement referenced a package no device row declared.
    #[error("package {0} is not registered")]
    UnknownPackage(String),

    /// Two different functions computed the same signal index within one
    /// family's table.
    #[error(
        "multiple functions mapped to index {index} of {template}: new = {new}, old = {old}"
    )]
    SignalIndexCollision {
        /// The template whose table is affected.
        template: String,
        /// Flat signal index (32 times the bank number plus the slot).
        index: usize,
        /// Function being added.
        new: String,
        /// Function already occupying the slot.
        old: String,
    },

    /// A signal index fell outside the family's table capacity.
    #[error("signal index {index} out of range for {template}")]
    SignalIndexOutOfRange {
        /// The template whose table is affected.
        template: String,
        /// The rejected flat index.
        index: usize,
    },

    /// The input declared no device rows.
    #[error("no devices found in file")]
    NoDevices,

    /// The input declared no package columns.
    #[error("no packages provided")]
    NoPackages,

    /// A pin ended up without any reset mapping entry.
    #[error("pin {0} has no reset selection")]
    MissingReset(String),
}
