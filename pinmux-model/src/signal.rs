use crate::template::TemplateId;

/// Handle of an interned [`PeripheralFunction`] inside a
/// [`DeviceModel`](crate::DeviceModel).
///
/// Function identities are unique by name; resolving the same signal text
/// twice yields the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub(crate) usize);

impl FunctionId {
    /// The distinguished "Disabled" function, interned at model construction.
    pub const DISABLED: FunctionId = FunctionId(0);

    /// Index into the model's function arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One peripheral instance, e.g. `FTM` + `2`.
#[derive(Debug, Clone)]
pub struct Peripheral {
    /// Base name, e.g. `FTM2` => `FTM`.
    pub base_name: String,
    /// Instance, e.g. `FTM2` => `2`.
    pub instance: String,
    /// Clock gating register, e.g. `SCGC6`, once peripheral metadata has been
    /// processed.
    pub clock_reg: Option<String>,
    /// Clock gating mask, e.g. `SIM_SCGC6_FTM2_MASK`.
    pub clock_mask: Option<String>,
}

impl Peripheral {
    pub(crate) fn new(base_name: &str, instance: &str) -> Self {
        Peripheral {
            base_name: base_name.to_string(),
            instance: instance.to_string(),
            clock_reg: None,
            clock_mask: None,
        }
    }

    /// Full name, e.g. `FTM2`.
    pub fn name(&self) -> String {
        format!("{}{}", self.base_name, self.instance)
    }
}

/// A named hardware signal that may be routed to one or more pins,
/// e.g. `FTM0_CH3`.
#[derive(Debug, Clone)]
pub struct PeripheralFunction {
    name: String,
    base_name: String,
    instance: String,
    signal: String,
    template: Option<TemplateId>,
}

impl PeripheralFunction {
    pub(crate) fn new(
        name: &str,
        base_name: &str,
        instance: &str,
        signal: &str,
        template: Option<TemplateId>,
    ) -> Self {
        PeripheralFunction {
            name: name.to_string(),
            base_name: base_name.to_string(),
            instance: instance.to_string(),
            signal: signal.to_string(),
            template,
        }
    }

    /// Full name, e.g. `FTM0_CH3`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning peripheral base name, e.g. `FTM0_CH3` => `FTM`.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Owning peripheral instance, e.g. `FTM0_CH3` => `0`.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Signal suffix, e.g. `FTM0_CH3` => `CH3`, `SPI0_SCK` => `SCK`.
    pub fn signal(&self) -> &str {
        &self.signal
    }

    /// Template this function was recognized by.
    pub fn template(&self) -> Option<TemplateId> {
        self.template
    }

    /// True for the disabled sentinel function.
    pub fn is_disabled(&self) -> bool {
        self.name.eq_ignore_ascii_case("Disabled")
    }
}
