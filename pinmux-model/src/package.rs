use std::collections::BTreeMap;

use crate::pin::PinName;

/// A physical package variant, e.g. `BGA121`, mapping pin names to physical
/// locations.
///
/// A pin with no entry is absent from the package.
#[derive(Debug, Clone)]
pub struct DevicePackage {
    name: String,
    locations: BTreeMap<PinName, String>,
}

impl DevicePackage {
    pub(crate) fn new(name: &str) -> Self {
        DevicePackage {
            name: name.to_string(),
            locations: BTreeMap::new(),
        }
    }

    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn add_pin(&mut self, pin: &PinName, location: &str) {
        self.locations.insert(pin.clone(), location.to_string());
    }

    /// Physical location of a pin within this package, or `None` if the pin
    /// is not bonded out.
    pub fn location(&self, pin: &str) -> Option<&str> {
        self.locations.get(&PinName::new(pin)).map(String::as_str)
    }

    /// All placements, in natural pin order.
    pub fn placements(&self) -> impl Iterator<Item = (&PinName, &str)> {
        self.locations.iter().map(|(pin, loc)| (pin, loc.as_str()))
    }
}

/// One device variant: a named device bound to a physical package.
#[derive(Debug, Clone)]
pub struct DeviceVariant {
    /// Device name, e.g. `MK20D5`.
    pub name: String,
    /// Reference manual identifier.
    pub manual: String,
    /// Name of the package this variant is offered in.
    pub package: String,
}
