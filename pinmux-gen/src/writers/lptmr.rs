//! Writer for low-power timer inputs.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{bad_signal, Group, InstanceWriter};

pub(crate) struct LptmrWriter;

impl InstanceWriter for LptmrWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        function
            .signal()
            .strip_prefix("ALT")
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| bad_signal(function))
    }

    fn instance_prefix(&self) -> &'static str {
        "lptmr"
    }

    fn declaration(
        &self,
        _model: &DeviceModel,
        _template: &PeripheralTemplate,
        _mapping: &MappingInfo,
        _index: usize,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn uses_aliases(&self) -> bool {
        false
    }

    fn group(&self) -> Group {
        Group {
            name: "LPTMR_Group",
            title: "Low Power Timer",
            brief: "Allows use of port pins as low power timer inputs",
        }
    }
}
