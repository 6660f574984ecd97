//! Writer for low-leakage wake-up pins.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{bad_signal, Group, InstanceWriter};

pub(crate) struct LlwuWriter;

impl InstanceWriter for LlwuWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        function
            .signal()
            .strip_prefix('P')
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| bad_signal(function))
    }

    fn instance_prefix(&self) -> &'static str {
        "llwu"
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
            name: "LLWU_Group",
            title: "Low-Leakage Wake-up Unit",
            brief: "Allows use of port pins as wake-up sources",
        }
    }
}
