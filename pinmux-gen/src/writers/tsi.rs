//! Writer for touch-sense interface channels.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{bad_signal, Group, InstanceWriter};

pub(crate) struct TsiWriter;

impl InstanceWriter for TsiWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        function
            .signal()
            .strip_prefix("CH")
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| bad_signal(function))
    }

    fn instance_prefix(&self) -> &'static str {
        "tsi"
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
            name: "TSI_Group",
            title: "Touch Sense Interface",
            brief: "Allows use of port pins as touch sense inputs",
        }
    }
}
