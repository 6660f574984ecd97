//! Writer for the voltage reference output.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{bad_signal, Group, InstanceWriter};

pub(crate) struct VrefWriter;

impl InstanceWriter for VrefWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        if function.signal() == "OUT" {
            Ok(0)
        } else {
            Err(bad_signal(function))
        }
    }

    fn instance_prefix(&self) -> &'static str {
        "vref"
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
            name: "VREF_Group",
            title: "Voltage Reference",
            brief: "Voltage reference output",
        }
    }
}
