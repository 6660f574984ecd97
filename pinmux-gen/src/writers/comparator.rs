//! Writer for analog comparator inputs.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{bad_signal, indexed_declaration, Group, InstanceWriter};

pub(crate) struct ComparatorWriter;

impl InstanceWriter for ComparatorWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        function
            .signal()
            .strip_prefix("IN")
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| bad_signal(function))
    }

    fn instance_prefix(&self) -> &'static str {
        "cmp"
    }

    fn declaration(
        &self,
        model: &DeviceModel,
        template: &PeripheralTemplate,
        mapping: &MappingInfo,
        index: usize,
    ) -> Result<Option<String>> {
        let signal = self.signal_index(model.function(mapping.functions[index]))?;
        Ok(Some(indexed_declaration(template.base_name(), signal)))
    }

    fn group(&self) -> Group {
        Group {
            name: "Cmp_Group",
            title: "Analogue Comparator",
            brief: "Allows use of port pins as comparator inputs",
        }
    }
}
