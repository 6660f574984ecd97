//! Fallback writer for signals no dedicated family recognizes.
//!
//! Miscellaneous functions take part in pin mapping (selector macros, XML)
//! but contribute no signal table and no per-pin declarations.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{no_signal_table, Group, InstanceWriter};

pub(crate) struct MiscWriter;

impl InstanceWriter for MiscWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        Err(no_signal_table(function, "Misc"))
    }

    fn instance_prefix(&self) -> &'static str {
        "misc"
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

    fn uses_guard(&self) -> bool {
        false
    }

    fn uses_aliases(&self) -> bool {
        false
    }

    fn group(&self) -> Group {
        Group {
            name: "Misc_Group",
            title: "Miscellaneous",
            brief: "Miscellaneous signals",
        }
    }
}
