//! Writer for the DMA request multiplexer.
//!
//! The DMAMUX recognizes no pin functions at all; its contribution to the
//! output is the slot enumeration built from the DMA rows.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{no_signal_table, Group, InstanceWriter};

pub(crate) struct DmaMuxWriter;

impl InstanceWriter for DmaMuxWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        Err(no_signal_table(function, "DmaMux"))
    }

    fn instance_prefix(&self) -> &'static str {
        "dma"
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
            name: "DMA_Group",
            title: "Direct Memory Access (DMA)",
            brief: "Support for DMA operations",
        }
    }
}
