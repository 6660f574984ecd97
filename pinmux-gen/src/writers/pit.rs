//! Writer for the periodic interrupt timer.
//!
//! The PIT has no pin multiplexing; only clock and interrupt metadata flow
//! into its information class.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{bad_signal, Group, InstanceWriter};

pub(crate) struct PitWriter;

impl InstanceWriter for PitWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        function
            .signal()
            .parse()
            .map_err(|_| bad_signal(function))
    }

    fn instance_prefix(&self) -> &'static str {
        "pit"
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
            name: "PIT_Group",
            title: "Programmable Interrupt Timer",
            brief: "Periodic interrupt timer support",
        }
    }
}
