//! Writer for SPI buses.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{bad_signal, ordinal_index, Group, InstanceWriter};

const SIGNALS: [&str; 6] = ["SCK", "SIN", "SOUT", "MISO", "MOSI", "SS"];

pub(crate) struct SpiWriter;

impl InstanceWriter for SpiWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        if let Some(rest) = function.signal().strip_prefix("PCS") {
            let select: usize = if rest.is_empty() {
                0
            } else {
                rest.parse().map_err(|_| bad_signal(function))?
            };
            return Ok(SIGNALS.len() + select);
        }
        ordinal_index(function, &SIGNALS)
    }

    fn instance_prefix(&self) -> &'static str {
        "spi"
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
            name: "SPI_Group",
            title: "Serial Peripheral Interface",
            brief: "Allows use of port pins for SPI bus signals",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SpiWriter;
    use crate::writers::InstanceWriter;
    use pinmux_model::DeviceModel;

    #[test]
    fn peripheral_chip_selects_follow_the_named_signals() {
        let mut model = DeviceModel::new("X", "X.csv");
        let sck = model.resolve_functions("SPI0_SCK", true).unwrap()[0].0;
        let pcs0 = model.resolve_functions("SPI0_PCS0", true).unwrap()[0].0;
        let pcs3 = model.resolve_functions("SPI0_PCS3", true).unwrap()[0].0;
        assert_eq!(SpiWriter.signal_index(model.function(sck)).unwrap(), 0);
        assert_eq!(SpiWriter.signal_index(model.function(pcs0)).unwrap(), 6);
        assert_eq!(SpiWriter.signal_index(model.function(pcs3)).unwrap(), 9);
    }
}
