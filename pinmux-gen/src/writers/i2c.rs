//! Writer for I2C buses.
//!
//! No per-pin aliases are emitted: the usable unit is the whole bus, not a
//! pin, so only the information table is generated.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{ordinal_index, Group, InstanceWriter};

const SIGNALS: [&str; 4] = ["SCL", "SDA", "4WSCLOUT", "4WSDAOUT"];

pub(crate) struct I2cWriter;

impl InstanceWriter for I2cWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        ordinal_index(function, &SIGNALS)
    }

    fn instance_prefix(&self) -> &'static str {
        "i2c"
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
            name: "I2C_Group",
            title: "Inter-Integrated Circuit",
            brief: "Allows use of port pins for I2C bus signals",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::I2cWriter;
    use crate::writers::InstanceWriter;
    use pinmux_model::DeviceModel;

    #[test]
    fn signals_index_by_ordinal() {
        let mut model = DeviceModel::new("X", "X.csv");
        let scl = model.resolve_functions("I2C0_SCL", true).unwrap()[0].0;
        let sda = model.resolve_functions("I2C0_SDA", true).unwrap()[0].0;
        assert_eq!(I2cWriter.signal_index(model.function(scl)).unwrap(), 0);
        assert_eq!(I2cWriter.signal_index(model.function(sda)).unwrap(), 1);
    }
}
