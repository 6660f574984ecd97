//! Writers for the UART and low-power UART families.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::{ordinal_index, Group, InstanceWriter};

const UART_SIGNALS: [&str; 5] = ["TX", "RX", "RTS_b", "CTS_b", "COL_b"];
const LPUART_SIGNALS: [&str; 4] = ["TX", "RX", "RTS_b", "CTS_b"];

pub(crate) struct UartWriter;

impl InstanceWriter for UartWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        ordinal_index(function, &UART_SIGNALS)
    }

    fn instance_prefix(&self) -> &'static str {
        "uart"
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
            name: "UART_Group",
            title: "Universal Asynchronous Receiver/Transmitter",
            brief: "Allows use of port pins for UART signals",
        }
    }
}

pub(crate) struct LpuartWriter;

impl InstanceWriter for LpuartWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        ordinal_index(function, &LPUART_SIGNALS)
    }

    fn instance_prefix(&self) -> &'static str {
        "lpuart"
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
            name: "LPUART_Group",
            title: "Low Power UART",
            brief: "Allows use of port pins for low-power UART signals",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UartWriter;
    use crate::writers::InstanceWriter;
    use pinmux_model::DeviceModel;

    #[test]
    fn modem_signals_follow_tx_and_rx() {
        let mut model = DeviceModel::new("X", "X.csv");
        let cts = model.resolve_functions("UART2_CTS_b", true).unwrap()[0].0;
        assert_eq!(UartWriter.signal_index(model.function(cts)).unwrap(), 3);
    }
}
