//! Writer for GPIO port pins.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};
use std::fmt::Write as _;

use super::{bad_signal, clock_and_irq_constants, Group, InstanceWriter, NAMESPACE};

pub(crate) struct DigitalIoWriter;

impl InstanceWriter for DigitalIoWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        let digits: String = function
            .signal()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().map_err(|_| bad_signal(function))
    }

    fn instance_prefix(&self) -> &'static str {
        "gpio"
    }

    fn declaration(
        &self,
        model: &DeviceModel,
        template: &PeripheralTemplate,
        mapping: &MappingInfo,
        index: usize,
    ) -> Result<Option<String>> {
        let signal = self.signal_index(model.function(mapping.functions[index]))?;
        Ok(Some(format!(
            "const {NAMESPACE}::{}<{signal}>",
            template.base_name()
        )))
    }

    fn info_constants(&self, model: &DeviceModel, template: &PeripheralTemplate) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "   //! PORT Hardware base pointer\n   static constexpr uint32_t pcrAddress   = {}_BasePtr;\n\n",
            template.peripheral_name()
        );
        let _ = write!(
            out,
            "   //! GPIO Hardware base pointer\n   static constexpr uint32_t gpioAddress   = {}_BasePtr;\n\n",
            template.peripheral_name().replace("PORT", "GPIO")
        );
        out.push_str(
            "   //! Value for PCR (including MUX value)\n   static constexpr uint32_t pcrValue  = GPIO_DEFAULT_PCR;\n\n",
        );
        out.push_str(&clock_and_irq_constants(model, template));
        out
    }

    fn group(&self) -> Group {
        Group {
            name: "DigitalIO_Group",
            title: "Digital Input/Output",
            brief: "Allows use of port pins as simple digital inputs or outputs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DigitalIoWriter;
    use crate::writers::InstanceWriter;
    use pinmux_model::DeviceModel;

    #[test]
    fn index_is_the_bit_number() {
        let mut model = DeviceModel::new("X", "X.csv");
        let id = model.resolve_functions("GPIOC_13", true).unwrap()[0].0;
        assert_eq!(DigitalIoWriter.signal_index(model.function(id)).unwrap(), 13);
    }
}
