//! Writer for TPM timer/PWM channels.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};

use super::flex_timer::{timer_info_constants, timer_signal_index};
use super::{Group, InstanceWriter, NAMESPACE};

pub(crate) struct TimerPwmWriter;

impl InstanceWriter for TimerPwmWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        timer_signal_index(function, false)
    }

    fn instance_prefix(&self) -> &'static str {
        "tpm"
    }

    fn instance_name(&self, model: &DeviceModel, mapping: &MappingInfo, index: usize) -> String {
        let function = model.function(mapping.functions[index]);
        format!(
            "tpm{}_{}",
            function.instance(),
            function.signal().replace("CH", "ch")
        )
    }

    fn declaration(
        &self,
        model: &DeviceModel,
        _template: &PeripheralTemplate,
        mapping: &MappingInfo,
        index: usize,
    ) -> Result<Option<String>> {
        let function = model.function(mapping.functions[index]);
        let signal = self.signal_index(function)?;
        Ok(Some(format!(
            "const {NAMESPACE}::Tpm{}<{signal}>",
            function.instance()
        )))
    }

    fn alias_name(&self, instance_name: &str, alias: &str) -> Option<String> {
        if instance_name.contains("_ch") {
            Some(format!("tpm_{alias}"))
        } else {
            None
        }
    }

    fn info_constants(&self, model: &DeviceModel, template: &PeripheralTemplate) -> String {
        let mut out = super::clock_and_irq_constants(model, template);
        let base = format!(
            "   //! Hardware base pointer\n   static constexpr uint32_t basePtr   = {}_BasePtr;\n\n   //! Base value for PCR (excluding MUX value)\n   static constexpr uint32_t pcrValue  = DEFAULT_PCR;\n\n",
            template.peripheral_name()
        );
        out.insert_str(0, &base);
        out.push_str(&timer_info_constants(template));
        out
    }

    fn group(&self) -> Group {
        Group {
            name: "PwmIO_Group",
            title: "PWM, Input capture, Output compare",
            brief: "Allows use of port pins as PWM outputs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TimerPwmWriter;
    use crate::writers::InstanceWriter;
    use pinmux_model::DeviceModel;

    #[test]
    fn fault_inputs_are_not_part_of_the_tpm_grammar() {
        let mut model = DeviceModel::new("X", "X.csv");
        // Resolve through the FTM family, then probe the TPM grammar.
        let id = model.resolve_functions("FTM0_FLT1", true).unwrap()[0].0;
        assert!(TimerPwmWriter.signal_index(model.function(id)).is_err());
    }
}
