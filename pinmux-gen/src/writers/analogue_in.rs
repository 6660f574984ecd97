//! Writer for analog (ADC) inputs.
//!
//! The family stores single-ended channels in the primary bank (`a`-suffixed
//! alternates shifted up by one bank) and the differential minus/plus
//! channels in their own named banks.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate, BANK_SIZE};
use regex::Regex;
use std::sync::OnceLock;

use super::{bad_signal, indexed_declaration, Group, InstanceWriter};

pub(crate) struct AnalogueInWriter;

fn signal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(SE|DM|DP)(\d+)(a)?$").unwrap())
}

impl InstanceWriter for AnalogueInWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        let caps = signal_pattern()
            .captures(function.signal())
            .ok_or_else(|| bad_signal(function))?;
        let channel: usize = caps[2].parse().map_err(|_| bad_signal(function))?;
        let index = match &caps[1] {
            "SE" => channel,
            "DM" => 2 * BANK_SIZE + channel,
            _ => 3 * BANK_SIZE + channel,
        };
        // An `a` suffix selects the alternate channel bank.
        if caps.get(3).is_some() {
            Ok(index + BANK_SIZE)
        } else {
            Ok(index)
        }
    }

    fn instance_prefix(&self) -> &'static str {
        "adc"
    }

    fn instance_name(&self, model: &DeviceModel, mapping: &MappingInfo, index: usize) -> String {
        let function = model.function(mapping.functions[index]);
        format!(
            "adc{}_{}",
            function.instance(),
            function.signal().to_ascii_lowercase()
        )
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

    fn bank_name(&self, bank: usize) -> String {
        match bank {
            0 => "info".to_string(),
            1 => "infoA".to_string(),
            2 => "infoDM".to_string(),
            _ => "infoDP".to_string(),
        }
    }

    fn group(&self) -> Group {
        Group {
            name: "AnalogueIO_Group",
            title: "Analogue Input",
            brief: "Allows use of port pins as analogue inputs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnalogueInWriter;
    use crate::writers::InstanceWriter;
    use pinmux_model::DeviceModel;

    fn index_of(name: &str) -> usize {
        let mut model = DeviceModel::new("X", "X.csv");
        let id = model.resolve_functions(name, true).unwrap()[0].0;
        AnalogueInWriter.signal_index(model.function(id)).unwrap()
    }

    #[test]
    fn single_ended_channels_use_the_primary_bank() {
        assert_eq!(index_of("ADC0_SE8"), 8);
    }

    #[test]
    fn a_suffix_shifts_up_one_bank() {
        assert_eq!(index_of("ADC0_SE4a"), 36);
    }

    #[test]
    fn differential_channels_use_their_own_banks() {
        assert_eq!(index_of("ADC1_DM2"), 66);
        assert_eq!(index_of("ADC1_DP0"), 96);
    }
}
