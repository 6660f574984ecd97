//! Writer for FlexTimer (FTM) channels.
//!
//! Channels occupy the low slots; the quadrature, external clock, and fault
//! inputs sit at fixed offsets above them.

use anyhow::Result;
use pinmux_model::{DeviceModel, MappingInfo, PeripheralFunction, PeripheralTemplate};
use std::fmt::Write as _;

use super::{bad_signal, Group, InstanceWriter, NAMESPACE};

/// First slot of the quadrature decoder inputs.
pub(crate) const QUAD_INDEX: usize = 8;
/// First slot of the external clock inputs.
pub(crate) const CLOCK_INDEX: usize = 10;
/// First slot of the fault inputs.
pub(crate) const FAULT_INDEX: usize = 12;

/// Maps a timer signal name onto its slot.
pub(crate) fn timer_signal_index(
    function: &PeripheralFunction,
    with_clock_and_fault: bool,
) -> Result<usize> {
    let signal = function.signal();
    if let Some(channel) = signal.strip_prefix("CH").and_then(|d| d.parse::<usize>().ok()) {
        return Ok(channel);
    }
    for (offset, name) in ["QD_PHA", "QD_PHB"].iter().enumerate() {
        if signal == *name {
            return Ok(QUAD_INDEX + offset);
        }
    }
    if with_clock_and_fault {
        for (offset, name) in ["CLKIN0", "CLKIN1"].iter().enumerate() {
            if signal == *name {
                return Ok(CLOCK_INDEX + offset);
            }
        }
        for (offset, name) in ["FLT0", "FLT1", "FLT2", "FLT3"].iter().enumerate() {
            if signal == *name {
                return Ok(FAULT_INDEX + offset);
            }
        }
    }
    Err(bad_signal(function))
}

/// Constants appended to a timer family's information class: the SC register
/// base value, the special-slot offsets, and the channel count.
pub(crate) fn timer_info_constants(
    template: &PeripheralTemplate,
) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "   //! Base value for tmr->SC register\n   static constexpr uint32_t scValue  = {}_SC;\n\n",
        template.peripheral_name()
    );
    let _ = write!(
        out,
        "   //! Indexes of special functions in PcrInfo[] table\n   static constexpr int QUAD_INDEX  = {QUAD_INDEX};\n   static constexpr int CLOCK_INDEX = {CLOCK_INDEX};\n   static constexpr int FAULT_INDEX = {FAULT_INDEX};\n\n"
    );
    let last_channel = template
        .banks()
        .first()
        .map(|bank| {
            bank.slots()
                .iter()
                .take(QUAD_INDEX)
                .rposition(Option::is_some)
                .map(|slot| slot + 1)
                .unwrap_or(0)
        })
        .unwrap_or(0);
    let _ = write!(out, "   static constexpr int NUM_CHANNELS  = {last_channel};\n\n");
    out
}

pub(crate) struct FlexTimerWriter;

impl InstanceWriter for FlexTimerWriter {
    fn signal_index(&self, function: &PeripheralFunction) -> Result<usize> {
        timer_signal_index(function, true)
    }

    fn instance_prefix(&self) -> &'static str {
        "ftm"
    }

    fn instance_name(&self, model: &DeviceModel, mapping: &MappingInfo, index: usize) -> String {
        let function = model.function(mapping.functions[index]);
        format!(
            "ftm{}_{}",
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
            "const {NAMESPACE}::Ftm{}<{signal}>",
            function.instance()
        )))
    }

    fn alias_name(&self, instance_name: &str, alias: &str) -> Option<String> {
        // Only the channels make sense as user aliases.
        if instance_name.contains("_ch") {
            Some(format!("ftm_{alias}"))
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
    use super::{timer_signal_index, CLOCK_INDEX, FAULT_INDEX, QUAD_INDEX};
    use pinmux_model::DeviceModel;

    fn function(name: &str) -> (DeviceModel, pinmux_model::FunctionId) {
        let mut model = DeviceModel::new("X", "X.csv");
        let id = model.resolve_functions(name, true).unwrap()[0].0;
        (model, id)
    }

    #[test]
    fn channels_map_directly() {
        let (model, id) = function("FTM3_CH6");
        assert_eq!(timer_signal_index(model.function(id), true).unwrap(), 6);
    }

    #[test]
    fn special_inputs_sit_in_their_sub_banks() {
        let (model, id) = function("FTM0_QD_PHB");
        assert_eq!(
            timer_signal_index(model.function(id), true).unwrap(),
            QUAD_INDEX + 1
        );
        let (model, id) = function("FTM0_CLKIN1");
        assert_eq!(
            timer_signal_index(model.function(id), true).unwrap(),
            CLOCK_INDEX + 1
        );
        let (model, id) = function("FTM0_FLT2");
        assert_eq!(
            timer_signal_index(model.function(id), true).unwrap(),
            FAULT_INDEX + 2
        );
    }
}
