//! Recurrent layer constructors. Forwarding goes through `layer_forward`,
//! which returns the output sequence and drops the final hidden state.

use tch::nn;
use tch::Device;

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::module::{Layer, LayerEntry};
use crate::registry::Registry;

fn rnn_spec(name: &'static str, usage: &'static str) -> CommandSpec {
    CommandSpec::new(name, usage)
        .arg(ArgSpec::required("inputSize", ArgKind::Int))
        .arg(ArgSpec::required("hiddenSize", ArgKind::Int))
        .arg(ArgSpec::optional("numLayers", ArgKind::Int, ArgValue::Int(1)))
        .arg(ArgSpec::optional(
            "bidirectional",
            ArgKind::Bool,
            ArgValue::Bool(false),
        ))
        .arg(ArgSpec::optional(
            "batchFirst",
            ArgKind::Bool,
            ArgValue::Bool(true),
        ))
        .arg(ArgSpec::optional(
            "dropout",
            ArgKind::Float,
            ArgValue::Float(0.0),
        ))
}

pub fn register(table: &mut CommandTable) {
    table.register(
        rnn_spec(
            "lstm",
            "lstm inputSize hiddenSize ?numLayers? ?bidirectional? ?batchFirst? ?dropout?",
        ),
        lstm,
    );
    table.register(
        rnn_spec(
            "gru",
            "gru inputSize hiddenSize ?numLayers? ?bidirectional? ?batchFirst? ?dropout?",
        ),
        gru,
    );
}

fn rnn_config(args: &BoundArgs) -> Result<(i64, i64, nn::RNNConfig), RtError> {
    let input_size = args.get_int("inputSize")?;
    let hidden_size = args.get_int("hiddenSize")?;
    let num_layers = args.get_int("numLayers")?;
    if input_size <= 0 || hidden_size <= 0 || num_layers <= 0 {
        return Err(RtError::argument(
            "Sizes and layer count must be positive",
        ));
    }
    let cfg = nn::RNNConfig {
        num_layers,
        bidirectional: args.get_bool("bidirectional")?,
        batch_first: args.get_bool("batchFirst")?,
        dropout: args.get_float("dropout")?,
        ..Default::default()
    };
    Ok((input_size, hidden_size, cfg))
}

fn lstm(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let (input_size, hidden_size, cfg) = rnn_config(args)?;
    let vs = nn::VarStore::new(Device::Cpu);
    let layer = nn::lstm(vs.root(), input_size, hidden_size, cfg);
    Ok(registry.insert_module(LayerEntry::new(vs, Layer::Lstm(layer))))
}

fn gru(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let (input_size, hidden_size, cfg) = rnn_config(args)?;
    let vs = nn::VarStore::new(Device::Cpu);
    let layer = nn::gru(vs.root(), input_size, hidden_size, cfg);
    Ok(registry.insert_module(LayerEntry::new(vs, Layer::Gru(layer))))
}
