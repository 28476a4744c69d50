//! Layer construction and execution. Constructors return module handles;
//! `layer_forward` bridges back to tensor handles.

use tch::nn;
use tch::Device;

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::list;
use crate::module::{Layer, LayerEntry};
use crate::registry::Registry;

pub fn register(table: &mut CommandTable) {
    table.register(
        CommandSpec::new("linear", "linear inFeatures outFeatures ?bias?")
            .arg(ArgSpec::required("inFeatures", ArgKind::Int))
            .arg(ArgSpec::required("outFeatures", ArgKind::Int))
            .arg(ArgSpec::optional("bias", ArgKind::Bool, ArgValue::Bool(true))),
        linear,
    );
    table.register(
        CommandSpec::new(
            "conv2d",
            "conv2d inChannels outChannels kernelSize ?stride? ?padding? ?bias?",
        )
        .arg(ArgSpec::required("inChannels", ArgKind::Int))
        .arg(ArgSpec::required("outChannels", ArgKind::Int))
        .arg(ArgSpec::required("kernelSize", ArgKind::Int))
        .arg(ArgSpec::optional("stride", ArgKind::Int, ArgValue::Int(1)))
        .arg(ArgSpec::optional("padding", ArgKind::Int, ArgValue::Int(0)))
        .arg(ArgSpec::optional("bias", ArgKind::Bool, ArgValue::Bool(true))),
        conv2d,
    );
    table.register(
        CommandSpec::new("batch_norm2d", "batch_norm2d numFeatures ?eps? ?momentum?")
            .arg(ArgSpec::required("numFeatures", ArgKind::Int))
            .arg(ArgSpec::optional("eps", ArgKind::Float, ArgValue::Float(1e-5)))
            .arg(ArgSpec::optional(
                "momentum",
                ArgKind::Float,
                ArgValue::Float(0.1),
            )),
        batch_norm2d,
    );
    table.register(
        CommandSpec::new("sequential", "sequential modules")
            .arg(ArgSpec::required("modules", ArgKind::StrList).with_aliases(&["layers"])),
        sequential,
    );
    table.register(
        CommandSpec::new("layer_forward", "layer_forward module input ?train?")
            .arg(ArgSpec::required("module", ArgKind::Str).with_aliases(&["layer"]))
            .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"]))
            .arg(ArgSpec::optional("train", ArgKind::Bool, ArgValue::Bool(false))),
        layer_forward,
    );
    table.register(
        CommandSpec::new("layer_parameters", "layer_parameters module")
            .arg(ArgSpec::required("module", ArgKind::Str).with_aliases(&["layer"])),
        layer_parameters,
    );
}

fn linear(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let in_features = args.get_int("inFeatures")?;
    let out_features = args.get_int("outFeatures")?;
    if in_features <= 0 || out_features <= 0 {
        return Err(RtError::argument("Feature counts must be positive"));
    }
    let vs = nn::VarStore::new(Device::Cpu);
    let cfg = nn::LinearConfig {
        bias: args.get_bool("bias")?,
        ..Default::default()
    };
    let layer = nn::linear(vs.root(), in_features, out_features, cfg);
    Ok(registry.insert_module(LayerEntry::new(vs, Layer::Plain(Box::new(layer)))))
}

fn conv2d(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let in_channels = args.get_int("inChannels")?;
    let out_channels = args.get_int("outChannels")?;
    let kernel = args.get_int("kernelSize")?;
    if in_channels <= 0 || out_channels <= 0 || kernel <= 0 {
        return Err(RtError::argument(
            "Channel counts and kernel size must be positive",
        ));
    }
    let vs = nn::VarStore::new(Device::Cpu);
    let cfg = nn::ConvConfig {
        stride: args.get_int("stride")?,
        padding: args.get_int("padding")?,
        bias: args.get_bool("bias")?,
        ..Default::default()
    };
    let layer = nn::conv2d(vs.root(), in_channels, out_channels, kernel, cfg);
    Ok(registry.insert_module(LayerEntry::new(vs, Layer::Plain(Box::new(layer)))))
}

fn batch_norm2d(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let features = args.get_int("numFeatures")?;
    if features <= 0 {
        return Err(RtError::argument("numFeatures must be positive"));
    }
    let vs = nn::VarStore::new(Device::Cpu);
    let cfg = nn::BatchNormConfig {
        eps: args.get_float("eps")?,
        momentum: args.get_float("momentum")?,
        ..Default::default()
    };
    let layer = nn::batch_norm2d(vs.root(), features, cfg);
    Ok(registry.insert_module(LayerEntry::new(vs, Layer::Plain(Box::new(layer)))))
}

/// Composes existing module handles; the parts stay independently usable
/// and shared, so releasing the composite does not release them.
fn sequential(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let handles = args.get_str_list("modules")?;
    if handles.is_empty() {
        return Err(RtError::argument("Expected at least one module for -modules"));
    }
    let mut parts = Vec::with_capacity(handles.len());
    for handle in handles {
        parts.push(registry.module(handle)?);
    }
    let vs = nn::VarStore::new(Device::Cpu);
    Ok(registry.insert_module(LayerEntry::new(vs, Layer::Seq(parts))))
}

fn layer_forward(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let entry = registry.module(args.get_str("module")?)?;
    let input = registry.tensor(args.get_str("input")?)?;
    let out = entry.borrow().forward(&input, args.get_bool("train")?)?;
    Ok(registry.insert_tensor(out))
}

/// Returns a list of tensor handles sharing storage with the layer's
/// weights, so an optimizer built from them trains the layer in place.
fn layer_parameters(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let entry = registry.module(args.get_str("module")?)?;
    let params = entry.borrow().parameters();
    let handles: Vec<String> = params
        .into_iter()
        .map(|p| registry.insert_tensor(p))
        .collect();
    Ok(list::format_list(&handles))
}
