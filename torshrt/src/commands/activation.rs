//! Activation functions.

use tch::Tensor;

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::registry::Registry;

use super::unary;

fn input_arg() -> ArgSpec {
    ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"])
}

pub fn register(table: &mut CommandTable) {
    table.register(
        CommandSpec::new("tensor_relu", "tensor_relu tensor").arg(input_arg()),
        tensor_relu,
    );
    table.register(
        CommandSpec::new("tensor_sigmoid", "tensor_sigmoid tensor").arg(input_arg()),
        tensor_sigmoid,
    );
    table.register(
        CommandSpec::new("tensor_tanh", "tensor_tanh tensor").arg(input_arg()),
        tensor_tanh,
    );
    table.register(
        CommandSpec::new("tensor_gelu", "tensor_gelu tensor").arg(input_arg()),
        tensor_gelu,
    );
    table.register(
        CommandSpec::new("tensor_softmax", "tensor_softmax tensor ?dim?")
            .arg(input_arg())
            .arg(ArgSpec::optional("dim", ArgKind::Int, ArgValue::Int(-1))),
        tensor_softmax,
    );
    table.register(
        CommandSpec::new("tensor_log_softmax", "tensor_log_softmax tensor ?dim?")
            .arg(input_arg())
            .arg(ArgSpec::optional("dim", ArgKind::Int, ArgValue::Int(-1))),
        tensor_log_softmax,
    );
    table.register(
        CommandSpec::new("tensor_dropout", "tensor_dropout tensor ?p? ?train?")
            .arg(input_arg())
            .arg(ArgSpec::optional("p", ArgKind::Float, ArgValue::Float(0.5)))
            .arg(ArgSpec::optional("train", ArgKind::Bool, ArgValue::Bool(true))),
        tensor_dropout,
    );
}

fn tensor_relu(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_relu)
}

fn tensor_sigmoid(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_sigmoid)
}

fn tensor_tanh(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_tanh)
}

fn tensor_gelu(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = input.f_gelu("none")?;
    Ok(registry.insert_tensor(out))
}

fn tensor_softmax(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = input.f_softmax(args.get_int("dim")?, input.kind())?;
    Ok(registry.insert_tensor(out))
}

fn tensor_log_softmax(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = input.f_log_softmax(args.get_int("dim")?, input.kind())?;
    Ok(registry.insert_tensor(out))
}

fn tensor_dropout(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let p = args.get_float("p")?;
    if !(0.0..=1.0).contains(&p) {
        return Err(RtError::argument("Invalid p value: must be in [0, 1]"));
    }
    let out = input.f_dropout(p, args.get_bool("train")?)?;
    Ok(registry.insert_tensor(out))
}
