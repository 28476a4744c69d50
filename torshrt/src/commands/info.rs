//! Introspection commands; results are encoded directly instead of minting
//! new handles.

use crate::binder::{ArgKind, ArgSpec, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::list;
use crate::registry::Registry;

use super::{device_name, kind_name};

fn input_arg() -> ArgSpec {
    ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"])
}

fn unary_spec(name: &'static str, usage: &'static str) -> CommandSpec {
    CommandSpec::new(name, usage).arg(input_arg())
}

pub fn register(table: &mut CommandTable) {
    table.register(unary_spec("tensor_shape", "tensor_shape tensor"), tensor_shape);
    table.register(unary_spec("tensor_dtype", "tensor_dtype tensor"), tensor_dtype);
    table.register(
        unary_spec("tensor_device", "tensor_device tensor"),
        tensor_device,
    );
    table.register(unary_spec("tensor_numel", "tensor_numel tensor"), tensor_numel);
    table.register(unary_spec("tensor_item", "tensor_item tensor"), tensor_item);
    table.register(
        unary_spec("tensor_requires_grad", "tensor_requires_grad tensor"),
        tensor_requires_grad,
    );
    table.register(
        unary_spec("tensor_values", "tensor_values tensor"),
        tensor_values,
    );
    table.register(unary_spec("tensor_print", "tensor_print tensor"), tensor_print);
}

fn tensor_shape(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let dims: Vec<String> = input.size().iter().map(|d| d.to_string()).collect();
    Ok(dims.join(" "))
}

fn tensor_dtype(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    Ok(kind_name(input.kind()).to_string())
}

fn tensor_device(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    Ok(device_name(input.device()))
}

fn tensor_numel(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    Ok(input.numel().to_string())
}

fn tensor_item(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    if input.numel() != 1 {
        return Err(RtError::domain(
            "tensor_item requires a tensor with exactly one element",
        ));
    }
    Ok(format_scalar(input.double_value(&[])))
}

fn tensor_requires_grad(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    Ok(if input.requires_grad() { "1" } else { "0" }.to_string())
}

fn tensor_values(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let flat = input.f_reshape([-1])?.to_kind(tch::Kind::Double);
    let values = Vec::<f64>::try_from(&flat)
        .map_err(|e| RtError::domain(format!("cannot read tensor values: {e}")))?;
    let words: Vec<String> = values.iter().map(|v| format_scalar(*v)).collect();
    Ok(list::format_list(&words))
}

fn tensor_print(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let handle = args.get_str("input")?;
    let input = registry.tensor(handle)?;
    Ok(format!(
        "{} shape {{{}}} dtype {} device {}\n{}",
        handle,
        input
            .size()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" "),
        kind_name(input.kind()),
        device_name(input.device()),
        input
    ))
}

/// Integral values render without a trailing `.0` so `tensor_item` on an
/// int tensor reads back as an integer word.
fn format_scalar(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
