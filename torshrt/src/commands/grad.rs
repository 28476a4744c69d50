//! Autograd surface.

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::registry::Registry;

fn input_arg() -> ArgSpec {
    ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"])
}

pub fn register(table: &mut CommandTable) {
    table.register(
        CommandSpec::new("tensor_backward", "tensor_backward tensor").arg(input_arg()),
        tensor_backward,
    );
    table.register(
        CommandSpec::new("tensor_grad", "tensor_grad tensor").arg(input_arg()),
        tensor_grad,
    );
    table.register(
        CommandSpec::new(
            "tensor_set_requires_grad",
            "tensor_set_requires_grad tensor ?requiresGrad?",
        )
        .arg(input_arg())
        .arg(ArgSpec::optional(
            "requiresGrad",
            ArgKind::Bool,
            ArgValue::Bool(true),
        )),
        tensor_set_requires_grad,
    );
}

fn tensor_backward(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    if !input.requires_grad() {
        return Err(RtError::domain(
            "tensor does not require grad; call tensor_set_requires_grad first",
        ));
    }
    input.backward();
    Ok(String::new())
}

fn tensor_grad(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let grad = input.grad();
    if !grad.defined() {
        return Err(RtError::domain(
            "tensor has no gradient; run tensor_backward first",
        ));
    }
    Ok(registry.insert_tensor(grad))
}

/// In-place: flips the flag on the stored tensor and returns the same
/// handle, unlike the result-minting commands.
fn tensor_set_requires_grad(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let handle = args.get_str("input")?;
    let input = registry.tensor(handle)?;
    let updated = input.set_requires_grad(args.get_bool("requiresGrad")?);
    registry.store_tensor(handle, updated);
    Ok(handle.to_string())
}
