//! Matrix decompositions and related linear algebra.

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::list;
use crate::registry::Registry;

fn input_arg() -> ArgSpec {
    ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor", "matrix"])
}

pub fn register(table: &mut CommandTable) {
    table.register(
        CommandSpec::new("tensor_svd", "tensor_svd matrix").arg(input_arg()),
        tensor_svd,
    );
    table.register(
        CommandSpec::new("tensor_qr", "tensor_qr matrix").arg(input_arg()),
        tensor_qr,
    );
    table.register(
        CommandSpec::new("tensor_cholesky", "tensor_cholesky matrix ?upper?")
            .arg(input_arg())
            .arg(ArgSpec::optional("upper", ArgKind::Bool, ArgValue::Bool(false))),
        tensor_cholesky,
    );
    table.register(
        CommandSpec::new("tensor_inverse", "tensor_inverse matrix").arg(input_arg()),
        tensor_inverse,
    );
    table.register(
        CommandSpec::new("tensor_det", "tensor_det matrix").arg(input_arg()),
        tensor_det,
    );
    table.register(
        CommandSpec::new("tensor_matrix_exp", "tensor_matrix_exp matrix").arg(input_arg()),
        tensor_matrix_exp,
    );
    table.register(
        CommandSpec::new("tensor_pinverse", "tensor_pinverse matrix ?rcond?")
            .arg(input_arg())
            .arg(ArgSpec::optional(
                "rcond",
                ArgKind::Float,
                ArgValue::Float(1e-15),
            )),
        tensor_pinverse,
    );
}

/// U, S, V as three handles in one list.
fn tensor_svd(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let (u, s, v) = input.f_svd(true, true)?;
    let handles = [
        registry.insert_tensor(u),
        registry.insert_tensor(s),
        registry.insert_tensor(v),
    ];
    Ok(list::format_list(&handles))
}

fn tensor_qr(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let (q, r) = input.f_qr(true)?;
    let handles = [registry.insert_tensor(q), registry.insert_tensor(r)];
    Ok(list::format_list(&handles))
}

fn tensor_cholesky(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = input.f_cholesky(args.get_bool("upper")?)?;
    Ok(registry.insert_tensor(out))
}

fn tensor_inverse(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = input.f_inverse()?;
    Ok(registry.insert_tensor(out))
}

/// A single matrix yields the determinant value directly; a batched input
/// yields a handle to the tensor of determinants.
fn tensor_det(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let det = input.f_det()?;
    if det.numel() == 1 {
        Ok(format!("{}", det.double_value(&[])))
    } else {
        Ok(registry.insert_tensor(det))
    }
}

fn tensor_matrix_exp(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = input.f_matrix_exp()?;
    Ok(registry.insert_tensor(out))
}

fn tensor_pinverse(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = input.f_pinverse(args.get_float("rcond")?)?;
    Ok(registry.insert_tensor(out))
}
