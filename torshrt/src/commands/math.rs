//! Elementwise and shape-manipulating tensor math.

use tch::Tensor;

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::registry::Registry;

use super::{binary, parse_device, parse_dtype, unary};

fn input_arg() -> ArgSpec {
    ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"])
}

fn binary_spec(name: &'static str, usage: &'static str) -> CommandSpec {
    CommandSpec::new(name, usage)
        .arg(ArgSpec::required("input1", ArgKind::Str).with_aliases(&["a"]))
        .arg(ArgSpec::required("input2", ArgKind::Str).with_aliases(&["b"]))
}

fn unary_spec(name: &'static str, usage: &'static str) -> CommandSpec {
    CommandSpec::new(name, usage).arg(input_arg())
}

pub fn register(table: &mut CommandTable) {
    table.register(
        binary_spec("tensor_add", "tensor_add tensor1 tensor2"),
        tensor_add,
    );
    table.register(
        binary_spec("tensor_sub", "tensor_sub tensor1 tensor2"),
        tensor_sub,
    );
    table.register(
        binary_spec("tensor_mul", "tensor_mul tensor1 tensor2"),
        tensor_mul,
    );
    table.register(
        binary_spec("tensor_div", "tensor_div tensor1 tensor2"),
        tensor_div,
    );
    table.register(
        binary_spec("tensor_matmul", "tensor_matmul tensor1 tensor2"),
        tensor_matmul,
    );
    table.register(
        binary_spec("tensor_bmm", "tensor_bmm tensor1 tensor2"),
        tensor_bmm,
    );
    table.register(unary_spec("tensor_abs", "tensor_abs tensor"), tensor_abs);
    table.register(unary_spec("tensor_exp", "tensor_exp tensor"), tensor_exp);
    table.register(unary_spec("tensor_log", "tensor_log tensor"), tensor_log);
    table.register(unary_spec("tensor_sqrt", "tensor_sqrt tensor"), tensor_sqrt);
    table.register(unary_spec("tensor_neg", "tensor_neg tensor"), tensor_neg);
    table.register(
        CommandSpec::new("tensor_pow", "tensor_pow tensor exponent")
            .arg(input_arg())
            .arg(ArgSpec::required("exponent", ArgKind::Float)),
        tensor_pow,
    );
    table.register(
        CommandSpec::new("tensor_sum", "tensor_sum tensor ?dim? ?keepdim?")
            .arg(input_arg())
            .arg(ArgSpec::opt_bare("dim", ArgKind::Int))
            .arg(ArgSpec::optional("keepdim", ArgKind::Bool, ArgValue::Bool(false))),
        tensor_sum,
    );
    table.register(
        CommandSpec::new("tensor_mean", "tensor_mean tensor ?dim? ?keepdim?")
            .arg(input_arg())
            .arg(ArgSpec::opt_bare("dim", ArgKind::Int))
            .arg(ArgSpec::optional("keepdim", ArgKind::Bool, ArgValue::Bool(false))),
        tensor_mean,
    );
    table.register(unary_spec("tensor_max", "tensor_max tensor"), tensor_max);
    table.register(unary_spec("tensor_min", "tensor_min tensor"), tensor_min);
    table.register(
        CommandSpec::new("tensor_reshape", "tensor_reshape tensor shape")
            .arg(input_arg())
            .arg(ArgSpec::required("shape", ArgKind::IntList(0))),
        tensor_reshape,
    );
    table.register(
        CommandSpec::new("tensor_transpose", "tensor_transpose tensor ?dim0? ?dim1?")
            .arg(input_arg())
            .arg(ArgSpec::optional("dim0", ArgKind::Int, ArgValue::Int(0)))
            .arg(ArgSpec::optional("dim1", ArgKind::Int, ArgValue::Int(1))),
        tensor_transpose,
    );
    table.register(
        CommandSpec::new("tensor_permute", "tensor_permute tensor dims")
            .arg(input_arg())
            .arg(ArgSpec::required("dims", ArgKind::IntList(0))),
        tensor_permute,
    );
    table.register(
        CommandSpec::new("tensor_cat", "tensor_cat tensors ?dim?")
            .arg(ArgSpec::required("tensors", ArgKind::StrList).with_aliases(&["inputs"]))
            .arg(ArgSpec::optional("dim", ArgKind::Int, ArgValue::Int(0))),
        tensor_cat,
    );
    table.register(
        CommandSpec::new("tensor_to", "tensor_to tensor ?device? ?dtype?")
            .arg(input_arg())
            .arg(ArgSpec::opt_bare("device", ArgKind::Str))
            .arg(ArgSpec::opt_bare("dtype", ArgKind::Str)),
        tensor_to,
    );
}

fn tensor_add(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    binary(registry, args, Tensor::f_add)
}

fn tensor_sub(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    binary(registry, args, Tensor::f_sub)
}

fn tensor_mul(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    binary(registry, args, Tensor::f_mul)
}

fn tensor_div(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    binary(registry, args, Tensor::f_div)
}

fn tensor_matmul(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    binary(registry, args, Tensor::f_matmul)
}

fn tensor_bmm(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    binary(registry, args, Tensor::f_bmm)
}

fn tensor_abs(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_abs)
}

fn tensor_exp(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_exp)
}

fn tensor_log(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_log)
}

fn tensor_sqrt(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_sqrt)
}

fn tensor_neg(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_neg)
}

fn tensor_pow(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let exponent = args.get_float("exponent")?;
    let out = input.f_pow_tensor_scalar(exponent)?;
    Ok(registry.insert_tensor(out))
}

fn tensor_sum(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let keepdim = args.get_bool("keepdim")?;
    let out = match args.opt_int("dim") {
        None => input.f_sum(input.kind())?,
        Some(dim) => input.f_sum_dim_intlist(Some([dim].as_slice()), keepdim, input.kind())?,
    };
    Ok(registry.insert_tensor(out))
}

fn tensor_mean(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let keepdim = args.get_bool("keepdim")?;
    let out = match args.opt_int("dim") {
        None => input.f_mean(input.kind())?,
        Some(dim) => input.f_mean_dim(Some([dim].as_slice()), keepdim, input.kind())?,
    };
    Ok(registry.insert_tensor(out))
}

fn tensor_max(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_max)
}

fn tensor_min(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    unary(registry, args, Tensor::f_min)
}

fn tensor_reshape(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let shape = args.get_int_list("shape")?;
    let out = input.f_reshape(shape)?;
    Ok(registry.insert_tensor(out))
}

fn tensor_transpose(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = input.f_transpose(args.get_int("dim0")?, args.get_int("dim1")?)?;
    Ok(registry.insert_tensor(out))
}

fn tensor_permute(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let dims = args.get_int_list("dims")?;
    let out = input.f_permute(dims)?;
    Ok(registry.insert_tensor(out))
}

fn tensor_cat(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let handles = args.get_str_list("tensors")?;
    if handles.is_empty() {
        return Err(RtError::argument("Expected at least one tensor for -tensors"));
    }
    let mut tensors = Vec::with_capacity(handles.len());
    for handle in handles {
        tensors.push(registry.tensor(handle)?);
    }
    let out = Tensor::f_cat(&tensors, args.get_int("dim")?)?;
    Ok(registry.insert_tensor(out))
}

fn tensor_to(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let mut t = registry.tensor(args.get_str("input")?)?;
    if let Some(spec) = args.opt_str("device") {
        t = t.to_device(parse_device(spec)?);
    }
    if let Some(spec) = args.opt_str("dtype") {
        t = t.to_kind(parse_dtype(spec)?);
    }
    Ok(registry.insert_tensor(t))
}
