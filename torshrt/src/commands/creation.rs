//! Tensor creation commands.

use tch::Tensor;

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::list;
use crate::registry::Registry;

use super::{parse_device, parse_dtype, tensor_options};

fn dtype_arg() -> ArgSpec {
    ArgSpec::optional("dtype", ArgKind::Str, ArgValue::Str("float32".to_string()))
}

fn device_arg() -> ArgSpec {
    ArgSpec::optional("device", ArgKind::Str, ArgValue::Str("cpu".to_string()))
}

fn requires_grad_arg() -> ArgSpec {
    ArgSpec::optional("requiresGrad", ArgKind::Bool, ArgValue::Bool(false))
}

pub fn register(table: &mut CommandTable) {
    table.register(
        CommandSpec::new(
            "tensor_create",
            "tensor_create data ?dtype? ?device? ?requiresGrad?",
        )
        .arg(ArgSpec::required("data", ArgKind::Str).with_aliases(&["values"]))
        .arg(dtype_arg())
        .arg(device_arg())
        .arg(requires_grad_arg()),
        tensor_create,
    );
    table.register(
        CommandSpec::new("zeros", "zeros shape ?dtype? ?device? ?requiresGrad?")
            .arg(ArgSpec::required("shape", ArgKind::IntList(0)))
            .arg(dtype_arg())
            .arg(device_arg())
            .arg(requires_grad_arg()),
        zeros,
    );
    table.register(
        CommandSpec::new("ones", "ones shape ?dtype? ?device? ?requiresGrad?")
            .arg(ArgSpec::required("shape", ArgKind::IntList(0)))
            .arg(dtype_arg())
            .arg(device_arg())
            .arg(requires_grad_arg()),
        ones,
    );
    table.register(
        CommandSpec::new("full", "full shape value ?dtype? ?device?")
            .arg(ArgSpec::required("shape", ArgKind::IntList(0)))
            .arg(ArgSpec::required("value", ArgKind::Float))
            .arg(dtype_arg())
            .arg(device_arg()),
        full,
    );
    table.register(
        CommandSpec::new("eye", "eye n ?dtype? ?device?")
            .arg(ArgSpec::required("n", ArgKind::Int))
            .arg(dtype_arg())
            .arg(device_arg()),
        eye,
    );
    table.register(
        CommandSpec::new("arange", "arange start ?end? ?step? ?dtype? ?device?")
            .arg(ArgSpec::required("start", ArgKind::Float))
            .arg(ArgSpec::opt_bare("end", ArgKind::Float))
            .arg(ArgSpec::optional("step", ArgKind::Float, ArgValue::Float(1.0)))
            .arg(dtype_arg())
            .arg(device_arg()),
        arange,
    );
    table.register(
        CommandSpec::new("linspace", "linspace start end steps ?dtype? ?device?")
            .arg(ArgSpec::required("start", ArgKind::Float))
            .arg(ArgSpec::required("end", ArgKind::Float))
            .arg(ArgSpec::required("steps", ArgKind::Int))
            .arg(dtype_arg())
            .arg(device_arg()),
        linspace,
    );
    table.register(
        CommandSpec::new("rand", "rand shape ?dtype? ?device?")
            .arg(ArgSpec::required("shape", ArgKind::IntList(0)))
            .arg(dtype_arg())
            .arg(device_arg()),
        rand,
    );
    table.register(
        CommandSpec::new("randn", "randn shape ?dtype? ?device?")
            .arg(ArgSpec::required("shape", ArgKind::IntList(0)))
            .arg(dtype_arg())
            .arg(device_arg()),
        randn,
    );
    table.register(
        CommandSpec::new("zeros_like", "zeros_like tensor ?dtype? ?device?")
            .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"]))
            .arg(ArgSpec::opt_bare("dtype", ArgKind::Str))
            .arg(ArgSpec::opt_bare("device", ArgKind::Str)),
        zeros_like,
    );
    table.register(
        CommandSpec::new("ones_like", "ones_like tensor ?dtype? ?device?")
            .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"]))
            .arg(ArgSpec::opt_bare("dtype", ArgKind::Str))
            .arg(ArgSpec::opt_bare("device", ArgKind::Str)),
        ones_like,
    );
    table.register(
        CommandSpec::new("randn_like", "randn_like tensor ?dtype? ?device?")
            .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"]))
            .arg(ArgSpec::opt_bare("dtype", ArgKind::Str))
            .arg(ArgSpec::opt_bare("device", ArgKind::Str)),
        randn_like,
    );
    table.register(
        CommandSpec::new("tensor_release", "tensor_release handle")
            .arg(ArgSpec::required("handle", ArgKind::Str).with_aliases(&["input", "tensor"])),
        tensor_release,
    );
}

fn tensor_create(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let (flat, shape) = list::parse_matrix(args.get_str("data")?)?;
    let (kind, device) = tensor_options(args)?;
    let mut t = Tensor::f_from_slice(&flat)?.to_kind(kind).to_device(device);
    if shape.len() > 1 {
        t = t.f_reshape(shape.as_slice())?;
    }
    if args.get_bool("requiresGrad")? {
        t = t.set_requires_grad(true);
    }
    Ok(registry.insert_tensor(t))
}

fn zeros(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let shape = args.get_int_list("shape")?;
    let (kind, device) = tensor_options(args)?;
    let mut t = Tensor::zeros(shape, (kind, device));
    if args.get_bool("requiresGrad")? {
        t = t.set_requires_grad(true);
    }
    Ok(registry.insert_tensor(t))
}

fn ones(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let shape = args.get_int_list("shape")?;
    let (kind, device) = tensor_options(args)?;
    let mut t = Tensor::ones(shape, (kind, device));
    if args.get_bool("requiresGrad")? {
        t = t.set_requires_grad(true);
    }
    Ok(registry.insert_tensor(t))
}

fn full(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let shape = args.get_int_list("shape")?;
    let value = args.get_float("value")?;
    let (kind, device) = tensor_options(args)?;
    let t = Tensor::full(shape, value, (kind, device));
    Ok(registry.insert_tensor(t))
}

fn eye(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let n = args.get_int("n")?;
    if n <= 0 {
        return Err(RtError::argument("Invalid n parameter: must be positive"));
    }
    let (kind, device) = tensor_options(args)?;
    Ok(registry.insert_tensor(Tensor::eye(n, (kind, device))))
}

fn arange(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    // `arange end` and `arange start end ?step?` both work; with a single
    // value the start defaults to zero, as the original surface allowed.
    let first = args.get_float("start")?;
    let (start, end) = match args.opt_float("end") {
        Some(end) => (first, end),
        None => (0.0, first),
    };
    let step = args.get_float("step")?;
    if step == 0.0 {
        return Err(RtError::argument("Invalid step value: must be non-zero"));
    }
    let (kind, device) = tensor_options(args)?;
    let t = Tensor::arange_start_step(start, end, step, (kind, device));
    Ok(registry.insert_tensor(t))
}

fn linspace(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let start = args.get_float("start")?;
    let end = args.get_float("end")?;
    let steps = args.get_int("steps")?;
    if steps <= 0 {
        return Err(RtError::argument("Invalid steps value: must be positive"));
    }
    let (kind, device) = tensor_options(args)?;
    let t = Tensor::linspace(start, end, steps, (kind, device));
    Ok(registry.insert_tensor(t))
}

fn rand(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let shape = args.get_int_list("shape")?;
    let (kind, device) = tensor_options(args)?;
    Ok(registry.insert_tensor(Tensor::rand(shape, (kind, device))))
}

fn randn(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let shape = args.get_int_list("shape")?;
    let (kind, device) = tensor_options(args)?;
    Ok(registry.insert_tensor(Tensor::randn(shape, (kind, device))))
}

fn like_overrides(args: &BoundArgs, t: Tensor) -> Result<Tensor, RtError> {
    let mut t = t;
    if let Some(spec) = args.opt_str("dtype") {
        t = t.to_kind(parse_dtype(spec)?);
    }
    if let Some(spec) = args.opt_str("device") {
        t = t.to_device(parse_device(spec)?);
    }
    Ok(t)
}

fn zeros_like(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = like_overrides(args, input.zeros_like())?;
    Ok(registry.insert_tensor(out))
}

fn ones_like(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = like_overrides(args, input.ones_like())?;
    Ok(registry.insert_tensor(out))
}

fn randn_like(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = like_overrides(args, input.randn_like())?;
    Ok(registry.insert_tensor(out))
}

fn tensor_release(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    registry.release(args.get_str("handle")?)?;
    Ok(String::new())
}
