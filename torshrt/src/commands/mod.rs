//! Command handlers, grouped by operation family.

mod activation;
mod conv;
mod creation;
mod grad;
mod info;
mod layer;
mod linalg;
mod loss;
mod math;
mod optim;
mod rnn;

use tch::{Device, Kind, TchError, Tensor};

use crate::binder::BoundArgs;
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::registry::Registry;

pub fn register_all(table: &mut CommandTable) {
    creation::register(table);
    math::register(table);
    activation::register(table);
    info::register(table);
    grad::register(table);
    conv::register(table);
    linalg::register(table);
    loss::register(table);
    layer::register(table);
    rnn::register(table);
    optim::register(table);
}

pub(crate) fn parse_dtype(spec: &str) -> Result<Kind, RtError> {
    match spec {
        "float32" | "float" | "f32" => Ok(Kind::Float),
        "float64" | "double" | "f64" => Ok(Kind::Double),
        "float16" | "half" | "f16" => Ok(Kind::Half),
        "bfloat16" | "bf16" => Ok(Kind::BFloat16),
        "int32" | "int" | "i32" => Ok(Kind::Int),
        "int64" | "long" | "i64" => Ok(Kind::Int64),
        "uint8" | "byte" => Ok(Kind::Uint8),
        "int8" | "char" => Ok(Kind::Int8),
        "bool" => Ok(Kind::Bool),
        _ => Err(RtError::argument(format!("Unknown scalar type: {spec}"))),
    }
}

pub(crate) fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Float => "float32",
        Kind::Double => "float64",
        Kind::Half => "float16",
        Kind::BFloat16 => "bfloat16",
        Kind::Int => "int32",
        Kind::Int64 => "int64",
        Kind::Uint8 => "uint8",
        Kind::Int8 => "int8",
        Kind::Bool => "bool",
        _ => "unknown",
    }
}

/// Device specs follow the original surface: `cpu`, `cuda`, `cuda:N`.
/// A CUDA request quietly falls back to CPU when CUDA is unavailable.
pub(crate) fn parse_device(spec: &str) -> Result<Device, RtError> {
    if spec == "cpu" {
        return Ok(Device::Cpu);
    }
    if spec == "cuda" {
        return Ok(if tch::Cuda::is_available() {
            Device::Cuda(0)
        } else {
            Device::Cpu
        });
    }
    if let Some(rest) = spec.strip_prefix("cuda:") {
        let idx: usize = rest
            .parse()
            .map_err(|_| RtError::argument(format!("Invalid cuda device index: {rest}")))?;
        return Ok(if tch::Cuda::is_available() {
            Device::Cuda(idx)
        } else {
            Device::Cpu
        });
    }
    Err(RtError::argument(format!("Unknown device spec: {spec}")))
}

pub(crate) fn device_name(device: Device) -> String {
    match device {
        Device::Cpu => "cpu".to_string(),
        Device::Cuda(idx) => format!("cuda:{idx}"),
        Device::Mps => "mps".to_string(),
        Device::Vulkan => "vulkan".to_string(),
    }
}

/// Read the common `-dtype` / `-device` pair every creation command carries.
pub(crate) fn tensor_options(args: &BoundArgs) -> Result<(Kind, Device), RtError> {
    let kind = parse_dtype(args.get_str("dtype")?)?;
    let device = parse_device(args.get_str("device")?)?;
    Ok((kind, device))
}

type UnaryOp = fn(&Tensor) -> Result<Tensor, TchError>;
type BinaryOp = fn(&Tensor, &Tensor) -> Result<Tensor, TchError>;

/// Shared shape of every elementwise unary handler: resolve, compute, store.
pub(crate) fn unary(
    registry: &mut Registry,
    args: &BoundArgs,
    op: UnaryOp,
) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let out = op(&input)?;
    Ok(registry.insert_tensor(out))
}

pub(crate) fn binary(
    registry: &mut Registry,
    args: &BoundArgs,
    op: BinaryOp,
) -> Result<String, RtError> {
    let a = registry.tensor(args.get_str("input1")?)?;
    let b = registry.tensor(args.get_str("input2")?)?;
    let out = op(&a, &b)?;
    Ok(registry.insert_tensor(out))
}
