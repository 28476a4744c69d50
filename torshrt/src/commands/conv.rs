//! Functional convolution and pooling.

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::registry::Registry;

fn pair(name: &'static str, default: i64) -> ArgSpec {
    ArgSpec::optional(name, ArgKind::IntList(2), ArgValue::IntList(vec![default; 2]))
}

pub fn register(table: &mut CommandTable) {
    table.register(
        CommandSpec::new(
            "tensor_conv2d",
            "tensor_conv2d input weight ?bias? ?stride? ?padding? ?dilation? ?groups?",
        )
        .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"]))
        .arg(ArgSpec::required("weight", ArgKind::Str))
        .arg(ArgSpec::opt_bare("bias", ArgKind::Str))
        .arg(pair("stride", 1))
        .arg(pair("padding", 0))
        .arg(pair("dilation", 1))
        .arg(ArgSpec::optional("groups", ArgKind::Int, ArgValue::Int(1))),
        tensor_conv2d,
    );
    table.register(
        CommandSpec::new(
            "tensor_maxpool2d",
            "tensor_maxpool2d input kernelSize ?stride? ?padding?",
        )
        .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"]))
        .arg(ArgSpec::required("kernelSize", ArgKind::IntList(2)))
        .arg(ArgSpec::opt_bare("stride", ArgKind::IntList(2)))
        .arg(pair("padding", 0)),
        tensor_maxpool2d,
    );
    table.register(
        CommandSpec::new(
            "tensor_avgpool2d",
            "tensor_avgpool2d input kernelSize ?stride? ?padding?",
        )
        .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["tensor"]))
        .arg(ArgSpec::required("kernelSize", ArgKind::IntList(2)))
        .arg(ArgSpec::opt_bare("stride", ArgKind::IntList(2)))
        .arg(pair("padding", 0)),
        tensor_avgpool2d,
    );
}

fn tensor_conv2d(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let weight = registry.tensor(args.get_str("weight")?)?;
    let bias = match args.opt_str("bias") {
        Some(handle) => Some(registry.tensor(handle)?),
        None => None,
    };
    let out = input.f_conv2d(
        &weight,
        bias.as_ref(),
        args.get_int_list("stride")?,
        args.get_int_list("padding")?,
        args.get_int_list("dilation")?,
        args.get_int("groups")?,
    )?;
    Ok(registry.insert_tensor(out))
}

fn tensor_maxpool2d(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let kernel = args.get_int_list("kernelSize")?;
    // Stride defaults to the kernel size, as the underlying op does.
    let stride = args.opt_int_list("stride").unwrap_or(kernel);
    let out = input.f_max_pool2d(
        kernel,
        stride,
        args.get_int_list("padding")?,
        [1, 1],
        false,
    )?;
    Ok(registry.insert_tensor(out))
}

fn tensor_avgpool2d(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let kernel = args.get_int_list("kernelSize")?;
    let stride = args.opt_int_list("stride").unwrap_or(kernel);
    let out = input.f_avg_pool2d(
        kernel,
        stride,
        args.get_int_list("padding")?,
        false,
        true,
        None::<i64>,
    )?;
    Ok(registry.insert_tensor(out))
}
