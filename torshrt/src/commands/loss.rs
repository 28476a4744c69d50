//! Loss functions.

use tch::Reduction;

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::registry::Registry;

pub fn register(table: &mut CommandTable) {
    table.register(
        CommandSpec::new("mse_loss", "mse_loss input target ?reduction?")
            .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["prediction"]))
            .arg(ArgSpec::required("target", ArgKind::Str))
            .arg(ArgSpec::optional(
                "reduction",
                ArgKind::Str,
                ArgValue::Str("mean".to_string()),
            )),
        mse_loss,
    );
    table.register(
        CommandSpec::new("cross_entropy", "cross_entropy logits targets")
            .arg(ArgSpec::required("input", ArgKind::Str).with_aliases(&["logits"]))
            .arg(ArgSpec::required("target", ArgKind::Str).with_aliases(&["targets"])),
        cross_entropy,
    );
}

fn parse_reduction(spec: &str) -> Result<Reduction, RtError> {
    match spec {
        "mean" => Ok(Reduction::Mean),
        "sum" => Ok(Reduction::Sum),
        "none" => Ok(Reduction::None),
        _ => Err(RtError::argument(format!("Unknown reduction: {spec}"))),
    }
}

fn mse_loss(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let input = registry.tensor(args.get_str("input")?)?;
    let target = registry.tensor(args.get_str("target")?)?;
    let reduction = parse_reduction(args.get_str("reduction")?)?;
    let out = input.f_mse_loss(&target, reduction)?;
    Ok(registry.insert_tensor(out))
}

fn cross_entropy(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let logits = registry.tensor(args.get_str("input")?)?;
    let targets = registry.tensor(args.get_str("target")?)?;
    let out = logits.cross_entropy_for_logits(&targets);
    Ok(registry.insert_tensor(out))
}
