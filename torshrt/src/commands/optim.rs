//! Optimizer commands. Parameters are given as tensor handles (module
//! handles are accepted too and expand to their trainable parameters);
//! updates act through the shared tensor storage.

use tch::Tensor;

use crate::binder::{ArgKind, ArgSpec, ArgValue, BoundArgs, CommandSpec};
use crate::error::RtError;
use crate::interp::CommandTable;
use crate::optim::{AdamCfg, Optim, SgdCfg};
use crate::registry::Registry;

pub fn register(table: &mut CommandTable) {
    table.register(
        CommandSpec::new(
            "optimizer_sgd",
            "optimizer_sgd parameters lr ?momentum? ?dampening? ?weightDecay? ?nesterov?",
        )
        .arg(ArgSpec::required("parameters", ArgKind::StrList).with_aliases(&["params"]))
        .arg(ArgSpec::required("lr", ArgKind::Float))
        .arg(ArgSpec::optional("momentum", ArgKind::Float, ArgValue::Float(0.0)))
        .arg(ArgSpec::optional("dampening", ArgKind::Float, ArgValue::Float(0.0)))
        .arg(ArgSpec::optional(
            "weightDecay",
            ArgKind::Float,
            ArgValue::Float(0.0),
        ))
        .arg(ArgSpec::optional(
            "nesterov",
            ArgKind::Bool,
            ArgValue::Bool(false),
        )),
        optimizer_sgd,
    );
    table.register(
        CommandSpec::new(
            "optimizer_adam",
            "optimizer_adam parameters lr ?beta1? ?beta2? ?eps? ?weightDecay?",
        )
        .arg(ArgSpec::required("parameters", ArgKind::StrList).with_aliases(&["params"]))
        .arg(ArgSpec::required("lr", ArgKind::Float))
        .arg(ArgSpec::optional("beta1", ArgKind::Float, ArgValue::Float(0.9)))
        .arg(ArgSpec::optional("beta2", ArgKind::Float, ArgValue::Float(0.999)))
        .arg(ArgSpec::optional("eps", ArgKind::Float, ArgValue::Float(1e-8)))
        .arg(ArgSpec::optional(
            "weightDecay",
            ArgKind::Float,
            ArgValue::Float(0.0),
        )),
        optimizer_adam,
    );
    table.register(
        CommandSpec::new("optimizer_step", "optimizer_step optimizer")
            .arg(ArgSpec::required("optimizer", ArgKind::Str)),
        optimizer_step,
    );
    table.register(
        CommandSpec::new("optimizer_zero_grad", "optimizer_zero_grad optimizer")
            .arg(ArgSpec::required("optimizer", ArgKind::Str)),
        optimizer_zero_grad,
    );
}

fn collect_params(registry: &Registry, handles: &[String]) -> Result<Vec<Tensor>, RtError> {
    if handles.is_empty() {
        return Err(RtError::argument(
            "Expected at least one parameter for -parameters",
        ));
    }
    let mut params = Vec::with_capacity(handles.len());
    for handle in handles {
        if let Ok(t) = registry.tensor(handle) {
            params.push(t);
        } else if let Ok(entry) = registry.module(handle) {
            params.extend(entry.borrow().parameters());
        } else {
            return Err(RtError::handle(format!("Invalid parameter tensor: {handle}")));
        }
    }
    Ok(params)
}

fn check_lr(lr: f64) -> Result<(), RtError> {
    if lr <= 0.0 || !lr.is_finite() {
        return Err(RtError::argument("Invalid learning rate: must be positive"));
    }
    Ok(())
}

fn optimizer_sgd(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let params = collect_params(registry, args.get_str_list("parameters")?)?;
    let cfg = SgdCfg {
        lr: args.get_float("lr")?,
        momentum: args.get_float("momentum")?,
        dampening: args.get_float("dampening")?,
        weight_decay: args.get_float("weightDecay")?,
        nesterov: args.get_bool("nesterov")?,
    };
    check_lr(cfg.lr)?;
    if cfg.nesterov && (cfg.momentum <= 0.0 || cfg.dampening != 0.0) {
        return Err(RtError::argument(
            "Nesterov momentum requires a positive momentum and zero dampening",
        ));
    }
    Ok(registry.insert_optimizer(Optim::sgd(params, cfg)))
}

fn optimizer_adam(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let params = collect_params(registry, args.get_str_list("parameters")?)?;
    let cfg = AdamCfg {
        lr: args.get_float("lr")?,
        beta1: args.get_float("beta1")?,
        beta2: args.get_float("beta2")?,
        eps: args.get_float("eps")?,
        weight_decay: args.get_float("weightDecay")?,
    };
    check_lr(cfg.lr)?;
    if !(0.0..1.0).contains(&cfg.beta1) || !(0.0..1.0).contains(&cfg.beta2) {
        return Err(RtError::argument("Invalid beta value: must be in [0, 1)"));
    }
    Ok(registry.insert_optimizer(Optim::adam(params, cfg)))
}

fn optimizer_step(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let optim = registry.optimizer(args.get_str("optimizer")?)?;
    optim.borrow_mut().step()?;
    Ok(String::new())
}

fn optimizer_zero_grad(registry: &mut Registry, args: &BoundArgs) -> Result<String, RtError> {
    let optim = registry.optimizer(args.get_str("optimizer")?)?;
    optim.borrow_mut().zero_grad();
    Ok(String::new())
}
