//! Optimizer state stored in the registry.
//!
//! Updates are computed by hand over the referenced parameter tensors and
//! applied in place under `no_grad`, so every handle sharing storage with a
//! parameter (layer weights, `layer_parameters` results) observes the step.

use tch::{no_grad, Tensor};

use crate::error::RtError;

#[derive(Debug, Clone, Copy)]
pub struct SgdCfg {
    pub lr: f64,
    pub momentum: f64,
    pub dampening: f64,
    pub weight_decay: f64,
    pub nesterov: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct AdamCfg {
    pub lr: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub eps: f64,
    pub weight_decay: f64,
}

pub enum Optim {
    Sgd {
        cfg: SgdCfg,
        params: Vec<Tensor>,
        buf: Vec<Option<Tensor>>,
    },
    Adam {
        cfg: AdamCfg,
        params: Vec<Tensor>,
        exp_avg: Vec<Tensor>,
        exp_avg_sq: Vec<Tensor>,
        step: i64,
    },
}

impl Optim {
    pub fn sgd(params: Vec<Tensor>, cfg: SgdCfg) -> Self {
        let buf = params.iter().map(|_| None).collect();
        Optim::Sgd { cfg, params, buf }
    }

    pub fn adam(params: Vec<Tensor>, cfg: AdamCfg) -> Self {
        let exp_avg = params.iter().map(|p| p.zeros_like()).collect();
        let exp_avg_sq = params.iter().map(|p| p.zeros_like()).collect();
        Optim::Adam {
            cfg,
            params,
            exp_avg,
            exp_avg_sq,
            step: 0,
        }
    }

    fn params(&self) -> &[Tensor] {
        match self {
            Optim::Sgd { params, .. } | Optim::Adam { params, .. } => params,
        }
    }

    pub fn zero_grad(&mut self) {
        for p in self.params() {
            let mut grad = p.grad();
            if grad.defined() {
                let _ = grad.zero_();
            }
        }
    }

    pub fn step(&mut self) -> Result<(), RtError> {
        no_grad(|| self.step_inner())
    }

    fn step_inner(&mut self) -> Result<(), RtError> {
        match self {
            Optim::Sgd { cfg, params, buf } => {
                for (p, slot) in params.iter_mut().zip(buf.iter_mut()) {
                    let grad = p.grad();
                    if !grad.defined() {
                        continue;
                    }
                    let mut d = if cfg.weight_decay != 0.0 {
                        &grad + &*p * cfg.weight_decay
                    } else {
                        grad.shallow_clone()
                    };
                    if cfg.momentum != 0.0 {
                        let momentum = match slot.take() {
                            Some(prev) => prev * cfg.momentum + &d * (1.0 - cfg.dampening),
                            None => d.copy(),
                        };
                        d = if cfg.nesterov {
                            &d + &momentum * cfg.momentum
                        } else {
                            momentum.shallow_clone()
                        };
                        *slot = Some(momentum);
                    }
                    let _ = p.f_sub_(&(d * cfg.lr))?;
                }
                Ok(())
            }
            Optim::Adam {
                cfg,
                params,
                exp_avg,
                exp_avg_sq,
                step,
            } => {
                *step += 1;
                let bias1 = 1.0 - cfg.beta1.powi(*step as i32);
                let bias2 = 1.0 - cfg.beta2.powi(*step as i32);
                for (i, p) in params.iter_mut().enumerate() {
                    let grad = p.grad();
                    if !grad.defined() {
                        continue;
                    }
                    let grad = if cfg.weight_decay != 0.0 {
                        &grad + &*p * cfg.weight_decay
                    } else {
                        grad.shallow_clone()
                    };
                    exp_avg[i] = &exp_avg[i] * cfg.beta1 + &grad * (1.0 - cfg.beta1);
                    exp_avg_sq[i] = &exp_avg_sq[i] * cfg.beta2
                        + grad.pow_tensor_scalar(2.0) * (1.0 - cfg.beta2);
                    let m_hat = &exp_avg[i] / bias1;
                    let v_hat = &exp_avg_sq[i] / bias2;
                    let update = m_hat / (v_hat.sqrt() + cfg.eps) * cfg.lr;
                    let _ = p.f_sub_(&update)?;
                }
                Ok(())
            }
        }
    }
}
