//! Layer (module) entries stored in the registry.
//!
//! Each constructed layer owns its variable store; a `sequential` entry owns
//! none itself and forwards through shared references to its parts, so the
//! same layer handle can participate in several compositions.

use std::cell::RefCell;
use std::rc::Rc;

use tch::nn::{self, ModuleT, RNN};
use tch::Tensor;

use crate::error::RtError;

pub enum Layer {
    Plain(Box<dyn ModuleT>),
    Lstm(nn::LSTM),
    Gru(nn::GRU),
    Seq(Vec<Rc<RefCell<LayerEntry>>>),
}

pub struct LayerEntry {
    pub vs: nn::VarStore,
    pub layer: Layer,
}

impl LayerEntry {
    pub fn new(vs: nn::VarStore, layer: Layer) -> Self {
        LayerEntry { vs, layer }
    }

    /// Run the layer. `train` selects train-mode behaviour for layers that
    /// distinguish it (batch norm, dropout); recurrent layers return the
    /// output sequence and drop the final hidden state.
    pub fn forward(&self, input: &Tensor, train: bool) -> Result<Tensor, RtError> {
        match &self.layer {
            Layer::Plain(m) => Ok(m.forward_t(input, train)),
            Layer::Lstm(l) => {
                let (out, _) = l.seq(input);
                Ok(out)
            }
            Layer::Gru(g) => {
                let (out, _) = g.seq(input);
                Ok(out)
            }
            Layer::Seq(parts) => {
                let mut x = input.shallow_clone();
                for part in parts {
                    x = part.borrow().forward(&x, train)?;
                }
                Ok(x)
            }
        }
    }

    /// Trainable parameters, in variable-store order; a sequential entry
    /// yields its parts' parameters in composition order.
    pub fn parameters(&self) -> Vec<Tensor> {
        match &self.layer {
            Layer::Seq(parts) => parts
                .iter()
                .flat_map(|part| part.borrow().parameters())
                .collect(),
            _ => self.vs.trainable_variables(),
        }
    }
}
