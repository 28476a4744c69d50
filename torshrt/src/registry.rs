//! String-handle storage for native objects that outlive a single command.
//!
//! The registry is an explicit value owned by the interpreter session and
//! passed into every handler; independent sessions never share state.
//! Handles render as `"<prefix><N>"` with a per-kind counter that is never
//! reset for the life of the registry, so a handle is unique within its
//! session once issued.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tch::Tensor;

use crate::error::RtError;
use crate::module::LayerEntry;
use crate::optim::Optim;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Tensor = 0,
    Module = 1,
    Optimizer = 2,
}

impl HandleKind {
    pub fn prefix(self) -> &'static str {
        match self {
            HandleKind::Tensor => "tensor",
            HandleKind::Module => "module",
            HandleKind::Optimizer => "optimizer",
        }
    }
}

#[derive(Default)]
pub struct Registry {
    tensors: HashMap<String, Tensor>,
    modules: HashMap<String, Rc<RefCell<LayerEntry>>>,
    optimizers: HashMap<String, Rc<RefCell<Optim>>>,
    counters: [u64; 3],
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Mint a fresh handle of the given kind. Never collides with a
    /// previously issued handle of that kind for this registry's lifetime.
    pub fn next_handle(&mut self, kind: HandleKind) -> String {
        let idx = kind as usize;
        let n = self.counters[idx];
        self.counters[idx] += 1;
        format!("{}{}", kind.prefix(), n)
    }

    /// Insert or overwrite. Overwriting is an explicit re-assignment only;
    /// handlers mint fresh handles for results.
    pub fn store_tensor(&mut self, handle: &str, tensor: Tensor) {
        self.tensors.insert(handle.to_string(), tensor);
    }

    /// Store a tensor under a freshly minted handle and return it.
    pub fn insert_tensor(&mut self, tensor: Tensor) -> String {
        let handle = self.next_handle(HandleKind::Tensor);
        self.tensors.insert(handle.clone(), tensor);
        handle
    }

    /// Look up a tensor. The returned tensor shares storage with the stored
    /// one, so explicitly in-place operations are visible through the handle.
    pub fn tensor(&self, handle: &str) -> Result<Tensor, RtError> {
        self.tensors
            .get(handle)
            .map(Tensor::shallow_clone)
            .ok_or_else(|| RtError::handle(format!("Invalid tensor name: {handle}")))
    }

    pub fn insert_module(&mut self, entry: LayerEntry) -> String {
        let handle = self.next_handle(HandleKind::Module);
        self.modules.insert(handle.clone(), Rc::new(RefCell::new(entry)));
        handle
    }

    pub fn module(&self, handle: &str) -> Result<Rc<RefCell<LayerEntry>>, RtError> {
        self.modules
            .get(handle)
            .cloned()
            .ok_or_else(|| RtError::handle(format!("Invalid module name: {handle}")))
    }

    pub fn insert_optimizer(&mut self, optim: Optim) -> String {
        let handle = self.next_handle(HandleKind::Optimizer);
        self.optimizers
            .insert(handle.clone(), Rc::new(RefCell::new(optim)));
        handle
    }

    pub fn optimizer(&self, handle: &str) -> Result<Rc<RefCell<Optim>>, RtError> {
        self.optimizers
            .get(handle)
            .cloned()
            .ok_or_else(|| RtError::handle(format!("Invalid optimizer name: {handle}")))
    }

    /// Remove an entry of any kind. The counter is not rewound, so the name
    /// is never reissued.
    pub fn release(&mut self, handle: &str) -> Result<(), RtError> {
        if self.tensors.remove(handle).is_some()
            || self.modules.remove(handle).is_some()
            || self.optimizers.remove(handle).is_some()
        {
            Ok(())
        } else {
            Err(RtError::handle(format!("Invalid handle name: {handle}")))
        }
    }

    pub fn tensor_count(&self) -> usize {
        self.tensors.len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn optimizer_count(&self) -> usize {
        self.optimizers.len()
    }
}
