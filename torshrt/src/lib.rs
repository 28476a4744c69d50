//! Command-dispatch runtime exposing tensor operations as named commands.
//!
//! A session is an [`Interp`] owning a [`Registry`] of string-handled
//! tensors, layers and optimizers. Commands accept positional, named
//! (`-flag value`) or hybrid argument syntax and return handle strings or
//! encoded values.

pub mod binder;
pub mod commands;
pub mod error;
pub mod interp;
pub mod list;
pub mod module;
pub mod optim;
pub mod registry;
pub mod trace;

pub use error::RtError;
pub use interp::{command_table, Interp};
pub use registry::{HandleKind, Registry};
pub use trace::{TraceLog, TraceRecord};
