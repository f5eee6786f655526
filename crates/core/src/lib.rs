//! lmn-core: the program tree and VM configuration shared across the
//! lmn toolchain.
//!
//! Key design principle: this crate knows nothing about tokenizing,
//! parsing, or executing. It only defines the immutable data that the
//! compiler produces and the runtime consumes, so neither has to depend
//! on the other.
//!
//! # Modules
//!
//! - `program`: `Argument`, `Operation`, `OpKind`, `Phase`, `Program`
//! - `config`: `VmConfig`, the resource-budget knobs

pub mod config;
pub mod program;

pub use config::VmConfig;
pub use program::{Argument, OpKind, Operation, Phase, Program};
