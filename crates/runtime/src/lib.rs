//! lmn-runtime: the virtual machine that executes a parsed `lmn_core::Program`.
//!
//! ```
//! use lmn_core::VmConfig;
//! use lmn_runtime::Vm;
//!
//! let program = lmn_compiler::parse_program(r#"
//!     BEGIN {
//!         PUSH "a"
//!         HALT
//!     }
//! "#).unwrap();
//!
//! let mut vm = Vm::new(VmConfig::default());
//! let result = vm.execute(&program);
//! assert_eq!(result.final_state.stack, vec!["a".to_string()]);
//! ```

pub mod cond;
pub mod error;
pub mod result;
pub mod vm;

pub use error::RuntimeError;
pub use result::{ExecutionResult, FinalState, Status, TraceRecord};
pub use vm::Vm;
