//! Run-time terminating error kinds.
//!
//! Each variant maps 1:1 onto a non-`Complete`/`Halted` `Status`. These are
//! never exposed to program authors as exceptions; `Vm::execute` folds them
//! into the `ExecutionResult` it returns (see spec §7: "run-time errors are
//! never caught within the program").

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    StackOverflow { max_stack_depth: usize },
    BindingsOverflow { max_bindings: usize },
    CycleLimit { max_saturate_iterations: u64 },
    OpLimit { max_operations: u64 },
    Condition(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::StackOverflow { max_stack_depth } => {
                write!(f, "stack overflow (max depth: {max_stack_depth})")
            }
            RuntimeError::BindingsOverflow { max_bindings } => {
                write!(f, "bindings overflow (max: {max_bindings})")
            }
            RuntimeError::CycleLimit {
                max_saturate_iterations,
            } => write!(
                f,
                "SATURATE exceeded {max_saturate_iterations} iterations"
            ),
            RuntimeError::OpLimit { max_operations } => {
                write!(f, "operation limit exceeded ({max_operations})")
            }
            RuntimeError::Condition(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RuntimeError {}
