//! `ExecutionResult` and the value types it's built from.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::RuntimeError;

/// The terminating status of one `Vm::execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Complete,
    Halted,
    TermOpLimit,
    TermCycleLimit,
    ErrStackOverflow,
    ErrBindingsOverflow,
    ErrCondition,
}

impl Status {
    /// The CLI maps this to exit code 0; everything else maps to 1.
    pub fn is_success(self) -> bool {
        matches!(self, Status::Complete | Status::Halted)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Complete => "COMPLETE",
            Status::Halted => "HALTED",
            Status::TermOpLimit => "TERM_OP_LIMIT",
            Status::TermCycleLimit => "TERM_CYCLE_LIMIT",
            Status::ErrStackOverflow => "ERR_STACK_OVERFLOW",
            Status::ErrBindingsOverflow => "ERR_BINDINGS_OVERFLOW",
            Status::ErrCondition => "ERR_CONDITION",
        };
        f.write_str(s)
    }
}

impl From<&RuntimeError> for Status {
    fn from(err: &RuntimeError) -> Self {
        match err {
            RuntimeError::StackOverflow { .. } => Status::ErrStackOverflow,
            RuntimeError::BindingsOverflow { .. } => Status::ErrBindingsOverflow,
            RuntimeError::CycleLimit { .. } => Status::TermCycleLimit,
            RuntimeError::OpLimit { .. } => Status::TermOpLimit,
            RuntimeError::Condition(_) => Status::ErrCondition,
        }
    }
}

/// A snapshot of stack and bindings, in the shape `ExecutionResult`
/// reports it in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalState {
    pub stack: Vec<String>,
    pub bindings: IndexMap<String, String>,
    pub depth: usize,
    pub binding_count: usize,
}

impl FinalState {
    pub fn capture(stack: &[String], bindings: &IndexMap<String, String>) -> Self {
        FinalState {
            stack: stack.to_vec(),
            bindings: bindings.clone(),
            depth: stack.len(),
            binding_count: bindings.len(),
        }
    }
}

/// One WITNESS checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    pub phase: String,
    pub operation: u64,
    pub stack: Vec<String>,
    pub bindings: IndexMap<String, String>,
}

/// The full outcome of executing a `Program`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub status: Status,
    pub phases_executed: u64,
    pub operations_executed: u64,
    pub final_state: FinalState,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
