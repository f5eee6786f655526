//! The execution engine: operator dispatch, the SATURATE fixed-point loop,
//! budget enforcement, and the phase driver.

use indexmap::IndexMap;
use lmn_core::{Argument, OpKind, Operation, Phase, Program, VmConfig};
use tracing::{debug, trace, warn};

use crate::cond;
use crate::error::RuntimeError;
use crate::result::{ExecutionResult, FinalState, Status, TraceRecord};

/// How a dispatched operation (or a run of them) wants control to proceed.
/// Not an error: GATE's break and HALT are control-flow signals, per spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlFlow {
    Continue,
    /// A failing GATE: stop the enclosing operation sequence (a SATURATE
    /// iteration or a phase's top level) without raising an error.
    BreakBlock,
    Halted,
}

/// Owns one execution's mutable state. `Vm::execute` resets this before
/// every run, so one instance can safely run many programs in sequence
/// (the Reset safety property) and a shared, immutable `Program` can be
/// executed by many `Vm`s in parallel.
pub struct Vm {
    config: VmConfig,
    stack: Vec<String>,
    bindings: IndexMap<String, String>,
    phase_counter: u64,
    operation_counter: u64,
    halted: bool,
    current_phase_name: String,
    trace: Vec<TraceRecord>,
}

impl Vm {
    pub fn new(config: VmConfig) -> Self {
        Vm {
            config,
            stack: Vec::new(),
            bindings: IndexMap::new(),
            phase_counter: 0,
            operation_counter: 0,
            halted: false,
            current_phase_name: String::new(),
            trace: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.bindings.clear();
        self.phase_counter = 0;
        self.operation_counter = 0;
        self.halted = false;
        self.current_phase_name.clear();
        self.trace.clear();
    }

    /// Executes `program` start to finish, returning the terminating
    /// result. Always resets first, so prior executions on this instance
    /// never leak into this one.
    pub fn execute(&mut self, program: &Program) -> ExecutionResult {
        self.reset();

        let outcome = self.run(program);
        let (status, error_message) = match &outcome {
            Ok(()) if self.halted => (Status::Halted, None),
            Ok(()) => (Status::Complete, None),
            Err(err) => {
                warn!(%err, "execution terminated abnormally");
                (Status::from(err), Some(err.to_string()))
            }
        };

        ExecutionResult {
            status,
            phases_executed: self.phase_counter,
            operations_executed: self.operation_counter,
            final_state: FinalState::capture(&self.stack, &self.bindings),
            trace: if self.config.trace_enabled {
                self.trace.clone()
            } else {
                Vec::new()
            },
            error_message,
        }
    }

    fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for phase in &program.phases {
            match self.execute_phase(phase)? {
                ControlFlow::Halted => break,
                ControlFlow::BreakBlock | ControlFlow::Continue => {}
            }
        }
        Ok(())
    }

    fn execute_phase(&mut self, phase: &Phase) -> Result<ControlFlow, RuntimeError> {
        self.phase_counter += 1;
        self.current_phase_name.clone_from(&phase.name);
        debug!(phase = %phase.name, "entering phase");
        self.run_block(&phase.operations)
    }

    /// Runs a sequence of operations in order, used both for a phase's top
    /// level and for a SATURATE's block body.
    fn run_block(&mut self, operations: &[Operation]) -> Result<ControlFlow, RuntimeError> {
        for op in operations {
            match self.dispatch(op)? {
                ControlFlow::Continue => {}
                flow @ (ControlFlow::BreakBlock | ControlFlow::Halted) => return Ok(flow),
            }
        }
        Ok(ControlFlow::Continue)
    }

    fn dispatch(&mut self, op: &Operation) -> Result<ControlFlow, RuntimeError> {
        if self.operation_counter >= self.config.max_operations {
            return Err(RuntimeError::OpLimit {
                max_operations: self.config.max_operations,
            });
        }
        self.operation_counter += 1;
        trace!(operator = %op.operator, line = op.source_line, "dispatch");

        match op.operator {
            OpKind::Push => {
                self.op_push(&op.arguments[0])?;
                Ok(ControlFlow::Continue)
            }
            OpKind::Invert => {
                self.stack.reverse();
                Ok(ControlFlow::Continue)
            }
            OpKind::Bind => {
                self.op_bind(&op.arguments[0], &op.arguments[1])?;
                Ok(ControlFlow::Continue)
            }
            OpKind::Release => {
                self.bindings.shift_remove(&op.arguments[0].value_string());
                Ok(ControlFlow::Continue)
            }
            OpKind::Gate => {
                if self.op_gate(&op.arguments[0])? {
                    Ok(ControlFlow::Continue)
                } else {
                    Ok(ControlFlow::BreakBlock)
                }
            }
            OpKind::Saturate => self.op_saturate(op.arguments[0].as_block()),
            OpKind::Witness => {
                self.op_witness();
                Ok(ControlFlow::Continue)
            }
            OpKind::Halt => {
                self.halted = true;
                Ok(ControlFlow::Halted)
            }
        }
    }

    fn op_push(&mut self, value: &Argument) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.config.max_stack_depth {
            return Err(RuntimeError::StackOverflow {
                max_stack_depth: self.config.max_stack_depth,
            });
        }
        self.stack.push(value.value_string());
        Ok(())
    }

    fn op_bind(&mut self, key: &Argument, value: &Argument) -> Result<(), RuntimeError> {
        let key = key.value_string();
        if !self.bindings.contains_key(&key) && self.bindings.len() >= self.config.max_bindings {
            return Err(RuntimeError::BindingsOverflow {
                max_bindings: self.config.max_bindings,
            });
        }
        self.bindings.insert(key, value.value_string());
        Ok(())
    }

    fn op_gate(&self, condition: &Argument) -> Result<bool, RuntimeError> {
        cond::evaluate(condition.as_reference(), self.stack.len(), &self.bindings)
    }

    fn op_saturate(&mut self, block: &[Operation]) -> Result<ControlFlow, RuntimeError> {
        let mut iteration: u64 = 0;
        loop {
            if iteration >= self.config.max_saturate_iterations {
                return Err(RuntimeError::CycleLimit {
                    max_saturate_iterations: self.config.max_saturate_iterations,
                });
            }

            let state_before = (self.stack.clone(), self.bindings.clone());
            match self.run_block(block)? {
                ControlFlow::Halted => return Ok(ControlFlow::Halted),
                ControlFlow::BreakBlock => break,
                ControlFlow::Continue => {}
            }
            let state_after = (self.stack.clone(), self.bindings.clone());

            if state_before == state_after {
                break;
            }
            iteration += 1;
        }
        Ok(ControlFlow::Continue)
    }

    fn op_witness(&mut self) {
        if !self.config.trace_enabled {
            return;
        }
        self.trace.push(TraceRecord {
            phase: self.current_phase_name.clone(),
            operation: self.operation_counter,
            stack: self.stack.clone(),
            bindings: self.bindings.clone(),
        });
    }
}
