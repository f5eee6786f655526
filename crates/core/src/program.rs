//! The program tree: `Program` -> `Phase` -> `Operation` -> `Argument`.
//!
//! Everything here is produced once by the parser and never mutated again;
//! the VM only ever reads it. The `serde` derives exist so `lmn check
//! --dump-ast` can hand the tree to a collaborator without either side
//! inventing its own schema.

use serde::{Deserialize, Serialize};

/// An operator keyword, fixed at eight members by design (see spec
/// Non-goals: no user-defined operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpKind {
    Push,
    Invert,
    Bind,
    Release,
    Gate,
    Saturate,
    Witness,
    Halt,
}

impl OpKind {
    /// Maps an upper-case keyword lexeme to its operator, or `None` if the
    /// keyword is not a known operator.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "PUSH" => OpKind::Push,
            "INVERT" => OpKind::Invert,
            "BIND" => OpKind::Bind,
            "RELEASE" => OpKind::Release,
            "GATE" => OpKind::Gate,
            "SATURATE" => OpKind::Saturate,
            "WITNESS" => OpKind::Witness,
            "HALT" => OpKind::Halt,
            _ => return None,
        })
    }

    /// Fixed argument count for this operator. `SATURATE`'s single
    /// argument is always a `Block`, never a `Literal`/`Reference`.
    pub fn arity(self) -> usize {
        match self {
            OpKind::Push => 1,
            OpKind::Invert => 0,
            OpKind::Bind => 2,
            OpKind::Release => 1,
            OpKind::Gate => 1,
            OpKind::Saturate => 1,
            OpKind::Witness => 0,
            OpKind::Halt => 0,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            OpKind::Push => "PUSH",
            OpKind::Invert => "INVERT",
            OpKind::Bind => "BIND",
            OpKind::Release => "RELEASE",
            OpKind::Gate => "GATE",
            OpKind::Saturate => "SATURATE",
            OpKind::Witness => "WITNESS",
            OpKind::Halt => "HALT",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A literal value inlined in source: a quoted string or a decimal integer.
///
/// `Int` is `u64` because the grammar's `NUMBER` token is unsigned decimal
/// digits only (spec Open Question: "Integer PUSH coerces to string" is
/// resolved by restricting NUMBER to unsigned decimal, canonical base-10
/// stringification).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Str(String),
    Int(u64),
}

impl Literal {
    /// The string form pushed onto the stack or stored in a binding.
    pub fn coerce_to_string(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            Literal::Int(n) => n.to_string(),
        }
    }
}

/// One operation's argument, tagged by shape rather than carried as an
/// "any value" slot so the type system enforces that only `SATURATE`
/// carries a `Block`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Argument {
    #[serde(rename = "LITERAL")]
    Literal { value: Literal },
    /// An identifier, or a pre-canonicalized GATE condition string (see
    /// `lmn_compiler::parser` for how the latter is assembled).
    #[serde(rename = "REFERENCE")]
    Reference { value: String },
    #[serde(rename = "BLOCK")]
    Block { operations: Vec<Operation> },
}

impl Argument {
    pub fn literal_str(value: impl Into<String>) -> Self {
        Argument::Literal {
            value: Literal::Str(value.into()),
        }
    }

    pub fn literal_int(value: u64) -> Self {
        Argument::Literal {
            value: Literal::Int(value),
        }
    }

    pub fn reference(value: impl Into<String>) -> Self {
        Argument::Reference {
            value: value.into(),
        }
    }

    /// Unwraps a `Reference`'s inner string. Panics if called on a
    /// `Literal`/`Block` argument; callers only reach for this after the
    /// parser has already enforced operand shape per `OpKind`.
    pub fn as_reference(&self) -> &str {
        match self {
            Argument::Reference { value } => value,
            _ => panic!("argument is not a Reference"),
        }
    }

    /// Unwraps a `Literal`'s value, coerced to its string form.
    pub fn as_literal_string(&self) -> String {
        match self {
            Argument::Literal { value } => value.coerce_to_string(),
            _ => panic!("argument is not a Literal"),
        }
    }

    /// The argument's textual value for operators that just move symbols
    /// around (`PUSH`, `BIND`, `RELEASE`): a literal's string form, or a
    /// bare identifier's own text (there are no variables to look up —
    /// see spec Non-goals). Panics on a `Block` argument.
    pub fn value_string(&self) -> String {
        match self {
            Argument::Literal { value } => value.coerce_to_string(),
            Argument::Reference { value } => value.clone(),
            Argument::Block { .. } => panic!("argument is a Block, not a value"),
        }
    }

    /// Unwraps a `Block`'s operations.
    pub fn as_block(&self) -> &[Operation] {
        match self {
            Argument::Block { operations } => operations,
            _ => panic!("argument is not a Block"),
        }
    }
}

/// One dispatched unit of work: an operator plus its fixed-arity arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operator: OpKind,
    pub arguments: Vec<Argument>,
    /// 1-based source line of the operator keyword, for parse diagnostics.
    pub source_line: usize,
}

impl Operation {
    pub fn new(operator: OpKind, arguments: Vec<Argument>, source_line: usize) -> Self {
        debug_assert_eq!(
            arguments.len(),
            operator.arity(),
            "{operator} built with {} arguments, expected {}",
            arguments.len(),
            operator.arity()
        );
        Operation {
            operator,
            arguments,
            source_line,
        }
    }
}

/// A named, non-empty, ordered group of operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub operations: Vec<Operation>,
}

/// A complete parsed program: one or more phases, executed in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub phases: Vec<Phase>,
}

impl Program {
    pub fn new(phases: Vec<Phase>) -> Self {
        Program { phases }
    }
}
