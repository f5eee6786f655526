//! lmn-compiler: tokenizer and recursive-descent parser for the lmn
//! state-transition language.
//!
//! ```
//! let program = lmn_compiler::parse_program(r#"
//!     BEGIN {
//!         PUSH "a"
//!         HALT
//!     }
//! "#).unwrap();
//! assert_eq!(program.phases.len(), 1);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::ParseError;
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::parse_program;
