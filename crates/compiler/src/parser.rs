//! Recursive-descent parser: tokens -> `lmn_core::Program`.
//!
//! ```text
//! program      = phase+
//! phase        = KEYWORD "{" operation+ "}"
//! operation    = opPush | opInvert | opBind | opRelease
//!              | opGate | opSaturate | opWitness | opHalt
//! argument     = STRING | NUMBER | IDENT | conditionArg
//! conditionArg = SYMBOL (NUMBER | IDENT)?
//! ```

use crate::error::ParseError;
use crate::lexer::{Token, TokenKind, tokenize};
use lmn_core::{Argument, OpKind, Operation, Phase, Program};

pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    /// The line of the last consumed token, for diagnostics anchored past
    /// end-of-input (unclosed braces, missing arguments).
    fn last_line(&self) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        match self.advance() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(ParseError::new(
                format!("expected {what}, got '{}'", token.lexeme),
                token.line,
            )),
            None => Err(ParseError::new(
                format!("expected {what}, reached end of file"),
                self.last_line(),
            )),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut phases = Vec::new();
        while self.peek().is_some() {
            phases.push(self.parse_phase()?);
        }
        if phases.is_empty() {
            return Err(ParseError::without_line(
                "program must have at least one phase",
            ));
        }
        Ok(Program::new(phases))
    }

    fn parse_phase(&mut self) -> Result<Phase, ParseError> {
        let name_token = self.expect(TokenKind::Keyword, "a phase name")?;
        let line = name_token.line;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut operations = Vec::new();
        while self.peek_kind() != Some(TokenKind::RBrace) {
            if self.peek().is_none() {
                return Err(ParseError::new(
                    format!("unclosed phase '{}'", name_token.lexeme),
                    line,
                ));
            }
            operations.push(self.parse_operation()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        if operations.is_empty() {
            return Err(ParseError::new(
                format!("phase '{}' must have at least one operation", name_token.lexeme),
                line,
            ));
        }

        Ok(Phase {
            name: name_token.lexeme,
            operations,
        })
    }

    fn parse_operation(&mut self) -> Result<Operation, ParseError> {
        let op_token = self.expect(TokenKind::Keyword, "an operator")?;
        let line = op_token.line;
        let operator = OpKind::from_keyword(&op_token.lexeme)
            .ok_or_else(|| ParseError::new(format!("unknown operator '{}'", op_token.lexeme), line))?;

        if operator == OpKind::Saturate {
            self.expect(TokenKind::LBrace, "'{'")?;
            let mut block = Vec::new();
            while self.peek_kind() != Some(TokenKind::RBrace) {
                if self.peek().is_none() {
                    return Err(ParseError::new("unclosed SATURATE block", line));
                }
                block.push(self.parse_operation()?);
            }
            self.expect(TokenKind::RBrace, "'}'")?;
            return Ok(Operation::new(operator, vec![Argument::Block { operations: block }], line));
        }

        if operator == OpKind::Gate {
            return Ok(Operation::new(operator, vec![self.parse_gate_condition(line)?], line));
        }

        let mut arguments = Vec::with_capacity(operator.arity());
        for _ in 0..operator.arity() {
            arguments.push(self.parse_argument(line)?);
        }
        Ok(Operation::new(operator, arguments, line))
    }

    /// GATE's single argument is a condition, which the lexer hands us as
    /// two or three separate tokens (`depth`, `<`, `5` or `bound`, `foo`).
    /// This canonicalizes them into the one space-joined string
    /// `lmn_runtime`'s condition evaluator expects, rather than treating
    /// GATE like any other single-argument operator.
    fn parse_gate_condition(&mut self, op_line: usize) -> Result<Argument, ParseError> {
        let head = self.advance().ok_or_else(|| {
            ParseError::new("expected a GATE condition, reached end of file", op_line)
        })?;

        let condition = match head.kind {
            TokenKind::Ident if head.lexeme == "depth" => {
                let symbol = self.expect(TokenKind::Symbol, "a comparison operator")?;
                let operand = self.parse_condition_operand(symbol.line)?;
                format!("{} {} {}", head.lexeme, symbol.lexeme, operand)
            }
            TokenKind::Ident if head.lexeme == "bound" || head.lexeme == "unbound" => {
                let key = self.parse_condition_operand(head.line)?;
                format!("{} {key}", head.lexeme)
            }
            TokenKind::Ident => head.lexeme,
            TokenKind::Symbol => {
                let mut condition = head.lexeme;
                if matches!(self.peek_kind(), Some(TokenKind::Number) | Some(TokenKind::Ident)) {
                    let operand = self.advance().expect("peeked token must exist");
                    condition.push(' ');
                    condition.push_str(&operand.lexeme);
                }
                condition
            }
            other => {
                return Err(ParseError::new(
                    format!("unexpected {other:?} '{}' in GATE condition", head.lexeme),
                    head.line,
                ));
            }
        };
        Ok(Argument::reference(condition))
    }

    fn parse_condition_operand(&mut self, prev_line: usize) -> Result<String, ParseError> {
        match self.advance() {
            Some(token) if token.kind == TokenKind::Number || token.kind == TokenKind::Ident => {
                Ok(token.lexeme)
            }
            Some(token) => Err(ParseError::new(
                format!("expected a condition operand, got '{}'", token.lexeme),
                token.line,
            )),
            None => Err(ParseError::new(
                "expected a condition operand, reached end of file",
                prev_line,
            )),
        }
    }

    fn parse_argument(&mut self, op_line: usize) -> Result<Argument, ParseError> {
        let token = self.advance().ok_or_else(|| {
            ParseError::new("expected argument, reached end of file", op_line)
        })?;

        match token.kind {
            TokenKind::String => Ok(Argument::literal_str(token.lexeme)),
            TokenKind::Number => {
                let value: u64 = token.lexeme.parse().map_err(|_| {
                    ParseError::new(format!("invalid integer literal '{}'", token.lexeme), token.line)
                })?;
                Ok(Argument::literal_int(value))
            }
            TokenKind::Ident => Ok(Argument::reference(token.lexeme)),
            TokenKind::Symbol => {
                let mut condition = token.lexeme;
                if matches!(self.peek_kind(), Some(TokenKind::Number) | Some(TokenKind::Ident)) {
                    let operand = self.advance().expect("peeked token must exist");
                    condition.push(' ');
                    condition.push_str(&operand.lexeme);
                }
                Ok(Argument::reference(condition))
            }
            other => Err(ParseError::new(
                format!("unexpected {other:?} '{}' as argument", token.lexeme),
                token.line,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_phase() {
        let program = parse_program(
            r#"
            BEGIN {
                PUSH "test"
                WITNESS
            }
            "#,
        )
        .unwrap();
        assert_eq!(program.phases.len(), 1);
        assert_eq!(program.phases[0].name, "BEGIN");
        assert_eq!(program.phases[0].operations.len(), 2);
    }

    #[test]
    fn parses_multiple_phases_in_order() {
        let program = parse_program(
            r#"
            PHASE_ONE { PUSH "a" }
            PHASE_TWO { PUSH "b" INVERT }
            "#,
        )
        .unwrap();
        assert_eq!(program.phases.len(), 2);
        assert_eq!(program.phases[0].name, "PHASE_ONE");
        assert_eq!(program.phases[1].name, "PHASE_TWO");
    }

    #[test]
    fn parses_saturate_block_with_gate_condition() {
        let program = parse_program(
            r#"
            TEST {
                SATURATE {
                    PUSH "x"
                    GATE depth < 5
                }
            }
            "#,
        )
        .unwrap();
        let op = &program.phases[0].operations[0];
        assert_eq!(op.operator, OpKind::Saturate);
        let block = op.arguments[0].as_block();
        assert_eq!(block.len(), 2);
        assert_eq!(block[1].operator, OpKind::Gate);
        assert_eq!(block[1].arguments[0].as_reference(), "depth < 5");
    }

    #[test]
    fn parses_bound_and_unbound_conditions() {
        let program = parse_program(
            r#"
            T {
                GATE unbound done
                GATE bound other
            }
            "#,
        )
        .unwrap();
        let ops = &program.phases[0].operations;
        assert_eq!(ops[0].arguments[0].as_reference(), "unbound done");
        assert_eq!(ops[1].arguments[0].as_reference(), "bound other");
    }

    #[test]
    fn empty_program_is_an_error() {
        assert!(parse_program("").is_err());
    }

    #[test]
    fn empty_phase_is_an_error() {
        let err = parse_program("T { }").unwrap_err();
        assert!(err.message.contains("must have at least one operation"));
    }

    #[test]
    fn unclosed_phase_is_an_error() {
        let err = parse_program("T { PUSH \"a\"").unwrap_err();
        assert!(err.message.contains("unclosed phase"));
    }

    #[test]
    fn unknown_operator_is_an_error() {
        let err = parse_program("T { NOPE }").unwrap_err();
        assert!(err.message.contains("unknown operator"));
    }

    #[test]
    fn wrong_arity_is_an_error() {
        let err = parse_program("T { BIND \"k\" }").unwrap_err();
        assert!(err.message.contains("reached end of file"));
    }
}
