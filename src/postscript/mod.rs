//! Tokenizer and stack evaluator for the PostScript calculator subset used
//! by PDF Type 4 functions (ISO 32000-1 §7.10.5).

mod compiler;
mod evaluator;
mod tokenizer;

pub use compiler::{compile, CompiledProgram};
pub use evaluator::{Evaluator, EvaluatorError};
pub use tokenizer::{tokenize, Token, TokenizeError};

/// A parsed calculator program: the outer `{ ... }` procedure's tokens,
/// ready to run against an operand stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub tokens: Vec<Token>,
}

impl Program {
    /// Parses a Type 4 function stream. The PDF stream is a single
    /// top-level procedure; the outer braces are stripped so `tokens`
    /// holds the procedure body directly.
    pub fn parse(source: &[u8]) -> Result<Program, TokenizeError> {
        let tokens = tokenize(source)?;
        let body = match tokens.as_slice() {
            [Token::Procedure(inner)] => inner.clone(),
            other => other.to_vec(),
        };
        Ok(Program { tokens: body })
    }

    pub fn evaluate(&self, inputs: &[f32], outputs: &mut Vec<f32>) -> Result<(), EvaluatorError> {
        let mut eval = Evaluator::new();
        eval.run(&self.tokens, inputs, outputs)
    }
}
