//! Compiles a purely arithmetic/logical calculator procedure into a direct
//! closure, skipping the interpreter's token dispatch on the hot path.
//! Compilation fails closed: any operator outside the supported set, or
//! any shape the symbolic evaluator can't prove has a fixed operand count,
//! leaves the caller to fall back to [`super::Evaluator`].

use super::evaluator::EvaluatorError;
use super::tokenizer::Token;

/// A compiled calculator program. Holds nothing but the expression tree;
/// evaluation allocates no intermediate `Vec` beyond the caller-supplied
/// output slice.
pub struct CompiledProgram {
    ops: Vec<Op>,
}

#[derive(Debug, Clone)]
enum Op {
    Push(f64),
    PushInput(usize),
    Unary(UnaryOp, Box<Op>),
    Binary(BinaryOp, Box<Op>, Box<Op>),
}

#[derive(Debug, Clone, Copy)]
enum UnaryOp {
    Neg,
    Abs,
    Sqrt,
    Ceiling,
    Floor,
    Round,
    Truncate,
    Sin,
    Cos,
    Ln,
    Log,
}

#[derive(Debug, Clone, Copy)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Exp,
}

impl Op {
    fn eval(&self, inputs: &[f32]) -> Result<f64, EvaluatorError> {
        match self {
            Op::Push(v) => Ok(*v),
            Op::PushInput(i) => Ok(*inputs.get(*i).ok_or(EvaluatorError::StackUnderflow)? as f64),
            Op::Unary(op, a) => {
                let a = a.eval(inputs)?;
                Ok(match op {
                    UnaryOp::Neg => -a,
                    UnaryOp::Abs => a.abs(),
                    UnaryOp::Sqrt => a.max(0.0).sqrt(),
                    UnaryOp::Ceiling => a.ceil(),
                    UnaryOp::Floor => a.floor(),
                    UnaryOp::Round => a.round(),
                    UnaryOp::Truncate => a.trunc(),
                    UnaryOp::Sin => a.to_radians().sin(),
                    UnaryOp::Cos => a.to_radians().cos(),
                    UnaryOp::Ln => a.ln(),
                    UnaryOp::Log => a.log10(),
                })
            }
            Op::Binary(op, a, b) => {
                let a = a.eval(inputs)?;
                let b = b.eval(inputs)?;
                Ok(match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => {
                        if b == 0.0 {
                            return Err(EvaluatorError::DivisionByZero);
                        }
                        a / b
                    }
                    BinaryOp::Exp => a.powf(b),
                })
            }
        }
    }
}

impl CompiledProgram {
    pub fn evaluate(&self, inputs: &[f32], out: &mut Vec<f32>) -> Result<(), EvaluatorError> {
        out.clear();
        for op in &self.ops {
            out.push(op.eval(inputs)? as f32);
        }
        Ok(())
    }
}

/// Attempts to compile `tokens` (the body of a Type 4 function, after the
/// outer procedure has been stripped) into a [`CompiledProgram`] with
/// `output_components` outputs. Returns `None` if the program uses any
/// token the symbolic evaluator doesn't model (control flow, stack
/// shuffling, an unrecognized operator).
pub fn compile(tokens: &[Token], input_count: usize, output_components: usize) -> Option<CompiledProgram> {
    let mut stack: Vec<Op> = (0..input_count).map(Op::PushInput).collect();
    for token in tokens {
        match token {
            Token::Number(n) => stack.push(Op::Push(*n)),
            Token::ExecutableName(name) => apply_operator(&mut stack, name)?,
            _ => return None,
        }
    }
    if stack.len() < output_components {
        return None;
    }
    let ops = stack.split_off(stack.len() - output_components);
    Some(CompiledProgram { ops })
}

fn apply_operator(stack: &mut Vec<Op>, name: &str) -> Option<()> {
    let unary = |op: UnaryOp, stack: &mut Vec<Op>| -> Option<()> {
        let a = stack.pop()?;
        stack.push(Op::Unary(op, Box::new(a)));
        Some(())
    };
    let binary = |op: BinaryOp, stack: &mut Vec<Op>| -> Option<()> {
        let b = stack.pop()?;
        let a = stack.pop()?;
        stack.push(Op::Binary(op, Box::new(a), Box::new(b)));
        Some(())
    };
    match name {
        "add" => binary(BinaryOp::Add, stack),
        "sub" => binary(BinaryOp::Sub, stack),
        "mul" => binary(BinaryOp::Mul, stack),
        "div" => binary(BinaryOp::Div, stack),
        "exp" => binary(BinaryOp::Exp, stack),
        "neg" => unary(UnaryOp::Neg, stack),
        "abs" => unary(UnaryOp::Abs, stack),
        "sqrt" => unary(UnaryOp::Sqrt, stack),
        "ceiling" => unary(UnaryOp::Ceiling, stack),
        "floor" => unary(UnaryOp::Floor, stack),
        "round" => unary(UnaryOp::Round, stack),
        "truncate" => unary(UnaryOp::Truncate, stack),
        "sin" => unary(UnaryOp::Sin, stack),
        "cos" => unary(UnaryOp::Cos, stack),
        "ln" => unary(UnaryOp::Ln, stack),
        "log" => unary(UnaryOp::Log, stack),
        "dup" => {
            let a = stack.last()?.clone();
            stack.push(a);
            Some(())
        }
        "exch" => {
            let len = stack.len();
            if len < 2 {
                return None;
            }
            stack.swap(len - 1, len - 2);
            Some(())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postscript::{tokenize, Evaluator, Token};

    fn body_of(src: &[u8]) -> Vec<Token> {
        let tokens = tokenize(src).unwrap();
        match &tokens[0] {
            Token::Procedure(inner) => inner.clone(),
            _ => panic!("expected outer procedure"),
        }
    }

    #[test]
    fn compiles_simple_arithmetic() {
        let body = body_of(b"{ 2 mul 1 add }");
        let compiled = compile(&body, 1, 1).expect("should compile");
        let mut out = Vec::new();
        compiled.evaluate(&[0.25], &mut out).unwrap();
        assert_eq!(out, vec![1.5]);
    }

    #[test]
    fn refuses_control_flow() {
        let body = body_of(b"{ true { 1 } { 0 } ifelse }");
        assert!(compile(&body, 0, 1).is_none());
    }

    #[test]
    fn agrees_with_interpreter_on_random_inputs() {
        let body = body_of(b"{ dup mul exch dup mul add sqrt }");
        let compiled = compile(&body, 2, 1).expect("should compile");
        for i in 0..50 {
            let a = (i as f32) * 0.13 - 3.0;
            let b = (i as f32) * 0.07 - 1.5;
            let mut compiled_out = Vec::new();
            compiled.evaluate(&[a, b], &mut compiled_out).unwrap();

            let mut interp_out = Vec::new();
            Evaluator::new().run(&body, &[a, b], &mut interp_out).unwrap();

            assert!((compiled_out[0] - interp_out[0]).abs() < 1e-4);
        }
    }
}
