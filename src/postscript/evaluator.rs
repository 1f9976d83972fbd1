use super::tokenizer::Token;
use lazy_static::lazy_static;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("operand type mismatch for {0}")]
    TypeMismatch(&'static str),

    #[error("if/ifelse requires procedure operands")]
    NotAProcedure,
}

lazy_static! {
    /// Names recognized by the evaluator, used by the compiler to decide
    /// whether a program is purely arithmetic/logical (eligible for
    /// direct compilation) before it ever looks at argument counts.
    pub static ref KNOWN_OPERATORS: HashSet<&'static str> = [
        "add", "sub", "mul", "div", "idiv", "mod", "neg", "abs", "ceiling",
        "floor", "round", "truncate", "sqrt", "sin", "cos", "atan", "exp",
        "ln", "log", "cvi", "cvr", "eq", "ne", "lt", "le", "gt", "ge",
        "and", "or", "xor", "not", "bitshift", "dup", "exch", "pop",
        "copy", "index", "roll", "if", "ifelse", "true", "false",
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Num(f64),
    Bool(bool),
}

impl Value {
    fn as_num(self) -> Result<f64, EvaluatorError> {
        match self {
            Value::Num(n) => Ok(n),
            Value::Bool(_) => Err(EvaluatorError::TypeMismatch("number")),
        }
    }

    fn as_bool(self) -> Result<bool, EvaluatorError> {
        match self {
            Value::Bool(b) => Ok(b),
            Value::Num(_) => Err(EvaluatorError::TypeMismatch("boolean")),
        }
    }
}

/// A stack machine over a single operand stack. Procedures execute their
/// tokens against the live stack rather than a fresh one: `if`/`ifelse`
/// are the only source of control flow, there is no `def`/loop construct.
pub struct Evaluator {
    stack: Vec<Value>,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator { stack: Vec::new() }
    }

    pub fn run(
        &mut self,
        tokens: &[Token],
        inputs: &[f32],
        outputs: &mut Vec<f32>,
    ) -> Result<(), EvaluatorError> {
        self.stack.clear();
        for &x in inputs {
            self.stack.push(Value::Num(x as f64));
        }
        self.exec(tokens)?;
        outputs.clear();
        for v in &self.stack {
            outputs.push(v.as_num()? as f32);
        }
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, EvaluatorError> {
        self.stack.pop().ok_or(EvaluatorError::StackUnderflow)
    }

    fn pop_num(&mut self) -> Result<f64, EvaluatorError> {
        self.pop()?.as_num()
    }

    fn pop_bool(&mut self) -> Result<bool, EvaluatorError> {
        self.pop()?.as_bool()
    }

    fn exec(&mut self, tokens: &[Token]) -> Result<(), EvaluatorError> {
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i] {
                Token::Number(n) => self.stack.push(Value::Num(*n)),
                Token::Boolean(b) => self.stack.push(Value::Bool(*b)),
                Token::Procedure(_) => {
                    // Procedures are only meaningful as operands to if/ifelse;
                    // a bare procedure token is skipped here and consumed by
                    // the following operator via look-behind in `if`/`ifelse`.
                    return self.exec_with_procedures(tokens, i);
                }
                Token::ExecutableName(name) => self.exec_operator(name)?,
                _ => return Err(EvaluatorError::TypeMismatch("unsupported token")),
            }
            i += 1;
        }
        Ok(())
    }

    /// Handles the `bool {proc} if` / `bool {proc} {proc} ifelse` shape by
    /// scanning forward from a procedure literal to its controlling
    /// operator, since procedures are pushed as pending operands rather
    /// than executed immediately.
    fn exec_with_procedures(&mut self, tokens: &[Token], start: usize) -> Result<(), EvaluatorError> {
        let mut i = start;
        while i < tokens.len() {
            match &tokens[i] {
                Token::Number(n) => {
                    self.stack.push(Value::Num(*n));
                    i += 1;
                }
                Token::Boolean(b) => {
                    self.stack.push(Value::Bool(*b));
                    i += 1;
                }
                Token::Procedure(body) => {
                    // Look ahead for a second procedure (ifelse) or jump to if.
                    if let Some(Token::Procedure(second)) = tokens.get(i + 1) {
                        match tokens.get(i + 2) {
                            Some(Token::ExecutableName(op)) if op == "ifelse" => {
                                let cond = self.pop_bool()?;
                                if cond {
                                    self.exec(body)?;
                                } else {
                                    self.exec(second)?;
                                }
                                i += 3;
                                continue;
                            }
                            _ => {}
                        }
                    }
                    match tokens.get(i + 1) {
                        Some(Token::ExecutableName(op)) if op == "if" => {
                            let cond = self.pop_bool()?;
                            if cond {
                                self.exec(body)?;
                            }
                            i += 2;
                        }
                        _ => return Err(EvaluatorError::NotAProcedure),
                    }
                }
                Token::ExecutableName(name) => {
                    self.exec_operator(name)?;
                    i += 1;
                }
                _ => return Err(EvaluatorError::TypeMismatch("unsupported token")),
            }
        }
        Ok(())
    }

    fn exec_operator(&mut self, name: &str) -> Result<(), EvaluatorError> {
        match name {
            "add" => self.binary_num(|a, b| Ok(a + b)),
            "sub" => self.binary_num(|a, b| Ok(a - b)),
            "mul" => self.binary_num(|a, b| Ok(a * b)),
            "div" => self.binary_num(|a, b| {
                if b == 0.0 {
                    Err(EvaluatorError::DivisionByZero)
                } else {
                    Ok(a / b)
                }
            }),
            "idiv" => self.binary_num(|a, b| {
                if b == 0.0 {
                    Err(EvaluatorError::DivisionByZero)
                } else {
                    Ok(((a as i64) / (b as i64)) as f64)
                }
            }),
            "mod" => self.binary_num(|a, b| {
                if b == 0.0 {
                    Err(EvaluatorError::DivisionByZero)
                } else {
                    Ok(((a as i64) % (b as i64)) as f64)
                }
            }),
            "neg" => self.unary_num(|a| Ok(-a)),
            "abs" => self.unary_num(|a| Ok(a.abs())),
            "ceiling" => self.unary_num(|a| Ok(a.ceil())),
            "floor" => self.unary_num(|a| Ok(a.floor())),
            "round" => self.unary_num(|a| Ok(a.round())),
            "truncate" => self.unary_num(|a| Ok(a.trunc())),
            "sqrt" => self.unary_num(|a| Ok(a.max(0.0).sqrt())),
            "sin" => self.unary_num(|a| Ok(a.to_radians().sin())),
            "cos" => self.unary_num(|a| Ok(a.to_radians().cos())),
            "atan" => self.binary_num(|num, den| {
                let mut deg = num.atan2(den).to_degrees();
                if deg < 0.0 {
                    deg += 360.0;
                }
                Ok(deg)
            }),
            "exp" => self.binary_num(|base, exponent| Ok(base.powf(exponent))),
            "ln" => self.unary_num(|a| Ok(a.ln())),
            "log" => self.unary_num(|a| Ok(a.log10())),
            "cvi" => self.unary_num(|a| Ok(a.trunc())),
            "cvr" => self.unary_num(Ok),
            "eq" => self.compare(|a, b| a == b),
            "ne" => self.compare(|a, b| a != b),
            "lt" => self.compare(|a, b| a < b),
            "le" => self.compare(|a, b| a <= b),
            "gt" => self.compare(|a, b| a > b),
            "ge" => self.compare(|a, b| a >= b),
            "and" => self.logical(|a, b| a && b, |a, b| a & b),
            "or" => self.logical(|a, b| a || b, |a, b| a | b),
            "xor" => self.logical(|a, b| a != b, |a, b| a ^ b),
            "not" => {
                match self.pop()? {
                    Value::Bool(b) => self.stack.push(Value::Bool(!b)),
                    Value::Num(n) => self.stack.push(Value::Num(!(n as i64) as f64)),
                }
                Ok(())
            }
            "bitshift" => {
                let shift = self.pop_num()? as i64;
                let value = self.pop_num()? as i64;
                let shifted = if shift >= 0 {
                    value.wrapping_shl(shift.min(63) as u32)
                } else {
                    value.wrapping_shr((-shift).min(63) as u32)
                };
                self.stack.push(Value::Num(shifted as f64));
                Ok(())
            }
            "dup" => {
                let top = *self.stack.last().ok_or(EvaluatorError::StackUnderflow)?;
                self.stack.push(top);
                Ok(())
            }
            "exch" => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.stack.push(b);
                self.stack.push(a);
                Ok(())
            }
            "pop" => {
                self.pop()?;
                Ok(())
            }
            "copy" => {
                let n = self.pop_num()? as usize;
                if n > self.stack.len() {
                    return Err(EvaluatorError::StackUnderflow);
                }
                let start = self.stack.len() - n;
                let slice: Vec<Value> = self.stack[start..].to_vec();
                self.stack.extend(slice);
                Ok(())
            }
            "index" => {
                let n = self.pop_num()? as usize;
                let len = self.stack.len();
                let v = *self
                    .stack
                    .get(len.checked_sub(n + 1).ok_or(EvaluatorError::StackUnderflow)?)
                    .ok_or(EvaluatorError::StackUnderflow)?;
                self.stack.push(v);
                Ok(())
            }
            "roll" => {
                let j = self.pop_num()? as i64;
                let n = self.pop_num()? as usize;
                if n > self.stack.len() {
                    return Err(EvaluatorError::StackUnderflow);
                }
                if n == 0 {
                    return Ok(());
                }
                let start = self.stack.len() - n;
                let slice = &mut self.stack[start..];
                let shift = j.rem_euclid(n as i64) as usize;
                slice.rotate_right(shift);
                Ok(())
            }
            other => Err(EvaluatorError::UnknownOperator(other.to_string())),
        }
    }

    fn binary_num(
        &mut self,
        f: impl Fn(f64, f64) -> Result<f64, EvaluatorError>,
    ) -> Result<(), EvaluatorError> {
        let b = self.pop_num()?;
        let a = self.pop_num()?;
        self.stack.push(Value::Num(f(a, b)?));
        Ok(())
    }

    fn unary_num(&mut self, f: impl Fn(f64) -> Result<f64, EvaluatorError>) -> Result<(), EvaluatorError> {
        let a = self.pop_num()?;
        self.stack.push(Value::Num(f(a)?));
        Ok(())
    }

    fn compare(&mut self, f: impl Fn(f64, f64) -> bool) -> Result<(), EvaluatorError> {
        let b = self.pop_num()?;
        let a = self.pop_num()?;
        self.stack.push(Value::Bool(f(a, b)));
        Ok(())
    }

    fn logical(
        &mut self,
        bool_op: impl Fn(bool, bool) -> bool,
        int_op: impl Fn(i64, i64) -> i64,
    ) -> Result<(), EvaluatorError> {
        let b = self.pop()?;
        let a = self.pop()?;
        match (a, b) {
            (Value::Bool(a), Value::Bool(b)) => self.stack.push(Value::Bool(bool_op(a, b))),
            (Value::Num(a), Value::Num(b)) => {
                self.stack.push(Value::Num(int_op(a as i64, b as i64) as f64))
            }
            _ => return Err(EvaluatorError::TypeMismatch("matching operand types")),
        }
        Ok(())
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}
