use super::{clamp_inputs, clamp_outputs, Function, FunctionDescriptor, OutputBuffer};
use crate::error::{ColorCoreError, Result};
use crate::postscript::{compile, CompiledProgram, Program};

/// PDF Type 4 (PostScript calculator) function. Parses the program once
/// at construction; tries to compile it to a direct closure (see
/// [`crate::postscript::compile`]) and falls back to the interpreter for
/// anything the compiler doesn't support.
pub struct PostScriptFunction {
    domain: Vec<f32>,
    range: Option<Vec<f32>>,
    program: Program,
    compiled: Option<CompiledProgram>,
    out: OutputBuffer,
}

impl std::fmt::Debug for PostScriptFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostScriptFunction")
            .field("domain", &self.domain)
            .field("range", &self.range)
            .field("compiled", &self.compiled.is_some())
            .finish()
    }
}

impl PostScriptFunction {
    pub fn new(descriptor: &FunctionDescriptor) -> Result<Self> {
        let program = Program::parse(&descriptor.postscript_source).map_err(|e| {
            ColorCoreError::InvalidFunction(format!("PostScript calculator parse error: {e}"))
        })?;

        let output_components = descriptor.range.as_ref().map(|r| r.len() / 2);
        let compiled = output_components
            .and_then(|n| compile(&program.tokens, descriptor.domain.len() / 2, n));

        Ok(PostScriptFunction {
            domain: descriptor.domain.clone(),
            range: descriptor.range.clone(),
            program,
            compiled,
            out: OutputBuffer::default(),
        })
    }
}

impl Function for PostScriptFunction {
    fn domain(&self) -> &[f32] {
        &self.domain
    }

    fn range(&self) -> Option<&[f32]> {
        self.range.as_deref()
    }

    fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        let inputs = clamp_inputs(&self.domain, inputs);

        self.out.with(|buf| {
            let ok = match &self.compiled {
                Some(compiled) => compiled.evaluate(&inputs, buf).is_ok(),
                None => false,
            };
            if !ok {
                if self.program.evaluate(&inputs, buf).is_err() {
                    buf.clear();
                    if let Some(range) = &self.range {
                        buf.resize(range.len() / 2, 0.0);
                    }
                }
                if let Some(n) = self.range.as_ref().map(|r| r.len() / 2) {
                    if buf.len() > n {
                        let start = buf.len() - n;
                        buf.drain(0..start);
                    }
                }
            }
            clamp_outputs(self.range.as_deref(), buf);
            buf.clone()
        })
    }
}
