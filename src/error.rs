use thiserror::Error;

/// Errors produced while constructing or evaluating the color/function/shading core.
///
/// Construction failures are meant to be recoverable: callers fall back to an
/// identity or solid-black result rather than propagate a hard error into the
/// renderer (see the module docs on each builder for the exact fallback).
#[derive(Error, Debug)]
pub enum ColorCoreError {
    #[error("invalid color space descriptor: {0}")]
    InvalidColorSpace(String),

    #[error("invalid function descriptor: {0}")]
    InvalidFunction(String),

    #[error("sampled function grid too large: {0} entries (limit 8,000,000)")]
    SampledGridTooLarge(usize),

    #[error("unsupported function type: {0}")]
    UnsupportedFunctionType(u8),

    #[error("unsupported shading type: {0}")]
    UnsupportedShadingType(u8),

    #[error("invalid shading descriptor: {0}")]
    InvalidShading(String),

    #[error("invalid pattern descriptor: {0}")]
    InvalidPattern(String),

    #[error("PostScript evaluator error: {0}")]
    Evaluator(#[from] crate::postscript::EvaluatorError),

    #[error("mesh stream decode error: {0}")]
    MeshDecode(String),
}

pub type Result<T> = std::result::Result<T, ColorCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_color_space_message() {
        let err = ColorCoreError::InvalidColorSpace("missing alternate space".to_string());
        assert_eq!(
            err.to_string(),
            "invalid color space descriptor: missing alternate space"
        );
    }

    #[test]
    fn sampled_grid_too_large_message() {
        let err = ColorCoreError::SampledGridTooLarge(9_000_000);
        assert!(err.to_string().contains("9000000"));
    }

    #[test]
    fn evaluator_error_converts() {
        let eval_err = crate::postscript::EvaluatorError::StackUnderflow;
        let err: ColorCoreError = eval_err.into();
        match err {
            ColorCoreError::Evaluator(_) => {}
            _ => panic!("expected Evaluator variant"),
        }
    }

    #[test]
    fn result_alias_ok_and_err() {
        let ok: Result<i32> = Ok(5);
        assert_eq!(ok.unwrap(), 5);

        let err: Result<i32> = Err(ColorCoreError::UnsupportedShadingType(9));
        assert!(err.is_err());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ColorCoreError>();
    }
}
