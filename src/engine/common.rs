// src/engine/common.rs
//
// Common utilities shared across engine modules.
// Provides the engine result alias and panic containment for native codecs.

use crate::error::ConvertError;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Engine operations always report ConvertError so the error kind survives
/// up to the batch boundary.
pub type EngineResult<T> = std::result::Result<T, ConvertError>;

/// Run a codec call, turning a panic into the error built by `on_panic`.
///
/// mozjpeg reports libjpeg failures by unwinding, and libwebp/image can
/// panic on hostile input, so every native call goes through here.
pub fn run_with_panic_policy<T, F, P>(stage: &'static str, on_panic: P, f: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T>,
    P: FnOnce(String) -> ConvertError,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(stage, %message, "codec panicked");
            Err(on_panic(format!("{stage}: {message}")))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_passes_through_ok_and_err() {
        let ok = run_with_panic_policy("test", ConvertError::decode_failed, || Ok(7));
        assert_eq!(ok.unwrap(), 7);

        let err: EngineResult<()> = run_with_panic_policy(
            "test",
            ConvertError::decode_failed,
            || Err(ConvertError::encode_failed("png", "nope")),
        );
        assert_eq!(err.unwrap_err().kind(), ErrorKind::Encode);
    }

    #[test]
    fn test_panic_becomes_stage_error() {
        let err: EngineResult<()> =
            run_with_panic_policy("decode:jpeg", ConvertError::decode_failed, || {
                panic!("corrupt huffman table")
            });
        let err = err.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        let text = err.to_string();
        assert!(text.contains("decode:jpeg"));
        assert!(text.contains("corrupt huffman table"));
    }
}
