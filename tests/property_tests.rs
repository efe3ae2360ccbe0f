//! Property-based tests for the artifact codec and definition path.

use proptest::prelude::*;

use classveil::runtime::{DefineOptions, Runtime};
use classveil::veil_format::ClassImage;

proptest! {
    /// Decoding must reject or accept arbitrary input, never panic.
    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = ClassImage::decode(&bytes);
    }

    /// Truncating a valid artifact anywhere yields an error, not a partial
    /// class.
    #[test]
    fn truncated_artifacts_never_decode(cut in any::<prop::sample::Index>()) {
        let image = classveil::compiler::compile_source(
            "class NonFindable\n\nfield counter: Int\n\nmethod test() -> Int:\n    return 42\n",
        )
        .unwrap();
        let bytes = image.encode().unwrap();
        // Index maps into the artifact's real length, so every draw is a
        // valid cut point strictly before the end.
        let cut = cut.index(bytes.len());
        prop_assert!(ClassImage::decode(&bytes[..cut]).is_err());
    }

    /// Whatever the bytes, a definition attempt terminates in Ok or a typed
    /// error.
    #[test]
    fn define_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut runtime = Runtime::new();
        let _ = runtime.define(&bytes, DefineOptions::HIDDEN_NESTMATE);
    }
}
