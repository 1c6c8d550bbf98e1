use tgen_common::Language;

/// Hard failures of the language layer.
///
/// These are programmer errors (asking for a plugin that does not exist,
/// instantiating a generic with the wrong number of arguments); expected
/// misses such as malformed annotations degrade to `unknown` instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeSystemError {
    #[error("no type system is registered for {0}")]
    UnsupportedLanguage(Language),
    #[error("`{name}` expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}
