/// Hard failures when building constraints.
///
/// Evaluation never fails: a constraint that cannot decide returns a
/// permissive mask.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    #[error("no constraint bucket handles kind `{0}`")]
    UnknownConstraintKind(String),
    #[error("invalid token pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unsupported JSON schema at `{path}`: {reason}")]
    UnsupportedSchema { path: String, reason: String },
}
