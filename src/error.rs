use tgen_constraints::ConstraintError;
use tgen_lang::TypeSystemError;
use thiserror::Error;

/// Failure while assembling engine components.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    TypeSystem(#[from] TypeSystemError),
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}
