use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Base input out of domain, detected before anything is derived
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Derived state out of domain (stop or unit cost), detected mid-computation
    #[error("Calculation error: {0}")]
    Calculation(String),
}
