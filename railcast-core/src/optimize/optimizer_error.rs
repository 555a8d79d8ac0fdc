#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("invalid allocation request: {0}")]
    InvalidRequest(String),
    #[error("invalid allocation constraints: {0}")]
    InvalidConstraints(String),
    #[error("invalid optimizer configuration: {0}")]
    InvalidConfig(String),
    #[error("malformed integer program: {0}")]
    InvalidProgram(String),
}
