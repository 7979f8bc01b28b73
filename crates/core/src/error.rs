use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
