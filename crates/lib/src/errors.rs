use thiserror::Error;

/// Errors produced when talking to a generative oracle service.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Failed to send request to the oracle service: {0}")]
    Request(reqwest::Error),
    #[error("Failed to deserialize the oracle service response: {0}")]
    Deserialization(reqwest::Error),
    #[error("The oracle service returned an error: {0}")]
    Api(String),
    #[error("API key is missing")]
    MissingApiKey,
}
