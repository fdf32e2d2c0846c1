use std::fmt;

#[derive(Debug)]
pub enum PlayError {
    InvalidFormation(String),
    InvalidRoute(String),
    InvalidTrigger(String),
    MissingEntity(String),
    ValidationError(String),
    SerializationError(String),
    DeserializationError(String),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlayError::InvalidFormation(name) => {
                write!(f, "Invalid formation: {}", name)
            }
            PlayError::InvalidRoute(msg) => {
                write!(f, "Invalid route: {}", msg)
            }
            PlayError::InvalidTrigger(msg) => {
                write!(f, "Invalid trigger: {}", msg)
            }
            PlayError::MissingEntity(id) => {
                write!(f, "No entity with id: {}", id)
            }
            PlayError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            PlayError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            PlayError::DeserializationError(msg) => {
                write!(f, "Deserialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for PlayError {}

impl From<serde_json::Error> for PlayError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            PlayError::DeserializationError(err.to_string())
        } else {
            PlayError::SerializationError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, PlayError>;
