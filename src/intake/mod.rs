pub mod age;
pub mod bedrock;
pub mod custom;
pub mod fallback;
pub mod invoker;
pub mod normalize;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod selection;
pub mod session;
pub mod signing;

pub use age::*;
pub use bedrock::*;
pub use custom::*;
pub use fallback::*;
pub use invoker::*;
pub use normalize::*;
pub use parser::*;
pub use prompt::*;
pub use provider::*;
pub use selection::*;
pub use session::*;

use thiserror::Error;

use crate::models::SymptomCategory;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Age must be a whole number between 1 and 120 (got {0:?})")]
    InvalidAge(String),

    #[error("Unknown age group: {0}")]
    UnknownAgeBucket(String),

    #[error("Custom symptom name must not be empty")]
    EmptySymptomName,

    #[error("Severity must be between 1 and 5 (got {0})")]
    InvalidSeverity(u8),

    #[error("Symptom {key} is not in the {category} catalog")]
    UnknownSymptom {
        category: SymptomCategory,
        key: String,
    },

    #[error("No symptoms selected")]
    EmptySelection,

    #[error("No age selected")]
    MissingAge,

    #[error("An analysis is already running for this session")]
    AnalysisInProgress,

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider response is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Provider response has an invalid urgency level: {0}")]
    InvalidUrgency(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
