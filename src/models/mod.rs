//! Session data model: ages, symptoms, and diagnosis results.

pub mod age;
pub mod diagnosis;
pub mod enums;
pub mod symptom;

pub use age::{AgeBand, AgeDescriptor};
pub use diagnosis::DiagnosisResult;
pub use enums::SymptomCategory;
pub use symptom::SymptomDescriptor;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
