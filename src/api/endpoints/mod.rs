//! API endpoint handlers.
//!
//! Each module corresponds to one screen of the intake flow.

pub mod analysis;
pub mod catalog;
pub mod health;
pub mod places;
pub mod sessions;
pub mod symptoms;
