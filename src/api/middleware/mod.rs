//! API middleware.
//!
//! Execution order (outermost first):
//! 1. CORS
//! 2. `Cache-Control: no-store`
//! 3. Access logger

pub mod access_log;
