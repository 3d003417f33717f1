//! Utility modules and helper functions
//!
//! This module contains shared utilities and helper functions used across the application.

pub mod dates;
pub mod encoding;
pub mod logging;
pub mod validation;

// Re-export commonly used utilities
pub use dates::*;
pub use encoding::*;
pub use logging::*;
pub use validation::*;
