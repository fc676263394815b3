pub mod error;
pub mod geo;
pub mod logger;
pub mod runtime_paths;
pub mod time;
pub mod validation;
