pub mod decimal;
pub mod errors;
pub mod extractors;
