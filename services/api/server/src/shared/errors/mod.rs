pub mod base;
pub mod common;
pub mod conversion;

pub use base::{ApiError, ErrorContext, ErrorDetail, codes};
pub use common::*;
