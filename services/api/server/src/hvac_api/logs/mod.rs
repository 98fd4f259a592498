pub mod create;
pub mod delete;
pub mod errors;
pub mod list;
pub mod models;
pub mod update;
