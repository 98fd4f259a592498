pub mod buildings;
pub mod maintenance_logs;
