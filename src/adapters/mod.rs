//! File-based implementations of the ports.

pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
