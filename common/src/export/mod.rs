//! Export core modules shared by the report sinks.

pub mod excel_core;

pub use excel_core::generate_workbook_buffer;
