//! Shared task model and data-store wire contract for `Taskboard`.

pub mod rows;
pub mod table;
pub mod task;
