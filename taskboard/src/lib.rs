//! `Taskboard` -- personal task tracker library.

pub mod app;
pub mod board;
pub mod config;
pub mod notify;
pub mod table;
pub mod tasks;
