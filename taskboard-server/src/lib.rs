//! `Taskboard` task table server library.
//!
//! Exposes the table service for use in tests and embedding. The server
//! owns the `tasks` table and answers every call with a `{ data, error }`
//! envelope.

pub mod api;
pub mod config;
pub mod store;
