//! Weekly timesheets: daily task entries capped at eight hours a day, with
//! week totals and status derived from the entries after every change.

pub mod auth;
pub mod cli;
pub mod dashboard;
pub mod db;
pub mod engine;
pub mod error;
pub mod import;
pub mod service;
pub mod store;
pub mod types;

pub use error::{Reject, TimesheetError};
