// src/lib.rs

pub mod charts;
pub mod config;
pub mod error;
pub mod power;
pub mod process;
pub mod report;
pub mod schema;
pub mod table;

pub use error::{Result, SurveyError};
