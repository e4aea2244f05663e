//! Data types shared across the pipeline.

pub mod job;
pub mod notification;
pub mod run;
pub mod saved_search;
pub mod schedule;
