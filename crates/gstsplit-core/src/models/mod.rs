//! Data models for the splitter and its configuration.

pub mod config;
pub mod invoice;
