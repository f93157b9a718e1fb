//! Vacancy harvester application: configuration, logging and run modes.
pub mod config;
pub mod logging;
pub mod runner;
