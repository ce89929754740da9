//! Resolve AWS access credentials for the IoT connector and check them
//! against the live service.
//!
//! Values come from two layers: runtime overrides ([`config::OverrideMap`])
//! shadow the persisted settings ([`config::ConfigStore`]). Nothing is cached;
//! every call reads both layers again.

pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
