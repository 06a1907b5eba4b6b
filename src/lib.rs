//! AlumTrace Library
//!
//! Core modules for the AlumTrace alumni record tracing client.

pub mod api;
pub mod claim;
pub mod config;
pub mod consent;
pub mod core;
pub mod error;
pub mod locator;
pub mod login;
pub mod posts;
pub mod selection;
pub mod session;
pub mod utils;
