//! Energy Sync - reconciles metering readings into Postgres and serves daily production
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod metering;
pub mod routes;
pub mod storage;
pub mod sync;
pub mod weather;
