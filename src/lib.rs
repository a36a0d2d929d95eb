//! Library crate for igrite-back, exposing modules for binaries, client adapters and integration tests.

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
