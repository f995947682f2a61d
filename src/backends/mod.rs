//! Backend implementations.

pub mod cli;
pub mod connect;
