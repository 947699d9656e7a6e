// Prize pool daemon library
// Exposes the round lifecycle for the binary and the integration tests

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::type_complexity)]

extern crate log;

pub mod config;
pub mod core;
