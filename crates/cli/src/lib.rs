//! `fleetd`: the HTTP/CLI shell around `fleet-core`. Routes deserialize
//! requests, call into the core, and serialize responses; the `launch` and
//! `install` subcommands are thin clients of the running server and the
//! local profile store respectively.

pub mod config;
pub mod http;
pub mod install;
pub mod launch;
pub mod run;

#[cfg(test)]
pub mod test_support;

pub use config::Config;
