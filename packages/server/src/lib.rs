// Youtube Title Doctor - API Core
//
// This crate provides the backend API that emails creators improved titles
// for their most recent videos. Work runs as an in-process event cascade:
// each pipeline stage reacts to the previous stage's fact event.
//
// Stages are organized per-domain in domains/*/effects and domains/*/actions.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
