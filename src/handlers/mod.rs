//! HTTP handlers: the serve path for stored files and the host's probes.

pub mod health_handlers;
pub mod serve_handlers;
