//! # HTTP Middleware

pub mod tracing_layer;
