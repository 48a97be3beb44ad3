//! # Middleware References
//!
//! Authentication shapes only ever point at middleware; the types here describe
//! those pointers and how they are checked.

pub mod config;

pub use config::{
    MiddlewareConfigRef, MiddlewareConfigValidator, OpaqueMiddlewareValidator,
    RegisteredMiddlewareValidator,
};
