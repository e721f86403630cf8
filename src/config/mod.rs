//! Static configuration
//!
//! Loaded once at startup from `config.toml` plus environment variables and
//! passed explicitly to the components that need it. There is no global
//! configuration singleton; the serving process owns its `StaticConfig`.

mod structs;

pub use structs::*;
