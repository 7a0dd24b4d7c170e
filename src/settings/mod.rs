//! The layered settings resolver.
//!
//! [`Settings`] holds an ordered list of loaded source layers and
//! resolves named keys against them: the first layer containing a key
//! determines the result, and typed getters coerce it to the requested
//! type.

mod resolver;

pub use resolver::{Lookup, MissPolicy, Settings, SettingsBuilder};
