//! Crate-level test support and behaviour scenarios.

pub(crate) mod support;
