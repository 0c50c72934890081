//! Session-scoped event delivery.
//!
//! A server broadcasts events; each client session decides whether it should
//! see a given event through an [`EventSessionFilter`]. The crate also tracks
//! the live session set ([`ClientSessionLifecycle`]) and offers a small
//! in-process bus ([`SessionEventBus`]) that applies filters on publish.

pub mod bus;
pub mod filter;
pub mod lifecycle;

pub use self::bus::{SessionEventBus, SubscribeError};
pub use self::filter::{EventSessionFilter, ListEventSessionFilter};
pub use self::lifecycle::{ClientSessionLifecycle, ClientSessionListener, LifecycleError};
