//! Core types and trait definitions for the Lore lesson-sharing backend.
//!
//! No HTTP and no database here: the store, identity and payment
//! boundaries are traits implemented by the other crates.

#![allow(async_fn_in_trait)]

pub mod actor;
pub mod comment;
pub mod error;
pub mod identity;
pub mod lesson;
pub mod payment;
pub mod reaction;
pub mod report;
pub mod store;
pub mod thread;
pub mod user;

pub use actor::ActorId;
pub use error::{Error, Result};
