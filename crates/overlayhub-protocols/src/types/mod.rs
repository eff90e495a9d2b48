//! Common types used across protocols.

mod common;

pub use common::*;
