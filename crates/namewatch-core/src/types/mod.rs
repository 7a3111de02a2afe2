//! Core types used across NameWatch.

pub mod availability;

pub use availability::*;
