//! # NameWatch Providers
//! Availability probes, the "is this name free?" side of NameWatch.

pub mod mojang;

pub use mojang::MojangProbe;
