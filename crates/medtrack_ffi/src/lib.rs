//! Flutter-facing bridge crate for MedTrack.

pub mod api;
