//! Core logic: feature extraction, classifier capability, scoring.

pub mod features;
pub mod model;
pub mod scoring;
