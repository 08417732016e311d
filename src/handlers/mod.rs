//! HTTP handlers

pub mod health;
pub mod model;
pub mod predict;

#[cfg(test)]
mod tests;
