pub mod cli;
pub mod configuration;
pub mod dao;
pub mod error;
pub mod handler;
pub mod helpers;
pub mod model;
pub mod provider;
pub mod report;
pub mod transform;
pub mod types;

#[cfg(test)]
mod fixtures;
