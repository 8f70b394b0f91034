//! Maven artefact mirroring library.
//!
//! This crate copies artefacts between two Maven-layout repositories over
//! HTTP. For each coordinate it discovers the files on the source, stages
//! them locally, and publishes them to the destination. It backs the
//! `artefact-mirror` binary and can be driven programmatically through
//! [`pipeline::MirrorPipeline`] with any [`transport::RepositoryClient`].
//!
//! # Modules
//!
//! - [`auth`] - Per-endpoint authentication header resolution
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - YAML run configuration
//! - [`coordinate`] - Artefact coordinates and repository paths
//! - [`discovery`] - Listing-page scraping and conventional file names
//! - [`error`] - Fatal configuration and staging errors
//! - [`pipeline`] - Per-artefact download and upload orchestration
//! - [`report`] - Per-file and per-run outcome records
//! - [`staging`] - Local staging directory management
//! - [`transport`] - HTTP client abstraction and single-file transfers

pub mod auth;
pub mod cli;
pub mod config;
pub mod coordinate;
pub mod discovery;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod staging;
pub mod transport;
