//! Version calculation for `@types` packages
//!
//! This module compares parsed packages with what is published on npm,
//! decides which packages need a new version, and keeps the version ledger.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│   Client    │────▶│  Reconcile  │
//! │  (fetch)    │     │  (cached)   │     │  (decide)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                 │     │
//!                            ▼                 ▼     ▼
//!                     ┌─────────────┐ ┌──────────┐ ┌─────────┐
//!                     │    Cache    │ │  Ledger  │ │ Changes │
//!                     │  (SQLite)   │ │  (JSON)  │ │ (JSON)  │
//!                     └─────────────┘ └──────────┘ └─────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: the `Semver` value type and latest-version selection
//! - [`ledger`]: package → major → patch ledger persisted as `versions.json`
//! - [`reconcile`]: decides new versions and collects changes
//! - [`changes`]: change list persisted as `version-changes.json`
//! - [`registry`]: traits for fetching package documents
//! - [`registries`]: npm implementation of the registry trait
//! - [`cache`]: SQLite copy of fetched package documents
//! - [`client`]: client answering from the cache when content is unchanged
//! - [`error`]: error types
//! - [`types`]: registry document types like `NpmInfo`

pub mod cache;
pub mod changes;
pub mod client;
pub mod error;
pub mod ledger;
pub mod reconcile;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod types;
