//! # skillbase
//!
//! A local-first knowledge-base CLI. A directory tree of markdown "skills"
//! and parameterized prompt templates is mirrored into SQLite with
//! full-text search, plus simple plan/task records layered on top.
//!
//! The core is the incremental sync engine: scan the content roots, detect
//! changes by content hash, parse YAML front matter, and perform
//! idempotent, relationship-aware upserts — including the fragment
//! indirection that lets a prompt embed an ordered, named subset of
//! skills.
//!
//! ## Quick Start
//!
//! ```bash
//! skb init                      # create database
//! skb sync                      # mirror skills, prompts, fragments
//! skb search "ownership"        # full-text search
//! skb show prompt rust-helper   # inspect a prompt and its skills
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`scan`] | Deterministic directory scanning |
//! | [`hash`] | Content digests for change detection |
//! | [`frontmatter`] | YAML front-matter splitting |
//! | [`classify`] | Path-derived categorization |
//! | [`record`] | Normalized record construction |
//! | [`store`] | Row-level upsert/query primitives |
//! | [`fragments`] | Fragment reconciliation |
//! | [`sync`] | Three-pass sync orchestration |
//! | [`search`] | FTS5 search |
//! | [`records`] | Plan/task CRUD |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema setup |

pub mod classify;
pub mod config;
pub mod db;
pub mod fragments;
pub mod frontmatter;
pub mod hash;
pub mod migrate;
pub mod models;
pub mod record;
pub mod records;
pub mod scan;
pub mod search;
pub mod show;
pub mod store;
pub mod sync;
