//! # toplist-cms
//!
//! A multi-tenant content backend for affiliate toplists, usable both as a
//! standalone binary and as a library.
//!
//! Brands carry default deal terms, sites override them per brand, and each
//! toplist item can override both again. The public endpoint serves every
//! toplist with those three layers already merged.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use toplist_cms::config::ServerConfig;
//! use toplist_cms::server::{AppState, create_router};
//! use toplist_cms::store::{SqliteStore, Store};
//!
//! let config = ServerConfig::default();
//! let store = SqliteStore::new(&config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), &config).unwrap());
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `toplist-cms` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod import;
pub mod media;
pub mod naming;
pub mod server;
pub mod store;
pub mod toplist;
pub mod types;
