//! Stockroom Admin library.
//!
//! Client-side catalog administration on top of a remote product API whose
//! writes are simulated and never persisted. The crate pairs the remote API
//! with a local record store and reconciles the two:
//!
//! - [`api`] - HTTP gateway for products, auth and users
//! - [`storage`] - String key-value storage (file-backed or in-memory)
//! - [`store`] - Local product records kept in storage
//! - [`catalog`] - Merged view, local-first create, fork-on-write edits and
//!   optimistic deletes
//! - [`session`] - Logged-in user, token persistence and admin checks
//! - [`filters`] - Listing filter state
//! - [`account`] - Registration and login flows
//!
//! # Security
//!
//! Access tokens are held as [`secrecy::SecretString`] and never logged.
//! Catalog mutations require an [`session::AdminGrant`], which only an admin
//! [`session::Session`] can hand out.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod session;
pub mod storage;
pub mod store;

pub use api::{ApiClient, GatewayError, ListQuery, Page, ProductGateway};
pub use catalog::{Catalog, CatalogPage};
pub use config::{AdminAllowList, AdminConfig, ConfigError};
pub use error::CatalogError;
pub use filters::ProductFilters;
pub use session::{AdminGrant, Session, SessionError};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::LocalStore;
