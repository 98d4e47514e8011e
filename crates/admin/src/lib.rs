//! Atelier Admin library.
//!
//! This crate provides the admin back-office as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! This crate contains HIGH PRIVILEGE access:
//! - User and role management (RBAC)
//! - Catalog management (categories, products)
//!
//! Every admin route is gated: authenticated, email verified, and holding the
//! required permission - in that order, before any validation or mutation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validate;
