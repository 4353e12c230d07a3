//! Pageturn web library.
//!
//! This crate provides the reading site as a library, allowing it to be
//! tested end to end and served by the `pageturn-web` binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
