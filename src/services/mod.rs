//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod account;
pub mod auth;
pub mod chapter;
pub mod document;
pub mod feedback;
pub mod group;
pub mod identity;
pub mod scoring;
pub mod session;
pub mod submission;
pub mod youtube;
