//! Client-side library for the callboard server: a typed HTTP client, the
//! offline mirror (full-snapshot cache of actors and shows), and the
//! read-only printable sign-in sheet it feeds when disconnected.

pub mod api;
pub mod mirror;
pub mod sheet;
