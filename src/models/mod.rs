//! Resource shapes exchanged with the WorkHub REST API.
//!
//! Field names follow the wire format (snake_case, server-issued string ids,
//! RFC 3339 timestamps). Optional fields the server may omit carry
//! `skip_serializing_if` so request bodies stay minimal.

pub mod document;
pub mod notification;
pub mod user;
pub mod workspace;
