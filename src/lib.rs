//! Bulk-toggle the two-factor authentication requirement for 3CX users.
//!
//! Authenticates once against the PBX with OAuth2 client credentials, then sends
//! one `PATCH /xapi/v1/Users({id})` per configured user, in order.

pub mod cmd;
pub mod config;
pub mod error;
pub mod xapi;
