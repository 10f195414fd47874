//! # API Route Modules
//!
//! - `identity` — create, update and verify identities; read records,
//!   verification state, KYC level, journal history and owner lookups.

pub mod identity;
