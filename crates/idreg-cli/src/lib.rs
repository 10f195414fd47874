//! # idreg-cli — CLI for the Identity Registry
//!
//! Provides the `idreg` command-line interface over a registry kept in a
//! local JSON state file. The CLI plays the host: it names the calling
//! principal, supplies the clock height, and runs one operation per
//! invocation.
//!
//! ## Subcommands
//!
//! - `idreg init` — create a registry with its verifier and hash format.
//! - `idreg create | update | verify` — mutations, run as `--caller`.
//! - `idreg get | verified | kyc-level | history | owner` — reads.
//! - `idreg hash` — SHA-256 of a document, ready to submit.
//!
//! ```bash
//! idreg init --verifier deployer
//! idreg create --caller wallet_1 "$(idreg hash passport.pdf)"
//! idreg verify --caller deployer 1 2
//! idreg kyc-level 1
//! ```
//!
//! ## Exit Status
//!
//! `0` on success, `1` on I/O, parse or usage failures, `2` when the
//! registry rejects the operation.

pub mod digest;
pub mod identity;
pub mod init;
pub mod state_file;
