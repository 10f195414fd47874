//! # Identity Subcommands
//!
//! Registry operations against a local state file.
//!
//! ## Mutations
//!
//! - `create <HASH>` — claim the caller's identity.
//! - `update <ID> <HASH>` — owner replaces the document hash.
//! - `verify <ID> <LEVEL>` — verifier sets the KYC level.
//!
//! Each mutation runs as `--caller` at `--height` (default: one past the
//! last recorded height). The state file is rewritten only when the
//! operation succeeds. A rejected operation prints `ERR <CODE>: <message>`
//! and exits with status 2.
//!
//! ## Reads
//!
//! `get`, `verified`, `kyc-level`, `history` and `owner` never modify the
//! state file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use idreg_core::{BlockHeight, IdentityId, KycLevel, Principal, RegistryError};
use idreg_state::{CallContext, Registry};

use crate::state_file;

/// Exit status for an operation the registry rejected.
pub const EXIT_REJECTED: u8 = 2;

/// Caller attribution shared by the mutating commands.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Principal invoking the operation.
    #[arg(long)]
    pub caller: String,

    /// Logical clock height of the call.
    #[arg(long)]
    pub height: Option<u64>,
}

impl CallArgs {
    /// Resolve the call context against the registry's clock.
    fn context(&self, registry: &Registry) -> Result<CallContext> {
        let caller = Principal::new(self.caller.as_str()).context("invalid --caller")?;
        let last = registry.last_height();
        let height = match (self.height, last) {
            (Some(h), Some(last)) if h < last.get() => {
                bail!("--height {h} is below the last recorded height {last}")
            }
            (Some(h), _) => BlockHeight(h),
            (None, Some(last)) => last.next(),
            (None, None) => BlockHeight(1),
        };
        Ok(CallContext::new(caller, height))
    }
}

/// Arguments for `idreg create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub call: CallArgs,
    /// Document hash.
    pub hash: String,
}

/// Arguments for `idreg update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub call: CallArgs,
    /// Identity id.
    pub id: u64,
    /// New document hash.
    pub hash: String,
}

/// Arguments for `idreg verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub call: CallArgs,
    /// Identity id.
    pub id: u64,
    /// KYC level to assign.
    pub level: u32,
}

/// Arguments for the single-id read commands.
#[derive(Args, Debug)]
pub struct IdArgs {
    /// Identity id.
    pub id: u64,
}

/// Arguments for `idreg owner`.
#[derive(Args, Debug)]
pub struct OwnerArgs {
    /// Principal to look up.
    pub principal: String,
}

// ─── Mutations ──────────────────────────────────────────────────────────────

/// Execute `idreg create`.
pub fn run_create(args: &CreateArgs, state: &Path) -> Result<u8> {
    mutate(state, &args.call, |registry, ctx| {
        let id = registry.create_identity(ctx, &args.hash)?;
        println!("OK: created identity {id} for {} at height {}", ctx.caller, ctx.height);
        Ok(())
    })
}

/// Execute `idreg update`.
pub fn run_update(args: &UpdateArgs, state: &Path) -> Result<u8> {
    let id = parse_id(args.id)?;
    mutate(state, &args.call, |registry, ctx| {
        registry.update_identity_data(ctx, id, &args.hash)?;
        println!("OK: updated hash of identity {id}");
        Ok(())
    })
}

/// Execute `idreg verify`.
pub fn run_verify(args: &VerifyArgs, state: &Path) -> Result<u8> {
    let id = parse_id(args.id)?;
    let level = KycLevel(args.level);
    mutate(state, &args.call, |registry, ctx| {
        registry.verify_identity(ctx, id, level)?;
        println!("OK: verified identity {id} at KYC level {level}");
        Ok(())
    })
}

/// Load, run one mutation, and save only if it succeeded.
fn mutate(
    state: &Path,
    call: &CallArgs,
    op: impl FnOnce(&mut Registry, &CallContext) -> Result<(), RegistryError>,
) -> Result<u8> {
    let mut registry = state_file::load(state)?;
    let ctx = call.context(&registry)?;
    match op(&mut registry, &ctx) {
        Ok(()) => {
            state_file::save(state, &registry)?;
            Ok(0)
        }
        Err(err) => Ok(rejected(&err)),
    }
}

// ─── Reads ──────────────────────────────────────────────────────────────────

/// Execute `idreg get`: the record as JSON, or `none`.
pub fn run_get(args: &IdArgs, state: &Path) -> Result<u8> {
    let registry = state_file::load(state)?;
    match registry.get_identity_data(parse_id(args.id)?) {
        Some(data) => println!("{}", serde_json::to_string_pretty(&data)?),
        None => println!("none"),
    }
    Ok(0)
}

/// Execute `idreg verified`.
pub fn run_verified(args: &IdArgs, state: &Path) -> Result<u8> {
    let registry = state_file::load(state)?;
    match registry.is_identity_verified(parse_id(args.id)?) {
        Ok(verified) => {
            println!("{verified}");
            Ok(0)
        }
        Err(err) => Ok(rejected(&err)),
    }
}

/// Execute `idreg kyc-level`.
pub fn run_kyc_level(args: &IdArgs, state: &Path) -> Result<u8> {
    let registry = state_file::load(state)?;
    match registry.get_kyc_level(parse_id(args.id)?) {
        Ok(level) => {
            println!("{level}");
            Ok(0)
        }
        Err(err) => Ok(rejected(&err)),
    }
}

/// Execute `idreg history`: one JSON event per line, oldest first.
pub fn run_history(args: &IdArgs, state: &Path) -> Result<u8> {
    let registry = state_file::load(state)?;
    for event in registry.query().history(parse_id(args.id)?) {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(0)
}

/// Execute `idreg owner`: the id owned by a principal, or `none`.
pub fn run_owner(args: &OwnerArgs, state: &Path) -> Result<u8> {
    let registry = state_file::load(state)?;
    let principal = Principal::new(args.principal.as_str()).context("invalid principal")?;
    match registry.query().identity_of(&principal) {
        Some(id) => println!("{id}"),
        None => println!("none"),
    }
    Ok(0)
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn parse_id(raw: u64) -> Result<IdentityId> {
    IdentityId::new(raw).context("invalid identity id")
}

fn rejected(err: &RegistryError) -> u8 {
    eprintln!("ERR {}: {err}", err.code());
    EXIT_REJECTED
}
