//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The registry and the host clock live together behind one
//! `parking_lot::Mutex`, so every request observes and mutates them as a
//! single unit. Requests execute one at a time in lock-acquisition order,
//! and each mutating request is stamped with the next clock height.
//! The lock is never held across an `.await`.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use idreg_core::{BlockHeight, HashFormat, Principal, RegistryError};
use idreg_state::{CallContext, Registry, RegistryConfig};

// -- Host Clock ---------------------------------------------------------------

/// Logical clock supplied to the registry by this host.
///
/// Advances by one for every mutating request, accepted or rejected, the
/// way a ledger advances one block per submitted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightClock {
    current: BlockHeight,
}

impl HeightClock {
    /// A clock whose first tick yields `genesis + 1`.
    pub fn starting_at(genesis: BlockHeight) -> Self {
        Self { current: genesis }
    }

    /// Height of the most recent tick.
    pub fn current(&self) -> BlockHeight {
        self.current
    }

    /// Advance and return the new height.
    pub fn tick(&mut self) -> BlockHeight {
        self.current = self.current.next();
        self.current
    }
}

// -- Configuration ------------------------------------------------------------

/// Errors building [`AppConfig`] from the environment.
#[derive(Error, Debug)]
pub enum EnvConfigError {
    /// Neither `IDREG_CONFIG` nor `IDREG_VERIFIER` is set.
    #[error("no verifier configured: set IDREG_CONFIG or IDREG_VERIFIER")]
    MissingVerifier,

    /// A variable is set to an unusable value.
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The registry config file could not be loaded.
    #[error(transparent)]
    Registry(#[from] idreg_state::ConfigError),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Registry initialization parameters.
    pub registry: RegistryConfig,
    /// Clock height before the first request.
    pub genesis_height: BlockHeight,
}

impl AppConfig {
    /// Defaults around the given registry config.
    pub fn new(registry: RegistryConfig) -> Self {
        Self {
            port: 8080,
            registry,
            genesis_height: BlockHeight(0),
        }
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, EnvConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `PORT` | listen port, default 8080 |
    /// | `IDREG_CONFIG` | path to a YAML registry config |
    /// | `IDREG_VERIFIER` | verifier principal, when no config file is given |
    /// | `IDREG_HASH_LENGTH` | hex hash length, with `IDREG_VERIFIER` |
    /// | `IDREG_GENESIS_HEIGHT` | starting clock height, default 0 |
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, EnvConfigError> {
        let port: u16 = get("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let registry = match get("IDREG_CONFIG") {
            Some(path) => RegistryConfig::load(std::path::Path::new(&path))?,
            None => {
                let raw = get("IDREG_VERIFIER").ok_or(EnvConfigError::MissingVerifier)?;
                let verifier = Principal::new(raw.clone()).map_err(|e| EnvConfigError::Invalid {
                    var: "IDREG_VERIFIER",
                    value: raw,
                    reason: e.to_string(),
                })?;
                let mut config = RegistryConfig::new(verifier);
                if let Some(raw) = get("IDREG_HASH_LENGTH") {
                    let length = parse_var("IDREG_HASH_LENGTH", raw)?;
                    config = config.with_hash_format(HashFormat::Hex { length });
                }
                config
            }
        };

        let genesis_height = match get("IDREG_GENESIS_HEIGHT") {
            Some(raw) => BlockHeight(parse_var("IDREG_GENESIS_HEIGHT", raw)?),
            None => BlockHeight(0),
        };

        Ok(Self {
            port,
            registry,
            genesis_height,
        })
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, EnvConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| EnvConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

// -- Application State --------------------------------------------------------

#[derive(Debug)]
struct Ledger {
    registry: Registry,
    clock: HeightClock,
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    ledger: Arc<Mutex<Ledger>>,
}

impl AppState {
    /// Initialize an empty registry from the configuration.
    pub fn new(config: AppConfig) -> Self {
        let registry = Registry::new(config.registry.clone());
        let clock = HeightClock::starting_at(config.genesis_height);
        Self {
            config,
            ledger: Arc::new(Mutex::new(Ledger { registry, clock })),
        }
    }

    /// Run a mutating operation as `caller` at the next clock height.
    pub fn mutate<R>(
        &self,
        caller: Principal,
        op: impl FnOnce(&mut Registry, &CallContext) -> Result<R, RegistryError>,
    ) -> Result<R, RegistryError> {
        let mut guard = self.ledger.lock();
        let ledger = &mut *guard;
        let ctx = CallContext::new(caller, ledger.clock.tick());
        op(&mut ledger.registry, &ctx)
    }

    /// Run a read against the current registry state.
    pub fn read<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        f(&self.ledger.lock().registry)
    }

    /// Current clock height.
    pub fn height(&self) -> BlockHeight {
        self.ledger.lock().clock.current()
    }
}
