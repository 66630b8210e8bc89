use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, RwLock};
use once_cell::sync::Lazy;

/// Process environment variables consulted while loading a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnvVar {
    /// Declares the PJRT runtime the XLA device library binds to on first use
    PjrtDevice,
    /// Debug override for the resolved device identity
    DbgDevice,
    /// Presence enables ahead-of-time compilation on the XLA device
    DbgCompile,
}

impl EnvVar {
    /// Canonical key of the variable in the process environment.
    pub const fn key(self) -> &'static str {
        match self {
            EnvVar::PjrtDevice => "PJRT_DEVICE",
            EnvVar::DbgDevice => "DBG_DEVICE",
            EnvVar::DbgCompile => "DBG_COMPILE",
        }
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Read/write access to environment state.
///
/// The loader never touches `std::env` directly; it goes through this trait so
/// callers can inject the process environment or an isolated map.
pub trait EnvironmentAccess: Send + Sync {
    /// Returns the value of the variable if it is set
    fn get(&self, var: EnvVar) -> Option<String>;

    /// Sets the variable only when it is absent.
    ///
    /// # Returns
    ///
    /// `true` if this call wrote the value, `false` if a value was already present
    fn set_if_absent(&self, var: EnvVar, value: &str) -> bool;

    /// Whether the variable is present, whatever its value
    fn is_set(&self, var: EnvVar) -> bool {
        self.get(var).is_some()
    }
}

// Serializes every read-modify-write of the real process environment.
static PROCESS_ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Accessor backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl ProcessEnvironment {
    pub fn new() -> Self {
        Self
    }
}

impl EnvironmentAccess for ProcessEnvironment {
    fn get(&self, var: EnvVar) -> Option<String> {
        std::env::var_os(var.key()).map(|v| v.to_string_lossy().into_owned())
    }

    fn set_if_absent(&self, var: EnvVar, value: &str) -> bool {
        // A poisoned lock only means another writer panicked; the env itself is intact.
        let _guard = PROCESS_ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        if std::env::var_os(var.key()).is_some() {
            return false;
        }
        std::env::set_var(var.key(), value);
        true
    }
}

/// In-memory accessor, isolated from the process environment.
///
/// Useful for embedding the loader in a host that manages its own settings,
/// and for tests that must not leak state between each other.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    vars: RwLock<HashMap<EnvVar, String>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an environment with the given variables already set.
    pub fn with_vars<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = (EnvVar, S)>,
        S: Into<String>,
    {
        let vars = vars.into_iter().map(|(k, v)| (k, v.into())).collect();
        Self { vars: RwLock::new(vars) }
    }

    /// Unconditionally sets a variable.
    pub fn set(&self, var: EnvVar, value: &str) {
        let mut vars = self.vars.write().unwrap_or_else(|e| e.into_inner());
        vars.insert(var, value.to_string());
    }

    /// Removes a variable.
    pub fn remove(&self, var: EnvVar) {
        let mut vars = self.vars.write().unwrap_or_else(|e| e.into_inner());
        vars.remove(&var);
    }
}

impl EnvironmentAccess for MemoryEnvironment {
    fn get(&self, var: EnvVar) -> Option<String> {
        let vars = self.vars.read().unwrap_or_else(|e| e.into_inner());
        vars.get(&var).cloned()
    }

    fn set_if_absent(&self, var: EnvVar, value: &str) -> bool {
        let mut vars = self.vars.write().unwrap_or_else(|e| e.into_inner());
        if vars.contains_key(&var) {
            return false;
        }
        vars.insert(var, value.to_string());
        true
    }
}
