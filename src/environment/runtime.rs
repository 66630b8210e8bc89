use tracing::info;
use super::environment::{EnvVar, EnvironmentAccess};

/// PJRT runtime declared when the caller has not chosen one
pub const DEFAULT_PJRT_DEVICE: &str = "TPU";

/// Declares the accelerator runtime for the XLA device library.
///
/// Sets `PJRT_DEVICE` to [`DEFAULT_PJRT_DEVICE`] when it is absent and never
/// overwrites an existing value. Idempotent: call it once at startup, before
/// the first device-aware call; repeated calls are no-ops.
///
/// # Returns
///
/// The runtime in effect after the call
pub fn declare_runtime(env: &dyn EnvironmentAccess) -> String {
    if env.set_if_absent(EnvVar::PjrtDevice, DEFAULT_PJRT_DEVICE) {
        info!(
            "{} environment variable not found. Setting it to '{}'.",
            EnvVar::PjrtDevice,
            DEFAULT_PJRT_DEVICE
        );
    }
    env.get(EnvVar::PjrtDevice)
        .unwrap_or_else(|| DEFAULT_PJRT_DEVICE.to_string())
}
