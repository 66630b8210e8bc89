use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::environment::{EnvVar, EnvironmentAccess};

/// Canonical identity of the XLA accelerator device
pub const XLA_DEVICE: &str = "xla";

/// Identity of the device that hosts a model's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Device {
    /// The XLA accelerator, selected through PJRT
    Xla,
    /// Host memory
    Cpu,
    /// Any other token, passed through untouched (e.g. "xla:1", "cuda")
    Other(String),
}

impl Device {
    /// Parses a device token. Only the exact canonical tokens map to the named
    /// variants; everything else is kept verbatim.
    pub fn from_token(token: &str) -> Self {
        match token {
            XLA_DEVICE => Device::Xla,
            "cpu" => Device::Cpu,
            other => Device::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Device::Xla => XLA_DEVICE,
            Device::Cpu => "cpu",
            Device::Other(token) => token,
        }
    }

    pub fn is_xla(&self) -> bool {
        matches!(self, Device::Xla)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Device {
    fn from(token: String) -> Self {
        Device::from_token(&token)
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.as_str().to_string()
    }
}

/// Resolves the device a load call targets.
///
/// `DBG_DEVICE` wins when present; otherwise the XLA device is used.
pub fn resolve_device(env: &dyn EnvironmentAccess) -> Device {
    match env.get(EnvVar::DbgDevice) {
        Some(token) => {
            let device = Device::from_token(&token);
            debug!("Device set to: {}", device);
            device
        }
        None => Device::Xla,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::MemoryEnvironment;

    #[test]
    fn test_defaults_to_xla() {
        let env = MemoryEnvironment::new();
        assert_eq!(resolve_device(&env), Device::Xla);
    }

    #[test]
    fn test_debug_override() {
        let env = MemoryEnvironment::with_vars([(EnvVar::DbgDevice, "cpu")]);
        assert_eq!(resolve_device(&env), Device::Cpu);

        let env = MemoryEnvironment::with_vars([(EnvVar::DbgDevice, "xla:1")]);
        let device = resolve_device(&env);
        assert_eq!(device, Device::Other("xla:1".to_string()));
        assert!(!device.is_xla());
        assert_eq!(device.to_string(), "xla:1");
    }

    #[test]
    fn test_override_with_canonical_token_is_xla() {
        let env = MemoryEnvironment::with_vars([(EnvVar::DbgDevice, "xla")]);
        assert!(resolve_device(&env).is_xla());
    }

    #[test]
    fn test_serde_uses_token() {
        let json = serde_json::to_string(&Device::Xla).unwrap();
        assert_eq!(json, "\"xla\"");
        let device: Device = serde_json::from_str("\"cuda\"").unwrap();
        assert_eq!(device, Device::Other("cuda".to_string()));
    }
}
