use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::InferenceError;

/// Which compute device the models should be placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// First compiled-in GPU backend that initialises, else CPU.
    #[default]
    Auto,
    Cpu,
}

impl DevicePreference {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "cpu" => Some(Self::Cpu),
            _ => None,
        }
    }
}

/// Selects the compute device. GPU failures fall back to CPU, never to an error.
pub fn select_device(preference: DevicePreference) -> Result<Device, InferenceError> {
    if preference == DevicePreference::Cpu {
        debug!("CPU device requested explicitly");
        return Ok(Device::Cpu);
    }

    #[allow(unused_mut)]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU acceleration");
                return Ok(device);
            }
            Err(e) => failures.push(format!("metal: {e}")),
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA GPU acceleration");
                return Ok(device);
            }
            Err(e) => failures.push(format!("cuda: {e}")),
        }
    }

    if failures.is_empty() {
        info!("No GPU backend compiled, using CPU");
    } else {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    }
    Ok(Device::Cpu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preference() {
        assert_eq!(DevicePreference::parse("AUTO"), Some(DevicePreference::Auto));
        assert_eq!(DevicePreference::parse(" cpu "), Some(DevicePreference::Cpu));
        assert_eq!(DevicePreference::parse("tpu"), None);
    }

    #[test]
    fn test_cpu_preference_returns_cpu() {
        let device = select_device(DevicePreference::Cpu).unwrap();
        assert!(device.is_cpu());
    }
}
