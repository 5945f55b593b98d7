//! Data providers selected by `[data] provider`.

pub mod mock;
pub mod vendor;

use crate::domain::error::MomentumError;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub use mock::MockProvider;
pub use vendor::VendorProvider;

pub fn create_provider(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, MomentumError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "mock".to_string())
        .to_lowercase();
    let seed = config.get_int("project", "seed", 42);

    match provider.as_str() {
        "mock" => Ok(Box::new(MockProvider::new(seed))),
        "tushare" => Ok(Box::new(VendorProvider::tushare())),
        "joinquant" => Ok(Box::new(VendorProvider::joinquant())),
        _ => Err(MomentumError::UnsupportedProvider { provider }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn provider_for(ini: &str) -> Result<Box<dyn DataPort>, MomentumError> {
        create_provider(&FileConfigAdapter::from_string(ini).unwrap())
    }

    #[test]
    fn defaults_to_mock() {
        assert_eq!(provider_for("[data]\n").unwrap().name(), "mock");
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(
            provider_for("[data]\nprovider = JoinQuant\n").unwrap().name(),
            "JoinQuant"
        );
        assert_eq!(
            provider_for("[data]\nprovider = TUSHARE\n").unwrap().name(),
            "TuShare"
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = provider_for("[data]\nprovider = wind\n").err().unwrap();
        assert!(matches!(err, MomentumError::UnsupportedProvider { provider } if provider == "wind"));
    }
}
