//! Vendor-backed providers that are not wired up yet.

use crate::domain::error::MomentumError;
use crate::domain::observation::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;

/// A named vendor whose every call fails with `ProviderNotImplemented`.
pub struct VendorProvider {
    name: &'static str,
}

impl VendorProvider {
    pub fn tushare() -> Self {
        Self { name: "TuShare" }
    }

    pub fn joinquant() -> Self {
        Self { name: "JoinQuant" }
    }

    fn not_implemented(&self) -> MomentumError {
        MomentumError::ProviderNotImplemented {
            provider: self.name.to_string(),
        }
    }
}

impl DataPort for VendorProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn get_universe(&self, _num_stocks: usize) -> Result<Vec<String>, MomentumError> {
        Err(self.not_implemented())
    }

    fn get_price_data(
        &self,
        _symbols: &[String],
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomentumError> {
        Err(self.not_implemented())
    }
}
