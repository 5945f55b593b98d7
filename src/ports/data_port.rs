//! Market data provider port.

use crate::domain::error::MomentumError;
use crate::domain::observation::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    /// The first `num_stocks` symbols of the provider's universe.
    fn get_universe(&self, num_stocks: usize) -> Result<Vec<String>, MomentumError>;

    /// Daily rows for `symbols` between the two dates, inclusive, sorted by
    /// (symbol, date).
    fn get_price_data(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomentumError>;
}
