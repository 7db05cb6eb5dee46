//! Histogram configuration.
//!
//! A histogram's range and precision are fixed when it is created. `HistogramConfig` is that pair
//! as plain data, so it can live in an application's configuration file and be read with any serde
//! format:
//!
//! ```
//! use hdrtally::{Histogram, HistogramConfig};
//!
//! let cfg: HistogramConfig = serde_json::from_str(
//!     r#"{ "highest_trackable_value": 3600000000, "significant_value_digits": 3 }"#,
//! ).unwrap();
//! let hist: Histogram = Histogram::from_config(&cfg).unwrap();
//! assert_eq!(hist.config(), cfg);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::encoding::Encoding;
use crate::errors::CreationError;

/// The two parameters that determine a histogram's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Highest value to be tracked. Must be >= 2.
    pub highest_trackable_value: u64,
    /// Number of significant decimal digits to which values are resolved. Must be in `[0, 5]`.
    pub significant_value_digits: u8,
}

impl HistogramConfig {
    /// Bundle a highest trackable value and a precision.
    pub fn new(highest_trackable_value: u64, significant_value_digits: u8) -> HistogramConfig {
        HistogramConfig {
            highest_trackable_value,
            significant_value_digits,
        }
    }

    /// Validate this configuration and derive its slot layout.
    pub fn encoding(&self) -> Result<Encoding, CreationError> {
        Encoding::new(self.highest_trackable_value, self.significant_value_digits)
    }
}

impl From<&Encoding> for HistogramConfig {
    fn from(e: &Encoding) -> Self {
        HistogramConfig::new(e.highest_trackable_value(), e.significant_value_digits())
    }
}
