use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BubbleRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub market_cap: Option<f64>,
    #[serde(
        default,
        rename = "price_change_percentage_24h",
        deserialize_with = "lenient_number"
    )]
    pub change_24h: Option<f64>,
    #[serde(default, rename = "current_price", deserialize_with = "lenient_number")]
    pub price: Option<f64>,
}

/// Non-numeric values decode as `None` instead of rejecting the entry.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(Value::as_f64))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeCategory {
    Gain,
    Loss,
    Unknown,
}

impl BubbleRecord {
    /// Market cap usable for sizing, `None` when missing, non-finite or not positive.
    pub fn magnitude(&self) -> Option<f64> {
        self.market_cap
            .filter(|value| value.is_finite() && *value > 0.0)
    }

    pub fn change_category(&self) -> ChangeCategory {
        match self.change_24h {
            Some(change) if change.is_finite() && change >= 0.0 => ChangeCategory::Gain,
            Some(change) if change.is_finite() => ChangeCategory::Loss,
            _ => ChangeCategory::Unknown,
        }
    }

    pub fn display_symbol(&self) -> String {
        if self.symbol.is_empty() {
            self.id.to_uppercase()
        } else {
            self.symbol.to_uppercase()
        }
    }
}

pub fn magnitude_domain(records: &[BubbleRecord]) -> Option<(f64, f64)> {
    records
        .iter()
        .filter_map(BubbleRecord::magnitude)
        .fold(None, |domain, value| match domain {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

#[cfg(test)]
pub(crate) fn record(id: &str, market_cap: Option<f64>, change_24h: Option<f64>) -> BubbleRecord {
    BubbleRecord {
        id: id.to_owned(),
        name: id.to_owned(),
        symbol: id.to_owned(),
        market_cap,
        change_24h,
        price: Some(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_sign_picks_category() {
        assert_eq!(record("a", None, Some(0.0)).change_category(), ChangeCategory::Gain);
        assert_eq!(record("a", None, Some(3.2)).change_category(), ChangeCategory::Gain);
        assert_eq!(record("a", None, Some(-0.01)).change_category(), ChangeCategory::Loss);
        assert_eq!(record("a", None, None).change_category(), ChangeCategory::Unknown);
        assert_eq!(
            record("a", None, Some(f64::NAN)).change_category(),
            ChangeCategory::Unknown
        );
    }

    #[test]
    fn domain_ignores_unusable_magnitudes() {
        let records = vec![
            record("a", Some(4e9), None),
            record("b", None, None),
            record("c", Some(-5.0), None),
            record("d", Some(f64::INFINITY), None),
            record("e", Some(1e9), None),
        ];
        assert_eq!(magnitude_domain(&records), Some((1e9, 4e9)));
        assert_eq!(magnitude_domain(&records[1..4]), None);
    }
}
