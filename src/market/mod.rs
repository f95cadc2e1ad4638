mod parse;
mod record;
mod source;

pub use record::{BubbleRecord, ChangeCategory, magnitude_domain};
pub use source::{CoinGeckoSource, DEFAULT_MARKETS_URL, JsonFileSource, MarketSource};

#[cfg(test)]
pub(crate) use record::record;
