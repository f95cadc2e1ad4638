use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::warn;

use super::record::BubbleRecord;

pub(super) fn parse_markets_output(raw: &str) -> Result<Vec<BubbleRecord>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON from market source")?;

    let entries = match parsed {
        Value::Array(entries) => entries,
        Value::Object(object) => {
            let message = object
                .get("status")
                .and_then(|status| status.get("error_message"))
                .or_else(|| object.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("unexpected JSON object");
            return Err(anyhow!("market source returned an error: {message}"));
        }
        _ => return Err(anyhow!("unexpected JSON type from market source")),
    };

    let total = entries.len();
    let records = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<BubbleRecord>(entry).ok())
        .filter(|record| !record.id.is_empty())
        .collect::<Vec<_>>();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            "dropped malformed market entries"
        );
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_market_entries() {
        let raw = r#"[
            {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":64000.5,
             "market_cap":1260000000000,"price_change_percentage_24h":-1.25,"image":"x"},
            {"id":"tether","symbol":"usdt","name":"Tether","current_price":1.0,
             "market_cap":110000000000,"price_change_percentage_24h":null},
            {"id":"ghost","symbol":"gst","name":"Ghost"}
        ]"#;

        let records = parse_markets_output(raw).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "bitcoin");
        assert_eq!(records[0].price, Some(64000.5));
        assert_eq!(records[0].change_24h, Some(-1.25));
        assert_eq!(records[1].change_24h, None);
        assert_eq!(records[2].market_cap, None);
    }

    #[test]
    fn skips_entries_without_identity() {
        let raw = r#"[{"symbol":"x"},{"id":"","symbol":"y"},{"id":"ok","market_cap":5}]"#;
        let records = parse_markets_output(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ok");
    }

    #[test]
    fn wrongly_typed_numbers_keep_the_entry() {
        let raw = r#"[
            {"id":"a","market_cap":"oops"},
            {"id":"b","market_cap":7,"current_price":true,"price_change_percentage_24h":[1]}
        ]"#;

        let records = parse_markets_output(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].market_cap, None);
        assert_eq!(records[0].magnitude(), None);
        assert_eq!(records[1].magnitude(), Some(7.0));
        assert_eq!(records[1].price, None);
        assert_eq!(records[1].change_24h, None);
    }

    #[test]
    fn surfaces_api_error_objects() {
        let raw = r#"{"status":{"error_code":429,"error_message":"rate limited"}}"#;
        let error = parse_markets_output(raw).unwrap_err();
        assert!(error.to_string().contains("rate limited"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_markets_output("not json").is_err());
        assert!(parse_markets_output("42").is_err());
    }
}
