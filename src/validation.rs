// ABOUTME: Option validation for replay and stream requests (§4.8)
// ABOUTME: Every failure names the offending field and the permitted values
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use replay_core::{ExchangeCatalog, Filter, ValidationError};

/// Options accepted by [`crate::replay::replay`], prior to validation.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub exchange: String,
    pub from: String,
    pub to: String,
    pub filters: Vec<Filter>,
    pub skip_decoding: bool,
    pub return_disconnects_as_undefined: bool,
}

/// A validated [`ReplayOptions`], with `from`/`to` parsed to instants.
#[derive(Debug, Clone)]
pub struct ValidatedReplayOptions {
    pub exchange: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub filters: Vec<Filter>,
    pub skip_decoding: bool,
    pub return_disconnects_as_undefined: bool,
}

/// Validate `exchange belongs to the catalog; from/to parse and to > from;
/// every filter's channel is known for the exchange; symbols, if present,
/// are strings` (they always are, `Filter::symbols` is typed as
/// `Vec<String>` — the Rust type system makes the "wrong symbol typing"
/// failure mode in the original spec unreachable here, so only the
/// structural checks remain).
pub fn validate_replay(options: ReplayOptions) -> Result<ValidatedReplayOptions, ValidationError> {
    if !ExchangeCatalog::is_known_exchange(&options.exchange) {
        return Err(ValidationError::UnknownExchange {
            exchange: options.exchange,
            valid: ExchangeCatalog::exchanges_joined(),
        });
    }

    let from = parse_date("from", &options.from)?;
    let to = parse_date("to", &options.to)?;

    if to <= from {
        return Err(ValidationError::RangeNotPositive {
            from: options.from,
            to: options.to,
        });
    }

    for filter in &options.filters {
        if !ExchangeCatalog::is_known_channel(&options.exchange, &filter.channel) {
            return Err(ValidationError::UnknownChannel {
                exchange: options.exchange.clone(),
                channel: filter.channel.clone(),
                valid: ExchangeCatalog::channels_joined(&options.exchange),
            });
        }
    }

    Ok(ValidatedReplayOptions {
        exchange: options.exchange,
        from,
        to,
        filters: options.filters,
        skip_decoding: options.skip_decoding,
        return_disconnects_as_undefined: options.return_disconnects_as_undefined,
    })
}

/// Options accepted by [`crate::stream::stream`].
#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub exchange: String,
    pub filters: Vec<Filter>,
}

/// Stream validation: filters present, channels known for the exchange.
pub fn validate_stream(options: &StreamOptions) -> Result<(), ValidationError> {
    if !ExchangeCatalog::is_known_exchange(&options.exchange) {
        return Err(ValidationError::UnknownExchange {
            exchange: options.exchange.clone(),
            valid: ExchangeCatalog::exchanges_joined(),
        });
    }
    if options.filters.is_empty() {
        return Err(ValidationError::MissingFilters);
    }
    for filter in &options.filters {
        if !ExchangeCatalog::is_known_channel(&options.exchange, &filter.channel) {
            return Err(ValidationError::UnknownChannel {
                exchange: options.exchange.clone(),
                channel: filter.channel.clone(),
                valid: ExchangeCatalog::channels_joined(&options.exchange),
            });
        }
    }
    Ok(())
}

fn parse_date(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Accept a bare date (`YYYY-MM-DD`) as midnight UTC, matching
            // the original's permissive date parsing.
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|date| {
                    DateTime::<Utc>::from_naive_utc_and_offset(
                        date.and_hms_opt(0, 0, 0).unwrap_or_default(),
                        Utc,
                    )
                })
                .map_err(|err| ValidationError::InvalidDate {
                    field,
                    value: value.to_owned(),
                    reason: err.to_string(),
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_exchange() {
        let opts = ReplayOptions {
            exchange: "unknown".into(),
            from: "2020-03-01".into(),
            to: "2020-03-02".into(),
            filters: vec![],
            skip_decoding: false,
            return_disconnects_as_undefined: false,
        };
        let err = validate_replay(opts).unwrap_err();
        match err {
            ValidationError::UnknownExchange { exchange, valid } => {
                assert_eq!(exchange, "unknown");
                assert!(valid.contains("binance"));
            }
            other => panic!("expected UnknownExchange, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_range() {
        let opts = ReplayOptions {
            exchange: "binance".into(),
            from: "2020-03-02".into(),
            to: "2020-03-01".into(),
            filters: vec![],
            skip_decoding: false,
            return_disconnects_as_undefined: false,
        };
        assert!(matches!(
            validate_replay(opts),
            Err(ValidationError::RangeNotPositive { .. })
        ));
    }

    #[test]
    fn rejects_unknown_channel() {
        let opts = ReplayOptions {
            exchange: "binance".into(),
            from: "2020-03-01".into(),
            to: "2020-03-02".into(),
            filters: vec![Filter::new("sleep", None)],
            skip_decoding: false,
            return_disconnects_as_undefined: false,
        };
        assert!(matches!(
            validate_replay(opts),
            Err(ValidationError::UnknownChannel { .. })
        ));
    }

    #[test]
    fn accepts_valid_request() {
        let opts = ReplayOptions {
            exchange: "binance".into(),
            from: "2020-03-01T00:00:00Z".into(),
            to: "2020-03-01T00:02:00Z".into(),
            filters: vec![Filter::new("trade", None)],
            skip_decoding: false,
            return_disconnects_as_undefined: false,
        };
        let validated = validate_replay(opts).unwrap();
        assert_eq!(validated.exchange, "binance");
        assert!(validated.to > validated.from);
    }

    #[test]
    fn stream_requires_at_least_one_filter() {
        let opts = StreamOptions {
            exchange: "binance".into(),
            filters: vec![],
        };
        assert!(matches!(
            validate_stream(&opts),
            Err(ValidationError::MissingFilters)
        ));
    }
}
