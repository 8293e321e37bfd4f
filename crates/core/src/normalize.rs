use crate::domain::DailyStockRecord;
use crate::error::NormalizationError;
use crate::provider::types::RawDailyBar;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Maps one raw provider bar into the canonical daily record. Pure: no IO,
/// no clock. Prices go through `Decimal::from_str` so `"123.4500"` stays
/// exactly 123.4500. Required fields are never defaulted; the optional
/// adjustment fields fall back to their neutral values (dividend 0, split 1).
pub fn normalize(
    symbol: &str,
    trading_date: NaiveDate,
    bar: &RawDailyBar,
) -> Result<DailyStockRecord, NormalizationError> {
    Ok(DailyStockRecord {
        trading_date,
        symbol: symbol.to_string(),
        open: required_decimal("open", bar.open.as_deref())?,
        high: required_decimal("high", bar.high.as_deref())?,
        low: required_decimal("low", bar.low.as_deref())?,
        close: required_decimal("close", bar.close.as_deref())?,
        adjusted_close: required_decimal("adjusted_close", bar.adjusted_close.as_deref())?,
        volume: required_int("volume", bar.volume.as_deref())?,
        dividend_amount: optional_decimal(
            "dividend_amount",
            bar.dividend_amount.as_deref(),
            Decimal::ZERO,
        )?,
        split_coefficient: optional_decimal(
            "split_coefficient",
            bar.split_coefficient.as_deref(),
            Decimal::ONE,
        )?,
    })
}

fn required_decimal(
    field: &'static str,
    value: Option<&str>,
) -> Result<Decimal, NormalizationError> {
    let raw = value.ok_or(NormalizationError::MissingField(field))?;
    parse_decimal(field, raw)
}

fn optional_decimal(
    field: &'static str,
    value: Option<&str>,
    default: Decimal,
) -> Result<Decimal, NormalizationError> {
    match value {
        Some(raw) => parse_decimal(field, raw),
        None => Ok(default),
    }
}

fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, NormalizationError> {
    Decimal::from_str(raw.trim()).map_err(|_| NormalizationError::Unparsable {
        field,
        value: raw.to_string(),
    })
}

fn required_int(field: &'static str, value: Option<&str>) -> Result<i64, NormalizationError> {
    let raw = value.ok_or(NormalizationError::MissingField(field))?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| NormalizationError::Unparsable {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn full_bar() -> RawDailyBar {
        RawDailyBar {
            open: Some("120.0000".into()),
            high: Some("125.0000".into()),
            low: Some("119.5000".into()),
            close: Some("123.4500".into()),
            adjusted_close: Some("123.4500".into()),
            volume: Some("3120000".into()),
            dividend_amount: Some("0.0000".into()),
            split_coefficient: Some("1.0".into()),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
    }

    #[test]
    fn close_survives_with_exact_precision() {
        let record = normalize("IBM", date(), &full_bar()).unwrap();
        assert_eq!(record.close, dec!(123.4500));
        // Scale is preserved too: no round-trip through f64.
        assert_eq!(record.close.to_string(), "123.4500");
        assert_eq!(record.volume, 3_120_000);
        assert_eq!(record.symbol, "IBM");
    }

    #[test]
    fn missing_close_is_a_missing_field_error() {
        let mut bar = full_bar();
        bar.close = None;
        assert_eq!(
            normalize("IBM", date(), &bar),
            Err(NormalizationError::MissingField("close"))
        );
    }

    #[test]
    fn garbage_volume_is_unparsable() {
        let mut bar = full_bar();
        bar.volume = Some("lots".into());
        assert_eq!(
            normalize("IBM", date(), &bar),
            Err(NormalizationError::Unparsable {
                field: "volume",
                value: "lots".into()
            })
        );
    }

    #[test]
    fn adjustment_fields_default_to_neutral_values() {
        let mut bar = full_bar();
        bar.dividend_amount = None;
        bar.split_coefficient = None;
        let record = normalize("IBM", date(), &bar).unwrap();
        assert_eq!(record.dividend_amount, Decimal::ZERO);
        assert_eq!(record.split_coefficient, Decimal::ONE);
    }
}
