//! Object Keys
//!
//! Flat files are laid out as
//! `{asset_class}/{data_type}/{year}/{month}/{day}/{file_name}.{format}.gz`.

use std::fmt::{self, Display};

use chrono::{Datelike, NaiveDate};

/// Default file format.
pub const DEFAULT_FORMAT: &str = "csv";

/// Top-level dataset directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetClass {
    /// US stocks, SIP feed.
    Stocks,
    /// US options, OPRA feed.
    Options,
    /// US indices.
    Indices,
    /// Global forex.
    Forex,
    /// Global crypto.
    Crypto,
    /// US futures, CME.
    Futures,
    /// Any other directory name.
    Custom(String),
}

impl AssetClass {
    /// Directory name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stocks => "us_stocks_sip",
            Self::Options => "us_options_opra",
            Self::Indices => "us_indices",
            Self::Forex => "global_forex",
            Self::Crypto => "global_crypto",
            Self::Futures => "us_futures_cme",
            Self::Custom(name) => name,
        }
    }
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset within an asset class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Tick trades.
    Trades,
    /// Tick quotes.
    Quotes,
    /// Minute bars.
    MinuteAggs,
    /// Daily bars.
    DayAggs,
    /// Any other directory name.
    Custom(String),
}

impl DataType {
    /// Directory name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Trades => "trades_v1",
            Self::Quotes => "quotes_v1",
            Self::MinuteAggs => "minute_aggs_v1",
            Self::DayAggs => "day_aggs_v1",
            Self::Custom(name) => name,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of one daily file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFileKey {
    asset_class: AssetClass,
    data_type: DataType,
    date: NaiveDate,
    format: String,
    file_name: Option<String>,
}

impl FlatFileKey {
    /// Key for one day's file in the default format.
    #[must_use]
    pub fn new(asset_class: AssetClass, data_type: DataType, date: NaiveDate) -> Self {
        Self {
            asset_class,
            data_type,
            date,
            format: DEFAULT_FORMAT.to_string(),
            file_name: None,
        }
    }

    /// Override the format extension (before `.gz`).
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Override the file stem, which defaults to the ISO date.
    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Date of the file.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Render the object key.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for FlatFileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{:04}/{:02}/{:02}/",
            self.asset_class,
            self.data_type,
            self.date.year(),
            self.date.month(),
            self.date.day()
        )?;
        match &self.file_name {
            Some(name) => f.write_str(name)?,
            None => write!(f, "{}", self.date.format("%Y-%m-%d"))?,
        }
        write!(f, ".{}.gz", self.format)
    }
}

/// Directory prefix for a dataset, optionally narrowed by date parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFilePrefix {
    asset_class: AssetClass,
    data_type: DataType,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    raw: Option<String>,
}

impl FlatFilePrefix {
    /// Prefix covering a whole dataset.
    #[must_use]
    pub const fn new(asset_class: AssetClass, data_type: DataType) -> Self {
        Self {
            asset_class,
            data_type,
            year: None,
            month: None,
            day: None,
            raw: None,
        }
    }

    /// Narrow to a year.
    #[must_use]
    pub const fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Narrow to a month.
    #[must_use]
    pub const fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    /// Narrow to a day.
    #[must_use]
    pub const fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    /// Use `prefix` verbatim instead of the computed one.
    #[must_use]
    pub fn raw(mut self, prefix: impl Into<String>) -> Self {
        self.raw = Some(prefix.into());
        self
    }

    /// Render the prefix up to the deepest contiguous date part.
    #[must_use]
    pub fn render(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }

        let mut prefix = format!("{}/{}/", self.asset_class, self.data_type);
        if let Some(year) = self.year {
            prefix.push_str(&format!("{year:04}/"));
            if let Some(month) = self.month {
                prefix.push_str(&format!("{month:02}/"));
                if let Some(day) = self.day {
                    prefix.push_str(&format!("{day:02}/"));
                }
            }
        }
        prefix
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case(AssetClass::Stocks, DataType::Trades, "us_stocks_sip/trades_v1/2024/03/07/2024-03-07.csv.gz" ; "stocks trades")]
    #[test_case(AssetClass::Options, DataType::DayAggs, "us_options_opra/day_aggs_v1/2024/03/07/2024-03-07.csv.gz" ; "options day aggs")]
    #[test_case(AssetClass::Crypto, DataType::MinuteAggs, "global_crypto/minute_aggs_v1/2024/03/07/2024-03-07.csv.gz" ; "crypto minute aggs")]
    #[test_case(AssetClass::Custom("us_stocks_tape".into()), DataType::Custom("bbo_v2".into()), "us_stocks_tape/bbo_v2/2024/03/07/2024-03-07.csv.gz" ; "custom")]
    fn key_rendering(asset_class: AssetClass, data_type: DataType, expected: &str) {
        let key = FlatFileKey::new(asset_class, data_type, date(2024, 3, 7));
        assert_eq!(key.render(), expected);
    }

    #[test]
    fn key_format_and_file_name_overrides() {
        let key = FlatFileKey::new(AssetClass::Forex, DataType::Quotes, date(2023, 12, 1))
            .format("parquet")
            .file_name("eurusd");
        assert_eq!(
            key.to_string(),
            "global_forex/quotes_v1/2023/12/01/eurusd.parquet.gz"
        );
    }

    #[test]
    fn prefix_stops_at_deepest_part() {
        let base = FlatFilePrefix::new(AssetClass::Stocks, DataType::Trades);
        assert_eq!(base.render(), "us_stocks_sip/trades_v1/");
        assert_eq!(base.clone().year(2024).render(), "us_stocks_sip/trades_v1/2024/");
        assert_eq!(
            base.clone().year(2024).month(3).day(7).render(),
            "us_stocks_sip/trades_v1/2024/03/07/"
        );
        // A day without a month cannot narrow the prefix.
        assert_eq!(base.year(2024).day(7).render(), "us_stocks_sip/trades_v1/2024/");
    }

    #[test]
    fn raw_prefix_is_verbatim() {
        let prefix = FlatFilePrefix::new(AssetClass::Stocks, DataType::Trades).raw("custom/path");
        assert_eq!(prefix.render(), "custom/path");
    }
}
