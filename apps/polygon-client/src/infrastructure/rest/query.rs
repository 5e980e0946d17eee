//! Query Options and Endpoint Templates
//!
//! Every REST call is described by an [`Endpoint`]: a path template with
//! `{name}` placeholders plus the query keys that endpoint accepts. Caller
//! options are filtered through that allow-list before they reach the URL.

use std::fmt::{self, Display};

use super::error::RestError;

// =============================================================================
// Query Options
// =============================================================================

/// Ordered query options supplied by the caller.
///
/// Keys keep their first insertion position; setting a key again replaces
/// its value in place. `None` values are carried but never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    entries: Vec<(String, Option<String>)>,
}

impl QueryOptions {
    /// No options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.set(key, Some(value.to_string()));
        self
    }

    /// Set a key only when `value` is present; an explicit `None` is kept
    /// as absent.
    #[must_use]
    pub fn with_opt<V: Display>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.set(key, value.map(|v| v.to_string()));
        self
    }

    /// Set a key in place.
    pub fn set(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a key's value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order, including absent values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for QueryOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |options, (k, v)| options.with(k, v))
    }
}

// =============================================================================
// Endpoint
// =============================================================================

/// A REST endpoint: path template plus accepted query keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Path with `{name}` placeholders, starting with `/`.
    pub path: &'static str,
    /// Query keys the endpoint accepts.
    pub params: &'static [&'static str],
}

impl Endpoint {
    /// Describe an endpoint.
    #[must_use]
    pub const fn new(path: &'static str, params: &'static [&'static str]) -> Self {
        Self { path, params }
    }

    /// Interpolate path segments, percent-encoding each value.
    ///
    /// # Errors
    ///
    /// Returns `RestError::MissingPathSegment` if a placeholder has no
    /// value, or `RestError::InvalidPath` if a brace is left unclosed.
    pub fn render_path(&self, segments: &[(&str, &str)]) -> Result<String, RestError> {
        let mut rendered = String::with_capacity(self.path.len() + 16);
        let mut rest = self.path;

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| RestError::InvalidPath(self.path.to_string()))?;
            let name = &after[..close];
            let value = segments
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| RestError::MissingPathSegment(name.to_string()))?;
            rendered.push_str(&urlencoding::encode(value));
            rest = &after[close + 1..];
        }
        rendered.push_str(rest);

        Ok(rendered)
    }

    /// Keep only allow-listed keys with present values, in caller order.
    #[must_use]
    pub fn filter<'a>(&self, options: &'a QueryOptions) -> Vec<(&'a str, &'a str)> {
        options
            .iter()
            .filter(|(key, _)| self.params.contains(key))
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

// =============================================================================
// Shared Vocabulary
// =============================================================================

/// Bar size unit for aggregate endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timespan {
    /// Second bars.
    Second,
    /// Minute bars.
    Minute,
    /// Hourly bars.
    Hour,
    /// Daily bars.
    Day,
    /// Weekly bars.
    Week,
    /// Monthly bars.
    Month,
    /// Quarterly bars.
    Quarter,
    /// Yearly bars.
    Year,
}

impl Timespan {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction for the gainers/losers snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Top gainers.
    Gainers,
    /// Top losers.
    Losers,
}

impl Direction {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gainers => "gainers",
            Self::Losers => "losers",
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const TICKER: Endpoint = Endpoint::new("/v3/reference/tickers/{ticker}", &["date"]);

    #[test]
    fn options_keep_insertion_order_and_replace_in_place() {
        let options = QueryOptions::new()
            .with("limit", 10)
            .with("sort", "asc")
            .with("limit", 50);
        let keys: Vec<_> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["limit", "sort"]);
        assert_eq!(options.get("limit"), Some("50"));
    }

    #[test]
    fn filter_drops_unknown_keys_and_absent_values() {
        let options = QueryOptions::new()
            .with("bogus", 1)
            .with_opt::<&str>("date", None)
            .with("limit", 5);
        let endpoint = Endpoint::new("/x", &["date", "limit"]);
        assert_eq!(endpoint.filter(&options), vec![("limit", "5")]);
    }

    #[test]
    fn filter_keeps_caller_order() {
        let options: QueryOptions = [("sort", "desc"), ("order", "asc"), ("limit", "3")]
            .into_iter()
            .collect();
        let endpoint = Endpoint::new("/x", &["limit", "order", "sort"]);
        assert_eq!(
            endpoint.filter(&options),
            vec![("sort", "desc"), ("order", "asc"), ("limit", "3")]
        );
    }

    #[test]
    fn render_interpolates_and_encodes() {
        assert_eq!(
            TICKER.render_path(&[("ticker", "AAPL")]).unwrap(),
            "/v3/reference/tickers/AAPL"
        );
        assert_eq!(
            TICKER.render_path(&[("ticker", "BRK/A")]).unwrap(),
            "/v3/reference/tickers/BRK%2FA"
        );
    }

    #[test]
    fn render_multiple_segments() {
        let endpoint = Endpoint::new(
            "/v2/aggs/ticker/{ticker}/range/{multiplier}/{timespan}/{from}/{to}",
            &[],
        );
        let path = endpoint
            .render_path(&[
                ("ticker", "X:BTCUSD"),
                ("multiplier", "1"),
                ("timespan", "day"),
                ("from", "2023-01-01"),
                ("to", "2023-01-31"),
            ])
            .unwrap();
        assert_eq!(
            path,
            "/v2/aggs/ticker/X%3ABTCUSD/range/1/day/2023-01-01/2023-01-31"
        );
    }

    #[test_case("/a/{b", RestError::InvalidPath(String::new()) ; "unclosed")]
    #[test_case("/a/{missing}", RestError::MissingPathSegment(String::new()) ; "missing")]
    fn render_errors(path: &'static str, expected: RestError) {
        let err = Endpoint::new(path, &[]).render_path(&[]).unwrap_err();
        assert_eq!(std::mem::discriminant(&err), std::mem::discriminant(&expected));
    }

    #[test]
    fn timespan_names() {
        assert_eq!(Timespan::Minute.to_string(), "minute");
        assert_eq!(Direction::Losers.as_str(), "losers");
    }
}
