//! Yahoo Finance data provider.
//!
//! Fetches bars from Yahoo's v8 chart API with a blocking client: one round
//! trip per call, no retries. The same endpoint serves FX pairs such as
//! `JPY=X`, so this type is also the live [`RateProvider`].
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; parse failures surface as [`DataError::ResponseFormatChanged`].

use super::provider::{
    canonicalize, DataError, DataProvider, HistoryRequest, Interval, Period, RateProvider,
};
use crate::domain::{Bar, PriceSeries};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Option<Vec<Option<u64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different chart endpoint (proxies, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the chart API URL for a symbol, range and interval.
    fn chart_url(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<reqwest::Url, DataError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| DataError::Other(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| DataError::Other(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("range", &period.to_string())
            .append_pair("interval", &interval.to_string())
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }

    /// Execute one chart request and parse it into bars.
    fn fetch_chart(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, DataError> {
        let url = self.chart_url(symbol, period, interval)?;
        debug!(%symbol, %url, "requesting chart");

        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                DataError::NetworkUnreachable(e.to_string())
            } else {
                DataError::Other(format!("request for {symbol} failed: {e}"))
            }
        })?;

        let status = resp.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        parse_response(symbol, chart)
    }
}

/// Parse the chart API response into adjusted bars.
///
/// Prices are scaled by adjclose/close when adjusted closes are present.
/// Rows missing any OHLC value are dropped rather than carried as NaN.
fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
    let result = resp.chart.result.ok_or_else(|| {
        if let Some(err) = resp.chart.error {
            if err.code == "Not Found" {
                DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }
            } else {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
        } else {
            DataError::ResponseFormatChanged("empty result with no error".into())
        }
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

    let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

    let timestamps = data
        .timestamp
        .ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote
            .volume
            .as_ref()
            .and_then(|v| v.get(i).copied().flatten())
            .unwrap_or(0);

        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            skipped += 1;
            continue;
        };

        let factor = adj_closes
            .as_ref()
            .and_then(|v| v.get(i).copied().flatten())
            .filter(|adj| close != 0.0 && adj.is_finite())
            .map(|adj| adj / close)
            .unwrap_or(1.0);

        bars.push(Bar {
            date,
            open: open * factor,
            high: high * factor,
            low: low * factor,
            close: close * factor,
            volume,
        });
    }

    if skipped > 0 {
        debug!(%symbol, skipped, "dropped rows with missing prices");
    }

    if bars.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }

    Ok(canonicalize(bars))
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, request: &HistoryRequest) -> Result<PriceSeries, DataError> {
        let bars = self.fetch_chart(symbol, request.period, request.interval)?;
        debug!(%symbol, bars = bars.len(), "chart fetched");
        Ok(PriceSeries::new(symbol, bars)?)
    }
}

impl RateProvider for YahooProvider {
    /// Last daily close of the pair. A few days are requested so that a
    /// weekend or holiday still yields a quote.
    fn latest_rate(&self, pair: &str) -> Result<f64, DataError> {
        let bars = self.fetch_chart(pair, Period::Days(5), Interval::Daily)?;
        bars.last()
            .map(|b| b.close)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: pair.to_string(),
            })
    }
}
