//! Yahoo Finance chart API integration (daily OHLCV).

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::{FetchConfig, PricePoint, Series};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; stx/0.1)";

/// Linear backoff step between retries.
const RETRY_BACKOFF_MS: u64 = 500;

pub struct YahooClient {
    client: Client,
    base_url: String,
    retries: u32,
    /// Attempt `n` waits `n * backoff` before retrying.
    backoff: Duration,
}

/// Outcome of a single failed HTTP attempt.
enum AttemptError {
    /// Transport error, 429 or 5xx: worth another try.
    Retryable(AppError),
    Fatal(AppError),
}

impl YahooClient {
    /// Build a client from `.env` / environment overrides.
    ///
    /// - `STX_MARKET_DATA_URL`: chart endpoint base (default: Yahoo query1)
    /// - `STX_USER_AGENT`: request user agent
    pub fn from_env(fetch: &FetchConfig) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var("STX_MARKET_DATA_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let user_agent =
            std::env::var("STX_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs.max(1)))
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::data_fetch(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retries: fetch.retries,
            backoff: Duration::from_millis(RETRY_BACKOFF_MS),
        })
    }

    /// Fetch daily bars for `symbol` in `[start, end)`.
    pub fn fetch_series(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Series, AppError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let period1 = unix_midnight(start).to_string();
        let period2 = unix_midnight(end).to_string();
        let query = [
            ("period1", period1.as_str()),
            ("period2", period2.as_str()),
            ("interval", "1d"),
            ("events", "history"),
        ];

        let attempts = self.retries.saturating_add(1);
        let mut attempt = 1;
        let body = loop {
            debug!(symbol, attempt, "requesting chart data");
            match self.request_once(&url, &query) {
                Ok(body) => break body,
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Retryable(err)) => {
                    if attempt >= attempts {
                        return Err(err);
                    }
                    warn!(symbol, attempt, error = %err, "market data request failed, retrying");
                    std::thread::sleep(self.backoff * attempt);
                    attempt += 1;
                }
            }
        };

        let series = parse_chart_response(symbol, &body)?;
        info!(symbol, rows = series.len(), %start, %end, "fetched daily prices");
        Ok(series)
    }

    fn request_once(&self, url: &str, query: &[(&str, &str)]) -> Result<String, AttemptError> {
        let resp = self.client.get(url).query(query).send().map_err(|e| {
            AttemptError::Retryable(AppError::data_fetch(format!("Market data request failed: {e}")))
        })?;

        let status = resp.status();
        if !status.is_success() {
            let err = AppError::data_fetch(format!("Market data request failed with status {status}."));
            return Err(if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                AttemptError::Retryable(err)
            } else {
                AttemptError::Fatal(err)
            });
        }

        resp.text().map_err(|e| {
            AttemptError::Retryable(AppError::data_fetch(format!("Failed to read market data response: {e}")))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Parse a chart API payload into a validated series.
///
/// Bars with any missing OHLCV field are skipped. If the provider reports the
/// same trading day twice, the later bar wins.
pub fn parse_chart_response(symbol: &str, body: &str) -> Result<Series, AppError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::data_fetch(format!("Failed to parse market data response: {e}")))?;

    if let Some(err) = envelope.chart.error {
        return Err(AppError::data_fetch(format!(
            "Market data provider error for {symbol}: {} ({})",
            err.description, err.code
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AppError::data_fetch(format!("No chart data returned for {symbol}.")))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| AppError::data_fetch(format!("No quote block returned for {symbol}.")))?;

    let field = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let mut by_date: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();
    let mut skipped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let bar = (
            field(&quote.open, i),
            field(&quote.high, i),
            field(&quote.low, i),
            field(&quote.close, i),
            field(&quote.volume, i),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = bar else {
            skipped += 1;
            continue;
        };
        let date = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)
            .ok_or_else(|| AppError::data_fetch(format!("Invalid timestamp {ts} in market data.")))?
            .date_naive();
        by_date.insert(
            date,
            PricePoint {
                date,
                open,
                high,
                low,
                close,
                volume,
            },
        );
    }

    if skipped > 0 {
        debug!(symbol, skipped, "skipped incomplete bars");
    }
    if by_date.is_empty() {
        return Err(AppError::data_fetch(format!("No complete daily bars returned for {symbol}.")));
    }

    Series::new(symbol, by_date.into_values().collect())
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use super::*;
    use crate::error::ErrorKind;

    const PAYLOAD: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "gmtoffset": -18000},
                "timestamp": [1704205800, 1704292200, 1704378600, 1704465000],
                "indicators": {
                    "quote": [{
                        "open":   [187.15, 184.22, null,   181.99],
                        "high":   [188.44, 185.88, 183.09, 182.76],
                        "low":    [183.89, 183.43, 180.88, 180.17],
                        "close":  [185.64, 184.25, 181.91, 181.18],
                        "volume": [82488700, 58414500, 71983600, 62303300]
                    }],
                    "adjclose": [{"adjclose": [185.0, 183.6, 181.3, 180.6]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_bars_and_skips_nulls() {
        let series = parse_chart_response("AAPL", PAYLOAD).unwrap();
        assert_eq!(series.len(), 3);
        let first = series.points()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!((first.close - 185.64).abs() < 1e-9);
        assert!((first.volume - 82_488_700.0).abs() < 1e-3);
        assert_eq!(series.points()[2].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn provider_error_is_data_fetch() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response("ZZZZ", body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFetch);
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn garbage_body_is_data_fetch() {
        let err = parse_chart_response("AAPL", "<html>rate limited</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFetch);
    }

    /// Serve one canned response per connection, in order. The handle yields
    /// the number of requests answered.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/chart", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let mut served = 0;
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let reply = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
                served += 1;
            }
            served
        });
        (base_url, handle)
    }

    fn client(base_url: String, retries: u32) -> YahooClient {
        YahooClient {
            client: Client::builder().no_proxy().build().unwrap(),
            base_url,
            retries,
            backoff: Duration::ZERO,
        }
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn server_errors_are_retried_until_success() {
        let (base_url, server) = serve(vec![(500, "oops"), (503, "busy"), (200, PAYLOAD)]);
        let series = client(base_url, 2).fetch_series("AAPL", jan(1), jan(6)).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(server.join().unwrap(), 3);
    }

    #[test]
    fn rate_limit_exhausts_retries() {
        let (base_url, server) = serve(vec![(429, "slow down"), (429, "slow down")]);
        let err = client(base_url, 1).fetch_series("AAPL", jan(1), jan(6)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFetch);
        assert!(err.to_string().contains("429"));
        assert_eq!(server.join().unwrap(), 2);
    }

    #[test]
    fn client_error_fails_without_retry() {
        let (base_url, server) = serve(vec![(404, "missing")]);
        let err = client(base_url, 3).fetch_series("AAPL", jan(1), jan(6)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFetch);
        assert!(err.to_string().contains("404"));
        assert_eq!(server.join().unwrap(), 1);
    }

    #[test]
    fn unix_midnight_is_utc() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(unix_midnight(d), 1_704_067_200);
    }
}
