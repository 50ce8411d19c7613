use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use time::{Date, OffsetDateTime, Time};

use crate::cache::SeriesCache;
use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::data_source::{
    DailyClosesRequest, HealthState, HealthStatus, PriceSource, SourceError,
};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::retry::RetryPolicy;
use crate::throttling::RequestThrottle;
use crate::{DateRange, PriceSeries, ProviderId, Symbol};

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_TTL: Duration = Duration::from_secs(3600);
const NOT_FOUND_CODE: &str = "Not Found";

#[derive(Debug, Clone)]
struct Crumb {
    value: String,
    fetched_at: Instant,
}

/// Cookie/crumb session for Yahoo's unofficial chart API.
///
/// The session cookie lives in the transport's cookie jar; the crumb is
/// cached here for an hour and sent as a query parameter. Setting
/// `YAHOO_COOKIE` skips the cookie handshake and sends that value instead.
#[derive(Debug, Default)]
pub struct YahooAuth {
    crumb: Mutex<Option<Crumb>>,
    cookie_override: Option<String>,
}

impl YahooAuth {
    pub fn new(cookie_override: Option<String>) -> Self {
        Self {
            crumb: Mutex::new(None),
            cookie_override,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var("YAHOO_COOKIE")
                .ok()
                .filter(|value| !value.trim().is_empty()),
        )
    }

    fn cached(&self) -> MutexGuard<'_, Option<Crumb>> {
        self.crumb.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn invalidate(&self) {
        *self.cached() = None;
    }

    fn decorate(&self, request: HttpRequest) -> HttpRequest {
        let request = request.with_header("referer", REFERER);
        match &self.cookie_override {
            Some(cookie) => request.with_header("cookie", cookie.clone()),
            None => request,
        }
    }

    pub async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        let fresh = self
            .cached()
            .as_ref()
            .filter(|crumb| crumb.fetched_at.elapsed() < CRUMB_TTL)
            .map(|crumb| crumb.value.clone());
        if let Some(value) = fresh {
            return Ok(value);
        }

        if self.cookie_override.is_none() {
            // Only the Set-Cookie side effect matters; fc.yahoo.com answers 404.
            let handshake = HttpRequest::get(COOKIE_URL).with_timeout_ms(timeout_ms);
            http_client
                .execute(self.decorate(handshake))
                .await
                .map_err(|error| {
                    SourceError::unavailable(format!(
                        "failed to fetch yahoo session cookie: {}",
                        error.message()
                    ))
                })?;
        }

        for url in CRUMB_URLS {
            let request = self.decorate(HttpRequest::get(url).with_timeout_ms(timeout_ms));
            let response = match http_client.execute(request).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::debug!(url, error = %error, "crumb endpoint failed");
                    continue;
                }
            };
            if response.status == 429 {
                return Err(SourceError::rate_limited(
                    "yahoo rate limited the crumb request",
                ));
            }
            if let Some(value) = parse_crumb(&response) {
                *self.cached() = Some(Crumb {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                });
                tracing::debug!("yahoo crumb refreshed");
                return Ok(value);
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch yahoo crumb from all endpoints",
        ))
    }
}

fn parse_crumb(response: &HttpResponse) -> Option<String> {
    if !response.is_success() {
        return None;
    }
    let body = response.body.trim();
    let looks_valid = !body.is_empty()
        && body.len() < 100
        && !body.contains(char::is_whitespace)
        && !body.contains('<')
        && !body.to_ascii_lowercase().contains("too many requests");
    looks_valid.then(|| body.to_owned())
}

/// Daily closes from Yahoo Finance's v8 chart endpoint.
pub struct YahooSource {
    http_client: Arc<dyn HttpClient>,
    auth: YahooAuth,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
    throttle: RequestThrottle,
    cache: SeriesCache,
    timeout_ms: u64,
}

impl std::fmt::Debug for YahooSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooSource")
            .field("circuit", &self.circuit_breaker.state())
            .field("retry", &self.retry)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl YahooSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: YahooAuth::from_env(),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            retry: RetryPolicy::default(),
            throttle: RequestThrottle::new(Duration::from_secs(1), 4),
            cache: SeriesCache::default(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_auth(mut self, auth: YahooAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_cache(mut self, cache: SeriesCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch(&self, req: &DailyClosesRequest) -> Result<PriceSeries, SourceError> {
        if let Some(series) = self.cache.get(req).await {
            tracing::debug!(symbol = %req.symbol, "yahoo cache hit");
            return Ok(series);
        }

        let series = self
            .retry
            .run(req.symbol.as_str(), |_| self.fetch_once(req))
            .await?;

        tracing::debug!(
            symbol = %req.symbol,
            closes = series.len(),
            range = %req.range,
            "yahoo chart fetched"
        );
        self.cache.put(req, series.clone()).await;
        Ok(series)
    }

    async fn fetch_once(&self, req: &DailyClosesRequest) -> Result<PriceSeries, SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::circuit_open("yahoo circuit breaker is open"));
        }

        self.throttle.wait().await;
        let crumb = self
            .auth
            .crumb(self.http_client.as_ref(), self.timeout_ms)
            .await?;
        let request =
            chart_request(&req.symbol, &req.range, &crumb)?.with_timeout_ms(self.timeout_ms);
        let request = self.auth.decorate(request);

        let response = self.http_client.execute(request).await.map_err(|error| {
            self.circuit_breaker.record_failure();
            SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
        })?;

        match response.status {
            200..=299 | 404 => {}
            401 | 403 => {
                // Stale crumb; the next attempt re-authenticates.
                self.auth.invalidate();
                return Err(SourceError::unavailable(format!(
                    "yahoo rejected credentials (status {})",
                    response.status
                )));
            }
            429 => {
                self.circuit_breaker.record_failure();
                return Err(SourceError::rate_limited("yahoo returned status 429"));
            }
            status if status >= 500 => {
                self.circuit_breaker.record_failure();
                return Err(SourceError::unavailable(format!(
                    "yahoo returned status {status}"
                )));
            }
            status => {
                return Err(SourceError::invalid_request(format!(
                    "yahoo returned status {status}"
                )));
            }
        }

        self.circuit_breaker.record_success();
        parse_chart(&req.symbol, &req.range, &response.body)
    }
}

impl PriceSource for YahooSource {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn daily_closes<'a>(
        &'a self,
        req: DailyClosesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch(&req).await })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            let state = match self.circuit_breaker.state() {
                CircuitState::Closed => HealthState::Healthy,
                CircuitState::HalfOpen => HealthState::Degraded,
                CircuitState::Open => HealthState::Unhealthy,
            };
            HealthStatus::new(state, state != HealthState::Unhealthy)
        })
    }
}

/// `period2` is exclusive upstream, so it is pushed to the day after `end`.
fn chart_request(
    symbol: &Symbol,
    range: &DateRange,
    crumb: &str,
) -> Result<HttpRequest, SourceError> {
    let period1 = midnight_utc(range.start());
    let period2 = range
        .end()
        .next_day()
        .map(midnight_utc)
        .ok_or_else(|| SourceError::invalid_request("date range ends at the calendar limit"))?;

    Ok(HttpRequest::get(format!(
        "{CHART_BASE_URL}/{}",
        urlencoding::encode(symbol.as_str())
    ))
    .with_query("period1", period1.to_string())
    .with_query("period2", period2.to_string())
    .with_query("interval", "1d")
    .with_query("events", "history")
    .with_query("crumb", crumb))
}

fn midnight_utc(date: Date) -> i64 {
    date.with_time(Time::MIDNIGHT).assume_utc().unix_timestamp()
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
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
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Normalizes a chart payload into a date-keyed close series.
///
/// Unknown tickers and empty windows come back as an empty series. Bars
/// with a null close are skipped; bars mapping to the same exchange-local
/// date keep the later close.
fn parse_chart(symbol: &Symbol, range: &DateRange, body: &str) -> Result<PriceSeries, SourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|error| SourceError::internal(format!("failed to parse yahoo chart: {error}")))?;

    if let Some(error) = envelope.chart.error {
        if error.code == NOT_FOUND_CODE {
            return Ok(PriceSeries::empty(symbol.clone()));
        }
        return Err(SourceError::invalid_request(format!(
            "yahoo chart error {}: {}",
            error.code, error.description
        )));
    }

    let Some(result) = envelope.chart.result.and_then(|results| results.into_iter().next())
    else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };

    let offset = result.meta.map_or(0, |meta| meta.gmtoffset);
    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    let mut by_date = BTreeMap::new();
    for (timestamp, close) in timestamps.into_iter().zip(closes) {
        let Some(close) = close else { continue };
        let date = OffsetDateTime::from_unix_timestamp(timestamp.saturating_add(offset))
            .map_err(|error| SourceError::internal(format!("invalid yahoo timestamp: {error}")))?
            .date();
        by_date.insert(date, close);
    }

    PriceSeries::from_closes(symbol.clone(), by_date)
        .map(|series| series.within(range))
        .map_err(|error| SourceError::internal(error.to_string()))
}
