//! Yahoo Finance chart client used as the live snapshot source.
//!
//! Each symbol is one request against the public chart endpoint; the price
//! is read from `chart.result[0].meta.regularMarketPrice`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::types::MarketSnapshot;

/// Yahoo chart API base URL.
const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Snapshot retrieval errors.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error for {symbol}: {status}")]
    ApiError { symbol: String, status: String },

    #[error("Invalid response for {symbol}: {reason}")]
    InvalidResponse { symbol: String, reason: String },
}

/// Anything that can produce a fresh `MarketSnapshot`.
#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    async fn fetch(&mut self) -> Result<MarketSnapshot, FetchError>;
}

/// Symbols polled for each snapshot field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    pub vix: String,
    pub vvix: String,
    pub spx: String,
    pub vx1: String,
    pub vx2: String,
    /// `vx3 = vx2 * vx3_multiplier`.
    pub vx3_multiplier: f64,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            vix: "^VIX".to_string(),
            vvix: "^VVIX".to_string(),
            spx: "^GSPC".to_string(),
            vx1: "VIXY".to_string(),
            vx2: "UVXY".to_string(),
            vx3_multiplier: 1.01,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

/// Pull the market price out of a chart response body.
fn extract_price(symbol: &str, body: ChartResponse) -> Result<f64, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidResponse {
        symbol: symbol.to_string(),
        reason: reason.to_string(),
    };

    let price = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| invalid("empty chart result"))?
        .meta
        .regular_market_price
        .ok_or_else(|| invalid("missing regularMarketPrice"))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(invalid(&format!("non-positive price {}", price)));
    }

    Ok(price)
}

/// Live snapshot source backed by the Yahoo chart API.
pub struct YahooSource {
    client: Client,
    symbols: SymbolConfig,
}

impl YahooSource {
    /// Create a new source for the given symbols.
    pub fn new(symbols: SymbolConfig) -> Self {
        Self {
            client: Client::new(),
            symbols,
        }
    }

    /// Fetch the latest price for one symbol.
    pub async fn get_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let url = format!("{}/{}", BASE_URL, symbol);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::ApiError {
                symbol: symbol.to_string(),
                status: response.status().to_string(),
            });
        }

        let body: ChartResponse = response.json().await.map_err(|e| {
            FetchError::InvalidResponse {
                symbol: symbol.to_string(),
                reason: format!("Failed to parse response: {}", e),
            }
        })?;

        let price = extract_price(symbol, body)?;
        debug!(symbol, price, "fetched price");
        Ok(price)
    }
}

impl SnapshotSource for YahooSource {
    async fn fetch(&mut self) -> Result<MarketSnapshot, FetchError> {
        let vix = self.get_price(&self.symbols.vix).await?;
        let vvix = self.get_price(&self.symbols.vvix).await?;
        let spx = self.get_price(&self.symbols.spx).await?;
        let vx1 = self.get_price(&self.symbols.vx1).await?;
        let vx2 = self.get_price(&self.symbols.vx2).await?;

        Ok(MarketSnapshot {
            vix,
            vvix,
            spx,
            vx1,
            vx2,
            vx3: vx2 * self.symbols.vx3_multiplier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_price() {
        let body = parse(r#"{"chart":{"result":[{"meta":{"regularMarketPrice":17.42,"currency":"USD"}}],"error":null}}"#);
        assert_eq!(extract_price("^VIX", body).unwrap(), 17.42);
    }

    #[test]
    fn test_extract_price_missing_result() {
        let body = parse(r#"{"chart":{"result":null,"error":{"code":"Not Found"}}}"#);
        let err = extract_price("^NOPE", body).unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse { .. }));
    }

    #[test]
    fn test_extract_price_rejects_non_positive() {
        let body = parse(r#"{"chart":{"result":[{"meta":{"regularMarketPrice":0.0}}]}}"#);
        assert!(extract_price("VIXY", body).is_err());

        let body = parse(r#"{"chart":{"result":[{"meta":{}}]}}"#);
        assert!(extract_price("VIXY", body).is_err());
    }

    #[test]
    fn test_default_symbols() {
        let symbols = SymbolConfig::default();
        assert_eq!(symbols.vix, "^VIX");
        assert_eq!(symbols.vx2, "UVXY");
        assert_eq!(symbols.vx3_multiplier, 1.01);
    }
}
