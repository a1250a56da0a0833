use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::core::cycle::Cycle;
use crate::error::{BoardError, BoardResult};

enum Endpoint {
    Affiliates,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::Affiliates => write!(f, "/v1/external/affiliates"),
        }
    }
}

/// Wager amount as sent by the affiliates API: usually a decimal string,
/// sometimes a bare number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Default for RawAmount {
    fn default() -> Self {
        RawAmount::Other(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AffiliateRecord {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub wagered_amount: RawAmount,
}

impl AffiliateRecord {
    pub fn new(username: &str, wagered_amount: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            wagered_amount: RawAmount::Text(wagered_amount.to_string()),
        }
    }

    /// Wagered amount as a non-negative finite number. Text is read up to its
    /// longest numeric prefix, so `"1,234"` is 1. Anything that cannot be read
    /// that way counts as nothing wagered.
    pub fn amount(&self) -> f64 {
        let parsed = match &self.wagered_amount {
            RawAmount::Number(n) => Some(*n),
            RawAmount::Text(s) => parse_numeric_prefix(s),
            RawAmount::Other(_) => None,
        };
        match parsed {
            Some(n) if n.is_finite() && n > 0.0 => n,
            _ => 0.0,
        }
    }
}

fn parse_numeric_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut n_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        n_digits += frac_end - end - 1;
        if n_digits > 0 {
            end = frac_end;
        }
    }
    if n_digits == 0 {
        return None;
    }
    // Exponent only counts when followed by at least one digit.
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    text[..end].parse::<f64>().ok()
}

/// Anything able to list the affiliates' wagers for a cycle.
#[async_trait]
pub trait AffiliateSource: Send + Sync {
    async fn fetch_records(&self, cycle: &Cycle) -> BoardResult<Vec<AffiliateRecord>>;
}

pub struct Rainbet {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl Rainbet {
    pub fn new(base_url: String, timeout: Duration, api_key: String) -> BoardResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BoardError::Config(format!("Could not build HTTP client. {e}")))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get(&self, endpoint: &Endpoint, cycle: &Cycle) -> BoardResult<String> {
        let url = format!("{}{}", self.base_url, endpoint);

        // Both bounds are inclusive calendar dates.
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("start_at", cycle.start_date()),
                ("end_at", cycle.end_date()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| BoardError::from(e.without_url()))?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| BoardError::from(e.without_url())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BoardError::UpstreamUnavailable(
                format!("{}. The API key might be invalid.", response.status()),
            )),
            status => Err(BoardError::UpstreamUnavailable(format!("{}", status))),
        }
    }

    fn parse_affiliates(body: &str) -> BoardResult<Vec<AffiliateRecord>> {
        // Only the affiliates list matters, everything else in the payload is ignored.
        #[derive(Debug, Deserialize)]
        struct AffiliatesResponse {
            affiliates: Option<Vec<AffiliateRecord>>,
        }

        let parsed = serde_json::from_str::<AffiliatesResponse>(body)?;
        parsed.affiliates.ok_or(BoardError::UpstreamMalformed(
            "Response has no affiliates field.".to_string(),
        ))
    }
}

#[async_trait]
impl AffiliateSource for Rainbet {
    async fn fetch_records(&self, cycle: &Cycle) -> BoardResult<Vec<AffiliateRecord>> {
        let body = self.get(&Endpoint::Affiliates, cycle).await?;
        Rainbet::parse_affiliates(&body)
    }
}
