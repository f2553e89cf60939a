//! Ethereum-style JSON-RPC block oracle (`eth_getBlockByNumber`).

use crate::domain::{BlockTag, RawBlock};
use crate::foundation::RaffleError;
use crate::infrastructure::config::OracleConfig;
use crate::infrastructure::oracle::{retry, BlockOracle, CircuitBreaker, CircuitBreakerConfig};
use async_trait::async_trait;
use log::{debug, info, trace, warn};
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const GET_BLOCK_METHOD: &str = "eth_getBlockByNumber";

#[derive(Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcEnvelope {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcErrorBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockFields {
    number: Option<String>,
    gas_limit: Option<String>,
}

pub struct JsonRpcBlockOracle {
    client: Client,
    url: String,
    redacted_url: String,
    retry_attempts: usize,
    retry_delay: Duration,
    breaker: CircuitBreaker,
    next_id: AtomicU64,
}

impl JsonRpcBlockOracle {
    pub fn new(
        url: impl Into<String>,
        request_timeout: Duration,
        retry_attempts: usize,
        retry_delay: Duration,
        breaker: CircuitBreakerConfig,
    ) -> Result<Self, RaffleError> {
        let url = url.into();
        let redacted_url = redact_url(&url);
        let client = Client::builder().timeout(request_timeout).build()?;
        info!("json-rpc block oracle configured url={} timeout_ms={}", redacted_url, request_timeout.as_millis());
        Ok(Self {
            client,
            url,
            redacted_url,
            retry_attempts: retry_attempts.max(1),
            retry_delay,
            breaker: CircuitBreaker::new(breaker),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &OracleConfig) -> Result<Self, RaffleError> {
        Self::new(
            config.rpc_url.clone(),
            Duration::from_millis(config.request_timeout_ms),
            config.retry_attempts,
            Duration::from_millis(config.retry_delay_ms),
            config.circuit_breaker,
        )
    }

    async fn request_block(&self, tag: BlockTag) -> Result<Option<RawBlock>, RaffleError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": GET_BLOCK_METHOD,
            "params": [tag_param(tag), false],
        });
        trace!("json-rpc request method={} id={} tag={}", GET_BLOCK_METHOD, id, tag);

        let resp = self.client.post(&self.url).json(&payload).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RaffleError::oracle(GET_BLOCK_METHOD, format!("http_status={} body={}", status, truncate(&body))));
        }
        let envelope: JsonRpcEnvelope = serde_json::from_str(&body)
            .map_err(|err| RaffleError::oracle(GET_BLOCK_METHOD, format!("invalid json error={} body={}", err, truncate(&body))))?;
        if let Some(err) = envelope.error {
            return Err(RaffleError::oracle(GET_BLOCK_METHOD, format!("json_rpc_error code={} message={}", err.code, err.message)));
        }
        parse_block(envelope.result.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl BlockOracle for JsonRpcBlockOracle {
    async fn get_block(&self, tag: BlockTag) -> Result<Option<RawBlock>, RaffleError> {
        if !self.breaker.allow() {
            return Err(RaffleError::OracleUnavailable(format!("circuit open url={}", self.redacted_url)));
        }
        let started = Instant::now();
        let result = retry(self.retry_attempts, self.retry_delay, || self.request_block(tag)).await;
        match &result {
            Ok(block) => {
                self.breaker.record_success();
                debug!(
                    "oracle get_block ok tag={} found={} elapsed_ms={}",
                    tag,
                    block.is_some(),
                    started.elapsed().as_millis()
                );
            }
            Err(err) => {
                if err.is_retryable() {
                    self.breaker.record_failure();
                }
                warn!("oracle get_block failed tag={} url={} error={}", tag, self.redacted_url, err);
            }
        }
        result
    }
}

fn tag_param(tag: BlockTag) -> String {
    match tag {
        BlockTag::Latest => "latest".to_string(),
        BlockTag::Number(number) => format!("0x{:x}", number),
    }
}

/// Parse an `eth_getBlockByNumber` result. `null` means the block does not exist yet.
pub fn parse_block(value: serde_json::Value) -> Result<Option<RawBlock>, RaffleError> {
    if value.is_null() {
        return Ok(None);
    }
    let fields: BlockFields =
        serde_json::from_value(value).map_err(|err| RaffleError::InvalidBlockData { field: "block".to_string(), details: err.to_string() })?;
    let number = fields.number.ok_or_else(|| missing("number"))?;
    let gas_limit = fields.gas_limit.ok_or_else(|| missing("gasLimit"))?;
    Ok(Some(RawBlock { number: parse_quantity("number", &number)?, gas_limit: parse_quantity("gasLimit", &gas_limit)? }))
}

/// Parse a JSON-RPC hex quantity such as `0x1c9c380`.
pub fn parse_quantity(field: &str, value: &str) -> Result<u64, RaffleError> {
    let digits = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")).ok_or_else(|| RaffleError::InvalidBlockData {
        field: field.to_string(),
        details: format!("expected 0x-prefixed quantity, got '{}'", value),
    })?;
    if digits.is_empty() {
        return Err(RaffleError::InvalidBlockData { field: field.to_string(), details: "empty quantity".to_string() });
    }
    u64::from_str_radix(digits, 16)
        .map_err(|err| RaffleError::InvalidBlockData { field: field.to_string(), details: format!("'{}': {}", value, err) })
}

fn missing(field: &str) -> RaffleError {
    RaffleError::InvalidBlockData { field: field.to_string(), details: "missing".to_string() }
}

fn truncate(body: &str) -> &str {
    const MAX_BODY_LOG_CHARS: usize = 256;
    match body.char_indices().nth(MAX_BODY_LOG_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Hide `user:password@` in URLs before they reach logs.
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let (scheme, rest) = url.split_at(scheme_end + 3);
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let Some(at) = rest[..authority_end].rfind('@') else {
        return url.to_string();
    };
    format!("{scheme}<redacted>@{}", &rest[at + 1..])
}
