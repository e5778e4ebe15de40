//! Finnhub quote endpoint client.
//!
//! `GET {base}/quote?symbol=AAPL` answers with an object such as
//! `{"c":148.96,"d":-0.84,"dp":-0.56,"h":149.7,"l":147.8,"o":148.985,"pc":149.8,"t":1635796803}`.
//! The body is passed through untouched; only HTTP status and the
//! unknown-symbol convention (all zeros) are interpreted here.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde_json::Value;
use stock_common::Result;
use stock_common::StockError;
use stock_common::error::ProviderError;
use stock_common::quote::{RawSnapshot, SnapshotField};

use crate::provider::QuoteProvider;

/// Public Finnhub REST endpoint.
pub const FINNHUB_API_URL: &str = "https://finnhub.io/api/v1";
const TOKEN_HEADER: &str = "X-Finnhub-Token";

/// Blocking HTTP client bound to one API key.
pub struct FinnhubClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    /// Build a client for `base_url` authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(StockError::Config(
                "a provider API key is required (--api-key or SMD_API_KEY)".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stock_ingestor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl QuoteProvider for FinnhubClient {
    fn fetch(&self, symbol: &str) -> Result<RawSnapshot> {
        let response = self
            .http
            .get(format!("{}/quote", self.base_url))
            .query(&[("symbol", symbol)])
            .header(TOKEN_HEADER, &self.api_key)
            .send()?;

        let status = response.status();
        debug!("Provider answered {} for {}", status, symbol);
        match status.as_u16() {
            401 | 403 => {
                return Err(ProviderError::Unauthorized(format!("status {status}")).into());
            }
            429 => return Err(ProviderError::RateLimited.into()),
            code if !status.is_success() => return Err(ProviderError::Status(code).into()),
            _ => {}
        }

        let body: Value = response
            .json()
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(interpret_body(symbol, body)?)
    }
}

fn interpret_body(symbol: &str, body: Value) -> std::result::Result<RawSnapshot, ProviderError> {
    let Value::Object(map) = body else {
        return Err(ProviderError::Decode(format!("expected an object, got {body}")));
    };
    if let Some(message) = map.get("error").and_then(Value::as_str) {
        return Err(ProviderError::Decode(message.to_string()));
    }
    // Unknown symbols come back as a 200 with every field zeroed.
    let zero = |field: SnapshotField| map.get(field.as_ref()).and_then(Value::as_f64) == Some(0.0);
    if zero(SnapshotField::Current) && zero(SnapshotField::Timestamp) {
        return Err(ProviderError::UnknownSymbol(symbol.to_string()));
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one canned HTTP response and hand back the raw request head.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            stream.write_all(response.as_bytes()).unwrap();
            head
        });
        (url, handle)
    }

    fn client(url: &str) -> FinnhubClient {
        FinnhubClient::new(url, "secret", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn fetch_sends_symbol_and_token() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"c":150.0,"h":151.0,"l":149.0,"o":150.5,"pc":-0.3,"t":1700000000}"#,
        );
        let snapshot = client(&url).fetch("AAPL").unwrap();
        assert_eq!(snapshot["c"], json!(150.0));

        let head = server.join().unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /quote?symbol=aapl "), "{head}");
        assert!(head.contains("x-finnhub-token: secret"), "{head}");
    }

    #[test]
    fn symbol_is_url_encoded() {
        let (url, server) = serve_once("200 OK", r#"{"c":1,"t":1}"#);
        client(&url).fetch("A&B=C").unwrap();
        let head = server.join().unwrap();
        assert!(head.starts_with("GET /quote?symbol=A%26B%3DC "), "{head}");
    }

    #[test]
    fn throttling_maps_to_rate_limited() {
        let (url, server) = serve_once("429 Too Many Requests", "{}");
        let err = client(&url).fetch("AAPL").unwrap_err();
        assert!(matches!(err, StockError::Provider(ProviderError::RateLimited)));
        server.join().unwrap();
    }

    #[test]
    fn rejected_key_maps_to_unauthorized() {
        let (url, server) = serve_once("401 Unauthorized", r#"{"error":"Invalid API key"}"#);
        let err = client(&url).fetch("AAPL").unwrap_err();
        assert!(matches!(err, StockError::Provider(ProviderError::Unauthorized(_))));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let err = client(&url).fetch("AAPL").unwrap_err();
        assert!(matches!(err, StockError::Provider(ProviderError::Transport(_))));
    }

    #[test]
    fn zeroed_body_means_unknown_symbol() {
        let body = json!({"c": 0, "d": null, "dp": null, "h": 0, "l": 0, "o": 0, "pc": 0, "t": 0});
        assert!(matches!(
            interpret_body("NOPE", body),
            Err(ProviderError::UnknownSymbol(s)) if s == "NOPE"
        ));
    }

    #[test]
    fn non_object_body_is_undecodable() {
        assert!(matches!(
            interpret_body("AAPL", json!([1, 2])),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = FinnhubClient::new(FINNHUB_API_URL, "  ", Duration::from_secs(1))
            .err()
            .unwrap();
        assert_eq!(err.kind(), "config");
    }
}
