use std::{future::Future, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde_json::Value;
use std::str::FromStr;
use tracing::{error, info};

use crate::{configuration::Config, error::Error, types::ListingsResponse};

/// Anything that can produce one batch of listing entries per call.
///
/// `Ok(None)` means the cycle produced no data and should be skipped.
pub trait ListingsSource {
    fn fetch(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<Value>>, Error>>;
}

#[derive(Debug)]
pub struct HTTP {
    pub config: Config,
    pub http: Client,
}

impl HTTP {
    pub fn new(config: Config) -> Result<HTTP, Error> {
        let mut header_map = HeaderMap::new();
        header_map.insert(
            HeaderName::from_str("Accepts")?,
            HeaderValue::from_str("application/json")?,
        );

        let mut api_key = HeaderValue::from_str(&config.api_key)?;
        api_key.set_sensitive(true);
        header_map.insert(HeaderName::from_str("X-CMC_PRO_API_KEY")?, api_key);

        let mut builder = Client::builder().default_headers(header_map);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let http = match builder.build() {
            Ok(c) => c,
            Err(e) => {
                return Err(Error::ReqwestError(e));
            },
        };

        Ok(HTTP { config, http })
    }

    pub async fn get_listings(&self) -> Result<Option<Vec<Value>>, Error> {
        let url = &self.config.listings_url;
        info!("{}", url);

        let response = match self
            .http
            .get(url)
            .query(&self.config.listings_query())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if is_transport_error(&e) => {
                error!("Error fetching data: {}", e);
                return Ok(None);
            },
            Err(e) => return Err(Error::ReqwestError(e)),
        };

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if is_transport_error(&e) => {
                error!("Error fetching data: {}", e);
                return Ok(None);
            },
            Err(e) => return Err(Error::ReqwestError(e)),
        };

        let json: ListingsResponse = serde_json::from_str(&body)?;

        match (json.data, json.status) {
            (Some(data), _) => Ok(Some(data)),
            (None, Some(status)) => {
                let reason = status
                    .error_message
                    .unwrap_or_else(|| String::from("missing data section"));
                error!("Listings error {}: {}", status.error_code, reason);
                Err(Error::MalformedPayload(reason))
            },
            (None, None) => Err(Error::MalformedPayload(String::from(
                "missing data section",
            ))),
        }
    }
}

impl ListingsSource for HTTP {
    fn fetch(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<Value>>, Error>> {
        self.get_listings()
    }
}

fn is_transport_error(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_redirect() || e.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    async fn serve_once(body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}/v1/cryptocurrency/listings/latest", addr), handle)
    }

    fn test_config(url: String) -> Config {
        let mut config = Config::new("test-key", "/tmp");
        config.listings_url = url;
        config
    }

    #[tokio::test]
    async fn test_fetch_returns_data_section_and_sends_key() {
        let (url, server) = serve_once(
            r#"{"status":{"error_code":0,"credit_count":1},"data":[{"name":"Bitcoin","quote":{"USD":{"price":1.5}}}]}"#,
        )
        .await;

        let http = HTTP::new(test_config(url)).unwrap();
        let data = http.fetch().await.unwrap().unwrap();

        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "Bitcoin");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /v1/cryptocurrency/listings/latest?start=1&limit=100&convert=usd "));
        assert!(request.contains("x-cmc_pro_api_key: test-key"));
        assert!(request.contains("accepts: application/json"));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_skips_cycle() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let http = HTTP::new(test_config(format!("http://{}/listings", addr)))
            .unwrap();

        assert!(http.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_timeout_skips_cycle() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let mut config = test_config(format!("http://{}/listings", addr));
        config.timeout = Some(1);
        let http = HTTP::new(config).unwrap();

        assert!(http.fetch().await.unwrap().is_none());
        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_error_envelope_is_malformed_payload() {
        let (url, server) = serve_once(
            r#"{"status":{"error_code":1002,"error_message":"API key missing."}}"#,
        )
        .await;

        let http = HTTP::new(test_config(url)).unwrap();
        let result = http.fetch().await;
        server.await.unwrap();

        match result {
            Err(Error::MalformedPayload(message)) => {
                assert_eq!(message, "API key missing.")
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
