use std::io::Read;

use anyhow::{anyhow, Result};
use axum::http::HeaderMap;
use flate2::read::GzDecoder;

use audit_domain::{IngestEnvelope, IngestTransfer, RuntimeConfig};

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

pub fn parse_transfers(headers: &HeaderMap, body: &[u8]) -> Result<Vec<IngestTransfer>> {
    let content = maybe_gunzip(headers, body)?;
    let envelope: IngestEnvelope = serde_json::from_str(&content)?;
    if envelope.schema_version.trim() != "v1" {
        return Err(anyhow!(
            "unsupported schema_version '{}', expected 'v1'",
            envelope.schema_version
        ));
    }
    Ok(envelope.events)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8]) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body);
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    const BODY: &str = r#"{
        "schema_version": "v1",
        "events": [{
            "transfer_type": "currency",
            "from_player": "alice",
            "to_player": "bob",
            "quantity": 500
        }]
    }"#;

    #[test]
    fn parses_plain_envelope() {
        let events = parse_transfers(&HeaderMap::new(), BODY.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].from_player, "alice");
        assert_eq!(events[0].quantity, 500);
    }

    #[test]
    fn parses_gzipped_envelope() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(BODY.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("Content-Encoding", "gzip".parse().unwrap());
        let events = parse_transfers(&headers, &compressed).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let body = BODY.replace("v1", "v9");
        assert!(parse_transfers(&HeaderMap::new(), body.as_bytes()).is_err());
    }

    #[test]
    fn authorize_requires_matching_bearer_when_token_set() {
        let config = RuntimeConfig {
            api_token: Some("secret".to_string()),
            ..RuntimeConfig::default()
        };

        let mut headers = HeaderMap::new();
        assert!(!authorize(&config, &headers));
        headers.insert("Authorization", "Bearer secret".parse().unwrap());
        assert!(authorize(&config, &headers));
        headers.insert("Authorization", "Bearer wrong".parse().unwrap());
        assert!(!authorize(&config, &headers));

        // No token configured: open instance.
        assert!(authorize(&RuntimeConfig::default(), &HeaderMap::new()));
    }
}
