// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `ddns_core::DnsProvider`.
//
// - ✅ One HTTP request per operation (plus pagination for listings)
// - ✅ Full error propagation; the reconciler decides what is fatal
// - ✅ HTTP timeout on every request
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic
// - ❌ NO caching
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::{DEFAULT_API_BASE, DEFAULT_HTTP_TIMEOUT_SECS};
use ddns_core::{ADDRESS_RECORD_TYPE, AddressRecord, DnsProvider, RecordChange, Zone};
use ddns_core::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const PROVIDER_NAME: &str = "cloudflare";

/// Page size for record listings (Cloudflare maximum is 5000, default 100)
const RECORDS_PER_PAGE: u32 = 100;

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended POST/PATCH payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip mutations
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `api_base`: API base URL, e.g. `https://api.cloudflare.com/client/v4`
    /// - `timeout`: Timeout applied to every request
    /// - `dry_run`: If true, perform GET requests but skip mutations
    ///
    /// # Errors
    ///
    /// - `Error::Authentication` if the token is empty
    /// - `Error::Http` if the HTTP client cannot be built
    pub fn new(
        api_token: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::auth("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider against the public API in live mode
    pub fn new_live(api_token: impl Into<String>) -> Result<Self> {
        Self::new(
            api_token,
            DEFAULT_API_BASE,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            false,
        )
    }

    /// Create a provider against the public API in dry-run mode
    pub fn new_dry_run(api_token: impl Into<String>) -> Result<Self> {
        Self::new(
            api_token,
            DEFAULT_API_BASE,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            true,
        )
    }

    /// Whether mutations are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
    }

    /// Send a request and unwrap the Cloudflare response envelope
    ///
    /// `action` is used in error messages ("Zone lookup", "Record listing", ...).
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<Envelope<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, action, &error_text));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("{}: failed to parse response: {}", action, e))
        })?;

        if !envelope.success {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("{} rejected: {}", action, envelope.error_summary()),
            ));
        }

        Ok(envelope)
    }

    fn log_dry_run(&self, method: &str, path: &str, change: &RecordChange) -> Result<()> {
        let payload = serde_json::to_string(change).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to serialize payload: {}", e))
        })?;
        tracing::info!(
            "[DRY-RUN] Would send {} request to {}{} with payload: {}",
            method,
            self.api_base,
            path,
            payload
        );
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn resolve_zone(&self, zone_name: &str) -> Result<Zone> {
        tracing::debug!("Looking up zone ID for: {}", zone_name);

        let request = self
            .request(Method::GET, "/zones")
            .query(&[("name", zone_name)]);
        let envelope: Envelope<Vec<ZoneResult>> = self.send(request, "Zone lookup").await?;

        let mut zones = envelope.result.unwrap_or_default();
        match zones.len() {
            0 => Err(Error::not_found(format!("Zone not found: {}", zone_name))),
            1 => {
                let zone = zones.remove(0);
                tracing::debug!("Found zone ID: {}", zone.id);
                Ok(Zone {
                    id: zone.id,
                    name: zone.name,
                })
            }
            count => Err(Error::provider(
                PROVIDER_NAME,
                format!("Ambiguous zone name {}: {} zones matched", zone_name, count),
            )),
        }
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=home.example.com&page=1&per_page=100
    /// Authorization: Bearer <token>
    /// ```
    async fn list_address_records(
        &self,
        zone: &Zone,
        record_name: &str,
    ) -> Result<Vec<AddressRecord>> {
        let path = format!("/zones/{}/dns_records", zone.id);
        let per_page = RECORDS_PER_PAGE.to_string();
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_param = page.to_string();
            let request = self.request(Method::GET, &path).query(&[
                ("type", ADDRESS_RECORD_TYPE),
                ("name", record_name),
                ("page", page_param.as_str()),
                ("per_page", per_page.as_str()),
            ]);
            let envelope: Envelope<Vec<AddressRecord>> =
                self.send(request, "Record listing").await?;

            let total_pages = envelope.result_info.map(|info| info.total_pages).unwrap_or(1);
            records.extend(envelope.result.unwrap_or_default());

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        tracing::debug!(
            "Found {} {} record(s) named {}",
            records.len(),
            ADDRESS_RECORD_TYPE,
            record_name
        );
        Ok(records)
    }

    /// # API Call
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// { "type": "A", "name": "home.example.com", "content": "1.2.3.4", "comment": "..." }
    /// ```
    async fn create_record(&self, zone: &Zone, change: &RecordChange) -> Result<AddressRecord> {
        let path = format!("/zones/{}/dns_records", zone.id);

        if self.dry_run {
            self.log_dry_run("POST", &path, change)?;
            return Ok(change.clone().into_record(String::new()));
        }

        let request = self.request(Method::POST, &path).json(change);
        let envelope: Envelope<AddressRecord> = self.send(request, "Record creation").await?;
        envelope.into_result("Record creation")
    }

    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// { "type": "A", "name": "home.example.com", "content": "1.2.3.4", "comment": "..." }
    /// ```
    async fn update_record(
        &self,
        zone: &Zone,
        record_id: &str,
        change: &RecordChange,
    ) -> Result<AddressRecord> {
        let path = format!("/zones/{}/dns_records/{}", zone.id, record_id);

        if self.dry_run {
            self.log_dry_run("PATCH", &path, change)?;
            return Ok(change.clone().into_record(record_id));
        }

        let request = self.request(Method::PATCH, &path).json(change);
        let envelope: Envelope<AddressRecord> = self.send(request, "Record update").await?;
        envelope.into_result("Record update")
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Map a non-success HTTP status to a typed error
fn status_error(status: StatusCode, action: &str, error_text: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API token or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{}: {} - {}", action, status, error_text)),
        429 => Error::rate_limited(format!("Cloudflare rate limit exceeded. Status: {}", status)),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("Cloudflare server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {} - {}", action, status, error_text),
        ),
    }
}

/// Standard Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

impl<T> Envelope<T> {
    fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "no error details returned".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn into_result(self, action: &str) -> Result<T> {
        self.result.ok_or_else(|| {
            Error::provider(PROVIDER_NAME, format!("{}: no result in response", action))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct ZoneResult {
    id: String,
    name: String,
}
