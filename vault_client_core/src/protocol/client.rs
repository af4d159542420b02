//! HTTP transport for the Vault API
//!
//! Owns the configured `reqwest::Client` and the base URL, attaches the
//! authentication headers and turns non-success statuses into
//! `ProtocolError::ServerError`. Requests are sent once; there is no retry.

use crate::error::{IoError, ValidationError, io::read_file};
use crate::protocol::error::{ProtocolError, ResponseCode};
use crate::protocol::messages::parse_errors;
use crate::protocol::{NAMESPACE_HEADER, REQUEST_HEADER, TOKEN_HEADER, endpoint};
use crate::security::SecureString;
use crate::{ClientConfig, Result, TlsConfig};
use log::{debug, trace, warn};
use reqwest::header::HeaderValue;
use reqwest::{Certificate, Client, Identity, Method, Url};
use std::path::Path;
use std::time::Duration;

/// HTTP transport bound to one server and one token
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    token: SecureString,
    namespace: Option<String>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build a transport from the connection options and a resolved token
    ///
    /// Nothing is sent to the server here; failures are configuration
    /// problems (bad address, unreadable TLS material, a token or namespace
    /// that cannot travel in a header).
    pub fn new(config: &ClientConfig, token: SecureString) -> Result<Self> {
        let base_url = parse_address(&config.address)?;

        let token_text = token
            .to_str()
            .map_err(|_| ValidationError::invalid_configuration("token is not valid UTF-8"))?;
        check_header_value("token", token_text)?;
        if let Some(namespace) = &config.namespace {
            check_header_value("namespace", namespace)?;
        }

        if config.timeout_seconds == 0 {
            return Err(
                ValidationError::invalid_configuration("timeout_seconds must be greater than 0")
                    .into(),
            );
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("vault-cli/", env!("CARGO_PKG_VERSION")));

        for certificate in load_root_certificates(&config.tls)? {
            builder = builder.add_root_certificate(certificate);
        }

        if let Some(identity) = load_identity(&config.tls)? {
            builder = builder.identity(identity);
        }

        if config.tls.skip_verify {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| ValidationError::invalid_tls(e.to_string()))?;

        debug!("HTTP transport ready for {base_url}");
        Ok(Self {
            client,
            base_url,
            token,
            namespace: config.namespace.clone(),
        })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send one request and return the body of a successful response
    pub async fn send(&self, method: Method, path: &str) -> Result<Vec<u8>> {
        let url = self
            .base_url
            .join(&endpoint(path))
            .map_err(|e| ValidationError::invalid_address(self.base_url.as_str(), &e.to_string()))?;

        debug!("{method} {url}");
        let token = self
            .token
            .to_str()
            .map_err(|_| ValidationError::invalid_configuration("token is not valid UTF-8"))?;

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(TOKEN_HEADER, token)
            .header(REQUEST_HEADER, "true");
        if let Some(namespace) = &self.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }
        if method == Method::PUT {
            request = request.body(Vec::new());
        }

        let response = request.send().await.map_err(|e| {
            debug!("{method} {url} failed: {e}");
            ProtocolError::from(e)
        })?;

        let code = ResponseCode(response.status().as_u16());
        let body = response.bytes().await.map_err(ProtocolError::from)?.to_vec();
        trace!("{method} {url} -> {code}, {} byte body", body.len());

        if !code.is_success() {
            let errors = parse_errors(&body);
            debug!("{method} {url} returned {code}: {errors:?}");
            return Err(ProtocolError::server_error(code.0, errors).into());
        }

        debug!("{method} {url} -> {code}");
        Ok(body)
    }
}

/// Reject values reqwest would refuse when building the request
fn check_header_value(name: &str, value: &str) -> Result<()> {
    HeaderValue::from_str(value).map_err(|_| {
        ValidationError::invalid_configuration(&format!(
            "{name} contains characters that are not allowed in an HTTP header"
        ))
    })?;
    Ok(())
}

/// Parse the configured address into a base URL ending in `/`
fn parse_address(address: &str) -> Result<Url> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::invalid_address(address, "address is empty").into());
    }

    let mut url =
        Url::parse(trimmed).map_err(|e| ValidationError::invalid_address(address, &e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::invalid_address(
            address,
            &format!("unsupported scheme '{}'", url.scheme()),
        )
        .into());
    }
    if url.host_str().is_none() {
        return Err(ValidationError::invalid_address(address, "missing host").into());
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn load_root_certificates(tls: &TlsConfig) -> Result<Vec<Certificate>> {
    let mut certificates = Vec::new();

    if let Some(ca_cert) = &tls.ca_cert {
        certificates.extend(read_pem_bundle(ca_cert)?);
    }

    if let Some(ca_path) = &tls.ca_path {
        let entries = std::fs::read_dir(ca_path)
            .map_err(|e| IoError::from_std(e).with_path(ca_path))?;
        for entry in entries {
            let entry = entry.map_err(|e| IoError::from_std(e).with_path(ca_path))?;
            let path = entry.path();
            if path.is_file() {
                certificates.extend(read_pem_bundle(&path)?);
            }
        }
    }

    if !certificates.is_empty() {
        debug!("Loaded {} CA certificate(s)", certificates.len());
    }
    Ok(certificates)
}

fn read_pem_bundle(path: &Path) -> Result<Vec<Certificate>> {
    let pem = read_file(path)?;
    let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| {
        ValidationError::invalid_tls(format!("{} is not a PEM bundle: {e}", path.display()))
    })?;
    if certificates.is_empty() {
        return Err(ValidationError::invalid_tls(format!(
            "{} contains no certificates",
            path.display()
        ))
        .into());
    }
    Ok(certificates)
}

fn load_identity(tls: &TlsConfig) -> Result<Option<Identity>> {
    let (cert, key) = match (&tls.client_cert, &tls.client_key) {
        (None, None) => return Ok(None),
        (Some(cert), Some(key)) => (cert, key),
        (Some(_), None) => {
            return Err(ValidationError::invalid_tls("client_cert set without client_key").into());
        }
        (None, Some(_)) => {
            return Err(ValidationError::invalid_tls("client_key set without client_cert").into());
        }
    };

    let mut pem = read_file(key)?;
    pem.push(b'\n');
    pem.extend(read_file(cert)?);

    let identity = Identity::from_pem(&pem).map_err(|e| {
        ValidationError::invalid_tls(format!(
            "cannot use {} / {} as client identity: {e}",
            cert.display(),
            key.display()
        ))
    })?;
    Ok(Some(identity))
}
