//! TLS certificate loading.

use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

use crate::config::schema::TlsConfig;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("certificate file not found: {}", .0.display())]
    CertificateNotFound(PathBuf),

    #[error("private key file not found: {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("both a certificate and a key are required for TLS")]
    Incomplete,

    #[error("invalid certificate or key: {0}")]
    Invalid(#[from] std::io::Error),
}

/// Pair up optional certificate and key paths.
///
/// Neither given means plain HTTP; exactly one given is an error.
pub fn tls_settings(
    cert_path: Option<PathBuf>,
    key_path: Option<PathBuf>,
) -> Result<Option<TlsConfig>, TlsError> {
    match (cert_path, key_path) {
        (Some(cert_path), Some(key_path)) => Ok(Some(TlsConfig { cert_path, key_path })),
        (None, None) => Ok(None),
        _ => Err(TlsError::Incomplete),
    }
}

/// Load the rustls configuration from PEM certificate and key files.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    check_exists(&config.cert_path, TlsError::CertificateNotFound)?;
    check_exists(&config.key_path, TlsError::KeyNotFound)?;

    let rustls = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path).await?;
    tracing::info!(cert = %config.cert_path.display(), "TLS certificate loaded");
    Ok(rustls)
}

fn check_exists(path: &Path, missing: fn(PathBuf) -> TlsError) -> Result<(), TlsError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(missing(path.to_path_buf()))
    }
}
