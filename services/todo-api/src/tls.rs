//! TLS termination for the API listener.
//!
//! Certificates and keys are read once at startup from PEM files. Only the
//! `ring` crypto provider is compiled in.

use crate::config::TlsFiles;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::{self, ServerConfig};

/// Errors from loading TLS material.
#[derive(Error, Debug)]
pub enum TlsError {
    /// A PEM file could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The certificate file holds no certificates.
    #[error("No certificates found in {}", .0.display())]
    NoCertificates(PathBuf),

    /// The key file holds no private key.
    #[error("No private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),

    /// rustls rejected the certificate and key.
    #[error("Invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Build a server config from a certificate chain and private key.
///
/// Only HTTP/1.1 is offered through ALPN.
///
/// # Errors
///
/// Returns [`TlsError`] if either file is unreadable or empty, or if the key
/// does not match the certificate.
pub fn server_config(files: &TlsFiles) -> Result<Arc<ServerConfig>, TlsError> {
    let certs = read_certs(&files.cert_file)?;
    let key = read_key(&files.key_file)?;

    let mut config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    tracing::debug!(
        cert = %files.cert_file.display(),
        key = %files.key_file.display(),
        "Loaded TLS certificate"
    );
    Ok(Arc::new(config))
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn read_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs = rustls_pemfile::certs(&mut open(path)?)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

fn read_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(&mut open(path)?)
        .map_err(|source| TlsError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/tls")
            .join(name)
    }

    fn files(cert: &str, key: &str) -> TlsFiles {
        TlsFiles {
            cert_file: fixture(cert),
            key_file: fixture(key),
        }
    }

    #[test]
    fn test_loads_certificate_and_key() {
        let config = server_config(&files("server.crt", "server.key")).unwrap();
        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }

    #[test]
    fn test_missing_file() {
        let err = server_config(&files("absent.crt", "server.key")).unwrap_err();
        assert!(matches!(err, TlsError::Read { .. }));
        assert!(err.to_string().contains("absent.crt"));
    }

    #[test]
    fn test_swapped_files() {
        let err = server_config(&files("server.key", "server.crt")).unwrap_err();
        assert!(matches!(err, TlsError::NoCertificates(_)));
    }

    #[test]
    fn test_key_file_without_key() {
        let err = server_config(&files("server.crt", "server.crt")).unwrap_err();
        assert!(matches!(err, TlsError::NoPrivateKey(_)));
    }
}
