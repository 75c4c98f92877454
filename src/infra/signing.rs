//! HTTP signature authentication for the cloud API.
//!
//! Every request is signed over its `Date` header with the account's RSA key:
//!
//! ```text
//! Authorization: Signature keyId="/<account>/keys/<key id>",algorithm="rsa-sha256",signature="<base64>"
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::Sha256;

use crate::domain::{Credentials, SigningError};

pub const ALGORITHM: &str = "rsa-sha256";

/// Format `now` as an RFC 7231 `Date` header value.
#[must_use]
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// The string covered by the signature.
#[must_use]
pub fn signing_string(date: &str) -> String {
    format!("date: {date}")
}

/// Signs requests on behalf of one account key.
pub struct RequestSigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl RequestSigner {
    /// Load the private key named by `creds.key_path`.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::ReadKey` if the file cannot be read or
    /// `SigningError::ParseKey` if it is not an RSA PEM key.
    pub fn load(creds: &Credentials) -> Result<Self, SigningError> {
        let path = creds.key_path.display().to_string();
        let pem = std::fs::read_to_string(&creds.key_path).map_err(|e| SigningError::ReadKey {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let key = parse_private_key(&pem).ok_or(SigningError::ParseKey { path })?;
        Ok(Self::new(&creds.account, &creds.key_id, key))
    }

    #[must_use]
    pub fn new(account: &str, key_id: &str, key: RsaPrivateKey) -> Self {
        Self {
            key_id: format!("/{account}/keys/{key_id}"),
            signing_key: SigningKey::<Sha256>::new(key),
        }
    }

    /// The `keyId` parameter sent with every request.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Build the `Authorization` header value for a request dated `date`.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::Sign` if the RSA operation fails.
    pub fn authorization(&self, date: &str) -> Result<String, SigningError> {
        let signature = self
            .signing_key
            .try_sign(signing_string(date).as_bytes())
            .map_err(|e| SigningError::Sign(e.to_string()))?;
        Ok(format!(
            "Signature keyId=\"{}\",algorithm=\"{ALGORITHM}\",signature=\"{}\"",
            self.key_id,
            STANDARD.encode(signature.to_bytes())
        ))
    }
}

/// Accept PKCS#1 (`BEGIN RSA PRIVATE KEY`) or PKCS#8 (`BEGIN PRIVATE KEY`) PEM.
fn parse_private_key(pem: &str) -> Option<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .ok()
        .or_else(|| RsaPrivateKey::from_pkcs8_pem(pem).ok())
}
