//! HMAC-signed upload URLs for backends without native presigning.
//!
//! A URL authorizes a single `PUT` of one key until its expiry. The
//! signature covers the key and the expiry timestamp:
//!
//! ```text
//! {base}/v1/objects/{key}?expires={unix_secs}&signature={b64url(hmac_sha256(secret, "PUT\n{key}\n{expires}"))}
//! ```

use crate::error::{StorageError, StorageResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use contractguard_core::config::MIN_SIGNING_SECRET_LEN;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Route prefix the server mounts the signed upload handler under.
pub const UPLOAD_ROUTE_PREFIX: &str = "/v1/objects";

/// Longest signature we bother decoding.
const MAX_SIGNATURE_LEN: usize = 128;

/// Unreserved characters stay literal; everything else in a segment is encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Signs and verifies upload URLs with a shared secret.
#[derive(Clone)]
pub struct UploadSigner {
    keyed: HmacSha256,
}

impl std::fmt::Debug for UploadSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSigner").finish_non_exhaustive()
    }
}

impl UploadSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> StorageResult<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SIGNING_SECRET_LEN {
            return Err(StorageError::Config(format!(
                "signing secret must be at least {MIN_SIGNING_SECRET_LEN} bytes"
            )));
        }
        let keyed =
            HmacSha256::new_from_slice(secret).map_err(|e| StorageError::Config(e.to_string()))?;
        Ok(Self { keyed })
    }

    fn mac(&self, key: &str, expires: i64) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(b"PUT\n");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac
    }

    /// Signature for `key` valid until `expires` (unix seconds).
    pub fn sign(&self, key: &str, expires: i64) -> String {
        URL_SAFE_NO_PAD.encode(self.mac(key, expires).finalize().into_bytes())
    }

    /// Check a signature and its expiry against `now` (unix seconds).
    pub fn verify(&self, key: &str, expires: i64, signature: &str, now: i64) -> StorageResult<()> {
        if signature.len() > MAX_SIGNATURE_LEN {
            return Err(StorageError::InvalidSignature);
        }
        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StorageError::InvalidSignature)?;
        self.mac(key, expires)
            .verify_slice(&provided)
            .map_err(|_| StorageError::InvalidSignature)?;

        if now > expires {
            return Err(StorageError::Expired);
        }
        Ok(())
    }

    /// Build the full upload URL for `key` under `base_url`.
    pub fn upload_url(&self, base_url: &str, key: &str, expires: i64) -> String {
        format!(
            "{}{UPLOAD_ROUTE_PREFIX}/{}?expires={expires}&signature={}",
            base_url.trim_end_matches('/'),
            encode_key(key),
            self.sign(key, expires)
        )
    }
}

/// Percent-encode each `/`-separated segment of a key.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
