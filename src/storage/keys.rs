//! Object key handling
//!
//! Keys are derived from upload filenames and recovered from public URLs.
//! Recovery is strict: a URL either maps to exactly one key in the bucket or
//! is rejected.
//!
//! Accepted public URL shapes:
//!
//! - `https://<bucket>.r2.dev/<key>` and `https://pub-<hash>.r2.dev/<key>`
//! - `https://<custom domain>/<base path>/<key>` where the custom domain and
//!   base path come from the configured public base URL
//!
//! Anything else on another host is [`KeyLookup::Foreign`]: it is not ours to
//! delete.

use percent_encoding::percent_decode_str;
use rand::Rng;
use url::Url;

const KEY_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("not a valid URL")]
    Malformed,

    #[error("unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("URL does not contain an object key")]
    EmptyKey,

    #[error("object key is not allowed: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLookup {
    /// The URL points into the managed bucket.
    Managed(String),
    /// The URL points somewhere else (external CDN, old hosting).
    Foreign,
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<prefix>-<unix millis>-<9 base36 chars>-<sanitized filename>`
pub fn generate_key<R: Rng + ?Sized>(
    prefix: &str,
    original_name: &str,
    unix_millis: i64,
    rng: &mut R,
) -> String {
    let suffix: String = (0..KEY_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!(
        "{}-{}-{}-{}",
        prefix,
        unix_millis,
        suffix,
        sanitize_filename(original_name)
    )
}

pub fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

fn is_r2_host(host: &str) -> bool {
    host.ends_with(".r2.dev") || host.starts_with("pub-")
}

/// Recover the object key from a public URL.
///
/// `public_base_url` is the configured base (`R2_PUBLIC_URL`); its path, if
/// any, is stripped from custom-domain URLs. The key is returned
/// percent-decoded. URLs with `.` or `..` path segments (escaped or not),
/// keys that are not valid UTF-8 once decoded, and keys with empty segments
/// or a trailing `/` are rejected.
pub fn extract_key(raw_url: &str, public_base_url: &str) -> Result<KeyLookup, KeyError> {
    let raw_url = raw_url.trim();
    // URL parsing resolves dot segments, so they must be caught on the raw input.
    if has_dot_segment(raw_url) {
        return Err(KeyError::InvalidKey(raw_url.to_string()));
    }

    let url = Url::parse(raw_url).map_err(|_| KeyError::Malformed)?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(KeyError::UnsupportedScheme(other.to_string())),
    }
    let host = url.host_str().ok_or(KeyError::Malformed)?.to_ascii_lowercase();

    let base = Url::parse(public_base_url).ok();
    let base_host = base
        .as_ref()
        .and_then(|b| b.host_str())
        .map(|h| h.to_ascii_lowercase());

    let path = url.path().trim_start_matches('/');
    let encoded_key = if base_host.as_deref() == Some(host.as_str()) {
        let base_path = base
            .as_ref()
            .map(|b| b.path().trim_matches('/').to_string())
            .unwrap_or_default();
        if base_path.is_empty() {
            path
        } else {
            path.strip_prefix(base_path.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or(KeyError::EmptyKey)?
        }
    } else if is_r2_host(&host) {
        path
    } else {
        return Ok(KeyLookup::Foreign);
    };

    let key = percent_decode_str(encoded_key)
        .decode_utf8()
        .map_err(|_| KeyError::InvalidKey(encoded_key.to_string()))?;
    validate_key(&key)?;
    Ok(KeyLookup::Managed(key.into_owned()))
}

fn has_dot_segment(raw_url: &str) -> bool {
    let before_query = raw_url.split(['?', '#']).next().unwrap_or_default();
    before_query.split(['/', '\\']).any(|segment| {
        let decoded = percent_decode_str(segment).decode_utf8_lossy();
        decoded == "." || decoded == ".."
    })
}

fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.trim().is_empty() {
        return Err(KeyError::EmptyKey);
    }
    if key.ends_with('/')
        || key
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return Err(KeyError::InvalidKey(key.to_string()));
    }
    Ok(())
}
