//! # Transform Engine
//!
//! The two data transforms. Both are pure: they read the Secret's data and
//! return the single write they want applied (or `None` when the destination
//! already holds the right bytes). They never remove keys and never write
//! anything but their own destination key.

use crate::transform::annotations::ResolvedAnnotation;
use crate::transform::operations::{TLS_CRT, TLS_KEY, TLS_PEM};
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use thiserror::Error;

/// Secret data map as stored in `Secret::data`
pub type SecretData = BTreeMap<String, ByteString>;

/// A single destination key write produced by a transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataWrite {
    pub key: String,
    pub value: ByteString,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The merge annotation holds something other than `tls.pem`
    #[error("Value {value} is invalid for annotation {annotation}")]
    InvalidValue { annotation: String, value: String },

    /// An input of the merge is missing from the Secret
    #[error("Secret {secret} does not contain a '{key}' data key")]
    MissingDataKey { secret: String, key: &'static str },

    /// The source of a copy is missing from the Secret
    #[error("the key \"{key}\" does not exist")]
    MissingSourceKey { key: String },
}

impl TransformError {
    /// Event reason for this failure
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            TransformError::InvalidValue { .. } => "InvalidSecretTransform",
            TransformError::MissingDataKey { key, .. } if *key == TLS_KEY => "MissingTLSKey",
            TransformError::MissingDataKey { key, .. } if *key == TLS_CRT => "MissingTLSCrt",
            TransformError::MissingDataKey { .. } => "MissingDataKey",
            TransformError::MissingSourceKey { .. } => "FailedCopying",
        }
    }

    /// Whether this failure ends the whole pass, discarding earlier writes.
    ///
    /// Only a missing copy source does; merge failures only skip the merge.
    #[must_use]
    pub fn aborts_pass(&self) -> bool {
        matches!(self, TransformError::MissingSourceKey { .. })
    }
}

/// Merge `tls.key` and `tls.crt` into `tls.pem`.
///
/// The new value is the key bytes immediately followed by the certificate
/// bytes, with no separator.
///
/// # Errors
///
/// - [`TransformError::InvalidValue`] when the annotation value is not `tls.pem`
/// - [`TransformError::MissingDataKey`] naming `tls.key` or `tls.crt`, whichever is absent first
pub fn merge_pem(
    secret_name: &str,
    data: &SecretData,
    annotation: ResolvedAnnotation<'_>,
) -> Result<Option<DataWrite>, TransformError> {
    if annotation.value != TLS_PEM {
        return Err(TransformError::InvalidValue {
            annotation: annotation.key.to_string(),
            value: annotation.value.to_string(),
        });
    }

    let tls_key = required(secret_name, data, TLS_KEY)?;
    let tls_crt = required(secret_name, data, TLS_CRT)?;

    let mut merged = Vec::with_capacity(tls_key.0.len() + tls_crt.0.len());
    merged.extend_from_slice(&tls_key.0);
    merged.extend_from_slice(&tls_crt.0);

    if data.get(TLS_PEM).is_some_and(|existing| existing.0 == merged) {
        return Ok(None);
    }

    Ok(Some(DataWrite {
        key: TLS_PEM.to_string(),
        value: ByteString(merged),
    }))
}

/// Copy the bytes of `source` to `destination`.
///
/// `destination` is used verbatim.
///
/// # Errors
///
/// [`TransformError::MissingSourceKey`] when `source` is absent.
pub fn copy_key(
    data: &SecretData,
    source: &str,
    destination: &str,
) -> Result<Option<DataWrite>, TransformError> {
    let value = data
        .get(source)
        .ok_or_else(|| TransformError::MissingSourceKey {
            key: source.to_string(),
        })?;

    if data.get(destination) == Some(value) {
        return Ok(None);
    }

    Ok(Some(DataWrite {
        key: destination.to_string(),
        value: value.clone(),
    }))
}

fn required<'a>(
    secret_name: &str,
    data: &'a SecretData,
    key: &'static str,
) -> Result<&'a ByteString, TransformError> {
    data.get(key).ok_or_else(|| TransformError::MissingDataKey {
        secret: secret_name.to_string(),
        key,
    })
}
