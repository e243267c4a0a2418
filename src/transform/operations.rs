//! # Operations
//!
//! Static table of the operations the controller performs, in evaluation order.
//!
//! ```yaml
//! metadata:
//!   annotations:
//!     secret-transform/secret-transform: "tls.pem"     # tls.key + tls.crt -> tls.pem
//!     secret-transform/secret-copy-ca.crt: "ca"        # ca.crt -> ca
//! ```

use crate::transform::annotations::AnnotationKey;

/// Canonical annotation namespace
pub const ANNOTATION_PREFIX: &str = "secret-transform/";

/// Annotation namespace used before the rename
pub const LEGACY_ANNOTATION_PREFIX: &str = "cert-manager.io/";

pub const TLS_KEY: &str = "tls.key";
pub const TLS_CRT: &str = "tls.crt";
pub const TLS_PEM: &str = "tls.pem";
pub const CA_CRT: &str = "ca.crt";
pub const KEYSTORE_JKS: &str = "keystore.jks";
pub const TRUSTSTORE_JKS: &str = "truststore.jks";
pub const KEYSTORE_P12: &str = "keystore.p12";
pub const TRUSTSTORE_P12: &str = "truststore.p12";

// Both prefixes above must stay in sync with the literals used here.
macro_rules! annotation_key {
    ($suffix:literal) => {
        AnnotationKey {
            canonical: concat!("secret-transform/", $suffix),
            legacy: &[concat!("cert-manager.io/", $suffix)],
        }
    };
}

/// What an operation does to the Secret's data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpec {
    /// Concatenate `tls.key` and `tls.crt` into `tls.pem`. The annotation value must be `tls.pem`.
    MergePem,
    /// Copy `source` to the key named by the annotation value
    CopyKey { source: &'static str },
}

/// One annotation-driven operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Short name used in logs and metric labels
    pub name: &'static str,
    pub annotation: AnnotationKey,
    pub transform: TransformSpec,
}

/// All operations, merge first, then copies in a fixed order
pub static OPERATIONS: [Operation; 8] = [
    Operation {
        name: "merge-tls.pem",
        annotation: annotation_key!("secret-transform"),
        transform: TransformSpec::MergePem,
    },
    Operation {
        name: "copy-ca.crt",
        annotation: annotation_key!("secret-copy-ca.crt"),
        transform: TransformSpec::CopyKey { source: CA_CRT },
    },
    Operation {
        name: "copy-tls.crt",
        annotation: annotation_key!("secret-copy-tls.crt"),
        transform: TransformSpec::CopyKey { source: TLS_CRT },
    },
    Operation {
        name: "copy-tls.key",
        annotation: annotation_key!("secret-copy-tls.key"),
        transform: TransformSpec::CopyKey { source: TLS_KEY },
    },
    Operation {
        name: "copy-keystore.jks",
        annotation: annotation_key!("secret-copy-keystore.jks"),
        transform: TransformSpec::CopyKey { source: KEYSTORE_JKS },
    },
    Operation {
        name: "copy-truststore.jks",
        annotation: annotation_key!("secret-copy-truststore.jks"),
        transform: TransformSpec::CopyKey {
            source: TRUSTSTORE_JKS,
        },
    },
    Operation {
        name: "copy-keystore.p12",
        annotation: annotation_key!("secret-copy-keystore.p12"),
        transform: TransformSpec::CopyKey { source: KEYSTORE_P12 },
    },
    Operation {
        name: "copy-truststore.p12",
        annotation: annotation_key!("secret-copy-truststore.p12"),
        transform: TransformSpec::CopyKey {
            source: TRUSTSTORE_P12,
        },
    },
];
