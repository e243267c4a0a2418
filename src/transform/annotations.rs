//! # Annotation Resolution
//!
//! Every operation is requested through an annotation that has a canonical
//! key and zero or more legacy aliases. The project originally used the
//! `cert-manager.io/` namespace for its annotations, which clashed with
//! cert-manager itself, so those keys are still honoured as aliases.
//!
//! Resolution walks the candidate keys in order and returns the first one
//! that is present with a non-empty value.

use crate::transform::operations::OPERATIONS;
use std::collections::BTreeMap;
use std::iter;

/// Annotation map as stored in `ObjectMeta`
pub type Annotations = BTreeMap<String, String>;

/// Physical keys for one logical annotation, canonical key first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationKey {
    pub canonical: &'static str,
    pub legacy: &'static [&'static str],
}

impl AnnotationKey {
    /// Candidate keys in resolution order
    pub fn candidates(&self) -> impl Iterator<Item = &'static str> {
        iter::once(self.canonical).chain(self.legacy.iter().copied())
    }

    /// Resolve this annotation against an object's annotations
    #[must_use]
    pub fn resolve<'a>(&self, annotations: Option<&'a Annotations>) -> Option<ResolvedAnnotation<'a>> {
        resolve(annotations, self.candidates())
    }
}

/// The annotation key that matched and its (non-empty) value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAnnotation<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Return the first candidate key present in `annotations` with a non-empty value.
///
/// Returns `None` when `annotations` is absent, when no candidate is present,
/// or when every present candidate has an empty value.
pub fn resolve<'a, I, K>(annotations: Option<&'a Annotations>, candidates: I) -> Option<ResolvedAnnotation<'a>>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let annotations = annotations?;
    candidates.into_iter().find_map(|candidate| {
        annotations
            .get_key_value(candidate.as_ref())
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| ResolvedAnnotation {
                key: key.as_str(),
                value: value.as_str(),
            })
    })
}

/// Whether a change to an object carrying these annotations is worth queuing.
///
/// True iff any operation's annotation resolves to a non-empty value. This
/// only reduces noise in the watch layer; the reconciler re-resolves
/// everything itself.
#[must_use]
pub fn should_reconcile(annotations: Option<&Annotations>) -> bool {
    OPERATIONS
        .iter()
        .any(|operation| operation.annotation.resolve(annotations).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(pairs: &[(&str, &str)]) -> Annotations {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_returns_first_found_candidate() {
        let annots = annotations(&[("foo", "foo-1"), ("bar", "bar-1"), ("baz", "baz-1")]);
        let resolved = resolve(Some(&annots), ["bar", "foo", "baz"]);
        assert_eq!(
            resolved,
            Some(ResolvedAnnotation {
                key: "bar",
                value: "bar-1"
            })
        );
    }

    #[test]
    fn test_resolve_unknown_key() {
        let annots = annotations(&[("foo", "foo-1"), ("bar", "bar-1")]);
        assert_eq!(resolve(Some(&annots), ["unknown"]), None);
    }

    #[test]
    fn test_resolve_without_annotations() {
        assert_eq!(resolve(None, ["foo", "bar"]), None);
    }

    #[test]
    fn test_resolve_skips_empty_values() {
        let annots = annotations(&[("foo", ""), ("bar", "bar-1")]);
        let resolved = resolve(Some(&annots), ["foo", "bar"]);
        assert_eq!(resolved.map(|r| r.key), Some("bar"));

        let annots = annotations(&[("foo", "")]);
        assert_eq!(resolve(Some(&annots), ["foo"]), None);
    }

    #[test]
    fn test_annotation_key_prefers_canonical_over_legacy() {
        let key = AnnotationKey {
            canonical: "secret-transform/secret-copy-ca.crt",
            legacy: &["cert-manager.io/secret-copy-ca.crt"],
        };
        let annots = annotations(&[
            ("cert-manager.io/secret-copy-ca.crt", "old"),
            ("secret-transform/secret-copy-ca.crt", "new"),
        ]);
        let resolved = key.resolve(Some(&annots));
        assert_eq!(
            resolved,
            Some(ResolvedAnnotation {
                key: "secret-transform/secret-copy-ca.crt",
                value: "new"
            })
        );
    }

    #[test]
    fn test_annotation_key_falls_back_to_legacy() {
        let key = AnnotationKey {
            canonical: "secret-transform/secret-copy-ca.crt",
            legacy: &["cert-manager.io/secret-copy-ca.crt"],
        };
        let annots = annotations(&[("cert-manager.io/secret-copy-ca.crt", "ca")]);
        let resolved = key.resolve(Some(&annots));
        assert_eq!(
            resolved,
            Some(ResolvedAnnotation {
                key: "cert-manager.io/secret-copy-ca.crt",
                value: "ca"
            })
        );
    }

    #[test]
    fn test_should_reconcile_nil_and_empty() {
        assert!(!should_reconcile(None));
        assert!(!should_reconcile(Some(&Annotations::new())));
    }

    #[test]
    fn test_should_reconcile_unrelated_annotation() {
        assert!(!should_reconcile(Some(&annotations(&[("unrelated", "value")]))));
    }

    #[test]
    fn test_should_reconcile_empty_value_is_ignored() {
        assert!(!should_reconcile(Some(&annotations(&[(
            "secret-transform/secret-transform",
            ""
        )]))));
    }

    #[test]
    fn test_should_reconcile_every_operation_canonical_and_legacy() {
        for operation in &OPERATIONS {
            for key in operation.annotation.candidates() {
                assert!(
                    should_reconcile(Some(&annotations(&[(key, "value")]))),
                    "annotation {key} should trigger reconciliation"
                );
            }
        }
    }
}
