use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::app_config::TrustSection;
use crate::core::errors::{KeywardError, Result};
use crate::core::models::certification::{Certification, SOFT_REVOKE_REASON};
use crate::core::models::keyring::provider_domain;
use crate::core::traits::openpgp::{OpenPgpKey, OpenPgpProvider};

/// Provider certificates allowed to override a user's self-revocation,
/// addressed by provider domain.
///
/// Built once and never mutated; share it by reference.
#[derive(Debug, Clone)]
pub struct TrustRegistry<K> {
    by_domain: HashMap<String, Arc<K>>,
}

impl<K: OpenPgpKey> TrustRegistry<K> {
    pub fn empty() -> Self {
        Self {
            by_domain: HashMap::new(),
        }
    }

    pub fn builder() -> TrustRegistryBuilder<K> {
        TrustRegistryBuilder {
            by_domain: HashMap::new(),
        }
    }

    /// Load every `[[trust.certificates]]` entry through the provider.
    ///
    /// Certificate files are resolved relative to `base_dir`.
    pub fn from_config<P>(provider: &P, trust: &TrustSection, base_dir: &Path) -> Result<Self>
    where
        P: OpenPgpProvider<Key = K>,
    {
        let mut builder = Self::builder();
        for entry in &trust.certificates {
            let path = base_dir.join(&entry.file);
            let armored = std::fs::read_to_string(&path).map_err(|e| KeywardError::InvalidConfig {
                detail: format!("Cannot read trust certificate {}: {e}", path.display()),
            })?;
            let key = provider.parse_armored_key(&armored)?;
            builder = builder.certificate(&entry.domains, key);
        }
        Ok(builder.build())
    }

    pub fn get(&self, domain: &str) -> Option<&K> {
        self.by_domain.get(&domain.to_lowercase()).map(Arc::as_ref)
    }

    /// Configured domains, sorted.
    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.by_domain.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }

    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }
}

pub struct TrustRegistryBuilder<K> {
    by_domain: HashMap<String, Arc<K>>,
}

impl<K: OpenPgpKey> TrustRegistryBuilder<K> {
    /// Register one certificate for several domains. Later registrations
    /// for the same domain win.
    pub fn certificate<S: AsRef<str>>(mut self, domains: &[S], key: K) -> Self {
        let key = Arc::new(key);
        for domain in domains {
            self.by_domain
                .insert(domain.as_ref().to_lowercase(), Arc::clone(&key));
        }
        self
    }

    pub fn build(self) -> TrustRegistry<K> {
        TrustRegistry {
            by_domain: self.by_domain,
        }
    }
}

/// Decides whether a provider certificate has soft-revoked a key.
pub struct TrustOverrideEngine<'a, P: OpenPgpProvider> {
    provider: &'a P,
    registry: &'a TrustRegistry<P::Key>,
}

impl<'a, P: OpenPgpProvider> TrustOverrideEngine<'a, P> {
    pub fn new(provider: &'a P, registry: &'a TrustRegistry<P::Key>) -> Self {
        Self { provider, registry }
    }

    /// True when some user ID of `key` carries a soft revocation (reason
    /// 101) from the trust certificate of the keyring's provider domain
    /// that no later certification from the same certificate has healed.
    ///
    /// Never fails: certifications that cannot be verified are ignored.
    pub fn is_key_pseudo_revoked(&self, keyring_id: &str, key: &P::Key) -> bool {
        let Some(trust_key) = self.registry.get(provider_domain(keyring_id)) else {
            return false;
        };

        key.users().iter().any(|user| {
            let Some(user_id) = user.user_id.as_deref() else {
                return false;
            };

            user.revocation_certifications.iter().any(|revocation| {
                revocation.revocation_reason == Some(SOFT_REVOKE_REASON)
                    && self.is_trusted(revocation, user_id, key, trust_key)
                    && !user.other_certifications.iter().any(|cert| {
                        cert.created > revocation.created
                            && self.is_trusted(cert, user_id, key, trust_key)
                    })
            })
        })
    }

    fn is_trusted(
        &self,
        cert: &Certification,
        user_id: &str,
        key: &P::Key,
        trust_key: &P::Key,
    ) -> bool {
        if cert.issuer_key_id != trust_key.key_id() || self.provider.is_expired(cert) {
            return false;
        }

        match self
            .provider
            .verify_certification(cert, user_id, key, trust_key)
        {
            Ok(valid) => valid,
            Err(e) => {
                debug!(issuer = %cert.issuer_key_id, error = %e, "ignoring unverifiable certification");
                false
            }
        }
    }
}
