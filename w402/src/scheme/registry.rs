//! Registry of signer capabilities keyed by network family.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use super::SchemeSigner;
use crate::chain::NetworkFamily;
use crate::error::{CredentialError, UnsupportedSchemeError};

/// Maps each [`NetworkFamily`] to at most one [`SchemeSigner`].
///
/// Built once at startup, then shared read-only through an [`Arc`]
/// obtained from [`SchemeRegistry::into_shared`].
#[derive(Default)]
pub struct SchemeRegistry(HashMap<NetworkFamily, Arc<dyn SchemeSigner>>);

impl Debug for SchemeRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let families: Vec<String> = self.families().iter().map(ToString::to_string).collect();
        f.debug_tuple("SchemeRegistry").field(&families).finish()
    }
}

impl SchemeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Registers a signer under its own family, replacing any previous one.
    pub fn register<S: SchemeSigner + 'static>(&mut self, signer: S) {
        self.register_shared(Arc::new(signer));
    }

    /// Registers an already shared signer under its own family.
    pub fn register_shared(&mut self, signer: Arc<dyn SchemeSigner>) {
        let family = signer.family();
        #[cfg(feature = "telemetry")]
        tracing::debug!(%family, address = %signer.address(), "Registered signer");
        self.0.insert(family, signer);
    }

    /// Builder-style variant of [`SchemeRegistry::register`].
    #[must_use]
    pub fn with<S: SchemeSigner + 'static>(mut self, signer: S) -> Self {
        self.register(signer);
        self
    }

    /// Returns the signer registered for `family`.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedSchemeError`] if no signer serves `family`.
    pub fn resolve(
        &self,
        family: NetworkFamily,
    ) -> Result<&Arc<dyn SchemeSigner>, UnsupportedSchemeError> {
        self.0.get(&family).ok_or_else(|| UnsupportedSchemeError {
            offered: vec![family.to_string()],
        })
    }

    /// Returns `true` if a signer serves `family`.
    #[must_use]
    pub fn contains(&self, family: NetworkFamily) -> bool {
        self.0.contains_key(&family)
    }

    /// Returns the registered families in a stable order.
    #[must_use]
    pub fn families(&self) -> Vec<NetworkFamily> {
        let mut families: Vec<NetworkFamily> = self.0.keys().copied().collect();
        families.sort_unstable();
        families
    }

    /// Returns the number of registered signers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no signer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Freezes the registry for sharing.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Missing`] if the registry is empty: a client
    /// with nothing to pay with cannot answer any challenge.
    pub fn into_shared(self) -> Result<Arc<Self>, CredentialError> {
        if self.is_empty() {
            return Err(CredentialError::Missing);
        }
        Ok(Arc::new(self))
    }
}
