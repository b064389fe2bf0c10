//! Strategies for choosing among matching payment options.

use alloy_primitives::U256;

use super::PaymentOption;
use crate::chain::NetworkFamily;

/// Chooses one option among the candidates a registered signer can serve.
///
/// Candidates arrive in challenge order. Returning `None` rejects them all.
pub trait PaymentSelector: Send + Sync {
    /// Selects a payment option from the candidates.
    fn select<'a>(&self, candidates: &[&'a PaymentOption]) -> Option<&'a PaymentOption>;
}

/// Selector that returns the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl PaymentSelector for FirstMatch {
    fn select<'a>(&self, candidates: &[&'a PaymentOption]) -> Option<&'a PaymentOption> {
        candidates.first().copied()
    }
}

/// Selector that prefers one family, falling back to the first candidate.
#[derive(Debug, Clone, Copy)]
pub struct PreferFamily(pub NetworkFamily);

impl PaymentSelector for PreferFamily {
    fn select<'a>(&self, candidates: &[&'a PaymentOption]) -> Option<&'a PaymentOption> {
        candidates
            .iter()
            .find(|c| c.family() == Some(self.0))
            .or_else(|| candidates.first())
            .copied()
    }
}

/// Selector that only accepts payments up to a maximum amount.
///
/// Wraps another selector, which picks among the candidates under the cap.
/// Options whose amount cannot be parsed are rejected.
#[derive(Debug, Clone, Copy)]
pub struct MaxAmount<S = FirstMatch> {
    /// Largest acceptable amount, in atomic units.
    pub cap: U256,
    /// Selector applied to the candidates within the cap.
    pub inner: S,
}

impl MaxAmount {
    /// Creates a cap that picks the first affordable candidate.
    #[must_use]
    pub const fn new(cap: U256) -> Self {
        Self {
            cap,
            inner: FirstMatch,
        }
    }
}

impl<S: PaymentSelector> PaymentSelector for MaxAmount<S> {
    fn select<'a>(&self, candidates: &[&'a PaymentOption]) -> Option<&'a PaymentOption> {
        let affordable: Vec<&'a PaymentOption> = candidates
            .iter()
            .copied()
            .filter(|c| c.amount_value().is_some_and(|amount| amount <= self.cap))
            .collect();
        self.inner.select(&affordable)
    }
}

impl<S: PaymentSelector + ?Sized> PaymentSelector for Box<S> {
    fn select<'a>(&self, candidates: &[&'a PaymentOption]) -> Option<&'a PaymentOption> {
        (**self).select(candidates)
    }
}
