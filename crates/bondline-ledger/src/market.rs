// crates/bondline-ledger/src/market.rs
//
// The two share markets a ledger can be instantiated for.
//
//   - Content: whole shares keyed by (creator, content key), quadratic price.
//   - Creator: fixed-point equity keyed by creator account, cubic price.
//
// In both markets the creator owns the subject and collects the subject fee.

use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use bondline_core::{AccountId, ContentSubject};
use bondline_curve::{BondingCurve, CubicCurve, QuadraticCurve};

/// Binds a subject type to a pricing curve.
pub trait Market: fmt::Debug + Send + Sync + 'static {
    type Subject: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display + Serialize + Send + Sync;
    type Curve: BondingCurve;

    /// Short market name used in logs and reports.
    const NAME: &'static str;

    /// Account that receives subject fees and is bound by last-share
    /// protection.
    fn subject_owner(subject: &Self::Subject) -> AccountId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentMarket;

impl Market for ContentMarket {
    type Subject = ContentSubject;
    type Curve = QuadraticCurve;

    const NAME: &'static str = "content";

    fn subject_owner(subject: &ContentSubject) -> AccountId {
        subject.creator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatorMarket;

impl Market for CreatorMarket {
    type Subject = AccountId;
    type Curve = CubicCurve;

    const NAME: &'static str = "creator";

    fn subject_owner(subject: &AccountId) -> AccountId {
        *subject
    }
}
