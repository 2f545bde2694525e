//! Outcome of a multi-pair rate request.

use crate::error::UpstreamError;

use super::currency::CurrencyCode;
use super::group::RateGroup;
use super::observation::RateResult;

/// How a group was resolved.
#[derive(Debug)]
pub enum GroupStatus {
    /// Served from the cache; nothing fetched or persisted.
    Cached,
    /// Fetched from the upstream provider. May still hold zero usable rates.
    Fetched,
    /// The upstream call failed; the group contributes no results.
    Failed(UpstreamError),
}

impl GroupStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, GroupStatus::Failed(_))
    }
}

/// Per-group part of a [`RatesReport`].
#[derive(Debug)]
pub struct GroupReport {
    pub base: CurrencyCode,
    pub symbols: Vec<CurrencyCode>,
    pub status: GroupStatus,
    /// Number of results this group contributed.
    pub resolved: usize,
}

impl GroupReport {
    pub fn new(group: &RateGroup, status: GroupStatus, resolved: usize) -> Self {
        Self {
            base: group.base,
            symbols: group.symbols(),
            status,
            resolved,
        }
    }
}

/// Flattened results plus one report per requested base currency.
///
/// Results are grouped by base (bases in first-requested order), and ordered
/// by quote code within a base.
#[derive(Debug, Default)]
pub struct RatesReport {
    pub results: Vec<RateResult>,
    pub groups: Vec<GroupReport>,
}

impl RatesReport {
    pub fn push_group(&mut self, report: GroupReport, results: Vec<RateResult>) {
        self.results.extend(results);
        self.groups.push(report);
    }

    pub fn failures(&self) -> impl Iterator<Item = &GroupReport> {
        self.groups.iter().filter(|g| g.status.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
