//! Tiered clinical flag selection.
//!
//! Each tier is gated independently: a draw against the tier's probability decides
//! whether the tier contributes at all, then a count is sampled and that many distinct
//! flags are drawn from the tier's pool. Detail templates get one freshly generated
//! relative date per slot.

use crate::catalog::{FlagPools, FlagTemplate};
use crate::dates::RelativeDate;
use crate::error::IntakeResult;
use crate::rng::{draw, sample_distinct};
use crate::template::fill_template;
use chrono::NaiveDateTime;
use intake_types::Probability;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flag priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagTier {
    Routine,
    Elevated,
    Critical,
}

impl FlagTier {
    /// Render order, highest priority first.
    pub const BY_PRIORITY: [FlagTier; 3] = [FlagTier::Critical, FlagTier::Elevated, FlagTier::Routine];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagTier::Routine => "routine",
            FlagTier::Elevated => "elevated",
            FlagTier::Critical => "critical",
        }
    }

    /// Uppercase label used in documents.
    pub fn heading(&self) -> &'static str {
        match self {
            FlagTier::Routine => "ROUTINE",
            FlagTier::Elevated => "ELEVATED",
            FlagTier::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for FlagTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tier inclusion probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlagTierOdds {
    pub routine: Probability,
    pub elevated: Probability,
    pub critical: Probability,
}

impl FlagTierOdds {
    pub fn for_tier(&self, tier: FlagTier) -> Probability {
        match tier {
            FlagTier::Routine => self.routine,
            FlagTier::Elevated => self.elevated,
            FlagTier::Critical => self.critical,
        }
    }
}

impl Default for FlagTierOdds {
    fn default() -> Self {
        Self {
            routine: Probability::ALWAYS,
            elevated: Probability::percent(60),
            critical: Probability::percent(15),
        }
    }
}

/// A selected flag with its template filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalFlag {
    pub tier: FlagTier,
    pub name: String,
    pub detail: String,
    /// One per template slot, in slot order
    pub dates: Vec<RelativeDate>,
}

/// All selected flags, grouped by tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClinicalFlags {
    pub critical: Vec<ClinicalFlag>,
    pub elevated: Vec<ClinicalFlag>,
    pub routine: Vec<ClinicalFlag>,
}

impl ClinicalFlags {
    pub fn tier(&self, tier: FlagTier) -> &[ClinicalFlag] {
        match tier {
            FlagTier::Routine => &self.routine,
            FlagTier::Elevated => &self.elevated,
            FlagTier::Critical => &self.critical,
        }
    }

    fn tier_mut(&mut self, tier: FlagTier) -> &mut Vec<ClinicalFlag> {
        match tier {
            FlagTier::Routine => &mut self.routine,
            FlagTier::Elevated => &mut self.elevated,
            FlagTier::Critical => &mut self.critical,
        }
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.elevated.len() + self.routine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flags in render order: critical, then elevated, then routine.
    pub fn by_priority(&self) -> impl Iterator<Item = &ClinicalFlag> {
        FlagTier::BY_PRIORITY
            .into_iter()
            .flat_map(move |tier| self.tier(tier).iter())
    }
}

/// Samples clinical flags from the catalog's tier pools.
pub struct FlagSelector<'a> {
    pools: &'a FlagPools,
    odds: FlagTierOdds,
}

impl<'a> FlagSelector<'a> {
    pub fn new(pools: &'a FlagPools, odds: FlagTierOdds) -> Self {
        Self { pools, odds }
    }

    /// Selects flags for every tier.
    ///
    /// # Errors
    ///
    /// Returns `SamplingExhaustion` or `TemplateSlotMismatch` for an unvalidated catalog.
    pub fn select<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: NaiveDateTime,
    ) -> IntakeResult<ClinicalFlags> {
        let mut flags = ClinicalFlags::default();
        for tier in [FlagTier::Routine, FlagTier::Elevated, FlagTier::Critical] {
            if !draw(rng, self.odds.for_tier(tier)) {
                continue;
            }
            let pool = self.pools.tier(tier);
            let count = pool.count.sample(rng);
            let pool_name = format!("{tier} flags");
            for template in sample_distinct(rng, &pool.entries, count, &pool_name)? {
                flags
                    .tier_mut(tier)
                    .push(instantiate(rng, now, tier, &template)?);
            }
        }
        tracing::debug!(
            critical = flags.critical.len(),
            elevated = flags.elevated.len(),
            routine = flags.routine.len(),
            "selected clinical flags"
        );
        Ok(flags)
    }
}

/// Fills a template with one independently generated date per slot.
fn instantiate<R: Rng + ?Sized>(
    rng: &mut R,
    now: NaiveDateTime,
    tier: FlagTier,
    template: &FlagTemplate,
) -> IntakeResult<ClinicalFlag> {
    let dates: Vec<RelativeDate> = template
        .dates
        .iter()
        .map(|range| RelativeDate::from_offset(now, range.sample(rng)))
        .collect();
    let labels: Vec<String> = dates.iter().map(|d| d.label.clone()).collect();
    let detail = fill_template(&template.name, &template.detail, &labels)?;
    Ok(ClinicalFlag {
        tier,
        name: template.name.clone(),
        detail,
        dates,
    })
}
