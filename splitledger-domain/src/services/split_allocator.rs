use crate::model::{Money, ParticipantId, SplitRecord};
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use thiserror::Error;

/// How sub-minor-unit remainder is absorbed when shares do not divide evenly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// Adjust the last share so the shares sum exactly to the total.
    #[default]
    TailAdjust,
    /// Spread the remainder one minor unit at a time over the first shares.
    FrontLoad,
}

/// How one expense total is divided among participants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitSpec {
    /// Equal share per participant.
    Even,
    /// Percentage of the total per participant; must cover 100% within 0.1.
    Percentages(Vec<(ParticipantId, Decimal)>),
    /// Caller-provided exact amounts; must sum to the total.
    Exact(Vec<(ParticipantId, Money)>),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("cannot split an expense across zero participants")]
    NoParticipants,
    #[error("split total must be positive (got {0})")]
    NonPositiveTotal(Money),
    #[error("percentages sum to {allocated} instead of 100")]
    PercentagesDoNotCover { allocated: Decimal },
    #[error("percentage for participant {participant} is negative ({percentage})")]
    NegativePercentage {
        participant: ParticipantId,
        percentage: Decimal,
    },
    #[error("exact shares sum to {allocated} instead of {total}")]
    ExactSharesMismatch { allocated: Money, total: Money },
    #[error("amount {0} exceeds the representable minor-unit range")]
    AmountOutOfRange(Money),
}

/// Materializes split records whose amounts sum exactly to the expense total.
pub struct SplitAllocator {
    scale: u32,
    remainder_policy: RemainderPolicy,
}

impl Default for SplitAllocator {
    fn default() -> Self {
        Self::new(2, RemainderPolicy::TailAdjust)
    }
}

impl SplitAllocator {
    pub fn new(scale: u32, remainder_policy: RemainderPolicy) -> Self {
        Self {
            scale,
            remainder_policy,
        }
    }

    /// Divides `total` among `participants` according to `spec`.
    ///
    /// Accepted allocations sum exactly to `total` after minor-unit rounding,
    /// so the downstream zero-sum invariant holds without tolerance games.
    pub fn allocate(
        &self,
        total: Money,
        participants: &[ParticipantId],
        spec: &SplitSpec,
    ) -> Result<Vec<SplitRecord>, SplitError> {
        if total <= Money::ZERO {
            return Err(SplitError::NonPositiveTotal(total));
        }
        let total = total.round_to(self.scale);

        match spec {
            SplitSpec::Even => self.allocate_even(total, participants),
            SplitSpec::Percentages(percentages) => self.allocate_percentages(total, percentages),
            SplitSpec::Exact(shares) => self.allocate_exact(total, shares),
        }
    }

    fn allocate_even(
        &self,
        total: Money,
        participants: &[ParticipantId],
    ) -> Result<Vec<SplitRecord>, SplitError> {
        if participants.is_empty() {
            return Err(SplitError::NoParticipants);
        }

        match self.remainder_policy {
            RemainderPolicy::FrontLoad => {
                let units = self.atomic_units(total)?;
                let count = participants.len() as i64;
                let base = units / count;
                let remainder = (units % count) as usize;

                Ok(participants
                    .iter()
                    .enumerate()
                    .map(|(idx, &participant)| {
                        let share_units = if idx < remainder { base + 1 } else { base };
                        SplitRecord {
                            participant,
                            amount: Money::new(share_units, self.scale),
                        }
                    })
                    .collect())
            }
            RemainderPolicy::TailAdjust => {
                let share = Money::from_decimal(
                    total.as_decimal() / Decimal::from(participants.len() as u64),
                )
                .round_to(self.scale);
                let mut shares: Vec<SplitRecord> = participants
                    .iter()
                    .map(|&participant| SplitRecord {
                        participant,
                        amount: share,
                    })
                    .collect();
                self.absorb_remainder(&mut shares, total)?;
                Ok(shares)
            }
        }
    }

    fn allocate_percentages(
        &self,
        total: Money,
        percentages: &[(ParticipantId, Decimal)],
    ) -> Result<Vec<SplitRecord>, SplitError> {
        if percentages.is_empty() {
            return Err(SplitError::NoParticipants);
        }

        // Percentages come from form input; normalize to one decimal place
        // before validating coverage.
        let normalized: Vec<(ParticipantId, Decimal)> = percentages
            .iter()
            .map(|&(participant, percentage)| {
                (
                    participant,
                    percentage
                        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
                )
            })
            .collect();

        for &(participant, percentage) in &normalized {
            if percentage < Decimal::ZERO {
                return Err(SplitError::NegativePercentage {
                    participant,
                    percentage,
                });
            }
        }

        let allocated: Decimal = normalized.iter().map(|(_, percentage)| *percentage).sum();
        if (allocated - Decimal::from(100)).abs() >= Decimal::new(1, 1) {
            return Err(SplitError::PercentagesDoNotCover { allocated });
        }

        let mut shares: Vec<SplitRecord> = normalized
            .iter()
            .map(|&(participant, percentage)| SplitRecord {
                participant,
                amount: Money::from_decimal(
                    percentage * total.as_decimal() / Decimal::from(100),
                )
                .round_to(self.scale),
            })
            .collect();
        self.absorb_remainder(&mut shares, total)?;
        Ok(shares)
    }

    fn allocate_exact(
        &self,
        total: Money,
        shares: &[(ParticipantId, Money)],
    ) -> Result<Vec<SplitRecord>, SplitError> {
        if shares.is_empty() {
            return Err(SplitError::NoParticipants);
        }

        let records: Vec<SplitRecord> = shares
            .iter()
            .map(|&(participant, amount)| SplitRecord {
                participant,
                amount: amount.round_to(self.scale),
            })
            .collect();

        let allocated: Money = records.iter().map(|record| record.amount).sum();
        if allocated != total {
            return Err(SplitError::ExactSharesMismatch { allocated, total });
        }
        Ok(records)
    }

    /// Folds the difference between `total` and the current share sum back
    /// into the shares so the allocation is exact.
    fn absorb_remainder(
        &self,
        shares: &mut [SplitRecord],
        total: Money,
    ) -> Result<(), SplitError> {
        let allocated: Money = shares.iter().map(|record| record.amount).sum();
        let diff = total - allocated;
        if diff.is_zero() {
            return Ok(());
        }

        match self.remainder_policy {
            RemainderPolicy::TailAdjust => {
                if let Some(last) = shares.last_mut() {
                    last.amount += diff;
                }
            }
            RemainderPolicy::FrontLoad => {
                let unit = Money::from_decimal(Decimal::new(1, self.scale));
                let step = if diff > Money::ZERO { unit } else { -unit };
                let steps = self.atomic_units(diff.abs())?;
                if steps as usize > shares.len() {
                    // Remainder larger than one unit per share; fall back to a
                    // single tail adjustment to keep the sum exact.
                    if let Some(last) = shares.last_mut() {
                        last.amount += diff;
                    }
                } else {
                    for record in shares.iter_mut().take(steps as usize) {
                        record.amount += step;
                    }
                }
            }
        }
        Ok(())
    }

    fn atomic_units(&self, amount: Money) -> Result<i64, SplitError> {
        let factor = 10_i64
            .checked_pow(self.scale)
            .ok_or(SplitError::AmountOutOfRange(amount))?;
        (amount.round_to(self.scale).as_decimal() * Decimal::from(factor))
            .to_i64()
            .ok_or(SplitError::AmountOutOfRange(amount))
    }
}
