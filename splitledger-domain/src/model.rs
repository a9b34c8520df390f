use std::{
    collections::BTreeMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use rust_decimal::{Decimal, RoundingStrategy};
use smol_str::SmolStr;

/// Opaque participant handle. Identity is owned by the membership collaborator;
/// the engine only keys balances by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed currency amount backed by [`Decimal`].
///
/// Used as a balance, positive means the participant is owed money and
/// negative means they owe money.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// `amount` scaled down by `10^scale`, e.g. `Money::new(1234, 2)` is 12.34.
    pub fn new(amount: i64, scale: u32) -> Self {
        Self(Decimal::new(amount, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Rounds half away from zero to `scale` decimal places.
    pub fn round_to(self, scale: u32) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Balance table for one computation.
///
/// A `BTreeMap` keyed by [`ParticipantId`] keeps iteration order stable, which
/// makes the greedy matcher's tie-breaks deterministic for identical input.
pub type ParticipantBalances = BTreeMap<ParticipantId, Money>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: SmolStr,
}

impl Participant {
    pub fn new(id: u64, display_name: impl Into<SmolStr>) -> Self {
        Self {
            id: ParticipantId(id),
            display_name: display_name.into(),
        }
    }
}

/// The portion of one expense attributed to one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitRecord {
    pub participant: ParticipantId,
    pub amount: Money,
}

/// One recorded expense as handed over by the storage collaborator.
///
/// The optional fields mirror the loosely validated source records: payer,
/// amount, and the split list can each be absent. The aggregator skips such
/// records and counts them as data-quality warnings instead of failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub description: SmolStr,
    pub payer: Option<ParticipantId>,
    pub amount: Option<Money>,
    pub splits: Option<Vec<SplitRecord>>,
}

impl ExpenseRecord {
    /// Well-formed record with every field present.
    pub fn new(
        description: impl Into<SmolStr>,
        payer: ParticipantId,
        amount: Money,
        splits: Vec<SplitRecord>,
    ) -> Self {
        Self {
            description: description.into(),
            payer: Some(payer),
            amount: Some(amount),
            splits: Some(splits),
        }
    }
}

/// An instruction for `from` to pay `to`. Output-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

/// Counts of records the aggregator dropped instead of failing on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataQuality {
    pub skipped_expenses: usize,
    pub skipped_splits: usize,
}

impl DataQuality {
    pub fn is_clean(self) -> bool {
        self.skipped_expenses == 0 && self.skipped_splits == 0
    }
}

/// Aggregator output: the balance table plus what had to be dropped to get it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aggregation {
    pub balances: ParticipantBalances,
    pub data_quality: DataQuality,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResidualSeverity {
    /// Leftover within rounding noise, nothing to report.
    Negligible,
    /// Leftover large enough to surface as an advisory warning.
    Significant,
}

/// Totals the matcher reconciled, with the leftover it could not place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub total_debt: Money,
    pub total_credit: Money,
    pub residual: Money,
    pub severity: ResidualSeverity,
}

/// Result of one settlement computation.
///
/// Always best-effort: a significant residual produces a warning string, never
/// an error, and the transfer list is still usable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementResult {
    pub transfers: Vec<Transfer>,
    pub total_original_debt: Money,
    pub total_simplified_debt: Money,
    pub reconciliation: ReconciliationReport,
    pub imbalance_warning: Option<String>,
}
