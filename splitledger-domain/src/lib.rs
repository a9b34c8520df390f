//! Settlement engine core for shared-expense groups.
//!
//! The pipeline is pure and runs in two stages with no feedback between them:
//! the balance aggregator folds raw expense records into signed per-participant
//! balances, and the settlement matcher reduces those balances to point-to-point
//! transfers with a greedy largest-remaining-first pass. A thin reconciliation
//! guard classifies whatever rounding residue is left. No state survives
//! between invocations; callers re-run the pipeline on every snapshot change.

#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Aggregation, DataQuality, ExpenseRecord, Money, Participant, ParticipantBalances,
    ParticipantId, ReconciliationReport, ResidualSeverity, SettlementResult, SplitRecord,
    Transfer,
};
pub use services::{
    BalanceAggregator, ReconciliationGuard, RemainderPolicy, SettlementMatcher, SettlementPolicy,
    SplitAllocator, SplitError, SplitSpec,
};

/// Net balance per participant for one snapshot of expenses.
///
/// Positive means owed money, negative means owing money. Data-quality counts
/// are dropped here; use [`BalanceAggregator::aggregate`] directly to keep
/// them.
pub fn aggregate_balances(
    expenses: &[ExpenseRecord],
    participants: &[Participant],
) -> ParticipantBalances {
    BalanceAggregator.aggregate(expenses, participants).balances
}

/// Greedy settlement of a balance table under the default minor-unit policy.
pub fn compute_settlement(balances: &ParticipantBalances) -> SettlementResult {
    SettlementMatcher::default().settle(balances)
}

/// Convenience composition of [`aggregate_balances`] and [`compute_settlement`].
pub fn simplify_debts(
    expenses: &[ExpenseRecord],
    participants: &[Participant],
) -> SettlementResult {
    compute_settlement(&aggregate_balances(expenses, participants))
}
