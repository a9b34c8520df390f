use crate::model::{
    Aggregation, DataQuality, ExpenseRecord, Money, Participant, ParticipantBalances,
    ParticipantId,
};
use fxhash::FxHashSet;

/// Builds per-participant net balances from raw expense records.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Aggregates `expenses` into a signed balance per participant.
    ///
    /// Every member of `participants` appears in the output zero-initialized,
    /// so an all-settled group is representable explicitly. Ids referenced
    /// only by expenses are inserted on first reference and never filtered;
    /// whether to surface those is the caller's policy.
    ///
    /// Malformed records are skipped and counted, never fatal: an expense
    /// missing its payer, amount, or split list (or with a non-positive
    /// amount) contributes nothing, and a split with a negative amount is
    /// dropped on its own. A split owed by the payer is a self-debt no-op.
    ///
    /// Every accepted split decreases exactly one balance and increases
    /// exactly one other by the same amount, so the sum of all balances stays
    /// at zero regardless of input size.
    pub fn aggregate(&self, expenses: &[ExpenseRecord], participants: &[Participant]) -> Aggregation {
        let mut balances: ParticipantBalances = participants
            .iter()
            .map(|participant| (participant.id, Money::ZERO))
            .collect();
        let known: FxHashSet<ParticipantId> =
            participants.iter().map(|participant| participant.id).collect();
        let mut data_quality = DataQuality::default();

        for expense in expenses {
            let (Some(payer), Some(amount), Some(splits)) =
                (expense.payer, expense.amount, expense.splits.as_ref())
            else {
                tracing::debug!(
                    description = %expense.description,
                    "Skipping expense with missing payer, amount, or splits"
                );
                data_quality.skipped_expenses += 1;
                continue;
            };
            if amount <= Money::ZERO {
                tracing::debug!(
                    description = %expense.description,
                    amount = %amount,
                    "Skipping expense with non-positive amount"
                );
                data_quality.skipped_expenses += 1;
                continue;
            }
            if !known.contains(&payer) {
                tracing::debug!(
                    payer = %payer,
                    description = %expense.description,
                    "Expense payer is not in the membership list"
                );
            }

            for split in splits {
                if split.participant == payer {
                    continue;
                }
                if split.amount < Money::ZERO {
                    tracing::debug!(
                        participant = %split.participant,
                        amount = %split.amount,
                        description = %expense.description,
                        "Skipping split with negative amount"
                    );
                    data_quality.skipped_splits += 1;
                    continue;
                }
                if !known.contains(&split.participant) {
                    tracing::debug!(
                        participant = %split.participant,
                        description = %expense.description,
                        "Split references a participant outside the membership list"
                    );
                }

                *balances.entry(split.participant).or_insert(Money::ZERO) -= split.amount;
                *balances.entry(payer).or_insert(Money::ZERO) += split.amount;
            }
        }

        Aggregation {
            balances,
            data_quality,
        }
    }
}
