use crate::{error::EngineError, ports::SnapshotSource};
use smol_str::SmolStr;
use splitledger_domain::{
    BalanceAggregator, DataQuality, ExpenseRecord, Money, Participant, ParticipantId,
    SettlementMatcher, SettlementPolicy, SettlementResult, SplitAllocator, SplitSpec,
};

/// Report handed back to the rendering layer after one recomputation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineReport {
    pub settlement: SettlementResult,
    pub data_quality: DataQuality,
}

/// Stateless settlement engine facade.
///
/// Holds only threshold configuration. Every [`recompute`](Self::recompute)
/// starts from the caller's snapshot and returns an owned report, so a
/// reactive caller can fire a recomputation on every data change and simply
/// discard superseded results; the latest snapshot always wins.
pub struct SettlementEngine {
    aggregator: BalanceAggregator,
    matcher: SettlementMatcher,
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(SettlementPolicy::default())
    }
}

impl SettlementEngine {
    pub fn new(policy: SettlementPolicy) -> Self {
        Self {
            aggregator: BalanceAggregator,
            matcher: SettlementMatcher::new(policy),
        }
    }

    /// Runs the full aggregate-then-match pipeline over one snapshot.
    pub fn recompute(
        &self,
        expenses: &[ExpenseRecord],
        participants: &[Participant],
    ) -> EngineReport {
        let aggregation = self.aggregator.aggregate(expenses, participants);
        let settlement = self.matcher.settle(&aggregation.balances);

        tracing::info!(
            expense_count = expenses.len(),
            participant_count = participants.len(),
            transfer_count = settlement.transfers.len(),
            skipped_expenses = aggregation.data_quality.skipped_expenses,
            skipped_splits = aggregation.data_quality.skipped_splits,
            "Settlement recomputed"
        );

        EngineReport {
            settlement,
            data_quality: aggregation.data_quality,
        }
    }

    pub fn recompute_from_source(&self, source: &dyn SnapshotSource) -> EngineReport {
        let expenses = source.expenses();
        let participants = source.participants();
        self.recompute(&expenses, &participants)
    }
}

/// Expense under construction, before splits are materialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub description: SmolStr,
    pub payer: ParticipantId,
    pub amount: Money,
    pub split: SplitSpec,
}

impl ExpenseDraft {
    /// Materializes the draft into a well-formed expense record.
    ///
    /// The splits are allocated over the whole group, so they sum exactly to
    /// the draft amount; validation failures are user input, never fatal to
    /// the engine.
    pub fn build(
        &self,
        participants: &[Participant],
        allocator: &SplitAllocator,
    ) -> Result<ExpenseRecord, EngineError> {
        if !participants
            .iter()
            .any(|participant| participant.id == self.payer)
        {
            return Err(EngineError::UnknownPayer { payer: self.payer });
        }

        let ids: Vec<ParticipantId> = participants
            .iter()
            .map(|participant| participant.id)
            .collect();
        let splits = allocator.allocate(self.amount, &ids, &self.split)?;

        Ok(ExpenseRecord::new(
            self.description.clone(),
            self.payer,
            self.amount,
            splits,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use splitledger_domain::SplitError;

    #[fixture]
    fn engine() -> SettlementEngine {
        SettlementEngine::default()
    }

    fn members(ids: &[u64]) -> Vec<Participant> {
        ids.iter()
            .map(|id| Participant::new(*id, format!("member-{id}")))
            .collect()
    }

    #[rstest]
    fn drafted_expense_feeds_straight_into_recompute(engine: SettlementEngine) {
        let participants = members(&[1, 2, 3]);
        let draft = ExpenseDraft {
            description: "dinner".into(),
            payer: ParticipantId(1),
            amount: Money::from_i64(30),
            split: SplitSpec::Even,
        };

        let expense = draft
            .build(&participants, &SplitAllocator::default())
            .expect("draft should build");
        let report = engine.recompute(&[expense], &participants);

        assert_eq!(report.settlement.transfers.len(), 2);
        assert!(report.data_quality.is_clean());
        assert_eq!(report.settlement.total_original_debt, Money::from_i64(20));
    }

    #[test]
    fn unknown_payer_is_rejected() {
        let participants = members(&[1, 2]);
        let draft = ExpenseDraft {
            description: "taxi".into(),
            payer: ParticipantId(9),
            amount: Money::from_i64(8),
            split: SplitSpec::Even,
        };

        let err = draft
            .build(&participants, &SplitAllocator::default())
            .expect_err("unknown payer must be rejected");
        assert_eq!(
            err,
            EngineError::UnknownPayer {
                payer: ParticipantId(9)
            }
        );
    }

    #[test]
    fn allocator_errors_propagate_from_draft() {
        let participants = members(&[1]);
        let draft = ExpenseDraft {
            description: "nothing".into(),
            payer: ParticipantId(1),
            amount: Money::ZERO,
            split: SplitSpec::Even,
        };

        let err = draft
            .build(&participants, &SplitAllocator::default())
            .expect_err("zero amount must be rejected");
        assert_eq!(
            err,
            EngineError::Split(SplitError::NonPositiveTotal(Money::ZERO))
        );
    }

    #[rstest]
    fn recompute_reports_data_quality(engine: SettlementEngine) {
        let participants = members(&[1, 2]);
        let broken = ExpenseRecord {
            description: "broken".into(),
            payer: None,
            amount: Some(Money::from_i64(10)),
            splits: Some(vec![]),
        };

        let report = engine.recompute(&[broken], &participants);

        assert_eq!(report.data_quality.skipped_expenses, 1);
        assert!(report.settlement.transfers.is_empty());
    }
}
