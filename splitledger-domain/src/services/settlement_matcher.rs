use std::collections::VecDeque;

use crate::{
    model::{Money, ParticipantBalances, ParticipantId, SettlementResult, Transfer},
    services::reconciliation::{ReconciliationGuard, SettlementPolicy},
};

struct PartyShare {
    id: ParticipantId,
    remaining: Money,
}

/// Greedy largest-remaining-first debt matcher.
///
/// Repeatedly pairs the largest debtor with the largest creditor until one
/// side is exhausted. The transfer count is bounded by
/// `debtors + creditors - 1` but not guaranteed minimal; finding the true
/// minimum is a subset-matching problem this engine does not attempt.
#[derive(Default)]
pub struct SettlementMatcher {
    policy: SettlementPolicy,
}

impl SettlementMatcher {
    pub fn new(policy: SettlementPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SettlementPolicy {
        &self.policy
    }

    /// Reduces a balance table to point-to-point transfers.
    ///
    /// Balances are first rounded to the policy scale; rounded magnitudes
    /// within epsilon count as settled and are excluded up front. Equal
    /// amounts keep the balance-table iteration order, which is deterministic
    /// for identical input but not contractual.
    ///
    /// Never fails: leftover remainder from compounded rounding is summed and
    /// classified by the reconciliation guard, and the best-effort transfer
    /// list is returned either way.
    pub fn settle(&self, balances: &ParticipantBalances) -> SettlementResult {
        let policy = &self.policy;
        let mut debtors: Vec<PartyShare> = Vec::new();
        let mut creditors: Vec<PartyShare> = Vec::new();

        for (&id, &balance) in balances {
            let rounded = balance.round_to(policy.scale);
            if rounded < -policy.epsilon {
                debtors.push(PartyShare {
                    id,
                    remaining: rounded.abs(),
                });
            } else if rounded > policy.epsilon {
                creditors.push(PartyShare {
                    id,
                    remaining: rounded,
                });
            }
        }

        // Stable descending sort keeps tie order deterministic.
        debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

        let total_original_debt: Money = debtors.iter().map(|party| party.remaining).sum();
        let total_credit: Money = creditors.iter().map(|party| party.remaining).sum();

        tracing::debug!(
            member_count = balances.len(),
            debtor_count = debtors.len(),
            creditor_count = creditors.len(),
            total_debt = %total_original_debt,
            total_credit = %total_credit,
            "Settlement matching started"
        );

        let mut debtors: VecDeque<PartyShare> = debtors.into();
        let mut creditors: VecDeque<PartyShare> = creditors.into();
        let mut transfers: Vec<Transfer> = Vec::new();

        loop {
            let Some(debtor) = debtors.front_mut() else {
                break;
            };
            let Some(creditor) = creditors.front_mut() else {
                break;
            };

            let payment = debtor.remaining.min(creditor.remaining);
            let rounded = payment.round_to(policy.scale);
            if rounded > policy.epsilon {
                transfers.push(Transfer {
                    from: debtor.id,
                    to: creditor.id,
                    amount: rounded,
                });
            }

            // Decrement by the unrounded payment so the rounding delta is
            // never double-counted across iterations.
            debtor.remaining -= payment;
            creditor.remaining -= payment;

            let debtor_done = debtor.remaining < policy.epsilon;
            let creditor_done = creditor.remaining < policy.epsilon;
            if debtor_done {
                debtors.pop_front();
            }
            if creditor_done {
                creditors.pop_front();
            }
        }

        let residual: Money = debtors
            .iter()
            .chain(creditors.iter())
            .filter(|party| party.remaining > policy.epsilon)
            .map(|party| party.remaining)
            .sum();
        let total_simplified_debt: Money = transfers.iter().map(|transfer| transfer.amount).sum();

        let (reconciliation, imbalance_warning) =
            ReconciliationGuard::report(total_original_debt, total_credit, residual, policy);

        tracing::debug!(
            transfer_count = transfers.len(),
            total_simplified = %total_simplified_debt,
            residual = %residual,
            "Settlement matching finished"
        );

        SettlementResult {
            transfers,
            total_original_debt,
            total_simplified_debt,
            reconciliation,
            imbalance_warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResidualSeverity;
    use rstest::{fixture, rstest};

    #[fixture]
    fn matcher() -> SettlementMatcher {
        SettlementMatcher::default()
    }

    fn balances(entries: &[(u64, i64)]) -> ParticipantBalances {
        entries
            .iter()
            .map(|(id, cents)| (ParticipantId(*id), Money::new(*cents, 2)))
            .collect()
    }

    fn transfer(from: u64, to: u64, cents: i64) -> Transfer {
        Transfer {
            from: ParticipantId(from),
            to: ParticipantId(to),
            amount: Money::new(cents, 2),
        }
    }

    #[rstest]
    #[case::single_pair(
        &[(1, 2500), (2, -2500)],
        vec![transfer(2, 1, 2500)]
    )]
    #[case::triangle(
        &[(1, 2000), (2, -1000), (3, -1000)],
        vec![transfer(2, 1, 1000), transfer(3, 1, 1000)]
    )]
    #[case::largest_first(
        &[(1, 500), (2, 1500), (3, -2000)],
        vec![transfer(3, 2, 1500), transfer(3, 1, 500)]
    )]
    #[case::split_credit(
        &[(1, 3000), (2, -1800), (3, -1200)],
        vec![transfer(2, 1, 1800), transfer(3, 1, 1200)]
    )]
    #[case::all_settled(&[(1, 0), (2, 0)], vec![])]
    #[case::sub_epsilon_noise(&[(1, 1), (2, -1)], vec![])]
    fn greedy_matching_cases(
        matcher: SettlementMatcher,
        #[case] entries: &[(u64, i64)],
        #[case] expected: Vec<Transfer>,
    ) {
        let result = matcher.settle(&balances(entries));

        assert_eq!(result.transfers, expected);
        assert_eq!(result.imbalance_warning, None);
    }

    #[rstest]
    fn empty_balance_table_settles_to_nothing(matcher: SettlementMatcher) {
        let result = matcher.settle(&ParticipantBalances::new());

        assert!(result.transfers.is_empty());
        assert_eq!(result.total_original_debt, Money::ZERO);
        assert_eq!(result.total_simplified_debt, Money::ZERO);
        assert_eq!(result.imbalance_warning, None);
    }

    #[rstest]
    fn totals_reconcile_for_clean_input(matcher: SettlementMatcher) {
        let result = matcher.settle(&balances(&[(1, 2000), (2, -1000), (3, -1000)]));

        assert_eq!(result.total_original_debt, Money::from_i64(20));
        assert_eq!(result.total_simplified_debt, Money::from_i64(20));
        assert_eq!(result.reconciliation.total_credit, Money::from_i64(20));
        assert_eq!(result.reconciliation.residual, Money::ZERO);
        assert_eq!(result.reconciliation.severity, ResidualSeverity::Negligible);
    }

    #[rstest]
    fn unmatched_debt_surfaces_as_warning(matcher: SettlementMatcher) {
        // No creditor exists, so the whole debt is residual.
        let result = matcher.settle(&balances(&[(1, -500)]));

        assert!(result.transfers.is_empty());
        assert_eq!(result.reconciliation.residual, Money::from_i64(5));
        assert_eq!(
            result.reconciliation.severity,
            ResidualSeverity::Significant
        );
        assert!(result.imbalance_warning.is_some());
    }

    #[rstest]
    fn small_unmatched_remainder_stays_silent(matcher: SettlementMatcher) {
        // Residual of 0.05 is above epsilon but below significance.
        let result = matcher.settle(&balances(&[(1, 1000), (2, -1005)]));

        assert_eq!(result.transfers, vec![transfer(2, 1, 1000)]);
        assert_eq!(result.reconciliation.residual, Money::new(5, 2));
        assert_eq!(result.imbalance_warning, None);
    }

    #[rstest]
    fn settle_is_deterministic(matcher: SettlementMatcher) {
        let table = balances(&[(1, 1000), (2, 1000), (3, -700), (4, -700), (5, -600)]);

        let first = matcher.settle(&table);
        let second = matcher.settle(&table);

        assert_eq!(first, second);
    }

    #[rstest]
    fn transfer_count_stays_within_bound(matcher: SettlementMatcher) {
        let table = balances(&[
            (1, 1100),
            (2, 900),
            (3, 500),
            (4, -800),
            (5, -800),
            (6, -900),
        ]);

        let result = matcher.settle(&table);

        // 3 debtors + 3 creditors can need at most 5 transfers.
        assert!(result.transfers.len() <= 5);
        let settled: Money = result.transfers.iter().map(|t| t.amount).sum();
        assert_eq!(settled, Money::from_i64(25));
    }

    #[test]
    fn coarser_scale_policy_reuses_same_algorithm() {
        let matcher = SettlementMatcher::new(SettlementPolicy::minor_unit(0));
        let table = balances(&[(1, 30000), (2, -10000), (3, -20000)]);

        let result = matcher.settle(&table);

        assert_eq!(
            result.transfers,
            vec![transfer(3, 1, 20000), transfer(2, 1, 10000)]
        );
    }
}
