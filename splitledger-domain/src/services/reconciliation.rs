use crate::model::{Money, ReconciliationReport, ResidualSeverity};
use rust_decimal::Decimal;

/// Threshold configuration for the settlement pipeline.
///
/// The thresholds are tunable rather than hard-coded policy. `Default` is the
/// two-decimal minor-unit configuration: two decimal places, rounded
/// balances within 0.01 treated as exactly settled, residuals above 0.10
/// worth an advisory warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementPolicy {
    /// Decimal places of the currency minor unit (2 for cent currencies).
    pub scale: u32,
    /// Magnitude below which a rounded balance counts as exactly settled.
    pub epsilon: Money,
    /// Residual magnitude above which the result carries a warning.
    pub significance: Money,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self::minor_unit(2)
    }
}

impl SettlementPolicy {
    /// Policy for a currency with `scale` minor-unit decimal places; epsilon is
    /// one minor unit and significance ten minor units.
    pub fn minor_unit(scale: u32) -> Self {
        Self {
            scale,
            epsilon: Money::from_decimal(Decimal::new(1, scale)),
            significance: Money::from_decimal(Decimal::new(10, scale)),
        }
    }
}

/// Classifies the residual imbalance left over after greedy matching.
///
/// Pure classification: the verdict is `Negligible` or `Significant`, never
/// fatal, so the matcher always returns its best-effort transfer list.
pub struct ReconciliationGuard;

impl ReconciliationGuard {
    pub fn classify(residual: Money, policy: &SettlementPolicy) -> ResidualSeverity {
        if residual.abs() > policy.significance {
            ResidualSeverity::Significant
        } else {
            ResidualSeverity::Negligible
        }
    }

    /// Builds the reconciliation report and, for a significant residual, the
    /// advisory warning string attached to the settlement result.
    pub fn report(
        total_debt: Money,
        total_credit: Money,
        residual: Money,
        policy: &SettlementPolicy,
    ) -> (ReconciliationReport, Option<String>) {
        let severity = Self::classify(residual, policy);
        let warning = match severity {
            ResidualSeverity::Significant => {
                tracing::warn!(
                    residual = %residual,
                    total_debt = %total_debt,
                    total_credit = %total_credit,
                    significance = %policy.significance,
                    "Residual imbalance above significance threshold"
                );
                let rounded = residual.round_to(policy.scale);
                Some(format!(
                    "There's a small imbalance of {rounded} in the calculations. \
                     This might be due to rounding."
                ))
            }
            ResidualSeverity::Negligible => None,
        };

        (
            ReconciliationReport {
                total_debt,
                total_credit,
                residual,
                severity,
            },
            warning,
        )
    }
}
