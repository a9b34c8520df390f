use crate::ports::MemberDirectory;
use splitledger_domain::{Money, ParticipantId, SettlementResult};
use std::borrow::Cow;

/// Plain-text rendering of one settlement result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementView {
    pub transfer_lines: Vec<String>,
    pub summary_line: String,
    pub warning_line: Option<String>,
}

/// Formats settlement results for display. Unknown ids fall back to the raw
/// id so a transfer referencing a departed member still renders.
pub struct SettlementPresenter {
    scale: u32,
}

impl Default for SettlementPresenter {
    fn default() -> Self {
        Self { scale: 2 }
    }
}

impl SettlementPresenter {
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    pub fn render(
        &self,
        result: &SettlementResult,
        directory: &dyn MemberDirectory,
    ) -> SettlementView {
        let transfer_lines = result
            .transfers
            .iter()
            .map(|transfer| {
                format!(
                    "{} pays {} {}",
                    label(transfer.from, directory),
                    label(transfer.to, directory),
                    self.format_amount(transfer.amount),
                )
            })
            .collect();

        let summary_line = match result.transfers.len() {
            0 => "Everyone is settled up.".to_owned(),
            1 => format!(
                "1 transfer settles {} of {} total debt",
                self.format_amount(result.total_simplified_debt),
                self.format_amount(result.total_original_debt),
            ),
            count => format!(
                "{count} transfers settle {} of {} total debt",
                self.format_amount(result.total_simplified_debt),
                self.format_amount(result.total_original_debt),
            ),
        };

        SettlementView {
            transfer_lines,
            summary_line,
            warning_line: result.imbalance_warning.clone(),
        }
    }

    fn format_amount(&self, amount: Money) -> String {
        let mut value = amount.as_decimal();
        value.rescale(self.scale);
        value.to_string()
    }
}

fn label(id: ParticipantId, directory: &dyn MemberDirectory) -> Cow<'_, str> {
    directory
        .display_name(id)
        .map(Cow::Borrowed)
        .unwrap_or_else(|| Cow::Owned(id.to_string()))
}
