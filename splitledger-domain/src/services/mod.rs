pub mod balance_aggregator;
pub mod reconciliation;
pub mod settlement_matcher;
pub mod split_allocator;

pub use balance_aggregator::BalanceAggregator;
pub use reconciliation::{ReconciliationGuard, SettlementPolicy};
pub use settlement_matcher::SettlementMatcher;
pub use split_allocator::{RemainderPolicy, SplitAllocator, SplitError, SplitSpec};
