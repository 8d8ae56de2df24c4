//! Transfer validation and stack-adjustment planning.

use rust_decimal::Decimal;

use super::error::TransferError;
use super::types::{TransferAdjustment, TransferInput};
use crate::allocation::StagedBreakdown;
use crate::breakdown::Direction;
use crate::session::SessionStatus;

/// Stateless rules for inter-repository transfers.
pub struct TransferService;

impl TransferService {
    /// Validates a transfer before anything is written.
    ///
    /// # Errors
    ///
    /// Returns a `TransferError` naming the first violated precondition.
    pub fn validate(input: &TransferInput, status: SessionStatus) -> Result<(), TransferError> {
        if !status.is_trading() {
            return Err(TransferError::SessionNotTrading { actual: status });
        }
        if input.outbound_repository_id == input.inbound_repository_id {
            return Err(TransferError::SameRepository(input.outbound_repository_id));
        }
        Self::validate_sum("outbound", input.outbound_sum)?;
        Self::validate_sum("inbound", input.inbound_sum)?;
        Ok(())
    }

    /// Validates that each side's breakdowns cover its sum exactly.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::CoverageMismatch` naming the failing side.
    pub fn validate_coverage(
        input: &TransferInput,
        outbound: &[StagedBreakdown],
        inbound: &[StagedBreakdown],
    ) -> Result<(), TransferError> {
        let covered: Decimal = outbound.iter().map(StagedBreakdown::value).sum();
        if covered != input.outbound_sum {
            return Err(TransferError::CoverageMismatch {
                side: "outbound",
                expected: input.outbound_sum,
                actual: covered,
            });
        }

        let covered: Decimal = inbound.iter().map(StagedBreakdown::value).sum();
        if covered != input.inbound_sum {
            return Err(TransferError::CoverageMismatch {
                side: "inbound",
                expected: input.inbound_sum,
                actual: covered,
            });
        }
        Ok(())
    }

    /// Plans the stack adjustments for one side's staged breakdowns.
    ///
    /// Outbound rows move units out of their stacks (positive transfer
    /// delta), inbound rows move them in. The stack mirrors the movement
    /// into its close count when the delta is applied.
    #[must_use]
    pub fn adjustments(staged: &[StagedBreakdown]) -> Vec<TransferAdjustment> {
        staged
            .iter()
            .map(|line| TransferAdjustment {
                float_stack_id: line.float_stack_id,
                transferred_delta: match line.direction {
                    Direction::Outbound => line.count,
                    Direction::Inbound => -line.count,
                },
            })
            .collect()
    }

    fn validate_sum(side: &'static str, sum: Decimal) -> Result<(), TransferError> {
        if sum == Decimal::ZERO {
            return Err(TransferError::ZeroSum { side });
        }
        if sum < Decimal::ZERO {
            return Err(TransferError::NegativeSum { side, sum });
        }
        Ok(())
    }
}
