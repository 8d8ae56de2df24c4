//! Pure planning for breakdown commit, uncommit, and delete.
//!
//! The planner decides which rows change status and which stack
//! adjustments follow; persistence applies the plan inside one database
//! transaction per breakable.

use rust_decimal::Decimal;

use super::error::BreakdownError;
use super::types::{
    BreakableRef, BreakdownPlan, BreakdownRow, BreakdownStatus, Direction, StackAdjustment,
};

/// Stateless planner for the breakdown lifecycle.
pub struct BreakdownLedger;

impl BreakdownLedger {
    /// The spend delta a row applies to its stack when committed.
    ///
    /// Outbound rows consume units (positive delta); inbound rows return
    /// them (negative delta).
    #[must_use]
    pub fn spend_delta(direction: Direction, count: Decimal) -> Decimal {
        match direction {
            Direction::Outbound => count,
            Direction::Inbound => -count,
        }
    }

    /// Plans a commit: every CREATED row flips to COMMITTED and adjusts
    /// its stack.
    ///
    /// Rows already COMMITTED or CANCELLED are skipped, so a retried
    /// commit cannot double-apply; an all-committed breakable yields an
    /// empty plan.
    ///
    /// # Errors
    ///
    /// Returns `BreakdownError::NoRows` if the breakable has no rows at
    /// all.
    pub fn commit_plan(
        breakable: BreakableRef,
        rows: &[BreakdownRow],
    ) -> Result<BreakdownPlan, BreakdownError> {
        if rows.is_empty() {
            return Err(BreakdownError::NoRows(breakable));
        }

        let mut plan = BreakdownPlan::default();
        for row in rows.iter().filter(|r| r.status == BreakdownStatus::Created) {
            plan.row_ids.push(row.id);
            plan.adjustments.push(StackAdjustment {
                float_stack_id: row.float_stack_id,
                spent_delta: Self::spend_delta(row.direction, row.count),
            });
        }
        Ok(plan)
    }

    /// Plans an uncommit: every COMMITTED row flips to CANCELLED and
    /// applies the exact inverse adjustment.
    ///
    /// # Errors
    ///
    /// Returns `BreakdownError::NoRows` if the breakable has no rows, or
    /// `BreakdownError::NothingCommitted` if none of them is COMMITTED.
    pub fn uncommit_plan(
        breakable: BreakableRef,
        rows: &[BreakdownRow],
    ) -> Result<BreakdownPlan, BreakdownError> {
        if rows.is_empty() {
            return Err(BreakdownError::NoRows(breakable));
        }

        let mut plan = BreakdownPlan::default();
        for row in rows
            .iter()
            .filter(|r| r.status == BreakdownStatus::Committed)
        {
            plan.row_ids.push(row.id);
            plan.adjustments.push(StackAdjustment {
                float_stack_id: row.float_stack_id,
                spent_delta: -Self::spend_delta(row.direction, row.count),
            });
        }

        if plan.is_empty() {
            return Err(BreakdownError::NothingCommitted(breakable));
        }
        Ok(plan)
    }

    /// Validates that a breakable's rows may be deleted outright.
    ///
    /// Delete never touches counters, so it is only valid before commit.
    ///
    /// # Errors
    ///
    /// Returns `BreakdownError::AlreadyCommitted` if any row is
    /// COMMITTED.
    pub fn validate_delete(
        breakable: BreakableRef,
        rows: &[BreakdownRow],
    ) -> Result<(), BreakdownError> {
        if rows
            .iter()
            .any(|r| r.status == BreakdownStatus::Committed)
        {
            return Err(BreakdownError::AlreadyCommitted(breakable));
        }
        Ok(())
    }

    /// Validates the coverage invariant: the CREATED/COMMITTED rows of
    /// one direction must sum to the breakable's target for that
    /// direction.
    ///
    /// # Errors
    ///
    /// Returns `BreakdownError::CoverageMismatch` when the sums differ.
    pub fn validate_coverage(
        breakable: BreakableRef,
        rows: &[BreakdownRow],
        direction: Direction,
        target: Decimal,
    ) -> Result<(), BreakdownError> {
        let actual: Decimal = rows
            .iter()
            .filter(|r| {
                r.direction == direction
                    && matches!(
                        r.status,
                        BreakdownStatus::Created | BreakdownStatus::Committed
                    )
            })
            .map(|r| r.count * r.denominated_value)
            .sum();

        if actual != target {
            return Err(BreakdownError::CoverageMismatch {
                breakable,
                expected: target,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::breakdown::types::BreakableKind;

    fn order_ref() -> BreakableRef {
        BreakableRef::new(BreakableKind::Order, Uuid::new_v4())
    }

    fn row(
        breakable: BreakableRef,
        direction: Direction,
        count: Decimal,
        value: Decimal,
        status: BreakdownStatus,
    ) -> BreakdownRow {
        BreakdownRow {
            id: Uuid::new_v4(),
            breakable,
            float_stack_id: Uuid::new_v4(),
            denomination_id: Uuid::new_v4(),
            count,
            direction,
            denominated_value: value,
            status,
        }
    }

    #[test]
    fn test_spend_delta_directions() {
        assert_eq!(
            BreakdownLedger::spend_delta(Direction::Outbound, dec!(4)),
            dec!(4)
        );
        assert_eq!(
            BreakdownLedger::spend_delta(Direction::Inbound, dec!(4)),
            dec!(-4)
        );
    }

    #[test]
    fn test_commit_plan_created_rows() {
        let breakable = order_ref();
        let rows = vec![
            row(breakable, Direction::Outbound, dec!(2), dec!(50), BreakdownStatus::Created),
            row(breakable, Direction::Inbound, dec!(5), dec!(20), BreakdownStatus::Created),
        ];

        let plan = BreakdownLedger::commit_plan(breakable, &rows).unwrap();
        assert_eq!(plan.row_ids.len(), 2);
        assert_eq!(plan.adjustments[0].spent_delta, dec!(2));
        assert_eq!(plan.adjustments[1].spent_delta, dec!(-5));
    }

    #[test]
    fn test_commit_plan_skips_committed_rows() {
        // A retried commit must not double-apply.
        let breakable = order_ref();
        let rows = vec![
            row(breakable, Direction::Outbound, dec!(2), dec!(50), BreakdownStatus::Committed),
            row(breakable, Direction::Outbound, dec!(1), dec!(20), BreakdownStatus::Created),
        ];

        let plan = BreakdownLedger::commit_plan(breakable, &rows).unwrap();
        assert_eq!(plan.row_ids, vec![rows[1].id]);
    }

    #[test]
    fn test_commit_plan_no_rows() {
        let breakable = order_ref();
        let result = BreakdownLedger::commit_plan(breakable, &[]);
        assert!(matches!(result, Err(BreakdownError::NoRows(_))));
    }

    #[test]
    fn test_uncommit_plan_inverts_commit() {
        let breakable = order_ref();
        let rows = vec![
            row(breakable, Direction::Outbound, dec!(2), dec!(50), BreakdownStatus::Committed),
            row(breakable, Direction::Inbound, dec!(5), dec!(20), BreakdownStatus::Committed),
        ];

        let commit: Decimal = rows
            .iter()
            .map(|r| BreakdownLedger::spend_delta(r.direction, r.count))
            .sum();
        let plan = BreakdownLedger::uncommit_plan(breakable, &rows).unwrap();
        let uncommit: Decimal = plan.adjustments.iter().map(|a| a.spent_delta).sum();

        assert_eq!(commit + uncommit, Decimal::ZERO);
    }

    #[test]
    fn test_uncommit_plan_requires_committed_rows() {
        let breakable = order_ref();
        let rows = vec![row(
            breakable,
            Direction::Outbound,
            dec!(2),
            dec!(50),
            BreakdownStatus::Created,
        )];

        let result = BreakdownLedger::uncommit_plan(breakable, &rows);
        assert!(matches!(result, Err(BreakdownError::NothingCommitted(_))));
    }

    #[test]
    fn test_uncommit_plan_skips_cancelled_rows() {
        let breakable = order_ref();
        let rows = vec![
            row(breakable, Direction::Outbound, dec!(2), dec!(50), BreakdownStatus::Committed),
            row(breakable, Direction::Outbound, dec!(3), dec!(20), BreakdownStatus::Cancelled),
        ];

        let plan = BreakdownLedger::uncommit_plan(breakable, &rows).unwrap();
        assert_eq!(plan.row_ids, vec![rows[0].id]);
    }

    #[test]
    fn test_validate_delete_pre_commit() {
        let breakable = order_ref();
        let rows = vec![row(
            breakable,
            Direction::Outbound,
            dec!(2),
            dec!(50),
            BreakdownStatus::Created,
        )];
        assert!(BreakdownLedger::validate_delete(breakable, &rows).is_ok());
    }

    #[test]
    fn test_validate_delete_rejects_committed() {
        let breakable = order_ref();
        let rows = vec![row(
            breakable,
            Direction::Outbound,
            dec!(2),
            dec!(50),
            BreakdownStatus::Committed,
        )];
        let result = BreakdownLedger::validate_delete(breakable, &rows);
        assert!(matches!(result, Err(BreakdownError::AlreadyCommitted(_))));
    }

    #[test]
    fn test_validate_coverage_exact() {
        let breakable = order_ref();
        let rows = vec![
            row(breakable, Direction::Outbound, dec!(2), dec!(50), BreakdownStatus::Created),
            row(breakable, Direction::Outbound, dec!(5), dec!(20), BreakdownStatus::Committed),
            // Cancelled rows never count toward coverage.
            row(breakable, Direction::Outbound, dec!(1), dec!(100), BreakdownStatus::Cancelled),
            // Other direction is tallied separately.
            row(breakable, Direction::Inbound, dec!(3), dec!(10), BreakdownStatus::Created),
        ];

        assert!(
            BreakdownLedger::validate_coverage(breakable, &rows, Direction::Outbound, dec!(200))
                .is_ok()
        );
        assert!(
            BreakdownLedger::validate_coverage(breakable, &rows, Direction::Inbound, dec!(30))
                .is_ok()
        );
    }

    #[test]
    fn test_validate_coverage_mismatch() {
        let breakable = order_ref();
        let rows = vec![row(
            breakable,
            Direction::Outbound,
            dec!(2),
            dec!(50),
            BreakdownStatus::Created,
        )];

        let result =
            BreakdownLedger::validate_coverage(breakable, &rows, Direction::Outbound, dec!(150));
        assert!(matches!(
            result,
            Err(BreakdownError::CoverageMismatch { .. })
        ));
    }
}
