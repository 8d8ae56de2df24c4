//! Property-based tests for the denomination allocator.
//!
//! - Sum correctness: a successful allocation settles the target exactly.
//! - Safety: the allocator never pledges more units than a stack has.
//! - Round-trip: commit then uncommit restores every spend accumulator.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::allocator::DenominationAllocator;
use super::error::AllocationError;
use super::types::{AllocationRequest, StagedBreakdown};
use crate::breakdown::{BreakableKind, BreakableRef, BreakdownLedger, BreakdownRow, BreakdownStatus, Direction};
use crate::float::{CountField, Denomination, FloatStack};

/// Canonical cash ladder the generated scenarios draw from.
const LADDER: [i64; 8] = [500, 200, 100, 50, 20, 10, 5, 2];

fn make_stack(value: Decimal, open_count: Decimal) -> FloatStack {
    let denom = Denomination {
        id: Uuid::new_v4(),
        ticker: "USD".to_string(),
        value,
        accepted: true,
    };
    let mut stack = FloatStack::open(Uuid::new_v4(), Uuid::new_v4(), &denom, None).unwrap();
    stack.record_count(CountField::Open, open_count).unwrap();
    stack
}

/// Strategy: a ladder of stacks plus a 1-unit backstop deep enough to
/// absorb any remainder, and an integer target within total availability.
fn allocatable_scenario() -> impl Strategy<Value = (Vec<FloatStack>, i64, u8)> {
    (
        proptest::collection::vec(0i64..40, LADDER.len()),
        1i64..2_000,
        0u8..=100,
    )
        .prop_map(|(counts, target, percentage)| {
            let mut stacks: Vec<FloatStack> = LADDER
                .iter()
                .zip(counts)
                .map(|(value, count)| make_stack(Decimal::from(*value), Decimal::from(count)))
                .collect();
            // The backstop guarantees the greedy pass can always settle
            // the remainder, so success is the expected outcome.
            stacks.push(make_stack(Decimal::ONE, Decimal::from(target)));
            (stacks, target, percentage)
        })
}

fn staged_total(staged: &[StagedBreakdown]) -> Decimal {
    staged.iter().map(StagedBreakdown::value).sum()
}

fn staged_to_rows(breakable: BreakableRef, staged: &[StagedBreakdown]) -> Vec<BreakdownRow> {
    staged
        .iter()
        .map(|s| BreakdownRow {
            id: Uuid::new_v4(),
            breakable,
            float_stack_id: s.float_stack_id,
            denomination_id: s.denomination_id,
            count: s.count,
            direction: s.direction,
            denominated_value: s.denominated_value,
            status: BreakdownStatus::Created,
        })
        .collect()
}

proptest! {
    /// A successful allocation settles the target to the cent and never
    /// pledges more units than any stack has available.
    #[test]
    fn prop_allocation_settles_target_exactly(
        (stacks, target, percentage) in allocatable_scenario()
    ) {
        let target = Decimal::from(target);
        let request = AllocationRequest::new(Direction::Outbound, target, percentage);

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();

        prop_assert_eq!(staged_total(&staged), target);
        for line in &staged {
            prop_assert!(line.count > Decimal::ZERO);
            prop_assert_eq!(line.count, line.count.floor());
            let stack = stacks
                .iter()
                .find(|s| s.id == line.float_stack_id)
                .expect("staged line references a known stack");
            prop_assert!(line.count <= stack.available_units());
        }
    }

    /// A target beyond total availability fails before anything is staged.
    #[test]
    fn prop_allocation_insufficient_float(
        (stacks, _, percentage) in allocatable_scenario(),
        excess in 1i64..1_000,
    ) {
        let total: Decimal = stacks.iter().map(FloatStack::current_value).sum();
        let request = AllocationRequest::new(
            Direction::Outbound,
            total + Decimal::from(excess),
            percentage,
        );

        let result = DenominationAllocator::allocate(&stacks, &request);
        let is_insufficient = matches!(
            result,
            Err(AllocationError::InsufficientFloat { .. })
        );
        prop_assert!(is_insufficient);
    }

    /// Committing an allocator-generated OUTBOUND breakdown never drives
    /// any stack's availability negative, and uncommitting restores every
    /// spend accumulator to its pre-allocation value exactly.
    #[test]
    fn prop_commit_uncommit_round_trip(
        (stacks, target, percentage) in allocatable_scenario()
    ) {
        let target = Decimal::from(target);
        let request = AllocationRequest::new(Direction::Outbound, target, percentage);
        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();

        let breakable = BreakableRef::new(BreakableKind::Order, Uuid::new_v4());
        let mut rows = staged_to_rows(breakable, &staged);
        let mut mutated: Vec<FloatStack> = stacks.clone();

        // COMMIT
        let plan = BreakdownLedger::commit_plan(breakable, &rows).unwrap();
        for adjustment in &plan.adjustments {
            let stack = mutated
                .iter_mut()
                .find(|s| s.id == adjustment.float_stack_id)
                .unwrap();
            stack.apply_spend(adjustment.spent_delta).unwrap();
            prop_assert!(stack.available_units() >= Decimal::ZERO);
        }
        for row in &mut rows {
            row.status = BreakdownStatus::Committed;
        }

        // UNCOMMIT
        let plan = BreakdownLedger::uncommit_plan(breakable, &rows).unwrap();
        for adjustment in &plan.adjustments {
            let stack = mutated
                .iter_mut()
                .find(|s| s.id == adjustment.float_stack_id)
                .unwrap();
            stack.apply_spend(adjustment.spent_delta).unwrap();
        }

        for (before, after) in stacks.iter().zip(&mutated) {
            prop_assert_eq!(before.spent_during_session, after.spent_during_session);
        }
    }
}
