//! The greedy breakdown algorithm.

use rust_decimal::Decimal;

use super::error::AllocationError;
use super::types::{AllocationPolicy, AllocationRequest, StagedBreakdown};
use crate::float::FloatStack;

/// Stateless allocator converting a target sum into per-stack unit counts.
pub struct DenominationAllocator;

impl DenominationAllocator {
    /// Breaks `request.target_sum` into denomination counts drawn from
    /// `stacks` (all stacks of one ticker within one session).
    ///
    /// The algorithm:
    /// 1. Orders the stacks by denominated value per the request's policy.
    /// 2. Fails with `InsufficientFloat` if the target exceeds the total
    ///    available value - before anything is staged.
    /// 3. Caps every stack except the last at
    ///    `floor(available_units x usage_percentage / 100)` units, keeping
    ///    the remainder behind to preserve denomination diversity.
    /// 4. Lets the final stack ignore the cap entirely so it can absorb
    ///    whatever target remains.
    /// 5. Takes `floor(min(capped_value, remaining) / value)` units per
    ///    stack in order, skipping zero takes.
    /// 6. Fails with `UnallocatedRemainder` if value is still outstanding
    ///    after the final stack.
    ///
    /// # Errors
    ///
    /// Returns an `AllocationError`; no stack is ever mutated.
    pub fn allocate(
        stacks: &[FloatStack],
        request: &AllocationRequest,
    ) -> Result<Vec<StagedBreakdown>, AllocationError> {
        if request.target_sum <= Decimal::ZERO {
            return Err(AllocationError::NonPositiveTarget(request.target_sum));
        }
        if request.usage_percentage > 100 {
            return Err(AllocationError::InvalidUsagePercentage(
                request.usage_percentage,
            ));
        }

        let mut ordered: Vec<&FloatStack> = stacks
            .iter()
            .filter(|s| s.denominated_value > Decimal::ZERO)
            .collect();
        match request.policy {
            AllocationPolicy::LargestFirst => {
                ordered.sort_by(|a, b| b.denominated_value.cmp(&a.denominated_value));
            }
            AllocationPolicy::SmallestFirst => {
                ordered.sort_by(|a, b| a.denominated_value.cmp(&b.denominated_value));
            }
        }

        let total_available: Decimal = ordered.iter().map(|s| s.current_value()).sum();
        if request.target_sum > total_available {
            return Err(AllocationError::InsufficientFloat {
                requested: request.target_sum,
                available: total_available,
            });
        }

        let percentage = Decimal::from(request.usage_percentage);
        let hundred = Decimal::ONE_HUNDRED;
        let last = ordered.len().saturating_sub(1);

        let mut remaining = request.target_sum;
        let mut staged = Vec::new();

        for (index, stack) in ordered.iter().enumerate() {
            if remaining <= Decimal::ZERO {
                break;
            }

            // The final stack takes 100% regardless of the cap; it is the
            // guarantee that the remainder can be absorbed.
            let usable_units = if index == last {
                stack.available_units()
            } else {
                (stack.available_units() * percentage / hundred).floor()
            };
            let capped_value = usable_units * stack.denominated_value;

            let count = (capped_value.min(remaining) / stack.denominated_value).floor();
            if count <= Decimal::ZERO {
                continue;
            }

            remaining -= count * stack.denominated_value;
            staged.push(StagedBreakdown {
                float_stack_id: stack.id,
                repository_id: stack.repository_id,
                denomination_id: stack.denomination_id,
                count,
                direction: request.direction,
                denominated_value: stack.denominated_value,
            });
        }

        if remaining > Decimal::ZERO {
            return Err(AllocationError::UnallocatedRemainder { remaining });
        }

        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::breakdown::Direction;
    use crate::float::{CountField, Denomination, FloatStack};

    fn stack(value: Decimal, open_count: Decimal) -> FloatStack {
        let denom = Denomination {
            id: Uuid::new_v4(),
            ticker: "USD".to_string(),
            value,
            accepted: true,
        };
        let mut stack =
            FloatStack::open(Uuid::new_v4(), Uuid::new_v4(), &denom, None).unwrap();
        stack.record_count(CountField::Open, open_count).unwrap();
        stack
    }

    fn total(staged: &[StagedBreakdown]) -> Decimal {
        staged.iter().map(StagedBreakdown::value).sum()
    }

    #[test]
    fn test_allocate_exact_from_ladder() {
        // 100s, 50s, 20s, 10s with plenty of each.
        let stacks = vec![
            stack(dec!(100), dec!(10)),
            stack(dec!(50), dec!(10)),
            stack(dec!(20), dec!(10)),
            stack(dec!(10), dec!(10)),
        ];
        let request = AllocationRequest::new(Direction::Outbound, dec!(380), 100);

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();
        assert_eq!(total(&staged), dec!(380));
        // Largest-first: 3x100, 1x50, 1x20, 1x10.
        assert_eq!(staged[0].count, dec!(3));
        assert_eq!(staged[0].denominated_value, dec!(100));
        assert_eq!(staged[1].count, dec!(1));
        assert_eq!(staged[2].count, dec!(1));
        assert_eq!(staged[3].count, dec!(1));
    }

    #[test]
    fn test_allocate_insufficient_float() {
        let stacks = vec![stack(dec!(100), dec!(5))]; // 500 available
        let request = AllocationRequest::new(Direction::Outbound, dec!(1000), 100);

        let result = DenominationAllocator::allocate(&stacks, &request);
        assert!(matches!(
            result,
            Err(AllocationError::InsufficientFloat {
                requested,
                available,
            }) if requested == dec!(1000) && available == dec!(500)
        ));
    }

    #[test]
    fn test_allocate_usage_percentage_reserves_non_final_stacks() {
        // 10 hundreds available but only 50% usable: 5x100 from the first
        // stack, the rest from the final stack.
        let stacks = vec![stack(dec!(100), dec!(10)), stack(dec!(10), dec!(100))];
        let request = AllocationRequest::new(Direction::Outbound, dec!(800), 50);

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();
        assert_eq!(total(&staged), dec!(800));
        assert_eq!(staged[0].count, dec!(5));
        assert_eq!(staged[1].count, dec!(30));
    }

    #[test]
    fn test_allocate_last_stack_ignores_usage_percentage() {
        // A lone stack is also the last stack: the cap must not apply.
        let stacks = vec![stack(dec!(10), dec!(100))];
        let request = AllocationRequest::new(Direction::Outbound, dec!(900), 10);

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].count, dec!(90));
    }

    #[rstest]
    #[case(0)]
    #[case(37)]
    #[case(100)]
    fn test_allocate_single_stack_any_percentage(#[case] percentage: u8) {
        // With exactly one stack the usage percentage is irrelevant.
        let stacks = vec![stack(dec!(20), dec!(50))];
        let request = AllocationRequest::new(Direction::Outbound, dec!(600), percentage);

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();
        assert_eq!(total(&staged), dec!(600));
    }

    #[test]
    fn test_allocate_zero_usage_percentage_routes_to_final_stack() {
        let stacks = vec![stack(dec!(100), dec!(10)), stack(dec!(10), dec!(200))];
        let request = AllocationRequest::new(Direction::Outbound, dec!(500), 0);

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();
        // Nothing usable from the capped stack; all 50 tens from the last.
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].denominated_value, dec!(10));
        assert_eq!(staged[0].count, dec!(50));
    }

    #[test]
    fn test_allocate_skips_zero_count_stacks() {
        let stacks = vec![
            stack(dec!(500), dec!(4)),
            stack(dec!(100), dec!(10)),
            stack(dec!(10), dec!(50)),
        ];
        // 150 takes nothing from the 500s.
        let request = AllocationRequest::new(Direction::Outbound, dec!(150), 100);

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();
        assert_eq!(total(&staged), dec!(150));
        assert!(staged.iter().all(|s| s.denominated_value != dec!(500)));
    }

    #[test]
    fn test_allocate_unrepresentable_remainder() {
        // Total value suffices but 30 cannot be settled in 20s: the final
        // stack takes one 20 and leaves 10 outstanding.
        let stacks = vec![stack(dec!(20), dec!(5))];
        let request = AllocationRequest::new(Direction::Outbound, dec!(30), 100);

        let result = DenominationAllocator::allocate(&stacks, &request);
        assert!(matches!(
            result,
            Err(AllocationError::UnallocatedRemainder { remaining }) if remaining == dec!(10)
        ));
    }

    #[test]
    fn test_allocate_rejects_non_positive_target() {
        let stacks = vec![stack(dec!(10), dec!(10))];
        for target in [Decimal::ZERO, dec!(-5)] {
            let request = AllocationRequest::new(Direction::Outbound, target, 100);
            let result = DenominationAllocator::allocate(&stacks, &request);
            assert!(matches!(result, Err(AllocationError::NonPositiveTarget(_))));
        }
    }

    #[test]
    fn test_allocate_rejects_invalid_percentage() {
        let stacks = vec![stack(dec!(10), dec!(10))];
        let request = AllocationRequest::new(Direction::Outbound, dec!(10), 101);

        let result = DenominationAllocator::allocate(&stacks, &request);
        assert!(matches!(
            result,
            Err(AllocationError::InvalidUsagePercentage(101))
        ));
    }

    #[test]
    fn test_allocate_respects_spent_and_transferred() {
        let mut s = stack(dec!(100), dec!(10));
        s.spent_during_session = dec!(4);
        s.transferred_during_session = dec!(3);
        // 3 units (300) actually available.
        let request = AllocationRequest::new(Direction::Outbound, dec!(400), 100);

        let result = DenominationAllocator::allocate(&[s], &request);
        assert!(matches!(
            result,
            Err(AllocationError::InsufficientFloat { available, .. }) if available == dec!(300)
        ));
    }

    #[test]
    fn test_allocate_smallest_first_policy() {
        let stacks = vec![stack(dec!(100), dec!(10)), stack(dec!(10), dec!(10))];
        let request = AllocationRequest {
            direction: Direction::Outbound,
            target_sum: dec!(200),
            usage_percentage: 100,
            policy: AllocationPolicy::SmallestFirst,
        };

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();
        assert_eq!(total(&staged), dec!(200));
        // Tens drained first, hundred absorbs the rest.
        assert_eq!(staged[0].denominated_value, dec!(10));
        assert_eq!(staged[0].count, dec!(10));
        assert_eq!(staged[1].denominated_value, dec!(100));
        assert_eq!(staged[1].count, dec!(1));
    }

    #[test]
    fn test_allocate_is_pure() {
        let stacks = vec![stack(dec!(50), dec!(10))];
        let before = stacks.clone();
        let request = AllocationRequest::new(Direction::Outbound, dec!(200), 100);

        DenominationAllocator::allocate(&stacks, &request).unwrap();
        assert_eq!(stacks, before);
    }

    #[test]
    fn test_allocate_inbound_direction_tags_rows() {
        let stacks = vec![stack(dec!(20), dec!(10))];
        let request = AllocationRequest::new(Direction::Inbound, dec!(100), 100);

        let staged = DenominationAllocator::allocate(&stacks, &request).unwrap();
        assert!(staged.iter().all(|s| s.direction == Direction::Inbound));
    }
}
