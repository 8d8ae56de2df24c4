//! Float stack derivations and mutations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::FloatError;
use super::types::{CountField, Denomination, FloatPhase, FloatStack};

impl FloatStack {
    /// Opens a new stack for a session, seeded from its predecessor in the
    /// prior session when one exists.
    ///
    /// The predecessor's close count becomes this stack's
    /// `last_session_count` - the expected opening position the counting
    /// user reconciles against.
    ///
    /// # Errors
    ///
    /// Returns `FloatError::DenominationNotAccepted` if the denomination
    /// is not accepted for float tracking.
    pub fn open(
        session_id: Uuid,
        repository_id: Uuid,
        denomination: &Denomination,
        predecessor: Option<&FloatStack>,
    ) -> Result<Self, FloatError> {
        if !denomination.accepted {
            return Err(FloatError::DenominationNotAccepted(denomination.id));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            session_id,
            repository_id,
            denomination_id: denomination.id,
            ticker: denomination.ticker.clone(),
            denominated_value: denomination.value,
            open_count: Decimal::ZERO,
            close_count: Decimal::ZERO,
            midday_count: Decimal::ZERO,
            last_session_count: predecessor.map_or(Decimal::ZERO, |p| p.close_count),
            spent_during_session: Decimal::ZERO,
            transferred_during_session: Decimal::ZERO,
            open_spot: None,
            close_spot: None,
            open_confirmed_at: None,
            close_confirmed_at: None,
            previous_session_float_stack_id: predecessor.map(|p| p.id),
        })
    }

    /// Units still available for allocation:
    /// `open_count - spent_during_session - transferred_during_session`.
    #[must_use]
    pub fn available_units(&self) -> Decimal {
        self.open_count - self.spent_during_session - self.transferred_during_session
    }

    /// Monetary value of the available units.
    #[must_use]
    pub fn current_value(&self) -> Decimal {
        self.available_units() * self.denominated_value
    }

    /// Records a physical count.
    ///
    /// Updates the count field only - confirmation is a separate explicit
    /// action (`confirm`); recording a count never sets a confirmed
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Returns `FloatError::NegativeCount` if `value` is negative.
    pub fn record_count(&mut self, field: CountField, value: Decimal) -> Result<(), FloatError> {
        if value < Decimal::ZERO {
            return Err(FloatError::NegativeCount(value));
        }
        match field {
            CountField::Open => self.open_count = value,
            CountField::Close => self.close_count = value,
            CountField::Midday => self.midday_count = value,
        }
        Ok(())
    }

    /// Confirms the recorded count for a phase.
    pub fn confirm(&mut self, phase: FloatPhase, at: DateTime<Utc>) {
        match phase {
            FloatPhase::Open => self.open_confirmed_at = Some(at),
            FloatPhase::Close => self.close_confirmed_at = Some(at),
        }
    }

    /// Returns whether the count for a phase has been confirmed.
    #[must_use]
    pub fn is_confirmed(&self, phase: FloatPhase) -> bool {
        match phase {
            FloatPhase::Open => self.open_confirmed_at.is_some(),
            FloatPhase::Close => self.close_confirmed_at.is_some(),
        }
    }

    /// Applies a spend adjustment from a breakdown commit or uncommit.
    ///
    /// A positive delta consumes units (outbound), a negative delta
    /// returns them (inbound or uncommit of an outbound row).
    ///
    /// # Errors
    ///
    /// Returns `FloatError::NegativeAvailability` if the adjustment would
    /// drive `available_units` below zero; the stack is left untouched.
    pub fn apply_spend(&mut self, delta: Decimal) -> Result<(), FloatError> {
        let spent = self.spent_during_session + delta;
        let available = self.open_count - spent - self.transferred_during_session;
        if available < Decimal::ZERO {
            return Err(FloatError::NegativeAvailability {
                stack_id: self.id,
                available,
            });
        }
        self.spent_during_session = spent;
        Ok(())
    }

    /// Applies a transfer adjustment.
    ///
    /// A positive delta moves units out of this stack, a negative delta
    /// moves them in. The physical movement is mirrored into `close_count`
    /// so the closing reconciliation reflects it.
    ///
    /// # Errors
    ///
    /// Returns `FloatError::NegativeAvailability` if the adjustment would
    /// drive `available_units` below zero; the stack is left untouched.
    pub fn apply_transfer(&mut self, delta: Decimal) -> Result<(), FloatError> {
        let transferred = self.transferred_during_session + delta;
        let available = self.open_count - self.spent_during_session - transferred;
        if available < Decimal::ZERO {
            return Err(FloatError::NegativeAvailability {
                stack_id: self.id,
                available,
            });
        }
        self.transferred_during_session = transferred;
        self.close_count -= delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd_denomination(value: Decimal) -> Denomination {
        Denomination {
            id: Uuid::new_v4(),
            ticker: "USD".to_string(),
            value,
            accepted: true,
        }
    }

    fn open_stack(value: Decimal, open_count: Decimal) -> FloatStack {
        let denom = usd_denomination(value);
        let mut stack =
            FloatStack::open(Uuid::new_v4(), Uuid::new_v4(), &denom, None).unwrap();
        stack.record_count(CountField::Open, open_count).unwrap();
        stack
    }

    #[test]
    fn test_open_seeds_from_predecessor() {
        let denom = usd_denomination(dec!(50));
        let mut predecessor =
            FloatStack::open(Uuid::new_v4(), Uuid::new_v4(), &denom, None).unwrap();
        predecessor.record_count(CountField::Close, dec!(42)).unwrap();

        let session_id = Uuid::new_v4();
        let stack =
            FloatStack::open(session_id, predecessor.repository_id, &denom, Some(&predecessor))
                .unwrap();

        assert_eq!(stack.last_session_count, dec!(42));
        assert_eq!(stack.previous_session_float_stack_id, Some(predecessor.id));
        assert_eq!(stack.session_id, session_id);
        assert_eq!(stack.open_count, Decimal::ZERO);
    }

    #[test]
    fn test_open_without_predecessor() {
        let denom = usd_denomination(dec!(20));
        let stack = FloatStack::open(Uuid::new_v4(), Uuid::new_v4(), &denom, None).unwrap();

        assert_eq!(stack.last_session_count, Decimal::ZERO);
        assert!(stack.previous_session_float_stack_id.is_none());
    }

    #[test]
    fn test_open_rejects_unaccepted_denomination() {
        let mut denom = usd_denomination(dec!(100));
        denom.accepted = false;

        let result = FloatStack::open(Uuid::new_v4(), Uuid::new_v4(), &denom, None);
        assert!(matches!(result, Err(FloatError::DenominationNotAccepted(_))));
    }

    #[test]
    fn test_available_units() {
        let mut stack = open_stack(dec!(50), dec!(10));
        stack.spent_during_session = dec!(3);
        stack.transferred_during_session = dec!(2);

        assert_eq!(stack.available_units(), dec!(5));
        assert_eq!(stack.current_value(), dec!(250));
    }

    #[test]
    fn test_record_count_does_not_confirm() {
        let mut stack = open_stack(dec!(50), dec!(0));
        stack.record_count(CountField::Open, dec!(7)).unwrap();

        assert_eq!(stack.open_count, dec!(7));
        assert!(stack.open_confirmed_at.is_none());
    }

    #[test]
    fn test_record_count_rejects_negative() {
        let mut stack = open_stack(dec!(50), dec!(0));
        let result = stack.record_count(CountField::Open, dec!(-1));
        assert!(matches!(result, Err(FloatError::NegativeCount(_))));
        assert_eq!(stack.open_count, Decimal::ZERO);
    }

    #[test]
    fn test_confirm_is_explicit() {
        let mut stack = open_stack(dec!(50), dec!(10));
        assert!(!stack.is_confirmed(FloatPhase::Open));

        stack.confirm(FloatPhase::Open, Utc::now());
        assert!(stack.is_confirmed(FloatPhase::Open));
        assert!(!stack.is_confirmed(FloatPhase::Close));
    }

    #[test]
    fn test_apply_spend_outbound() {
        let mut stack = open_stack(dec!(50), dec!(10));
        stack.apply_spend(dec!(4)).unwrap();

        assert_eq!(stack.spent_during_session, dec!(4));
        assert_eq!(stack.available_units(), dec!(6));
    }

    #[test]
    fn test_apply_spend_rejects_overdraw() {
        let mut stack = open_stack(dec!(50), dec!(10));
        let result = stack.apply_spend(dec!(11));

        assert!(matches!(
            result,
            Err(FloatError::NegativeAvailability { .. })
        ));
        // Rejected mutation leaves the stack untouched.
        assert_eq!(stack.spent_during_session, Decimal::ZERO);
        assert_eq!(stack.available_units(), dec!(10));
    }

    #[test]
    fn test_apply_spend_inbound_can_exceed_open_count() {
        // An inbound commit returns units, so availability may exceed the
        // opening count.
        let mut stack = open_stack(dec!(50), dec!(10));
        stack.apply_spend(dec!(-5)).unwrap();

        assert_eq!(stack.available_units(), dec!(15));
    }

    #[test]
    fn test_apply_transfer_mirrors_close_count() {
        let mut stack = open_stack(dec!(50), dec!(10));
        stack.record_count(CountField::Close, dec!(10)).unwrap();

        stack.apply_transfer(dec!(3)).unwrap();
        assert_eq!(stack.transferred_during_session, dec!(3));
        assert_eq!(stack.close_count, dec!(7));
        assert_eq!(stack.available_units(), dec!(7));

        stack.apply_transfer(dec!(-2)).unwrap();
        assert_eq!(stack.transferred_during_session, dec!(1));
        assert_eq!(stack.close_count, dec!(9));
    }

    #[test]
    fn test_apply_transfer_rejects_overdraw() {
        let mut stack = open_stack(dec!(50), dec!(10));
        let result = stack.apply_transfer(dec!(11));

        assert!(matches!(
            result,
            Err(FloatError::NegativeAvailability { .. })
        ));
        assert_eq!(stack.transferred_during_session, Decimal::ZERO);
        assert_eq!(stack.close_count, Decimal::ZERO);
    }
}
