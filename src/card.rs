//! Gift cards: ownership, balance, and the movement log.

use chrono::{DateTime, Utc};

use crate::error::{AmountError, DomainError, ServiceError};
use crate::money::Amount;

/// Audit record of one completed charge. Created only by
/// [`GiftCard::charge`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    when: DateTime<Utc>,
    merchant_id: String,
    amount: Amount,
    description: String,
}

impl Movement {
    fn debit(
        when: DateTime<Utc>,
        merchant_id: String,
        amount: Amount,
        description: String,
    ) -> Movement {
        Movement {
            when,
            merchant_id,
            amount,
            description,
        }
    }

    pub fn when(&self) -> DateTime<Utc> {
        self.when
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Positive magnitude of the debit, at scale 2.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A pre-loaded card. Unclaimed until some user claims it; claim and
/// charge are the only mutations it ever undergoes.
#[derive(Debug)]
pub struct GiftCard {
    id: String,
    owner_user_id: Option<String>,
    balance: Amount,
    movements: Vec<Movement>,
}

impl GiftCard {
    /// An unclaimed card holding `initial`. The balance is normalized to
    /// two decimals up front; over-precise or negative initial amounts
    /// are construction errors, not latent state.
    pub fn identified_with_balance(id: String, initial: Amount) -> Result<GiftCard, AmountError> {
        let balance = initial.to_scale_two()?;
        if balance.is_negative() {
            return Err(AmountError::Negative);
        }
        Ok(GiftCard {
            id,
            owner_user_id: None,
            balance,
            movements: Vec::new(),
        })
    }

    /// First claim wins and sticks. Re-claiming by the owner is a no-op;
    /// anyone else gets `AlreadyClaimed` and the card is left untouched.
    pub fn claim(&mut self, user_id: &str) -> Result<(), DomainError> {
        match &self.owner_user_id {
            Some(owner) if owner != user_id => Err(DomainError::AlreadyClaimed),
            _ => {
                self.owner_user_id = Some(user_id.to_owned());
                Ok(())
            }
        }
    }

    /// Debits `amount` and appends one movement at the log tail, or
    /// fails leaving the card exactly as it was. Checks run in a fixed
    /// order: claimed, balance cover, amount scale, amount sign.
    pub fn charge(
        &mut self,
        merchant_id: &str,
        amount: Amount,
        description: &str,
        when: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if !self.is_claimed() {
            return Err(DomainError::NotClaimed.into());
        }
        // Numeric comparison is exact at any input scale, so cover is
        // decidable before the amount has to be normalized.
        if self.balance < amount {
            return Err(DomainError::NotEnoughBalance.into());
        }
        let norm = amount.to_scale_two()?;
        if !norm.is_positive() {
            return Err(AmountError::NotPositive.into());
        }
        self.balance = self.balance.minus(norm);
        self.movements.push(Movement::debit(
            when,
            merchant_id.to_owned(),
            norm,
            description.to_owned(),
        ));
        Ok(())
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Owned snapshot of the log; callers cannot reach the internal
    /// state through it.
    pub fn movements(&self) -> Vec<Movement> {
        self.movements.clone()
    }

    pub fn is_claimed(&self) -> bool {
        self.owner_user_id.is_some()
    }

    pub fn owner_user_id(&self) -> Option<&str> {
        self.owner_user_id.as_deref()
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn card(initial: &str) -> GiftCard {
        GiftCard::identified_with_balance("CARD-1".to_owned(), initial.parse().unwrap()).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_card_is_unclaimed_with_its_initial_balance() {
        let card = card("100.00");
        assert!(!card.is_claimed());
        assert_eq!(card.owner_user_id(), None);
        assert_eq!(card.balance(), Amount::from_cents(10_000));
        assert!(card.movements().is_empty());
        assert_eq!(card.id(), "CARD-1");
    }

    #[test]
    fn construction_rejects_bad_initial_balances() {
        let over_precise = GiftCard::identified_with_balance(
            "CARD-1".to_owned(),
            "100.001".parse().unwrap(),
        );
        assert_eq!(over_precise.unwrap_err(), AmountError::PrecisionLoss);

        let negative =
            GiftCard::identified_with_balance("CARD-1".to_owned(), "-1.00".parse().unwrap());
        assert_eq!(negative.unwrap_err(), AmountError::Negative);
    }

    #[test]
    fn claim_is_idempotent_for_the_owner() {
        let mut card = card("100.00");
        card.claim("alice").unwrap();
        card.claim("alice").unwrap();
        assert_eq!(card.owner_user_id(), Some("alice"));
    }

    #[test]
    fn claim_by_a_second_user_is_rejected_and_changes_nothing() {
        let mut card = card("100.00");
        card.claim("bob").unwrap();

        assert_eq!(card.claim("alice"), Err(DomainError::AlreadyClaimed));
        assert_eq!(card.owner_user_id(), Some("bob"));
        assert_eq!(card.balance(), Amount::from_cents(10_000));
    }

    #[test]
    fn unclaimed_card_cannot_be_charged() {
        let mut card = card("100.00");
        let result = card.charge("M-001", "10.00".parse().unwrap(), "compra", noon());
        assert_eq!(result, Err(DomainError::NotClaimed.into()));
    }

    #[test]
    fn charge_debits_and_records_one_movement() {
        let mut card = card("100.00");
        card.claim("alice").unwrap();

        card.charge("M-001", "30.00".parse().unwrap(), "compra", noon())
            .unwrap();

        assert_eq!(card.balance(), Amount::from_cents(7_000));
        let movements = card.movements();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].amount(), Amount::from_cents(3_000));
        assert_eq!(movements[0].merchant_id(), "M-001");
        assert_eq!(movements[0].description(), "compra");
        assert_eq!(movements[0].when(), noon());
    }

    #[test]
    fn charge_of_the_exact_balance_empties_the_card() {
        let mut card = card("20.00");
        card.claim("alice").unwrap();

        card.charge("M-001", "20.00".parse().unwrap(), "compra", noon())
            .unwrap();
        assert_eq!(card.balance(), Amount::ZERO);
    }

    #[test]
    fn insufficient_balance_leaves_the_card_untouched() {
        let mut card = card("20.00");
        card.claim("alice").unwrap();

        let result = card.charge("M-001", "25.00".parse().unwrap(), "compra", noon());
        assert_eq!(result, Err(DomainError::NotEnoughBalance.into()));
        assert_eq!(card.balance(), Amount::from_cents(2_000));
        assert!(card.movements().is_empty());
    }

    #[test]
    fn cover_is_reported_before_precision() {
        let mut card = card("20.00");
        card.claim("alice").unwrap();

        // Simultaneously over budget and over-precise: the balance check
        // comes first in the pinned order.
        let result = card.charge("M-001", "25.001".parse().unwrap(), "compra", noon());
        assert_eq!(result, Err(DomainError::NotEnoughBalance.into()));
    }

    #[test]
    fn over_precise_amount_fails_without_rounding() {
        let mut card = card("100.00");
        card.claim("alice").unwrap();

        let result = card.charge("M-001", "30.001".parse().unwrap(), "compra", noon());
        assert_eq!(result, Err(AmountError::PrecisionLoss.into()));
        assert_eq!(card.balance(), Amount::from_cents(10_000));
        assert!(card.movements().is_empty());
    }

    #[test]
    fn non_positive_amounts_are_input_errors() {
        let mut card = card("100.00");
        card.claim("alice").unwrap();

        let zero = card.charge("M-001", "0.00".parse().unwrap(), "compra", noon());
        assert_eq!(zero, Err(AmountError::NotPositive.into()));

        let negative = card.charge("M-001", "-5.00".parse().unwrap(), "compra", noon());
        assert_eq!(negative, Err(AmountError::NotPositive.into()));
        assert_eq!(card.balance(), Amount::from_cents(10_000));
    }

    #[test]
    fn movements_keep_application_order() {
        let mut card = card("100.00");
        card.claim("alice").unwrap();

        card.charge("M-001", "10.00".parse().unwrap(), "m1", noon())
            .unwrap();
        card.charge("M-001", "5.00".parse().unwrap(), "m2", noon())
            .unwrap();

        let movements = card.movements();
        assert_eq!(movements[0].description(), "m1");
        assert_eq!(movements[1].description(), "m2");
    }

    #[test]
    fn movement_snapshot_is_detached_from_the_card() {
        let mut card = card("100.00");
        card.claim("alice").unwrap();
        card.charge("M-001", "10.00".parse().unwrap(), "m1", noon())
            .unwrap();

        let mut snapshot = card.movements();
        snapshot.clear();
        assert_eq!(card.movements().len(), 1);
    }
}
