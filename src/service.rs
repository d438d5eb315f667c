//! Service layer API for the gift-card use cases.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Duration;

use crate::card::{GiftCard, Movement};
use crate::clock::Clock;
use crate::error::{DomainError, ServiceError};
use crate::merchant::MerchantDirectory;
use crate::money::Amount;
use crate::session::Session;

/// Description recorded on merchant-notified charges.
const MERCHANT_CHARGE_DESCRIPTION: &str = "merchant charge";

/// Tunables that vary per deployment rather than per call.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// How long an issued token stays valid.
    pub token_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> ServiceConfig {
        ServiceConfig {
            token_ttl: Duration::minutes(5),
        }
    }
}

/// Facade over sessions, cards and merchants. Owns every registry, so
/// one instance is one fully independent service; tests build as many
/// as they like without cross-contamination.
///
/// Mutations are serialized per card: claim and charge on the same card
/// cannot interleave, so a charge's balance check and debit are one
/// atomic step even under concurrent callers.
pub struct GiftCardService {
    session: Session,
    cards: HashMap<String, Mutex<GiftCard>>,
    merchants: MerchantDirectory,
    clock: Arc<dyn Clock>,
}

impl GiftCardService {
    pub fn new(
        valid_users: HashMap<String, String>,
        cards: HashMap<String, GiftCard>,
        merchants: MerchantDirectory,
        clock: Arc<dyn Clock>,
    ) -> GiftCardService {
        Self::with_config(valid_users, cards, merchants, clock, ServiceConfig::default())
    }

    pub fn with_config(
        valid_users: HashMap<String, String>,
        cards: HashMap<String, GiftCard>,
        merchants: MerchantDirectory,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> GiftCardService {
        let cards = cards
            .into_iter()
            .map(|(id, card)| (id, Mutex::new(card)))
            .collect();
        GiftCardService {
            session: Session::new(valid_users, Arc::clone(&clock), config.token_ttl),
            cards,
            merchants,
            clock,
        }
    }

    /// Authenticates the user and issues a session token.
    pub fn login_for(&self, user: &str, pass: &str) -> Result<String, DomainError> {
        let token = self.session.login_for(user, pass)?;
        tracing::info!(user, "login: token issued");
        Ok(token)
    }

    /// Claims the card for the token's user. Surfaces `AlreadyClaimed`
    /// untouched when someone else owns it.
    pub fn claim_card_identified_as(&self, token: &str, card_id: &str) -> Result<(), DomainError> {
        let user_id = self.session.user_id_from_valid_token(token)?;
        let mut card = self.card_identified_as(card_id)?;
        card.claim(&user_id)?;
        tracing::info!(user = user_id.as_str(), card = card_id, "card claimed");
        Ok(())
    }

    /// Current balance, visible to the card's owner only.
    pub fn balance_of_card_identified_as(
        &self,
        token: &str,
        card_id: &str,
    ) -> Result<Amount, DomainError> {
        let user_id = self.session.user_id_from_valid_token(token)?;
        let card = self.must_be_owned_by(card_id, &user_id)?;
        Ok(card.balance())
    }

    /// Movement history, visible to the card's owner only.
    pub fn movements_of_card_identified_as(
        &self,
        token: &str,
        card_id: &str,
    ) -> Result<Vec<Movement>, DomainError> {
        let user_id = self.session.user_id_from_valid_token(token)?;
        let card = self.must_be_owned_by(card_id, &user_id)?;
        Ok(card.movements())
    }

    /// A merchant notifies a charge against a user's claimed card. This
    /// entry point is merchant-authenticated; no session token is
    /// involved. Check order is fixed: merchant validity, card
    /// existence, ownership, balance cover, amount scale.
    pub fn charge_notified_by_merchant(
        &self,
        merchant_id: &str,
        api_key: &str,
        user_id: &str,
        card_id: &str,
        amount: Amount,
    ) -> Result<(), ServiceError> {
        self.merchants.authenticate(merchant_id, api_key)?;
        let mut card = self.must_be_owned_by(card_id, user_id)?;
        match card.charge(
            merchant_id,
            amount,
            MERCHANT_CHARGE_DESCRIPTION,
            self.clock.now(),
        ) {
            Ok(()) => {
                tracing::info!(merchant = merchant_id, card = card_id, %amount, "charge applied");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(merchant = merchant_id, card = card_id, %err, "charge rejected");
                Err(err)
            }
        }
    }

    /// True while `token` would still be accepted by the queries above.
    pub fn is_token_valid(&self, token: &str) -> bool {
        self.session.is_valid(token)
    }

    fn card_identified_as(&self, card_id: &str) -> Result<MutexGuard<'_, GiftCard>, DomainError> {
        let card = self.cards.get(card_id).ok_or(DomainError::InvalidCardId)?;
        Ok(card.lock().expect("card lock poisoned"))
    }

    fn must_be_owned_by(
        &self,
        card_id: &str,
        user_id: &str,
    ) -> Result<MutexGuard<'_, GiftCard>, DomainError> {
        let card = self.card_identified_as(card_id)?;
        if card.owner_user_id() != Some(user_id) {
            return Err(DomainError::CardNotClaimedByUser);
        }
        Ok(card)
    }
}
