//! Trade lifecycle orchestration.
//!
//! The orchestrator is the single entry point for every mutation of the
//! session's active trade: creation, status transitions, the side-effect
//! drivers (payment proof, confirmation, release, dispute, rating) and
//! teardown. Local validation happens before any network call; the backend
//! stays authoritative, and its rejections never corrupt local state.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use super::session::RoleResolver;
use super::state::SessionState;
use super::sync::{ReconcileOutcome, Reconciler, SyncHandle, SyncLoop};
use crate::config::SyncConfig;
use crate::domain::{
    Amount, Offer, OfferDraft, PaymentMethodId, Trade, TradeError, TradeEvent, TradeId,
    TradeMessage, TradeRole, TradeStatus,
};
use crate::error::Result;
use crate::port::outbound::{
    Event, IdentityProvider, MarketplaceApi, NotifierRegistry, PaymentProofUpload, TradeRating,
    TradeRequest, TransitionCommand,
};

/// The trade lifecycle orchestration engine.
///
/// Owns the exclusive active-trade slot and the synchronization loop for it.
/// All methods are safe to call concurrently; mutations are serialized
/// through [`SessionState`].
pub struct TradeOrchestrator {
    api: Arc<dyn MarketplaceApi>,
    roles: RoleResolver,
    notifiers: Arc<NotifierRegistry>,
    state: Arc<SessionState>,
    reconciler: Arc<Reconciler>,
    sync: SyncConfig,
    sync_handle: Mutex<Option<SyncHandle>>,
}

impl TradeOrchestrator {
    /// Create an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        identity: Arc<dyn IdentityProvider>,
        notifiers: NotifierRegistry,
        sync: SyncConfig,
    ) -> Self {
        let notifiers = Arc::new(notifiers);
        let state = Arc::new(SessionState::new());
        let reconciler = Arc::new(Reconciler::new(
            api.clone(),
            state.clone(),
            notifiers.clone(),
            sync.failure_threshold,
        ));
        Self {
            api,
            roles: RoleResolver::new(identity),
            notifiers,
            state,
            reconciler,
            sync,
            sync_handle: Mutex::new(None),
        }
    }

    /// Clone of the session's active trade, if any.
    #[must_use]
    pub fn current_trade(&self) -> Option<Trade> {
        self.state.snapshot()
    }

    /// Read-only observable of the active trade. Watchers are only woken on
    /// real changes; idempotent reconciliations are silent.
    #[must_use]
    pub fn watch_trade(&self) -> tokio::sync::watch::Receiver<Option<Trade>> {
        self.state.subscribe()
    }

    /// Fetch currently published offers.
    pub async fn list_offers(&self) -> Result<Vec<Offer>> {
        Ok(self.api.fetch_offers().await?)
    }

    /// Validate and publish a new offer as the authenticated maker.
    pub async fn publish_offer(&self, draft: &OfferDraft) -> Result<Offer> {
        draft.validate()?;
        Ok(self.api.publish_offer(draft).await?)
    }

    /// Fetch the message log of a trade.
    pub async fn messages(&self, trade_id: &TradeId) -> Result<Vec<TradeMessage>> {
        Ok(self.api.fetch_messages(trade_id).await?)
    }

    /// Create a trade against `offer` and adopt it as the active trade.
    ///
    /// Amount bounds and the payment method are validated locally first; a
    /// taker with another active trade is rejected before the create call.
    /// Creation is never assumed on failure: no local record exists until
    /// the backend returns one.
    pub async fn create_trade(
        &self,
        offer: &Offer,
        amount: Amount,
        payment_method_id: &PaymentMethodId,
    ) -> Result<Trade> {
        offer.validate_amount(amount)?;
        offer.payment_method(payment_method_id)?;

        // One active trade per buyer: a client-side fast-fail, not a
        // security boundary. Makers accepting incoming requests are exempt.
        if !self.roles.is_maker_of(offer) {
            self.check_buyer_concurrency().await?;
        }

        let request = TradeRequest {
            amount,
            payment_method_id: payment_method_id.clone(),
        };
        let trade = self.api.create_trade(&offer.id, &request).await?;
        info!(trade_id = %trade.id, offer_id = %offer.id, status = %trade.status, "Trade created");
        self.adopt(trade.clone());
        Ok(trade)
    }

    /// Re-adopt an existing trade (e.g. after an application restart).
    pub async fn resume_trade(&self, trade_id: &TradeId) -> Result<Trade> {
        let trade = self.api.fetch_trade(trade_id).await?;
        self.adopt(trade.clone());
        Ok(trade)
    }

    /// Request a status transition on the active trade.
    ///
    /// Validates, in order: the trade is the session's active trade, the
    /// event is legal from the current status, the caller's role may
    /// initiate it, and any payload precondition holds. Each rejection is
    /// typed and returned without a network call. On success the backend's
    /// resulting trade is applied immediately and one confirmatory
    /// reconciliation is scheduled.
    pub async fn request_transition(
        &self,
        trade_id: &TradeId,
        event: TradeEvent,
    ) -> Result<Trade> {
        let held = self.active_trade(trade_id)?;
        let role = self.validate_transition(&held, event)?;
        let command = Self::command_for(event)
            .ok_or(TradeError::Unauthorized { event, role })?;
        self.drive(&held, &command).await
    }

    /// Upload payment proof, moving the trade to `payment_sent`.
    pub async fn mark_payment_sent(
        &self,
        trade_id: &TradeId,
        proof: &PaymentProofUpload,
    ) -> Result<Trade> {
        let held = self.active_trade(trade_id)?;
        self.validate_transition(&held, TradeEvent::PaymentSent)?;
        let updated = self.api.upload_payment_proof(&held.id, proof).await?;
        self.apply_authoritative(&held, updated)
    }

    /// Confirm receipt of payment as the payee.
    pub async fn confirm_payment(&self, trade_id: &TradeId) -> Result<Trade> {
        self.request_transition(trade_id, TradeEvent::ConfirmPayment)
            .await
    }

    /// Sign the release of escrowed funds, completing the trade.
    pub async fn sign_release(&self, trade_id: &TradeId) -> Result<Trade> {
        self.request_transition(trade_id, TradeEvent::Release).await
    }

    /// Open a dispute with a reason.
    pub async fn open_dispute(&self, trade_id: &TradeId, reason: &str) -> Result<Trade> {
        let held = self.active_trade(trade_id)?;
        self.validate_transition(&held, TradeEvent::OpenDispute)?;
        let command = TransitionCommand::Dispute {
            reason: reason.to_owned(),
        };
        self.drive(&held, &command).await
    }

    /// Rate the counterparty of a completed trade and end the session.
    ///
    /// Valid only in `completed`; on success the held trade is cleared
    /// rather than transitioned further.
    pub async fn submit_rating(&self, trade_id: &TradeId, rating: &TradeRating) -> Result<()> {
        let held = self.active_trade(trade_id)?;
        self.roles.role_in(&held)?;
        if held.status != TradeStatus::Completed {
            return Err(TradeError::RatingUnavailable {
                status: held.status,
            }
            .into());
        }
        self.api.submit_rating(&held.id, rating).await?;
        self.end_session(&held.id);
        Ok(())
    }

    /// Abandon the active trade: stop polling and clear the slot.
    pub fn abandon(&self) {
        if let Some(trade) = self.state.snapshot() {
            self.end_session(&trade.id);
        } else {
            self.stop_sync();
        }
    }

    /// Run one reconciliation immediately (subject to the single-flight
    /// guard shared with the polling loop).
    pub async fn reconcile_now(&self) -> ReconcileOutcome {
        self.reconciler.run_once().await
    }

    /// Whether a synchronization loop is currently running.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.sync_handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    // --- internals ---------------------------------------------------------

    fn active_trade(&self, trade_id: &TradeId) -> Result<Trade> {
        match self.state.snapshot() {
            Some(trade) if trade.id == *trade_id => Ok(trade),
            _ => Err(TradeError::NotActiveTrade {
                trade_id: trade_id.clone(),
            }
            .into()),
        }
    }

    /// Local legality, actor and payload checks for `event` on `held`.
    fn validate_transition(&self, held: &Trade, event: TradeEvent) -> Result<TradeRole> {
        if held.status.apply(event).is_none() {
            return Err(TradeError::IllegalTransition {
                from: held.status,
                event,
            }
            .into());
        }
        let role = self.roles.role_in(held)?;
        if !TradeStatus::required_actor(event).permits(role) {
            return Err(TradeError::Unauthorized { event, role }.into());
        }
        if event == TradeEvent::ConfirmPayment && !held.has_payment_proof() {
            return Err(TradeError::PaymentProofRequired {
                trade_id: held.id.clone(),
            }
            .into());
        }
        Ok(role)
    }

    /// The backend command for a client-initiated event. `EscrowSettled` has
    /// none: it is observed through reconciliation, never requested.
    fn command_for(event: TradeEvent) -> Option<TransitionCommand> {
        match event {
            TradeEvent::Accept => Some(TransitionCommand::Accept),
            TradeEvent::Cancel => Some(TransitionCommand::Cancel),
            TradeEvent::PaymentSent => Some(TransitionCommand::PaymentSent),
            TradeEvent::ConfirmPayment => Some(TransitionCommand::ConfirmPayment),
            TradeEvent::Release => Some(TransitionCommand::Complete),
            TradeEvent::OpenDispute => Some(TransitionCommand::Dispute {
                reason: String::new(),
            }),
            TradeEvent::EscrowSettled => None,
        }
    }

    async fn drive(&self, held: &Trade, command: &TransitionCommand) -> Result<Trade> {
        let updated = self.api.submit_transition(&held.id, command).await?;
        self.apply_authoritative(held, updated)
    }

    /// Apply the authoritative result of a mutating call, then keep the
    /// sync loop consistent and schedule one confirmatory reconciliation.
    fn apply_authoritative(&self, held: &Trade, updated: Trade) -> Result<Trade> {
        let from = held.status;
        let applied = self.state.apply_update(updated.clone());
        if applied && updated.status != from {
            self.notifiers.notify_all(Event::TradeUpdated {
                trade_id: updated.id.clone(),
                from,
                to: updated.status,
            });
        }
        self.settle_sync(&updated);
        if applied && updated.status.is_settling() {
            let reconciler = self.reconciler.clone();
            tokio::spawn(async move {
                let _ = reconciler.run_once().await;
            });
        }
        Ok(updated)
    }

    async fn check_buyer_concurrency(&self) -> Result<()> {
        let user = self.roles.current_user();
        let trades = self.api.fetch_trades().await?;
        if let Some(active) = trades
            .iter()
            .find(|t| t.taker.id == user && !t.status.is_terminal())
        {
            return Err(TradeError::ConcurrentTradeLimitExceeded {
                user_id: user,
                blocking_trade: active.id.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn adopt(&self, trade: Trade) {
        let trade_id = trade.id.clone();
        let status = trade.status;
        self.state.adopt(trade.clone());
        self.notifiers
            .notify_all(Event::TradeAdopted { trade_id, status });
        self.settle_sync(&trade);
    }

    /// Keep the sync-loop slot consistent with the trade's status: exactly
    /// one loop for a settling trade, none once it is terminal. Starting a
    /// loop for a new trade first cancels any prior one.
    fn settle_sync(&self, trade: &Trade) {
        let mut slot = self.sync_handle.lock();
        let keep = slot
            .as_ref()
            .is_some_and(|h| h.trade_id() == &trade.id && !h.is_finished());
        if trade.status.is_settling() {
            if !keep {
                if let Some(prior) = slot.take() {
                    prior.cancel();
                }
                *slot = Some(SyncLoop::spawn(
                    self.reconciler.clone(),
                    self.sync.poll_interval(),
                    trade.id.clone(),
                ));
            }
        } else if let Some(handle) = slot.take() {
            handle.cancel();
        }
    }

    fn stop_sync(&self) {
        if let Some(handle) = self.sync_handle.lock().take() {
            handle.cancel();
        }
    }

    fn end_session(&self, trade_id: &TradeId) {
        self.stop_sync();
        if self.state.clear().is_some() {
            info!(trade_id = %trade_id, "Trade session ended");
            self.notifiers.notify_all(Event::SessionEnded {
                trade_id: trade_id.clone(),
            });
        }
    }
}
