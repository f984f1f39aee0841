//! Scripted [`MarketplaceApi`] implementation.
//!
//! Each method pops the next scripted result from its queue; unscripted
//! mutating calls fail loudly while unscripted reads return benign defaults.
//! Call counters let tests assert exactly how many network calls were (or
//! were not) issued, and an optional fetch delay makes single-flight and
//! cancellation timing observable under `tokio::time::pause`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Offer, OfferDraft, OfferId, Trade, TradeId, TradeMessage};
use crate::error::TransportError;
use crate::port::outbound::{
    MarketplaceApi, PaymentProofUpload, TradeRating, TradeRequest, TransitionCommand,
};

/// A transport failure suitable for scripting.
pub fn transport_failure() -> TransportError {
    TransportError::Api {
        message: "injected failure".into(),
    }
}

/// Per-method call counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub fetch_offers: AtomicU32,
    pub publish_offer: AtomicU32,
    pub create_trade: AtomicU32,
    pub fetch_trades: AtomicU32,
    pub fetch_trade: AtomicU32,
    pub fetch_messages: AtomicU32,
    pub submit_transition: AtomicU32,
    pub upload_payment_proof: AtomicU32,
    pub submit_rating: AtomicU32,
}

impl CallCounts {
    /// Total calls across all methods.
    pub fn total(&self) -> u32 {
        self.fetch_offers.load(Ordering::SeqCst)
            + self.publish_offer.load(Ordering::SeqCst)
            + self.create_trade.load(Ordering::SeqCst)
            + self.fetch_trades.load(Ordering::SeqCst)
            + self.fetch_trade.load(Ordering::SeqCst)
            + self.fetch_messages.load(Ordering::SeqCst)
            + self.submit_transition.load(Ordering::SeqCst)
            + self.upload_payment_proof.load(Ordering::SeqCst)
            + self.submit_rating.load(Ordering::SeqCst)
    }

    /// Reconciliation fetches issued so far.
    pub fn fetches(&self) -> u32 {
        self.fetch_trade.load(Ordering::SeqCst)
    }
}

type Queue<T> = Mutex<VecDeque<Result<T, TransportError>>>;

/// Scripted in-memory marketplace backend.
#[derive(Default)]
pub struct ScriptedMarketplace {
    offers: Queue<Vec<Offer>>,
    published: Queue<Offer>,
    created: Queue<Trade>,
    trades: Queue<Vec<Trade>>,
    fetched: Queue<Trade>,
    messages: Queue<Vec<TradeMessage>>,
    transitioned: Queue<Trade>,
    uploaded: Queue<Trade>,
    ratings: Queue<()>,
    /// Fallback for `fetch_trade` when its queue is empty.
    default_trade: Mutex<Option<Trade>>,
    /// Artificial latency applied to `fetch_trade`.
    fetch_delay: Mutex<Option<Duration>>,
    counts: Arc<CallCounts>,
}

impl ScriptedMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared call counters.
    pub fn calls(&self) -> Arc<CallCounts> {
        self.counts.clone()
    }

    pub fn queue_offers(&self, result: Result<Vec<Offer>, TransportError>) {
        self.offers.lock().unwrap().push_back(result);
    }

    pub fn queue_publish(&self, result: Result<Offer, TransportError>) {
        self.published.lock().unwrap().push_back(result);
    }

    pub fn queue_create(&self, result: Result<Trade, TransportError>) {
        self.created.lock().unwrap().push_back(result);
    }

    pub fn queue_trades(&self, result: Result<Vec<Trade>, TransportError>) {
        self.trades.lock().unwrap().push_back(result);
    }

    pub fn queue_fetch(&self, result: Result<Trade, TransportError>) {
        self.fetched.lock().unwrap().push_back(result);
    }

    pub fn queue_messages(&self, result: Result<Vec<TradeMessage>, TransportError>) {
        self.messages.lock().unwrap().push_back(result);
    }

    pub fn queue_transition(&self, result: Result<Trade, TransportError>) {
        self.transitioned.lock().unwrap().push_back(result);
    }

    pub fn queue_upload(&self, result: Result<Trade, TransportError>) {
        self.uploaded.lock().unwrap().push_back(result);
    }

    pub fn queue_rating(&self, result: Result<(), TransportError>) {
        self.ratings.lock().unwrap().push_back(result);
    }

    /// What `fetch_trade` returns once its queue is exhausted.
    pub fn set_default_trade(&self, trade: Trade) {
        *self.default_trade.lock().unwrap() = Some(trade);
    }

    /// Delay every `fetch_trade` by `delay` (virtual time under pause).
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    fn unscripted(method: &str) -> TransportError {
        TransportError::Api {
            message: format!("unscripted call: {method}"),
        }
    }
}

#[async_trait]
impl MarketplaceApi for ScriptedMarketplace {
    async fn fetch_offers(&self) -> Result<Vec<Offer>, TransportError> {
        self.counts.fetch_offers.fetch_add(1, Ordering::SeqCst);
        self.offers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn publish_offer(&self, _draft: &OfferDraft) -> Result<Offer, TransportError> {
        self.counts.publish_offer.fetch_add(1, Ordering::SeqCst);
        self.published
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted("publish_offer")))
    }

    async fn create_trade(
        &self,
        _offer_id: &OfferId,
        _request: &TradeRequest,
    ) -> Result<Trade, TransportError> {
        self.counts.create_trade.fetch_add(1, Ordering::SeqCst);
        self.created
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted("create_trade")))
    }

    async fn fetch_trades(&self) -> Result<Vec<Trade>, TransportError> {
        self.counts.fetch_trades.fetch_add(1, Ordering::SeqCst);
        self.trades
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_trade(&self, id: &TradeId) -> Result<Trade, TransportError> {
        self.counts.fetch_trade.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.fetched.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => match self.default_trade.lock().unwrap().clone() {
                Some(trade) => Ok(trade),
                None => Err(TransportError::NotFound {
                    resource: format!("trades/{id}"),
                }),
            },
        }
    }

    async fn fetch_messages(&self, _id: &TradeId) -> Result<Vec<TradeMessage>, TransportError> {
        self.counts.fetch_messages.fetch_add(1, Ordering::SeqCst);
        self.messages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_transition(
        &self,
        _id: &TradeId,
        _command: &TransitionCommand,
    ) -> Result<Trade, TransportError> {
        self.counts.submit_transition.fetch_add(1, Ordering::SeqCst);
        self.transitioned
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted("submit_transition")))
    }

    async fn upload_payment_proof(
        &self,
        _id: &TradeId,
        _proof: &PaymentProofUpload,
    ) -> Result<Trade, TransportError> {
        self.counts
            .upload_payment_proof
            .fetch_add(1, Ordering::SeqCst);
        self.uploaded
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unscripted("upload_payment_proof")))
    }

    async fn submit_rating(
        &self,
        _id: &TradeId,
        _rating: &TradeRating,
    ) -> Result<(), TransportError> {
        self.counts.submit_rating.fetch_add(1, Ordering::SeqCst);
        self.ratings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(()))
    }
}
