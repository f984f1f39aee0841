//! HTTP implementation of the marketplace port.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    CreateOfferBody, CreateTradeBody, DisputeBody, Envelope, MessageDto, OfferDto, RatingBody,
    TradeDto,
};
use crate::config::ApiConfig;
use crate::domain::{Offer, OfferDraft, OfferId, Trade, TradeId, TradeMessage};
use crate::error::TransportError;
use crate::port::outbound::{
    MarketplaceApi, PaymentProofUpload, TradeRating, TradeRequest, TransitionCommand,
};

/// HTTP client for the marketplace REST backend.
pub struct HttpMarketplace {
    http: HttpClient,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpMarketplace {
    /// Create a client from connection settings.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and unwrap the uniform response envelope.
    ///
    /// A 404 maps to [`TransportError::NotFound`]; an envelope with
    /// `success == false` maps to [`TransportError::Api`].
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        resource: &str,
    ) -> Result<T, TransportError> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        debug!(resource, status = %status, "Backend response");

        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound {
                resource: resource.to_owned(),
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        envelope.into_data(resource)
    }
}

#[async_trait]
impl MarketplaceApi for HttpMarketplace {
    async fn fetch_offers(&self) -> Result<Vec<Offer>, TransportError> {
        let dtos: Vec<OfferDto> = self
            .execute(self.http.get(self.url("offers")), "offers")
            .await?;
        dtos.into_iter().map(TryInto::try_into).collect()
    }

    async fn publish_offer(&self, draft: &OfferDraft) -> Result<Offer, TransportError> {
        let body = CreateOfferBody::from(draft);
        let dto: OfferDto = self
            .execute(self.http.post(self.url("offers")).json(&body), "offers")
            .await?;
        dto.try_into()
    }

    async fn create_trade(
        &self,
        offer_id: &OfferId,
        request: &TradeRequest,
    ) -> Result<Trade, TransportError> {
        let body = CreateTradeBody {
            amount: request.amount,
            payment_method_id: request.payment_method_id.as_str().to_owned(),
        };
        let path = format!("offers/{offer_id}/trade");
        let dto: TradeDto = self
            .execute(self.http.post(self.url(&path)).json(&body), &path)
            .await?;
        dto.try_into()
    }

    async fn fetch_trades(&self) -> Result<Vec<Trade>, TransportError> {
        let dtos: Vec<TradeDto> = self
            .execute(self.http.get(self.url("trades")), "trades")
            .await?;
        dtos.into_iter().map(TryInto::try_into).collect()
    }

    async fn fetch_trade(&self, id: &TradeId) -> Result<Trade, TransportError> {
        let path = format!("trades/{id}");
        let dto: TradeDto = self.execute(self.http.get(self.url(&path)), &path).await?;
        dto.try_into()
    }

    async fn fetch_messages(&self, id: &TradeId) -> Result<Vec<TradeMessage>, TransportError> {
        let path = format!("trades/{id}/messages");
        let dtos: Vec<MessageDto> = self.execute(self.http.get(self.url(&path)), &path).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn submit_transition(
        &self,
        id: &TradeId,
        command: &TransitionCommand,
    ) -> Result<Trade, TransportError> {
        let path = format!("trades/{id}/{}", command.endpoint());
        let builder = match command {
            TransitionCommand::Dispute { reason } => self.http.post(self.url(&path)).json(
                &DisputeBody {
                    reason: reason.clone(),
                },
            ),
            _ => self.http.post(self.url(&path)),
        };
        let dto: TradeDto = self.execute(builder, &path).await?;
        dto.try_into()
    }

    async fn upload_payment_proof(
        &self,
        id: &TradeId,
        proof: &PaymentProofUpload,
    ) -> Result<Trade, TransportError> {
        let part = Part::bytes(proof.bytes.clone())
            .file_name(proof.file_name.clone())
            .mime_str(&proof.content_type)?;
        let mut form = Form::new().part("file", part);
        if let Some(note) = &proof.note {
            form = form.text("note", note.clone());
        }

        let path = format!("trades/{id}/payment-proof");
        let dto: TradeDto = self
            .execute(self.http.post(self.url(&path)).multipart(form), &path)
            .await?;
        dto.try_into()
    }

    async fn submit_rating(
        &self,
        id: &TradeId,
        rating: &TradeRating,
    ) -> Result<(), TransportError> {
        let body = RatingBody {
            score: rating.score,
            comment: rating.comment.clone(),
        };
        let path = format!("trades/{id}/rating");
        // The rating endpoint returns an empty data object.
        let _: serde_json::Value = self
            .execute(self.http.post(self.url(&path)).json(&body), &path)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpMarketplace {
        HttpMarketplace::new(&ApiConfig {
            base_url: base.into(),
            auth_token: None,
            user_id: None,
        })
    }

    #[test]
    fn url_joins_without_double_slash() {
        let c = client("https://api.example.com/");
        assert_eq!(c.url("offers"), "https://api.example.com/offers");

        let c = client("https://api.example.com");
        assert_eq!(c.url("trades/t-1"), "https://api.example.com/trades/t-1");
    }
}
