//! Backend calls. Every function returns `Result<_, ApiError>`; callers log
//! failures and wait for the next poll rather than retrying.

use gloo_net::http::{Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use relay_shared::channel::CompleteTicketRequest;
use relay_shared::mention::{MentionLookupRequest, MentionLookupResponse};
use relay_shared::message::{BotInfo, SendAck};
use relay_shared::{Channel, Message, OutgoingMessage};

use crate::config::ApiRoutes;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiError {
    #[error("fetch error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("parse error: {0}")]
    Decode(String),

    #[error("rejected: {0}")]
    Rejected(String),
}

async fn checked(request: Request) -> Result<Response, ApiError> {
    let resp = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(ApiError::Status(resp.status()));
    }
    Ok(resp)
}

async fn get_json<T: DeserializeOwned>(request: Request) -> Result<T, ApiError> {
    checked(request)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn get_request(url: &str) -> Result<Request, ApiError> {
    Request::get(url)
        .build()
        .map_err(|e| ApiError::Network(e.to_string()))
}

fn post_body<B: Serialize>(url: &str, body: &B) -> Result<Request, ApiError> {
    Request::post(url)
        .json(body)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Body text of a 2xx write call. A JSON `{error}` or `{ok: false}` body is
/// still a failure; an empty or non-JSON body counts as accepted.
async fn accepted(request: Request) -> Result<(), ApiError> {
    let text = checked(request).await?.text().await.unwrap_or_default();
    if let Ok(ack) = serde_json::from_str::<SendAck>(&text)
        && let Some(reason) = ack.rejection()
    {
        return Err(ApiError::Rejected(reason));
    }
    Ok(())
}

fn encode_segment(raw: &str) -> String {
    String::from(js_sys::encode_uri_component(raw))
}

pub(crate) async fn fetch_channels(routes: &ApiRoutes) -> Result<Vec<Channel>, ApiError> {
    get_json(get_request(&routes.tickets_url())?).await
}

/// Messages for `channel_id`, optionally only those newer than `since_id`.
pub(crate) async fn fetch_messages(
    routes: &ApiRoutes,
    channel_id: &str,
    since_id: Option<u64>,
) -> Result<Vec<Message>, ApiError> {
    let url = routes.messages_url(&encode_segment(channel_id));
    let mut builder = Request::get(&url);
    if let Some(since) = since_id {
        builder = builder.query([("since_id", since.to_string())]);
    }
    let request = builder
        .build()
        .map_err(|e| ApiError::Network(e.to_string()))?;
    get_json(request).await
}

pub(crate) async fn send_message(
    routes: &ApiRoutes,
    message: &OutgoingMessage,
) -> Result<(), ApiError> {
    accepted(post_body(&routes.send_url(), message)?).await
}

pub(crate) async fn fetch_bot_info(routes: &ApiRoutes) -> Result<BotInfo, ApiError> {
    get_json(get_request(&routes.bot_info_url())?).await
}

pub(crate) async fn lookup_mentions(
    routes: &ApiRoutes,
    request: &MentionLookupRequest,
) -> Result<MentionLookupResponse, ApiError> {
    get_json(post_body(&routes.mention_lookup_url(), request)?).await
}

pub(crate) async fn complete_ticket(routes: &ApiRoutes, ticket_id: &str) -> Result<(), ApiError> {
    let body = CompleteTicketRequest {
        ticket_id: ticket_id.to_string(),
    };
    accepted(post_body(&routes.complete_url(), &body)?).await
}
