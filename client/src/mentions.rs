use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use relay_shared::scan_mentions;

use crate::api;
use crate::app::{Config, Session};

/// Queue mention ids seen in the feed and send the next lookup batch, if
/// none is outstanding. Bookkeeping is untracked; only a completed lookup
/// notifies the feed to re-render.
pub(crate) fn request_missing(session: Session, config: Config) {
    let tokens: Vec<_> = session
        .feed
        .with_untracked(|feed| feed.iter().flat_map(|m| scan_mentions(&m.content)).collect());

    let mut batch = None;
    session.mentions.update_untracked(|resolver| {
        resolver.enqueue(tokens);
        batch = resolver.take_batch();
    });
    let Some(request) = batch else {
        return;
    };

    let routes = config.0.with_value(|c| c.routes.clone());
    spawn_local(async move {
        match api::lookup_mentions(&routes, &request).await {
            Ok(response) => {
                session.mentions.update(|resolver| resolver.complete(response));
                // Ids queued while this batch was out go next.
                request_missing(session, config);
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("Mention lookup failed: {e}").into());
                session.mentions.update_untracked(|resolver| resolver.fail());
            }
        }
    });
}
