use std::cell::RefCell;

use gloo_timers::callback::{Interval, Timeout};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use relay_shared::colors::hex_css;
use relay_shared::scroll::{ScrollMetrics, scroll_after_update};
use relay_shared::{
    FetchKind, Message, OutgoingMessage, PollGuard, author_color, render_content,
};

use crate::api;
use crate::app::{Config, Session, with_guard};
use crate::mentions;
use crate::tickets;
use crate::time_format::format_clock;

thread_local! {
    static FEED_POLL: RefCell<Option<Interval>> = const { RefCell::new(None) };
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Fetch new messages for the selected channel and merge them into the feed.
///
/// Skipped while a fetch is in flight. A response that arrives after the
/// channel changed carries a stale generation and is dropped.
pub(crate) fn refresh_feed(session: Session, config: Config) {
    let Some(channel_id) = session.current.get_untracked() else {
        return;
    };
    let Some(generation) = with_guard(session.feed_guard, PollGuard::try_begin) else {
        return;
    };
    let kind = session.feed.with_untracked(|feed| feed.next_fetch());
    let since = match kind {
        FetchKind::Since(id) => Some(id),
        FetchKind::Full => None,
    };
    let routes = config.0.with_value(|c| c.routes.clone());

    spawn_local(async move {
        let result = api::fetch_messages(&routes, &channel_id, since).await;
        if !with_guard(session.feed_guard, |g| g.finish(generation)) {
            return;
        }
        match result {
            Ok(batch) => {
                let identity = session.identity.get_untracked();
                let mut next = session.feed.get_untracked();
                let arrived = next.apply(batch, kind, &identity, js_sys::Date::now());
                if session.feed.with_untracked(|current| *current != next) {
                    session.feed.set(next);
                }
                // A failed lookup is retried on the next poll, not only on new traffic.
                if arrived > 0 || session.mentions.with_untracked(|m| m.needs_rescan()) {
                    mentions::request_missing(session, config);
                }
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("Message fetch failed: {e}").into());
            }
        }
    });
}

fn start_polling(session: Session, config: Config) {
    let interval_ms = config.0.with_value(|c| c.message_poll_ms);
    let interval = Interval::new(interval_ms, move || refresh_feed(session, config));
    FEED_POLL.with(|slot| {
        *slot.borrow_mut() = Some(interval);
    });
}

fn stop_polling() {
    FEED_POLL.with(|slot| {
        slot.borrow_mut().take();
    });
}

fn complete_current(session: Session, config: Config) {
    let Some(ticket_id) = session.current.get_untracked() else {
        return;
    };
    let confirmed = web_sys::window()
        .and_then(|w| {
            w.confirm_with_message("Mark this ticket as completed? It will leave the list.")
                .ok()
        })
        .unwrap_or(false);
    if !confirmed {
        return;
    }

    let routes = config.0.with_value(|c| c.routes.clone());
    spawn_local(async move {
        match api::complete_ticket(&routes, &ticket_id).await {
            Ok(()) => {
                if session.current.get_untracked().as_deref() == Some(ticket_id.as_str()) {
                    session.select(None);
                }
                tickets::refresh_channels(session, config);
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("Complete ticket failed: {e}").into());
                alert(&format!("COULD NOT COMPLETE TICKET: {e}"));
            }
        }
    });
}

#[component]
pub(crate) fn ChatHeader() -> impl IntoView {
    let session: Session = expect_context();
    let config: Config = expect_context();

    let title = move || {
        let Some(id) = session.current.get() else {
            return "AWAITING TARGET SELECTION...".to_string();
        };
        let name = session.channels.with(|channels| {
            channels
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.display_name())
        });
        format!("TARGET ACQUIRED: {}", name.unwrap_or(id))
    };

    view! {
        <div style="display: flex; align-items: center; justify-content: space-between; padding: 12px 18px; border-bottom: 1px solid #22222e;">
            <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.8rem; letter-spacing: 0.08em; color: #00f0ff;">
                {title}
            </span>
            <Show when=move || session.current.with(Option::is_some)>
                <button
                    style="padding: 6px 12px; background: transparent; color: #ff6600; border: 1px solid #ff6600; font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; cursor: pointer;"
                    on:click=move |_| complete_current(session, config)
                >
                    "COMPLETE"
                </button>
            </Show>
        </div>
    }
}

fn metrics_of(el: &web_sys::Element) -> ScrollMetrics {
    ScrollMetrics {
        scroll_top: el.scroll_top() as f64,
        scroll_height: el.scroll_height() as f64,
        client_height: el.client_height() as f64,
    }
}

fn message_view(message: Message, is_self: bool, html: String) -> impl IntoView {
    let name_color = if is_self {
        "#00f0ff".to_string()
    } else {
        hex_css(author_color(&message.author_name))
    };
    let row_style = format!(
        "display: flex; justify-content: {}; padding: 4px 18px;{}",
        if is_self { "flex-end" } else { "flex-start" },
        if message.is_optimistic() { " opacity: 0.55;" } else { "" },
    );
    let bubble_style = format!(
        "max-width: 70%; padding: 8px 12px; background: {}; border: 1px solid {};",
        if is_self { "rgba(0,240,255,0.08)" } else { "#12121a" },
        if is_self { "rgba(0,240,255,0.3)" } else { "#22222e" },
    );
    let clock = format_clock(&message.timestamp);

    view! {
        <div style=row_style>
            <div style=bubble_style>
                <div style="display: flex; gap: 8px; align-items: baseline; margin-bottom: 4px;">
                    <span style=format!("font-size: 0.75rem; font-weight: 600; color: {name_color};")>
                        {message.author_name}
                    </span>
                    <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.6rem; color: #5a5a6a;">
                        {clock}
                    </span>
                </div>
                <div style="font-size: 0.85rem; line-height: 1.4; word-break: break-word;" inner_html=html></div>
            </div>
        </div>
    }
}

/// Scrolling message list for the selected channel.
#[component]
pub(crate) fn ChatFeed() -> impl IntoView {
    let session: Session = expect_context();
    let config: Config = expect_context();
    let container = NodeRef::<leptos::html::Div>::new();
    let threshold = config.0.with_value(|c| c.near_bottom_px);
    // Geometry as of the last scroll event, i.e. before the next re-render.
    let last_metrics = StoredValue::new(None::<ScrollMetrics>);
    // Channel whose first batch has already been pinned to the bottom.
    let pinned_channel = StoredValue::new(None::<String>);

    Effect::new(move || {
        start_polling(session, config);
        on_cleanup(stop_polling);
    });

    Effect::new(move || {
        let (channel, loaded) = session
            .feed
            .with(|feed| (feed.channel_id().map(str::to_string), feed.is_loaded()));
        session.mentions.track();
        let Some(el) = container.get() else {
            return;
        };
        let force = loaded && pinned_channel.with_value(|pinned| *pinned != channel);
        if force {
            pinned_channel.set_value(channel);
        }
        let after = metrics_of(&el);
        let before = last_metrics.get_value().unwrap_or(after);
        let top = scroll_after_update(before, after, threshold, force);
        el.set_scroll_top(top as i32);
        last_metrics.set_value(Some(metrics_of(&el)));
    });

    let on_scroll = move |_| {
        if let Some(el) = container.get_untracked() {
            last_metrics.set_value(Some(metrics_of(&el)));
        }
    };

    let placeholder = |text: &'static str| {
        view! {
            <div style="padding: 48px; text-align: center; font-family: 'JetBrains Mono', monospace; font-size: 0.8rem; color: #5a5a6a;">
                {text}
            </div>
        }
        .into_any()
    };

    view! {
        <div node_ref=container on:scroll=on_scroll style="flex: 1; overflow-y: auto; padding: 12px 0;">
            {move || {
                if session.current.with(Option::is_none) {
                    return placeholder("SELECT A TICKET TO INITIATE LINK");
                }
                let identity = session.identity.get();
                session.mentions.with(|resolver| {
                    session.feed.with(|feed| {
                        if feed.is_loaded() && feed.is_empty() {
                            return placeholder("NO DATA LOGGED YET");
                        }
                        feed.iter()
                            .map(|m| {
                                let html = render_content(&m.content, resolver);
                                message_view(m.clone(), identity.is_self(m), html)
                            })
                            .collect_view()
                            .into_any()
                    })
                })
            }}
        </div>
    }
}

/// Text input and send button for the selected channel.
#[component]
pub(crate) fn Composer() -> impl IntoView {
    let session: Session = expect_context();
    let config: Config = expect_context();
    let draft = RwSignal::new(String::new());

    let send = move || {
        let text = draft.get_untracked();
        let content = text.trim().to_string();
        if content.is_empty() || session.sending.get_untracked() {
            return;
        }
        let Some(channel_id) = session.current.get_untracked() else {
            return;
        };
        let (routes, agent_name, refetch_ms) = config.0.with_value(|c| {
            (c.routes.clone(), c.agent_name.clone(), c.refetch_after_send_ms)
        });

        let created_ms = js_sys::Date::now();
        session.sending.set(true);
        session.feed.update(|feed| {
            feed.push_optimistic(Message::optimistic(&channel_id, &agent_name, &content, created_ms));
        });
        draft.set(String::new());

        spawn_local(async move {
            let outgoing = OutgoingMessage::new(&channel_id, &content);
            match api::send_message(&routes, &outgoing).await {
                Ok(()) => {
                    Timeout::new(refetch_ms, move || refresh_feed(session, config)).forget();
                }
                Err(e) => {
                    web_sys::console::warn_1(&format!("Send failed: {e}").into());
                    session.feed.update(|feed| {
                        feed.remove_optimistic(&content, created_ms);
                    });
                    if draft.with_untracked(String::is_empty) {
                        draft.set(text);
                    }
                    alert(&format!("TRANSMISSION FAILED: {e}"));
                }
            }
            session.sending.set(false);
        });
    };

    let disabled = move || session.sending.get() || session.current.with(Option::is_none);

    view! {
        <div style="display: flex; gap: 8px; padding: 12px 18px; border-top: 1px solid #22222e;">
            <input
                type="text"
                placeholder="TRANSMIT MESSAGE..."
                style="flex: 1; padding: 10px 12px; background: #12121a; border: 1px solid #22222e; color: #e0e0e8; font-family: 'Inter', system-ui, sans-serif; font-size: 0.85rem; outline: none;"
                prop:value=move || draft.get()
                prop:disabled=disabled
                on:input=move |ev| draft.set(event_target_value(&ev))
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Enter" && !ev.shift_key() {
                        ev.prevent_default();
                        send();
                    }
                }
            />
            <button
                style="padding: 10px 18px; background: #00f0ff; color: #0a0a0f; border: none; font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; font-weight: 700; cursor: pointer;"
                prop:disabled=disabled
                on:click=move |_| send()
            >
                "SEND"
            </button>
        </div>
    }
}
