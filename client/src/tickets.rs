use std::cell::RefCell;

use gloo_timers::callback::Interval;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use relay_shared::{Channel, PollGuard, Region, RegionFilter, filter_channels};

use crate::api;
use crate::app::{Config, Session, with_guard};
use crate::chat;

thread_local! {
    static CHANNEL_POLL: RefCell<Option<Interval>> = const { RefCell::new(None) };
}

/// Fetch the channel list unless a fetch is already in flight.
pub(crate) fn refresh_channels(session: Session, config: Config) {
    let Some(generation) = with_guard(session.list_guard, PollGuard::try_begin) else {
        return;
    };
    let routes = config.0.with_value(|c| c.routes.clone());

    spawn_local(async move {
        let result = api::fetch_channels(&routes).await;
        if !with_guard(session.list_guard, |g| g.finish(generation)) {
            return;
        }
        match result {
            Ok(channels) => {
                session.channels_offline.set(false);
                if session.channels.with_untracked(|current| *current != channels) {
                    session.channels.set(channels);
                }
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("Channel list fetch failed: {e}").into());
                session.channels_offline.set(true);
            }
        }
    });
}

fn start_polling(session: Session, config: Config) {
    let interval_ms = config.0.with_value(|c| c.channel_poll_ms);
    refresh_channels(session, config);
    let interval = Interval::new(interval_ms, move || refresh_channels(session, config));
    CHANNEL_POLL.with(|slot| {
        // Replacing the handle cancels any previous loop.
        *slot.borrow_mut() = Some(interval);
    });
}

fn stop_polling() {
    CHANNEL_POLL.with(|slot| {
        slot.borrow_mut().take();
    });
}

#[component]
fn RegionButton(filter: RegionFilter) -> impl IntoView {
    let session: Session = expect_context();
    view! {
        <button
            style=move || {
                let active = session.region.get() == filter;
                format!(
                    "flex: 1; padding: 6px 0; background: {}; color: {}; border: 1px solid #22222e; font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; cursor: pointer;",
                    if active { "#00f0ff" } else { "transparent" },
                    if active { "#0a0a0f" } else { "#8a8a9a" },
                )
            }
            on:click=move |_| session.set_region(filter)
        >
            {filter.label()}
        </button>
    }
}

#[component]
fn TicketRow(channel: Channel) -> impl IntoView {
    let session: Session = expect_context();
    let config: Config = expect_context();
    let id = channel.id.clone();
    let is_active = {
        let id = id.clone();
        move || session.current.with(|c| c.as_deref() == Some(id.as_str()))
    };
    let on_click = move |_| {
        if session.current.get_untracked().as_deref() == Some(id.as_str()) {
            return;
        }
        session.select(Some(id.clone()));
        chat::refresh_feed(session, config);
    };

    let status = channel.status.map(|s| {
        let color = if s.is_open() { "#00f0ff" } else { "#6a6a7a" };
        view! {
            <span style=format!("font-size: 0.6rem; padding: 1px 4px; border: 1px solid {color}; color: {color};")>
                {s.badge()}
            </span>
        }
    });
    let unread = channel.has_unread().then(|| {
        view! {
            <span style="min-width: 18px; padding: 1px 5px; border-radius: 9px; background: #ff6600; color: #0a0a0f; font-size: 0.65rem; font-weight: 700; text-align: center;">
                {channel.unread}
            </span>
        }
    });

    view! {
        <div
            style=move || format!(
                "display: flex; align-items: center; gap: 8px; padding: 10px 14px; cursor: pointer; border-left: 3px solid {}; background: {};",
                if is_active() { "#00f0ff" } else { "transparent" },
                if is_active() { "rgba(0,240,255,0.08)" } else { "transparent" },
            )
            on:click=on_click
        >
            <div style="flex: 1; min-width: 0;">
                <div style="font-size: 0.85rem; white-space: nowrap; overflow: hidden; text-overflow: ellipsis;">
                    {channel.display_name()}
                </div>
                <div style="font-family: 'JetBrains Mono', monospace; font-size: 0.65rem; color: #5a5a6a;">
                    {format!("{} · {}", channel.region().label(), channel.short_id())}
                </div>
            </div>
            {status}
            {unread}
        </div>
    }
}

/// Region filter plus the polled ticket list.
#[component]
pub(crate) fn TicketList() -> impl IntoView {
    let session: Session = expect_context();
    let config: Config = expect_context();

    Effect::new(move || {
        start_polling(session, config);
        on_cleanup(stop_polling);
    });

    let visible = Memo::new(move |_| {
        session
            .channels
            .with(|channels| filter_channels(channels, session.region.get()))
    });

    view! {
        <aside style="display: flex; flex-direction: column; width: 300px; border-right: 1px solid #22222e;">
            <div style="display: flex; gap: 4px; padding: 10px;">
                <RegionButton filter=RegionFilter::All />
                {Region::ALL
                    .into_iter()
                    .map(|region| view! { <RegionButton filter=RegionFilter::Only(region) /> })
                    .collect_view()}
            </div>
            <div style="flex: 1; overflow-y: auto;">
                {move || {
                    let channels = visible.get();
                    if channels.is_empty() {
                        let text = if session.channels_offline.get() {
                            "LINK OFFLINE"
                        } else {
                            "NO SIGNALS DETECTED"
                        };
                        return view! {
                            <div style="padding: 24px; text-align: center; font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; color: #5a5a6a;">
                                {text}
                            </div>
                        }
                        .into_any();
                    }
                    channels
                        .into_iter()
                        .map(|channel| view! { <TicketRow channel=channel /> })
                        .collect_view()
                        .into_any()
                }}
            </div>
        </aside>
    }
}
