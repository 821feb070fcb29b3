use gloo_storage::Storage;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use relay_shared::{
    Channel, Feed, MentionResolver, PollGuard, RegionFilter, SelfIdentity,
};

use crate::api;
use crate::chat::{ChatFeed, ChatHeader, Composer};
use crate::config::{DashboardConfig, SETTINGS_KEY};
use crate::stats_panel::StatsPanel;
use crate::tickets::TicketList;

/// Top-level page shown in the main area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub(crate) enum View {
    #[default]
    Tickets,
    Qualifications,
}

/// Read-only dashboard configuration, resolved once at startup.
#[derive(Clone, Copy)]
pub(crate) struct Config(pub StoredValue<DashboardConfig>);

#[derive(serde::Serialize, serde::Deserialize, Default)]
#[serde(default)]
struct Settings {
    view: View,
    region: RegionFilter,
}

/// All ticket/feed state for the session. Components read it from context
/// instead of sharing module-level globals.
#[derive(Clone, Copy)]
pub(crate) struct Session {
    pub channels: RwSignal<Vec<Channel>>,
    /// Set when the last channel list fetch failed.
    pub channels_offline: RwSignal<bool>,
    pub current: RwSignal<Option<String>>,
    pub region: RwSignal<RegionFilter>,
    pub feed: RwSignal<Feed>,
    pub mentions: RwSignal<MentionResolver>,
    pub identity: RwSignal<SelfIdentity>,
    pub sending: RwSignal<bool>,
    pub feed_guard: StoredValue<PollGuard>,
    pub list_guard: StoredValue<PollGuard>,
}

impl Session {
    fn new(region: RegionFilter, agent_name: String) -> Self {
        Self {
            channels: RwSignal::new(Vec::new()),
            channels_offline: RwSignal::new(false),
            current: RwSignal::new(None),
            region: RwSignal::new(region),
            feed: RwSignal::new(Feed::default()),
            mentions: RwSignal::new(MentionResolver::default()),
            identity: RwSignal::new(SelfIdentity {
                bot_id: None,
                agent_name,
            }),
            sending: RwSignal::new(false),
            feed_guard: StoredValue::new(PollGuard::default()),
            list_guard: StoredValue::new(PollGuard::default()),
        }
    }

    /// Switch the selected channel. Any feed response still in flight
    /// belongs to the old generation and will be dropped.
    pub fn select(&self, channel_id: Option<String>) {
        with_guard(self.feed_guard, |g| g.advance());
        self.feed.set(
            channel_id
                .as_deref()
                .map(Feed::for_channel)
                .unwrap_or_default(),
        );
        self.current.set(channel_id);
    }

    pub fn set_region(&self, region: RegionFilter) {
        if self.region.get_untracked() == region {
            return;
        }
        self.region.set(region);
        with_guard(self.list_guard, |g| g.advance());
        self.select(None);
    }
}

/// Run `f` against a stored guard and write the result back.
pub(crate) fn with_guard<R>(guard: StoredValue<PollGuard>, f: impl FnOnce(&mut PollGuard) -> R) -> R {
    let mut value = guard.get_value();
    let out = f(&mut value);
    guard.set_value(value);
    out
}

fn load_bot_identity(session: Session, config: Config) {
    let routes = config.0.with_value(|c| c.routes.clone());
    spawn_local(async move {
        match api::fetch_bot_info(&routes).await {
            Ok(bot) => {
                web_sys::console::info_1(&format!("Relay bot: {} ({})", bot.name, bot.id).into());
                session.identity.update(|identity| identity.bot_id = Some(bot.id));
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("Bot info fetch failed: {e}").into());
            }
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    let config = DashboardConfig::from_location();
    let saved: Settings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();

    let view_mode: RwSignal<View> = RwSignal::new(saved.view);
    let session = Session::new(saved.region, config.agent_name.clone());
    let config = Config(StoredValue::new(config));

    provide_context(config);
    provide_context(session);

    // Persist settings to localStorage on any change
    Effect::new(move || {
        let settings = Settings {
            view: view_mode.get(),
            region: session.region.get(),
        };
        let _ = gloo_storage::LocalStorage::set(SETTINGS_KEY, &settings);
    });

    load_bot_identity(session, config);

    let nav_button = move |target: View, label: &'static str| {
        view! {
            <button
                style=move || {
                    let active = view_mode.get() == target;
                    format!(
                        "padding: 8px 18px; background: {}; color: {}; border: 1px solid {}; font-family: 'JetBrains Mono', monospace; font-size: 0.8rem; letter-spacing: 0.12em; cursor: pointer;",
                        if active { "rgba(0,240,255,0.12)" } else { "transparent" },
                        if active { "#00f0ff" } else { "#6a6a7a" },
                        if active { "#00f0ff" } else { "#22222e" },
                    )
                }
                on:click=move |_| view_mode.set(target)
            >
                {label}
            </button>
        }
    };

    view! {
        <div style="display: flex; flex-direction: column; height: 100vh; background: #0a0a0f; color: #e0e0e8; font-family: 'Inter', system-ui, sans-serif;">
            <header style="display: flex; align-items: center; justify-content: space-between; padding: 12px 20px; border-bottom: 1px solid #22222e;">
                <span style="font-family: 'Silkscreen', monospace; font-size: 1rem; letter-spacing: 0.2em; color: #00f0ff;">"TRYOUT RELAY"</span>
                <nav style="display: flex; gap: 8px;">
                    {nav_button(View::Tickets, "TICKETS")}
                    {nav_button(View::Qualifications, "QUALIFICATIONS")}
                </nav>
            </header>
            <Show
                when=move || view_mode.get() == View::Tickets
                fallback=|| view! { <StatsPanel /> }
            >
                <main style="display: flex; flex: 1; min-height: 0;">
                    <TicketList />
                    <section style="display: flex; flex-direction: column; flex: 1; min-width: 0;">
                        <ChatHeader />
                        <ChatFeed />
                        <Composer />
                    </section>
                </main>
            </Show>
        </div>
    }
}
