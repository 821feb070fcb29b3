use relay_shared::message::DEFAULT_AGENT_NAME;
use relay_shared::scroll::NEAR_BOTTOM_PX;

pub(crate) const CHANNEL_POLL_MS: u32 = 3_000;
pub(crate) const MESSAGE_POLL_MS: u32 = 2_000;
pub(crate) const REFETCH_AFTER_SEND_MS: u32 = 300;
pub(crate) const SAVE_INDICATOR_MS: u32 = 500;
pub(crate) const COPY_FEEDBACK_MS: u32 = 2_000;
pub(crate) const SETTINGS_KEY: &str = "relay_settings";

/// Polls faster than this are clamped so a bad query string cannot hammer the backend.
const MIN_POLL_MS: u32 = 500;

/// Backend endpoint paths, joined onto `base`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApiRoutes {
    pub base: String,
    pub tickets: String,
    /// Message list path; `{id}` is replaced by the encoded channel id.
    pub messages: String,
    pub send: String,
    pub bot_info: String,
    pub mention_lookup: String,
    pub complete: String,
}

impl Default for ApiRoutes {
    fn default() -> Self {
        Self {
            base: String::new(),
            tickets: "/api/get_tickets".into(),
            messages: "/api/get_messages/{id}".into(),
            send: "/api/send_message".into(),
            bot_info: "/api/botinfo".into(),
            mention_lookup: "/api/mention_lookup".into(),
            complete: "/api/complete_ticket".into(),
        }
    }
}

impl ApiRoutes {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    pub fn tickets_url(&self) -> String {
        self.url(&self.tickets)
    }

    pub fn messages_url(&self, encoded_channel_id: &str) -> String {
        self.url(&self.messages.replace("{id}", encoded_channel_id))
    }

    pub fn send_url(&self) -> String {
        self.url(&self.send)
    }

    pub fn bot_info_url(&self) -> String {
        self.url(&self.bot_info)
    }

    pub fn mention_lookup_url(&self) -> String {
        self.url(&self.mention_lookup)
    }

    pub fn complete_url(&self) -> String {
        self.url(&self.complete)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DashboardConfig {
    pub routes: ApiRoutes,
    pub agent_name: String,
    pub channel_poll_ms: u32,
    pub message_poll_ms: u32,
    pub refetch_after_send_ms: u32,
    pub near_bottom_px: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            routes: ApiRoutes::default(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            channel_poll_ms: CHANNEL_POLL_MS,
            message_poll_ms: MESSAGE_POLL_MS,
            refetch_after_send_ms: REFETCH_AFTER_SEND_MS,
            near_bottom_px: NEAR_BOTTOM_PX,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `?api=..&agent=..&poll=..&msg_poll=..` from the page URL.
    ///
    /// Values are form-decoded (`+` and `%XX`). Unknown keys, empty values and
    /// unparseable numbers are ignored; poll intervals are raised to at least
    /// `MIN_POLL_MS`.
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, raw)) = pair.split_once('=') else {
                continue;
            };
            let Some(value) = form_decode(raw) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match key {
                "api" => config.routes.base = value,
                "agent" => config.agent_name = value,
                "poll" => {
                    if let Ok(ms) = value.parse::<u32>() {
                        config.channel_poll_ms = ms.max(MIN_POLL_MS);
                    }
                }
                "msg_poll" => {
                    if let Ok(ms) = value.parse::<u32>() {
                        config.message_poll_ms = ms.max(MIN_POLL_MS);
                    }
                }
                _ => {}
            }
        }
        config
    }

    /// Config for the current page, read from `window.location.search`.
    pub fn from_location() -> Self {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        Self::from_query(&search)
    }
}

/// `application/x-www-form-urlencoded` value decoding. `None` when the
/// escapes do not form valid UTF-8.
fn form_decode(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|value| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::{ApiRoutes, DashboardConfig, MESSAGE_POLL_MS};

    #[test]
    fn default_routes_match_ticket_backend() {
        let routes = ApiRoutes::default();
        assert_eq!(routes.tickets_url(), "/api/get_tickets");
        assert_eq!(routes.messages_url("42"), "/api/get_messages/42");
        assert_eq!(routes.send_url(), "/api/send_message");
    }

    #[test]
    fn base_is_joined_without_double_slash() {
        let routes = ApiRoutes {
            base: "https://relay.example/".into(),
            ..ApiRoutes::default()
        };
        assert_eq!(routes.bot_info_url(), "https://relay.example/api/botinfo");
    }

    #[test]
    fn query_overrides_selected_fields() {
        let config = DashboardConfig::from_query("?api=http://localhost:5000&agent=Tryout+Desk&poll=100");
        assert_eq!(config.routes.base, "http://localhost:5000");
        assert_eq!(config.agent_name, "Tryout Desk");
        assert_eq!(config.channel_poll_ms, 500);
        assert_eq!(config.message_poll_ms, MESSAGE_POLL_MS);
    }

    #[test]
    fn percent_encoded_values_are_decoded() {
        let config =
            DashboardConfig::from_query("?api=http%3A%2F%2Flocalhost%3A5000&agent=Tryout%20Desk");
        assert_eq!(config.routes.base, "http://localhost:5000");
        assert_eq!(config.agent_name, "Tryout Desk");
        assert_eq!(config.routes.tickets_url(), "http://localhost:5000/api/get_tickets");
    }

    #[test]
    fn invalid_escape_is_ignored() {
        let config = DashboardConfig::from_query("?agent=%FF%FE");
        assert_eq!(config.agent_name, DashboardConfig::default().agent_name);
    }

    #[test]
    fn garbage_query_keeps_defaults() {
        assert_eq!(
            DashboardConfig::from_query("?poll=abc&&=x&agent="),
            DashboardConfig::default()
        );
    }
}
