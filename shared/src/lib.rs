pub mod channel;
pub mod chart;
pub mod colors;
pub mod error;
pub mod feed;
pub mod markdown;
pub mod mention;
pub mod message;
pub mod poll;
pub mod rank;
pub mod scroll;
pub mod snapshot;
pub mod stats;
mod wire;

pub use channel::{Channel, Region, RegionFilter, TicketStatus, filter_channels};
pub use chart::{ChartLayout, DrawCommand, TextAlign, chart_commands};
pub use colors::author_color;
pub use error::SnapshotError;
pub use feed::{Feed, FetchKind};
pub use markdown::render_content;
pub use mention::{MentionResolver, scan_mentions};
pub use message::{Message, OutgoingMessage, SelfIdentity};
pub use poll::{Generation, PollGuard};
pub use rank::{Classification, classify};
pub use snapshot::{SNAPSHOT_KEY, SnapshotStore, StatSnapshot};
pub use stats::{StatInputSet, StatMode};
