//! Orchestration for dealhour: strategy building, affiliate links, daily
//! generation and the send-from-queue worker, plus the Telegram channel.

pub mod affiliate;
pub mod error;
pub mod generator;
pub mod message;
pub mod sender;
pub mod strategy;
pub mod telegram;
pub mod traits;

pub use affiliate::{AffiliateLinker, DEFAULT_CAMPAIGN_ID};
pub use error::{ChannelError, PipelineError};
pub use generator::{DailyGenerator, GeneratorConfig};
pub use message::render_caption;
pub use sender::{QueueSender, SenderConfig};
pub use strategy::{random_strategy, strategy_for_niche};
pub use telegram::TelegramChannel;
pub use traits::{Channel, DealSource, Enricher, Ledger};
