// Library crate - signal pipeline plus its data-acquisition collaborators

//! Initial Balance breakout engine for ES futures.
//!
//! Minute bars in, daily trade recommendations out:
//! - Initial Balance extraction over the 08:00-08:15:59 exchange-local window
//! - Daily bias scoring from price change and late-session volume
//! - Magnet-level (multiples of 50) profit targets
//! - Close-basis WIN/LOSS labeling over the most recent trading days
//!
//! The signal pipeline (`initial_balance`, `bias`, `magnets`, `engine`) is
//! pure and synchronous. Data acquisition (`fetch`, `cache`) and output
//! (`report`) are collaborators around it.

pub mod bars;
pub mod bias;
pub mod cache;
pub mod calendar;
pub mod engine;
pub mod fetch;
pub mod initial_balance;
pub mod magnets;
pub mod report;

// Re-export commonly used types
pub use bars::{Bar, BarSeries};
pub use bias::daily_bias;
pub use cache::FetchCache;
pub use calendar::ExchangeCalendar;
pub use engine::{
    generate_recommendations, Action, EngineConfig, Recommendation, RecommendationSummary,
    TradeOutcome,
};
pub use fetch::MarketDataClient;
pub use initial_balance::{compute_initial_balance, InitialBalance};
pub use magnets::magnet_levels;
