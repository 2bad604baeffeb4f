//! Quote domain — real-time tick records from the streaming feed.

pub mod state;
pub mod wire;

pub use state::{QuoteBook, DEFAULT_HISTORY_CAP};
pub use wire::{decode, decode_with, DecodeConfig, FieldLayout, FrameError, QuoteRecord};
