//! LRC lyrics parsing
//!
//! - `lrc`: tokenizer for `[mm:ss.xx]text` files and the LRC writer
//! - `types`: the parsed [`LyricDocument`]

mod lrc;
mod types;

pub use lrc::{
    MAX_TIMESTAMP_MS, Token, Tokenizer, parse_timestamp, stringify_lrc, write_timestamp,
};
pub use types::*;
