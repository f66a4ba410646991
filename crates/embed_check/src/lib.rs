//! Validation of user-written rich message embeds.
//!
//! [`check_json`] turns the raw JSON text of an embed into a [`Report`] of errors
//! and warnings. Image links found in the embed are probed over the network through
//! an [`ImageProber`], with outcomes memoized in a caller-owned [`ProbeCache`].

#[macro_use]
extern crate serde;

extern crate tracing as log;

pub mod cache;
pub mod error;
pub mod message;
pub mod primitives;
pub mod probe;
pub mod report;
pub mod session;
pub mod validator;

pub use cache::{Clock, ProbeCache, SystemClock};
pub use error::Error;
pub use message::Message;
pub use probe::{Fetch, HttpFetcher, ImageOutcome, ImageProber, ProbeResponse};
pub use report::{Issue, Report, Severity};
pub use session::{Session, Update};
pub use validator::check_json;

/// Embed size limits
pub mod limits {
    pub const TITLE: usize = 256;
    pub const DESCRIPTION: usize = 4096;
    pub const FOOTER_TEXT: usize = 2048;
    pub const AUTHOR_NAME: usize = 256;
    pub const FIELD_NAME: usize = 256;
    pub const FIELD_VALUE: usize = 1024;
    pub const MAX_FIELDS: usize = 25;

    /// Limit on the raw JSON text, in characters
    pub const TOTAL: usize = 6000;

    pub const MAX_COLOR: u64 = 0xFF_FF_FF;
}
