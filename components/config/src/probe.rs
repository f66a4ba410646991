use std::time::Duration;

use crate::util;

pub const DEFAULT_USER_AGENT: &str = "EmbedCheck/1.0 (link probe)";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

crate::section! {
    #[serde(default)]
    pub struct Probe {
        /// Upper bound on a single image probe, from sending the request to receiving headers.
        ///
        /// A probe that runs over is reported as "could not be checked".
        #[serde(deserialize_with = "util::duration::deserialize")]
        pub timeout: Duration = DEFAULT_TIMEOUT => "EMBED_CHECK_PROBE_TIMEOUT" | util::parse_duration[DEFAULT_TIMEOUT],

        #[serde(deserialize_with = "util::duration::deserialize")]
        pub connect_timeout: Duration = DEFAULT_CONNECT_TIMEOUT => "EMBED_CHECK_CONNECT_TIMEOUT" | util::parse_duration[DEFAULT_CONNECT_TIMEOUT],

        /// Maximum number of redirects followed before giving up on an image
        pub max_redirects: u32 = 2 => "EMBED_CHECK_MAX_REDIRECTS" | util::parse[2u32],

        pub user_agent: String = DEFAULT_USER_AGENT.to_owned() => "EMBED_CHECK_USER_AGENT",

        /// How long a probe outcome stays cached. Zero keeps outcomes for the lifetime of the cache.
        #[serde(deserialize_with = "util::duration::deserialize")]
        pub cache_ttl: Duration = Duration::ZERO => "EMBED_CHECK_CACHE_TTL" | util::parse_duration[Duration::ZERO],
    }

    impl Extra {
        fn configure(&mut self) {
            if self.timeout.is_zero() {
                self.timeout = DEFAULT_TIMEOUT;

                tracing::warn!("Probe timeout cannot be zero, using {:?}", self.timeout);
            }
        }
    }
}

impl Probe {
    /// Cache time-to-live, `None` if outcomes never expire
    pub fn ttl(&self) -> Option<Duration> {
        match self.cache_ttl.is_zero() {
            true => None,
            false => Some(self.cache_ttl),
        }
    }
}
