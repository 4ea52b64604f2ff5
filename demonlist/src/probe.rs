//! Availability probe for list hosts.
//!
//! Before committing to a full load the loader checks that the manifest is
//! reachable with a single cheap request: either a HEAD, or a GET limited to
//! the first byte. Some static hosts reject HEAD, which is why the ranged GET
//! exists as an alternative.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ConfigError, NO_RESPONSE_CODE};
use crate::http::{HttpClient, HttpRequest};

/// How the availability probe talks to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeMode {
    /// `HEAD` request against the manifest.
    #[default]
    Head,
    /// `GET` with `Range: bytes=0-0`.
    Range,
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMode::Head => f.write_str("head"),
            ProbeMode::Range => f.write_str("range"),
        }
    }
}

impl FromStr for ProbeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "head" => Ok(ProbeMode::Head),
            "range" | "get" => Ok(ProbeMode::Range),
            _ => Err(ConfigError::InvalidValue {
                key: "probe".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Result of a probe: the success predicate and the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub ok: bool,
    pub code: u16,
}

/// Issues exactly one availability request against `url`.
///
/// There is no retry. A request that fails before any response arrives is
/// reported as not ok with code 0.
pub async fn probe(client: &dyn HttpClient, url: &str, mode: ProbeMode) -> ProbeOutcome {
    let request = match mode {
        ProbeMode::Head => HttpRequest::head(url),
        ProbeMode::Range => HttpRequest::get(url).with_range(0, 0),
    };

    match client.send(request).await {
        Ok(response) => {
            debug!(url, mode = %mode, status = response.status, "probe completed");
            ProbeOutcome {
                ok: response.is_success(),
                code: response.status,
            }
        }
        Err(e) => {
            debug!(url, mode = %mode, error = %e, "probe failed without a response");
            ProbeOutcome {
                ok: false,
                code: NO_RESPONSE_CODE,
            }
        }
    }
}
