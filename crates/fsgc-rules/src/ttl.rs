//! TTL marker extraction.

use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use fsgc_core::{CollectorConfig, GcWarning, MatchScope, WarningKind};

/// Resolves the TTL encoded in a path by the configured marker pattern.
#[derive(Debug, Clone, Copy)]
pub struct TtlMarkerParser<'a> {
    config: &'a CollectorConfig,
}

impl<'a> TtlMarkerParser<'a> {
    /// Create a parser over a collector config.
    pub fn new(config: &'a CollectorConfig) -> Self {
        Self { config }
    }

    /// TTL for `path`, or `None` when the path carries no marker.
    ///
    /// A marker whose `value` is not a non-negative integer yields a
    /// warning; callers treat it as "no TTL". A suffix without a configured
    /// unit resolves to a zero TTL.
    pub fn ttl_for(&self, path: &Path) -> Result<Option<Duration>, GcWarning> {
        let subject = self.subject(path);
        let Some(caps) = self.config.marker.captures(&subject) else {
            return Ok(None);
        };

        let raw_value = caps.name("value").map_or("", |m| m.as_str());
        let value: u64 = raw_value.parse().map_err(|err| {
            warn!(path = %path.display(), value = raw_value, "TTL value cannot be converted to an integer");
            GcWarning::new(
                path,
                format!("TTL value `{raw_value}` cannot be converted to an integer: {err}"),
                WarningKind::TtlValueError,
            )
        })?;

        // A suffix group that did not take part in the match counts as empty.
        let suffix = caps.name("suffix").map_or("", |m| m.as_str());
        let unit = self.config.suffix_unit(suffix).unwrap_or_else(|| {
            debug!(path = %path.display(), suffix, "No unit configured for suffix, TTL is zero");
            Duration::ZERO
        });

        Ok(Some(scale(unit, value)))
    }

    fn subject<'p>(&self, path: &'p Path) -> Cow<'p, str> {
        match self.config.match_scope {
            MatchScope::FullPath => path.to_string_lossy(),
            MatchScope::BaseName => path
                .file_name()
                .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy()),
        }
    }
}

/// `unit * value`, saturating at `Duration::MAX`.
fn scale(unit: Duration, value: u64) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let total = unit.as_nanos().saturating_mul(u128::from(value));
    match u64::try_from(total / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (total % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
