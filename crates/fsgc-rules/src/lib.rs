//! Deletion rules for fsgc.
//!
//! Two independent policies decide what a collection run removes:
//!
//! - **TTL expiry** - a path carrying a marker such as `ttl=3` or `ttl=2h`
//!   expires once that long has passed since its last modification.
//!   [`TtlMarkerParser`] resolves the marker and [`ExpiryEvaluator`] compares
//!   it with the entry's age.
//! - **Count retention** - a directory holding a policy file keeps only the
//!   newest N files per name pattern. [`PolicyLoader`] reads the policy and
//!   [`RetentionEnforcer`] removes the overflow.
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::SystemTime;
//! use fsgc_core::CollectorConfig;
//! use fsgc_rules::{ExpiryEvaluator, TtlMarkerParser};
//!
//! let config = CollectorConfig::default();
//! let parser = TtlMarkerParser::new(&config);
//! let ttl = parser.ttl_for(Path::new("/builds/ttl=2h/app.tar")).unwrap();
//!
//! let modified = SystemTime::now();
//! let expiry = ExpiryEvaluator::new();
//! if let Some(ttl) = ttl {
//!     println!("expired: {}", expiry.is_expired(ttl, modified));
//! }
//! ```

mod expiry;
mod loader;
mod retention;
mod ttl;

pub use expiry::{Clock, ExpiryEvaluator, FixedClock, SystemClock, age_at, is_expired_at};
pub use loader::PolicyLoader;
pub use retention::{RetentionEnforcer, RetentionPlan, plan_retention};
pub use ttl::TtlMarkerParser;
