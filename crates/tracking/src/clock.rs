use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Time source injected into the store and sweeper.
///
/// Staleness is a pure function of "now", so swapping the clock makes every
/// threshold decision deterministic under test.
pub trait Clock: Send + Sync + Debug + 'static {
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedClock = Arc<dyn Clock>;

/// Wall clock used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
