//! Request-scoped trace identifier.
//!
//! The identifier lives in task-local storage for the duration of a request,
//! so services and error constructors can read it without threading it
//! through every call. Task locals do not follow `tokio::spawn`; wrap spawned
//! work in [`TraceId::scope`] to carry it along.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// UUID correlating the log lines and error payload of one request.
///
/// ```
/// use coursework::TraceId;
///
/// fn label() -> String {
///     TraceId::current().map_or_else(|| "-".to_owned(), |id| id.to_string())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Adopt an identifier supplied by an upstream proxy.
    ///
    /// Only canonical hyphenated UUIDs are accepted; anything else returns
    /// `None` so a caller cannot inject arbitrary text into logs.
    #[must_use]
    pub fn from_header(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.len() != uuid::fmt::Hyphenated::LENGTH {
            return None;
        }
        trimmed.parse().ok().filter(|id: &Self| !id.0.is_nil())
    }

    /// Identifier of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Borrow the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` as the current identifier.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
