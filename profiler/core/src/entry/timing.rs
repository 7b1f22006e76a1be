use std::fmt;
use std::time::SystemTime;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Numeric id of the calling OS thread.
///
/// Linux reports the kernel tid (`gettid`), macOS the `pthread_t` handle.
/// Elsewhere the std `ThreadId` is hashed, which is unique per thread for
/// the life of the process but means nothing outside it.
pub fn current_thread_id() -> u64 {
    #[cfg(target_os = "macos")]
    unsafe {
        return libc::pthread_self() as u64;
    }
    #[cfg(target_os = "linux")]
    unsafe {
        return libc::syscall(libc::SYS_gettid) as u64;
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        hasher.finish()
    }
}

// --- Timestamp ---
/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or_else(
                |_| Timestamp(0), // Fallback for systems where time might be before UNIX_EPOCH
                |d| Timestamp(i64::try_from(d.as_millis()).unwrap_or(i64::MAX)),
            )
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Signed difference `self - earlier` in milliseconds.
    ///
    /// Not clamped: an `earlier` that is actually later yields a negative value.
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Timestamp(ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Timing ---
/// Name and bounds of one completed timed event.
///
/// Serializes as `name`, `start`, `end` and the derived `duration`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timing {
    pub name: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Timing {
    pub fn new<N: Into<String>>(name: N, start: Timestamp, end: Timestamp) -> Self {
        Timing {
            name: name.into(),
            start,
            end,
        }
    }

    /// Returns `end - start` in milliseconds.
    pub fn duration(&self) -> i64 {
        self.end.millis_since(self.start)
    }

    pub(crate) fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.duration().to_string(),
        ]
    }
}

impl Serialize for Timing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Timing", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.serialize_field("duration", &self.duration())?;
        state.end()
    }
}
