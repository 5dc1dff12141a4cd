use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Server-assigned identifier of a task.
///
/// The value is opaque to the client: it is never parsed, only compared and
/// echoed back to the server.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TaskId(String);

/// Raised when an empty string is used as a task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task id must not be empty")]
pub struct EmptyTaskId;

impl TaskId {
    /// Wrap a raw identifier verbatim.
    ///
    /// # Errors
    /// Returns [`EmptyTaskId`] when `raw` is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyTaskId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(EmptyTaskId);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = EmptyTaskId;

    /// Parses user input; surrounding whitespace is dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id: TaskId = "  abc-1 ".parse().expect("must parse task id");
        assert_eq!(id.as_str(), "abc-1");
        assert_eq!(id.to_string(), "abc-1");
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!("   ".parse::<TaskId>(), Err(EmptyTaskId));
    }

    #[test]
    fn deserialize_keeps_server_ids_verbatim() {
        let id: TaskId = serde_json::from_str("\" abc-1 \"").expect("non-empty id");
        assert_eq!(id.as_str(), " abc-1 ");
        assert_eq!(serde_json::to_string(&id).expect("encode id"), "\" abc-1 \"");
    }

    #[test]
    fn deserialize_rejects_empty_string() {
        let err = serde_json::from_str::<TaskId>("\"\"").expect_err("empty id must fail");
        assert!(err.to_string().contains("must not be empty"));
    }
}
