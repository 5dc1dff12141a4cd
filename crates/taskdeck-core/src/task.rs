use serde::{Deserialize, Serialize};

use crate::id::TaskId;

/// A single to-do item as returned by the task service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: TaskId,
    /// User-visible text.
    pub description: String,
    /// Completion flag, `0`/`1` on the wire.
    #[serde(with = "completion")]
    pub completed: bool,
    /// Server-assigned creation timestamp, kept verbatim.
    pub created_at: String,
}

impl Task {
    /// Build a task from its parts.
    #[must_use]
    pub fn new(
        id: TaskId,
        description: impl Into<String>,
        completed: bool,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            completed,
            created_at: created_at.into(),
        }
    }

    /// Human-readable status label.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.completed { "Completed" } else { "Incomplete" }
    }
}

/// Partial update sent with `updateTask`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement completion flag.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "completion::option"
    )]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only replaces the description.
    #[must_use]
    pub fn description(text: impl Into<String>) -> Self {
        Self {
            description: Some(text.into()),
            completed: None,
        }
    }

    /// Patch that only replaces the completion flag.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            description: None,
            completed: Some(completed),
        }
    }

    /// True when the patch carries no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none()
    }

    /// Apply the patch to `task` in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Serde codec for the integer completion flag used by the task service.
pub mod completion {
    use serde::{Deserialize, Deserializer, Serializer};

    fn decode<E: serde::de::Error>(raw: u8) -> Result<bool, E> {
        match raw {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(E::custom(format!(
                "completion flag must be 0 or 1, got {other}"
            ))),
        }
    }

    /// Encode `true`/`false` as `1`/`0`.
    ///
    /// # Errors
    /// Propagates serializer failures.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*value))
    }

    /// Decode `0`/`1`, rejecting anything else.
    ///
    /// # Errors
    /// Fails on values other than `0` and `1`.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        decode(u8::deserialize(d)?)
    }

    /// Same codec for optional flags.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        /// Encode `Some(flag)` as `0`/`1` and `None` as null.
        ///
        /// # Errors
        /// Propagates serializer failures.
        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(value: &Option<bool>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(flag) => s.serialize_some(&u8::from(*flag)),
                None => s.serialize_none(),
            }
        }

        /// Decode an optional `0`/`1`.
        ///
        /// # Errors
        /// Fails on values other than `0`, `1` and null.
        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
            Option::<u8>::deserialize(d)?
                .map(super::decode::<D::Error>)
                .transpose()
        }
    }
}
