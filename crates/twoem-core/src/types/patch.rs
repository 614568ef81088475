//! Tri-state field update used by partial-update structs.

use serde::{Deserialize, Deserializer};

/// One field of a partial update.
///
/// In JSON an absent field is [`Patch::Keep`] (the containing struct must
/// mark the field `#[serde(default)]`), an explicit `null` is
/// [`Patch::Clear`], and any other value is [`Patch::Set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Leave the stored value unchanged.
    #[default]
    Keep,
    /// Remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    /// Whether this patch leaves the value untouched.
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Borrow the new value, if one is being set.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Convert the value being set, keeping the variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Keep => Patch::Keep,
            Self::Clear => Patch::Clear,
            Self::Set(v) => Patch::Set(f(v)),
        }
    }

    /// Resolve the patch against the currently stored value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(v) => Some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Self::Set(v),
            None => Self::Clear,
        })
    }
}
