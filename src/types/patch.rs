use serde::{Deserialize, Deserializer};

/// A field in a partial update body.
///
/// `Absent` leaves the stored value alone, `Null` clears it and `Value` replaces it.
/// Declare fields with `#[serde(default)]` so a missing key decodes as `Absent`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Self::Absent => Patch::Absent,
            Self::Null => Patch::Null,
            Self::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Applies the patch to a nullable column.
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Null => *target = None,
            Self::Value(v) => *target = Some(v),
        }
    }

    /// Applies the patch to a column whose "cleared" state is its default (lists, flags).
    pub fn apply_or_default(self, target: &mut T)
    where
        T: Default,
    {
        match self {
            Self::Absent => {}
            Self::Null => *target = T::default(),
            Self::Value(v) => *target = v,
        }
    }

    /// Applies the patch to a required column; an explicit null is rejected.
    pub fn apply_required(self, target: &mut T, field: &str) -> Result<(), String> {
        match self {
            Self::Absent => Ok(()),
            Self::Null => Err(format!("{field} cannot be null")),
            Self::Value(v) => {
                *target = v;
                Ok(())
            }
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|v| match v {
            Some(v) => Self::Value(v),
            None => Self::Null,
        })
    }
}
