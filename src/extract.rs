//! Shape selector for `to_vec` on both containers.

use crate::order::Priority;

/// What each element of a `to_vec` result carries.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Extract {
    /// Values only.
    #[default]
    Data,
    /// Priorities only.
    Priority,
    /// Value and priority together.
    Both,
}

/// One element of a `to_vec` result, shaped by `Extract`.
#[derive(Debug, PartialEq, Eq)]
pub enum Extracted<'a, V> {
    Data(&'a V),
    Priority(Priority),
    Both { data: &'a V, priority: Priority },
}

impl<'a, V> Extracted<'a, V> {
    pub(crate) fn shape(extract: Extract, data: &'a V, priority: Priority) -> Self {
        match extract {
            Extract::Data => Extracted::Data(data),
            Extract::Priority => Extracted::Priority(priority),
            Extract::Both => Extracted::Both { data, priority },
        }
    }

    /// The value, if this element carries one.
    pub fn data(&self) -> Option<&'a V> {
        match *self {
            Extracted::Data(d) | Extracted::Both { data: d, .. } => Some(d),
            Extracted::Priority(_) => None,
        }
    }

    /// The priority, if this element carries one.
    pub fn priority(&self) -> Option<Priority> {
        match *self {
            Extracted::Priority(p) | Extracted::Both { priority: p, .. } => Some(p),
            Extracted::Data(_) => None,
        }
    }
}

impl<'a, V> Clone for Extracted<'a, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, V> Copy for Extracted<'a, V> {}
