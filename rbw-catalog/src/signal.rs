use serde::Serialize;

/// An upstream value that is either real or a documented stand-in.
///
/// Callers can always read a value, but a `Degraded` one carries the
/// reason the real signal was unavailable.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Signal<T> {
    Live(T),
    Degraded { value: T, reason: String },
}

impl<T> Signal<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Signal::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Signal::Live(value) => value,
            Signal::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Signal::Live(value) => value,
            Signal::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Signal::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Signal::Live(_) => None,
            Signal::Degraded { reason, .. } => Some(reason.as_str()),
        }
    }
}
