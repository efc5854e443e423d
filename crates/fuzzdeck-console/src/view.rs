//! Widget state shared by every view.

/// A widget is either still showing its loading placeholder or has been
/// populated. Failed reads leave it `Loading`; the placeholder is only
/// removed once data arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    Loading,
    Ready(T),
}

impl<T> Panel<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            Panel::Loading => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            Panel::Ready(value) => Some(value),
            Panel::Loading => None,
        }
    }
}

impl<T> From<Option<T>> for Panel<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Panel::Loading, Panel::Ready)
    }
}
