//! Runtime configuration.
//!
//! ```ignore
//! use spark_fiber::RuntimeConfig;
//! use web_time::Duration;
//!
//! let config = RuntimeConfig::default()
//!     .with_yield_threshold(Duration::from_micros(500))
//!     .with_event_prefix("on");
//! ```

use web_time::Duration;

use crate::types::{Listener, PropValue};

/// Default minimum slice left in a deadline before the work loop yields.
pub const DEFAULT_YIELD_THRESHOLD: Duration = Duration::from_millis(1);

/// Default prefix that marks a property as an event listener (`onClick`).
pub const DEFAULT_EVENT_PREFIX: &str = "on";

/// Tunables for a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// The loop yields once the deadline has less than this much time left.
    pub yield_threshold: Duration,
    /// Property names starting with this prefix followed by an uppercase
    /// letter are treated as event listeners.
    pub event_prefix: &'static str,
}

impl RuntimeConfig {
    /// Set the yield threshold.
    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    /// Set the event listener prefix.
    pub fn with_event_prefix(mut self, prefix: &'static str) -> Self {
        self.event_prefix = prefix;
        self
    }

    /// Map a listener property name to its event name.
    ///
    /// `onClick` → `click`, `onMouseDown` → `mousedown`. Returns `None` for
    /// names that are not event-shaped.
    pub fn event_name(&self, prop: &str) -> Option<String> {
        let rest = prop.strip_prefix(self.event_prefix)?;
        let first = rest.chars().next()?;
        if !first.is_ascii_uppercase() {
            return None;
        }
        Some(rest.to_ascii_lowercase())
    }

    /// Decide how a property reaches the sink.
    pub(crate) fn classify<'v>(&self, name: &str, value: &'v PropValue) -> PropRole<'v> {
        match (self.event_name(name), value.as_listener()) {
            (Some(event), Some(listener)) => PropRole::Listener { event, listener },
            (None, None) => PropRole::Attribute,
            _ => PropRole::Ignored,
        }
    }
}

/// How a property is applied to a realized node.
#[derive(Debug)]
pub(crate) enum PropRole<'v> {
    /// Set and cleared through the attribute API.
    Attribute,
    /// Registered through the event API.
    Listener { event: String, listener: &'v Listener },
    /// Listener-shaped name without a listener value, or a listener under a
    /// plain name. Never sent to the sink.
    Ignored,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            yield_threshold: DEFAULT_YIELD_THRESHOLD,
            event_prefix: DEFAULT_EVENT_PREFIX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name() {
        let config = RuntimeConfig::default();
        assert_eq!(config.event_name("onClick").as_deref(), Some("click"));
        assert_eq!(config.event_name("onMouseDown").as_deref(), Some("mousedown"));
        assert_eq!(config.event_name("one"), None);
        assert_eq!(config.event_name("on"), None);
        assert_eq!(config.event_name("id"), None);
    }

    #[test]
    fn test_classify() {
        let config = RuntimeConfig::default();
        let listener = PropValue::from(Listener::new(|_| {}));
        let text = PropValue::from("x");
        assert!(matches!(config.classify("id", &text), PropRole::Attribute));
        assert!(matches!(
            config.classify("onClick", &listener),
            PropRole::Listener { ref event, .. } if event == "click"
        ));
        assert!(matches!(config.classify("onClick", &text), PropRole::Ignored));
        assert!(matches!(config.classify("id", &listener), PropRole::Ignored));
    }

    #[test]
    fn test_custom_prefix() {
        let config = RuntimeConfig::default().with_event_prefix("handle");
        assert_eq!(config.event_name("handleInput").as_deref(), Some("input"));
        assert_eq!(config.event_name("onInput"), None);
    }
}
