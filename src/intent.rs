/// Navigation intent data structures for Tab Divert
use url::Url;

/// The mechanism that produced a candidate navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Click,
    PushRoute,
    HashChange,
    WindowOpen,
}

impl Trigger {
    /// Route-change triggers are the ones an SPA router fires on its own,
    /// typically as an echo of a click the engine already handled.
    pub fn is_route_change(self) -> bool {
        matches!(self, Trigger::PushRoute | Trigger::HashChange)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Click => "click",
            Trigger::PushRoute => "push-route",
            Trigger::HashChange => "hash-change",
            Trigger::WindowOpen => "window-open",
        }
    }
}

/// One candidate page-leaving action: where to, what fired it, and when.
///
/// Timestamps are milliseconds as f64, the same shape `js_sys::Date::now()`
/// returns. Intents are built by the capturers and consumed immediately by
/// the suppression window; they are never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationIntent {
    pub url: Url,
    pub trigger: Trigger,
    pub observed_at: f64,
}

impl NavigationIntent {
    pub fn new(url: Url, trigger: Trigger, observed_at: f64) -> NavigationIntent {
        NavigationIntent {
            url,
            trigger,
            observed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_change_triggers() {
        assert!(Trigger::PushRoute.is_route_change());
        assert!(Trigger::HashChange.is_route_change());
        assert!(!Trigger::Click.is_route_change());
        assert!(!Trigger::WindowOpen.is_route_change());
    }

    #[test]
    fn test_intent_creation() {
        let url = Url::parse("https://example.com/a").unwrap();
        let intent = NavigationIntent::new(url.clone(), Trigger::Click, 1000.0);

        assert_eq!(intent.url, url);
        assert_eq!(intent.trigger, Trigger::Click);
        assert_eq!(intent.observed_at, 1000.0);
    }

    #[test]
    fn test_trigger_names() {
        assert_eq!(Trigger::Click.as_str(), "click");
        assert_eq!(Trigger::WindowOpen.as_str(), "window-open");
    }
}
