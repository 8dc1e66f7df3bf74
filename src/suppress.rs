/// Suppression window: reconciles overlapping navigation signals
use log::debug;
use url::Url;

use crate::intent::NavigationIntent;

/// Decides whether a navigation intent is a fresh navigation or a duplicate
/// of one already acted on.
///
/// All shared dedup state lives here and is written only by [`admit`] and
/// [`record_related`]; no other component reads or touches the fields.
/// State is page-load-scoped; a full (re)load starts from scratch.
///
/// [`admit`]: SuppressionWindow::admit
/// [`record_related`]: SuppressionWindow::record_related
#[derive(Debug)]
pub struct SuppressionWindow {
    window_ms: f64,
    last_open: Option<(Url, f64)>,
    last_trigger_at: Option<f64>,
}

impl SuppressionWindow {
    pub fn new(window_ms: f64) -> SuppressionWindow {
        SuppressionWindow {
            window_ms,
            last_open: None,
            last_trigger_at: None,
        }
    }

    /// Admission rule. An intent is dropped when its URL matches the last
    /// opened URL inside the window, or, for route-change triggers, when
    /// *any* trigger fired inside the window, URL regardless: a route event
    /// that close to a handled trigger is the SPA reacting to it, not the
    /// user navigating again.
    ///
    /// The trigger clock advances for every intent, admitted or dropped;
    /// the last-open slot advances only on admission. Updates happen
    /// synchronously, so an intent arriving one tick later already sees
    /// them.
    pub fn admit(&mut self, intent: &NavigationIntent) -> bool {
        let duplicate_url = match &self.last_open {
            Some((url, opened_at)) => {
                *url == intent.url && intent.observed_at - opened_at < self.window_ms
            }
            None => false,
        };

        let route_echo = intent.trigger.is_route_change()
            && self
                .last_trigger_at
                .is_some_and(|at| intent.observed_at - at < self.window_ms);

        self.last_trigger_at = Some(intent.observed_at);

        if duplicate_url || route_echo {
            debug!(
                "suppressed {} intent for {} ({})",
                intent.trigger.as_str(),
                intent.url,
                if duplicate_url { "duplicate url" } else { "route echo" }
            );
            return false;
        }

        self.last_open = Some((intent.url.clone(), intent.observed_at));
        true
    }

    /// Bookkeeping for a navigation that was observed but not opened
    /// (route-replace). Advances both the trigger clock and the last-open
    /// slot so follow-on signals for the same URL read as related.
    pub fn record_related(&mut self, url: Url, at: f64) {
        self.last_trigger_at = Some(at);
        self.last_open = Some((url, at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Trigger;

    const WINDOW: f64 = 2000.0;

    fn intent(url: &str, trigger: Trigger, at: f64) -> NavigationIntent {
        NavigationIntent::new(Url::parse(url).unwrap(), trigger, at)
    }

    #[test]
    fn test_first_intent_admitted() {
        let mut window = SuppressionWindow::new(WINDOW);
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 0.0)));
    }

    #[test]
    fn test_duplicate_url_inside_window_dropped() {
        let mut window = SuppressionWindow::new(WINDOW);
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 0.0)));
        assert!(!window.admit(&intent("https://x.test/a", Trigger::Click, 1999.0)));
    }

    #[test]
    fn test_duplicate_url_outside_window_admitted() {
        let mut window = SuppressionWindow::new(WINDOW);
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 0.0)));
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 2001.0)));
    }

    #[test]
    fn test_different_url_click_admitted_inside_window() {
        let mut window = SuppressionWindow::new(WINDOW);
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 0.0)));
        assert!(window.admit(&intent("https://x.test/b", Trigger::Click, 100.0)));
    }

    #[test]
    fn test_route_echo_dropped_regardless_of_url() {
        let mut window = SuppressionWindow::new(WINDOW);
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 0.0)));
        assert!(!window.admit(&intent("https://x.test/b", Trigger::PushRoute, 150.0)));
        assert!(!window.admit(&intent("https://x.test/c", Trigger::HashChange, 300.0)));
    }

    #[test]
    fn test_standalone_route_change_admitted() {
        let mut window = SuppressionWindow::new(WINDOW);
        assert!(window.admit(&intent("https://x.test/a", Trigger::PushRoute, 0.0)));
    }

    #[test]
    fn test_dropped_intents_still_advance_trigger_clock() {
        let mut window = SuppressionWindow::new(WINDOW);
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 0.0)));
        // Echo at 1500 is dropped but moves the clock; the push at 3400 is
        // within 2000ms of *it* and is dropped too.
        assert!(!window.admit(&intent("https://x.test/b", Trigger::PushRoute, 1500.0)));
        assert!(!window.admit(&intent("https://x.test/b", Trigger::PushRoute, 3400.0)));
        // Far enough out, a route change stands on its own again.
        assert!(window.admit(&intent("https://x.test/b", Trigger::PushRoute, 5500.0)));
    }

    #[test]
    fn test_window_open_ignores_trigger_clock() {
        let mut window = SuppressionWindow::new(WINDOW);
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 0.0)));
        // Not a route-change trigger, different URL: admitted.
        assert!(window.admit(&intent("https://x.test/b", Trigger::WindowOpen, 100.0)));
    }

    #[test]
    fn test_record_related_suppresses_follow_on() {
        let mut window = SuppressionWindow::new(WINDOW);
        window.record_related(Url::parse("https://x.test/a").unwrap(), 0.0);
        assert!(!window.admit(&intent("https://x.test/a#h", Trigger::HashChange, 50.0)));
        assert!(!window.admit(&intent("https://x.test/a", Trigger::Click, 100.0)));
    }

    #[test]
    fn test_configurable_window_length() {
        let mut window = SuppressionWindow::new(500.0);
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 0.0)));
        assert!(window.admit(&intent("https://x.test/a", Trigger::Click, 600.0)));
    }
}
