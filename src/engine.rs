/// Navigation interception engine for Tab Divert
use log::debug;
use url::Url;

use crate::intent::{NavigationIntent, Trigger};
use crate::options::EngineOptions;
use crate::settings::Settings;
use crate::suppress::SuppressionWindow;
use crate::urls;

/// What the engine needs from the page it runs in.
///
/// The wasm layer implements this over the real browser; tests drive the
/// engine with a mock carrying a virtual clock. `create_tab` and
/// `schedule_tab` must swallow and report their own failures: a missed tab
/// is acceptable, breaking the host page is not.
pub trait Host {
    fn now_ms(&self) -> f64;
    fn current_url(&self) -> Option<Url>;
    fn create_tab(&self, url: &Url, focus: bool);
    fn schedule_tab(&self, url: &Url, focus: bool, delay_ms: u32);
    fn mark_reentry(&self);
    fn peek_and_clear_reentry(&self) -> bool;
}

/// A pointer click as seen by the capture-phase listener, reduced to what
/// the decision needs.
#[derive(Debug, Clone)]
pub struct ClickContext {
    /// Raw href of the nearest enclosing anchor, if any.
    pub href: Option<String>,
    /// Any of ctrl/cmd/shift/alt was held.
    pub modifier_held: bool,
    pub primary_button: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Leave the event to the browser.
    Native,
    /// Default prevented, propagation stopped; the engine owns this click.
    Hijacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Delegate to the page's real history function with original arguments.
    Forward,
    /// Swallow the call.
    Suppress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Delegate to the original `window.open`.
    PassThrough,
    /// Handled here; the caller gets a null handle back.
    Intercepted,
}

/// Routes every navigation signal through the suppression window into the
/// host's tab-creation primitive.
///
/// Single-threaded by design: the wasm layer keeps it in an
/// `Rc<RefCell<Engine>>` and every event closure borrows it for the
/// duration of one synchronous decision.
pub struct Engine<H: Host> {
    host: H,
    opts: EngineOptions,
    window: SuppressionWindow,
}

/// Builds the engine for this page load, or decides not to.
///
/// The re-entry marker is consumed first and unconditionally, before the
/// policy gate, so a stale marker can never leak into a later navigation,
/// even on a disabled site. Call once, before installing any listener.
pub fn arm<H: Host>(host: H, settings: &Settings, opts: EngineOptions) -> Option<Engine<H>> {
    if host.peek_and_clear_reentry() {
        debug!("this tab was opened by the engine; staying dormant for this load");
        return None;
    }

    if let Some(current) = host.current_url() {
        if let Some(hostname) = urls::policy_host(&current) {
            if settings.is_disabled(hostname) {
                debug!("disabled on {}; not arming", hostname);
                return None;
            }
        }
    }

    Some(Engine::new(host, opts))
}

impl<H: Host> Engine<H> {
    pub fn new(host: H, opts: EngineOptions) -> Engine<H> {
        let window = SuppressionWindow::new(opts.suppression_ms);
        Engine { host, opts, window }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn options(&self) -> &EngineOptions {
        &self.opts
    }

    /// Capture-phase click decision. Modifier clicks, non-links,
    /// non-web schemes, unparseable hrefs and in-page anchor jumps all
    /// stay native; everything else is hijacked into a new tab.
    pub fn handle_click(&mut self, click: &ClickContext) -> ClickOutcome {
        if click.modifier_held || !click.primary_button {
            return ClickOutcome::Native;
        }
        let href = match &click.href {
            Some(href) => href,
            None => return ClickOutcome::Native,
        };
        let current = match self.host.current_url() {
            Some(current) => current,
            None => return ClickOutcome::Native,
        };
        let target = match urls::resolve(&current, href) {
            Some(target) => target,
            None => return ClickOutcome::Native,
        };
        if !urls::is_web_scheme(&target) || urls::same_document(&current, &target) {
            return ClickOutcome::Native;
        }

        // Marked preemptively, before admission: the opened tab must not
        // re-run interception even if this click races its own echoes.
        self.host.mark_reentry();
        let intent = NavigationIntent::new(target, Trigger::Click, self.host.now_ms());
        self.open(intent, false);
        ClickOutcome::Hijacked
    }

    /// `pushState` interception. A push to the current document URL is not
    /// a navigation and always forwards; a real route change goes through
    /// admission and, when admitted, opens after the settle deferral.
    pub fn handle_push_route(&mut self, raw_url: Option<&str>) -> RouteOutcome {
        let (current, target) = match self.resolved_route(raw_url) {
            Some(pair) => pair,
            None => return RouteOutcome::Forward,
        };
        if target == current {
            return RouteOutcome::Forward;
        }

        let intent = NavigationIntent::new(target, Trigger::PushRoute, self.host.now_ms());
        self.open(intent, true);

        if self.opts.forward_push_route {
            RouteOutcome::Forward
        } else {
            RouteOutcome::Suppress
        }
    }

    /// `replaceState` interception. Conventionally in-place cleanup, so the
    /// call always forwards; the suppression bookkeeping still advances so
    /// follow-on signals for the same URL read as related. The
    /// `replace_is_navigation` flag switches to push semantics.
    pub fn handle_replace_route(&mut self, raw_url: Option<&str>) -> RouteOutcome {
        if let Some((current, target)) = self.resolved_route(raw_url) {
            if target != current {
                if self.opts.replace_is_navigation {
                    let intent =
                        NavigationIntent::new(target, Trigger::PushRoute, self.host.now_ms());
                    self.open(intent, true);
                } else {
                    let now = self.host.now_ms();
                    self.window.record_related(target, now);
                }
            }
        }
        RouteOutcome::Forward
    }

    /// Passive `hashchange` handling; the event fires after the fact, so
    /// there is nothing to prevent, only an intent to admit or drop.
    pub fn handle_hash_change(&mut self, new_url: &str) {
        let target = match Url::parse(new_url) {
            Ok(target) => target,
            Err(_) => return,
        };
        if !urls::is_web_scheme(&target) {
            return;
        }
        let intent = NavigationIntent::new(target, Trigger::HashChange, self.host.now_ms());
        self.open(intent, false);
    }

    /// `window.open` interception. Only a string URL that parses, is
    /// http(s), and leaves the current document is taken over; everything
    /// else delegates to the original with original arguments.
    pub fn handle_window_open(&mut self, raw_url: Option<&str>) -> OpenOutcome {
        let raw = match raw_url {
            Some(raw) => raw,
            None => return OpenOutcome::PassThrough,
        };
        let current = match self.host.current_url() {
            Some(current) => current,
            None => return OpenOutcome::PassThrough,
        };
        let target = match urls::resolve(&current, raw) {
            Some(target) => target,
            None => return OpenOutcome::PassThrough,
        };
        if !urls::is_web_scheme(&target) || urls::same_document(&current, &target) {
            return OpenOutcome::PassThrough;
        }

        self.host.mark_reentry();
        let intent = NavigationIntent::new(target, Trigger::WindowOpen, self.host.now_ms());
        self.open(intent, false);
        OpenOutcome::Intercepted
    }

    /// Back/forward traversal is user-initiated browser navigation and is
    /// left alone.
    pub fn observe_traversal(&self) {
        debug!("history traversal observed; leaving native behavior");
    }

    /// The tab opener: the one path to the host's tab-creation primitive.
    /// Admission always runs first; a dropped intent is a no-op.
    fn open(&mut self, intent: NavigationIntent, deferred: bool) {
        if !self.window.admit(&intent) {
            return;
        }
        self.host.mark_reentry();
        debug!("opening tab for {} ({})", intent.url, intent.trigger.as_str());
        if deferred {
            self.host
                .schedule_tab(&intent.url, self.opts.focus_new_tab, self.opts.settle_ms);
        } else {
            self.host.create_tab(&intent.url, self.opts.focus_new_tab);
        }
    }

    fn resolved_route(&self, raw_url: Option<&str>) -> Option<(Url, Url)> {
        let current = self.host.current_url()?;
        let target = urls::resolve(&current, raw_url?)?;
        Some((current, target))
    }
}
