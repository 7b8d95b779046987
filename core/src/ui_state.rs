//! Theme and screen-size state for the wizard views.
//!
//! # Design
//! Instead of views mutating a global theme attribute or each registering
//! their own resize listener, the host pushes viewport and theme changes into
//! a `UiStore` and views subscribe to it. A `Subscription` is tied to the
//! view's lifetime: dropping it unsubscribes. The store is single-threaded,
//! like the UI loop that owns it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::debug;

/// Viewport width below which the layout is `Small`.
pub const SMALL_BREAKPOINT: u32 = 640;
/// Viewport width below which the layout is `Medium`.
pub const LARGE_BREAKPOINT: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenSize {
    Small,
    Medium,
    #[default]
    Large,
}

impl ScreenSize {
    pub fn from_width(width: u32) -> Self {
        if width < SMALL_BREAKPOINT {
            ScreenSize::Small
        } else if width < LARGE_BREAKPOINT {
            ScreenSize::Medium
        } else {
            ScreenSize::Large
        }
    }

    /// Carousel cards shown at once; also the loading skeleton's card count.
    pub fn skips_per_page(&self) -> usize {
        match self {
            ScreenSize::Small => 1,
            ScreenSize::Medium | ScreenSize::Large => 3,
        }
    }

    pub fn shimmer_interval(&self) -> Duration {
        match self {
            ScreenSize::Small => Duration::from_millis(600),
            ScreenSize::Medium | ScreenSize::Large => Duration::from_millis(800),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// A saved preference wins over the system colour scheme.
    pub fn initial(saved: Option<Theme>, prefers_dark: bool) -> Self {
        match saved {
            Some(theme) => theme,
            None if prefers_dark => Theme::Dark,
            None => Theme::Light,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Value of the document's `data-theme` attribute.
    pub fn attribute(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiState {
    pub theme: Theme,
    pub screen_size: ScreenSize,
}

type Listener = Box<dyn FnMut(&UiState)>;

struct Listeners {
    next_id: u64,
    by_id: BTreeMap<u64, Listener>,
    /// Listener taken out of `by_id` while it runs.
    running: Option<u64>,
    /// Set when the running listener's subscription is dropped mid-call.
    running_dropped: bool,
}

/// Observable holder of `UiState`.
pub struct UiStore {
    state: UiState,
    listeners: Rc<RefCell<Listeners>>,
}

/// Live registration with a `UiStore`. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let removed = {
            let mut listeners = listeners.borrow_mut();
            let removed = listeners.by_id.remove(&self.id);
            if removed.is_none() && listeners.running == Some(self.id) {
                listeners.running_dropped = true;
            }
            removed
        };
        // The listener may own subscriptions of its own.
        drop(removed);
    }
}

impl UiStore {
    pub fn new(state: UiState) -> Self {
        Self {
            state,
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                by_id: BTreeMap::new(),
                running: None,
                running_dropped: false,
            })),
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn subscribe(&self, listener: impl FnMut(&UiState) + 'static) -> Subscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.by_id.insert(id, Box::new(listener));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().by_id.len()
    }

    /// Feed a viewport width from the host's resize events.
    pub fn set_viewport_width(&mut self, width: u32) {
        let screen_size = ScreenSize::from_width(width);
        self.update(UiState {
            screen_size,
            ..self.state
        });
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.update(UiState { theme, ..self.state });
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.state.theme.toggled();
        self.set_theme(theme);
        theme
    }

    fn update(&mut self, next: UiState) {
        if next == self.state {
            return;
        }
        debug!(?next, "ui state changed");
        self.state = next;
        // No borrow is held across a call or a listener drop, so listeners
        // may drop any subscription, their own included.
        let ids: Vec<u64> = self.listeners.borrow().by_id.keys().copied().collect();
        for id in ids {
            let taken = {
                let mut listeners = self.listeners.borrow_mut();
                let taken = listeners.by_id.remove(&id);
                if taken.is_some() {
                    listeners.running = Some(id);
                    listeners.running_dropped = false;
                }
                taken
            };
            let Some(mut listener) = taken else {
                continue;
            };
            listener(&self.state);

            let mut listeners = self.listeners.borrow_mut();
            listeners.running = None;
            if listeners.running_dropped {
                drop(listeners);
                drop(listener);
            } else {
                listeners.by_id.insert(id, listener);
            }
        }
    }
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}
