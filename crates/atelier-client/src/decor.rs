//! Decorative animation models: starfield, comet divider, cursor follower.
//!
//! Only the numbers live here; drawing is up to the renderer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;

use crate::events::{EventBus, PointerEvent, Subscription};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Horizontal position, fraction of the viewport width.
    pub x: f32,
    /// Vertical position, fraction of the viewport height.
    pub y: f32,
    /// Radius in pixels.
    pub size: f32,
    pub twinkle_delay: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Starfield {
    pub stars: Vec<Star>,
}

impl Starfield {
    pub const MAX_TWINKLE_DELAY_MS: u64 = 5_000;

    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let stars = (0..count)
            .map(|_| Star {
                x: rng.gen::<f32>(),
                y: rng.gen::<f32>(),
                size: rng.gen_range(0.5..2.5),
                twinkle_delay: Duration::from_millis(rng.gen_range(0..Self::MAX_TWINKLE_DELAY_MS)),
            })
            .collect();
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

/// A comet crossing a section divider once per `period`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CometDivider {
    pub period: Duration,
    /// Tail length as a fraction of the divider width.
    pub tail: f32,
}

impl Default for CometDivider {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(6),
            tail: 0.15,
        }
    }
}

impl CometDivider {
    /// Head position in `[0, 1)` after `elapsed`.
    pub fn head_at(&self, elapsed: Duration) -> f32 {
        let period = self.period.as_secs_f64();
        if period <= 0.0 {
            return 0.0;
        }
        ((elapsed.as_secs_f64() % period) / period) as f32
    }

    /// `(start, end)` of the visible tail, clamped to the divider.
    pub fn tail_span(&self, elapsed: Duration) -> (f32, f32) {
        let head = self.head_at(elapsed);
        ((head - self.tail).max(0.0), head)
    }
}

/// Element that eases towards the last pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorFollower {
    pub x: f32,
    pub y: f32,
    target: (f32, f32),
    /// Easing rate per second. `stiffness * dt` is clamped to 1.
    stiffness: f32,
}

impl CursorFollower {
    pub fn new(stiffness: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            target: (0.0, 0.0),
            stiffness: stiffness.max(0.0),
        }
    }

    pub fn on_pointer(&mut self, event: PointerEvent) {
        self.target = (event.x, event.y);
    }

    /// Advance by `dt` seconds of frame time.
    pub fn step(&mut self, dt: f32) {
        let t = (self.stiffness * dt).clamp(0.0, 1.0);
        self.x += (self.target.0 - self.x) * t;
        self.y += (self.target.1 - self.y) * t;
    }

    pub fn target(&self) -> (f32, f32) {
        self.target
    }

    /// Start following pointer events from `bus`. The follower stops
    /// receiving events once the returned handle is dropped.
    pub fn attach(self, bus: &EventBus<PointerEvent>) -> AttachedFollower {
        let state = Arc::new(Mutex::new(self));
        let s = state.clone();
        let subscription = bus.subscribe(move |event: &PointerEvent| {
            lock(&s).on_pointer(*event);
        });
        AttachedFollower {
            state,
            _subscription: subscription,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`CursorFollower`] wired to a pointer event bus.
pub struct AttachedFollower {
    state: Arc<Mutex<CursorFollower>>,
    _subscription: Subscription,
}

impl AttachedFollower {
    pub fn step(&self, dt: f32) {
        lock(&self.state).step(dt);
    }

    pub fn snapshot(&self) -> CursorFollower {
        *lock(&self.state)
    }
}
