use crate::bolt::{self, BoltPath};
use rand::Rng;

/// Milliseconds since the owning view was activated.
pub type Millis = u64;

pub const CANVAS_WIDTH: f64 = 520.0;
pub const CANVAS_HEIGHT: f64 = 680.0;
pub const BOLT_FADE_MS: Millis = 300;
pub const CONFIRMATION_MS: Millis = 3000;
pub const CELEBRATION_SPARK_MS: Millis = 600;

const STROBE_DELAY_MS: (Millis, Millis) = (2000, 10000);
const STROBE_ON_MS: (Millis, Millis) = (80, 320);
const STROBE_SPARK_MS: (Millis, Millis) = (700, 1300);
const STROBE_STRIKE_MS: (Millis, Millis) = (120, 520);
const CELEBRATION_STRIKE_MS: (Millis, Millis) = (300, 700);
const STROBE_SPARK_THRESHOLD: f64 = 0.65;
const STROBE_STRIKE_THRESHOLD: f64 = 0.55;

#[derive(Debug, Clone, PartialEq)]
enum StrobePhase {
    Stopped,
    Waiting { flash_at: Millis },
    Flashing { off_at: Millis },
}

#[derive(Debug, Clone, PartialEq)]
enum PulsePhase {
    Idle,
    Showing { hide_at: Millis },
}

#[derive(Debug, Clone, PartialEq)]
enum BoltPhase {
    Idle,
    Flashing { path: BoltPath, hide_at: Millis },
    Fading { path: BoltPath, clear_at: Millis },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectEvent {
    FlashOn { at: Millis },
    FlashOff { at: Millis },
    SparksHidden { at: Millis },
    BoltHidden { at: Millis },
    BoltCleared { at: Millis },
    ConfirmationHidden { at: Millis },
}

/// Read-only view of the current effect flags and live bolt.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectState {
    pub strobe_active: bool,
    pub show_sparks: bool,
    pub bolt_visible: bool,
    pub confirmation_visible: bool,
    pub bolt: Option<BoltPath>,
}

/// Timer-driven state machine behind the strobe, spark, bolt and
/// confirmation effects. Each effect kind holds at most one pending
/// deadline, so re-triggering an effect replaces its timer instead of
/// queueing another.
pub struct EffectScheduler<R> {
    rng: R,
    strobe: StrobePhase,
    sparks: PulsePhase,
    bolt: BoltPhase,
    confirmation: PulsePhase,
}

#[derive(Clone, Copy)]
enum Due {
    Strobe,
    Sparks,
    Bolt,
    Confirmation,
}

impl<R: Rng> EffectScheduler<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            strobe: StrobePhase::Stopped,
            sparks: PulsePhase::Idle,
            bolt: BoltPhase::Idle,
            confirmation: PulsePhase::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.strobe != StrobePhase::Stopped
    }

    /// Starts the strobe loop. No-op while it is already running.
    pub fn start(&mut self, now: Millis) {
        if self.is_running() {
            return;
        }
        self.schedule_flash(now);
    }

    /// Cancels every pending timer and drops the live bolt.
    pub fn stop(&mut self) {
        self.strobe = StrobePhase::Stopped;
        self.sparks = PulsePhase::Idle;
        self.bolt = BoltPhase::Idle;
        self.confirmation = PulsePhase::Idle;
    }

    pub fn spark_burst(&mut self, now: Millis, duration: Millis) {
        self.sparks = PulsePhase::Showing {
            hide_at: now + duration,
        };
    }

    /// Replaces any visible or fading bolt with a freshly generated one.
    pub fn strike(&mut self, now: Millis, duration: Millis) {
        let path = bolt::generate_with(&mut self.rng, CANVAS_WIDTH, CANVAS_HEIGHT);
        self.bolt = BoltPhase::Flashing {
            path,
            hide_at: now + duration,
        };
    }

    /// Entry celebration after a charge has been logged.
    pub fn celebrate(&mut self, now: Millis) {
        self.confirmation = PulsePhase::Showing {
            hide_at: now + CONFIRMATION_MS,
        };
        let duration = self.draw(CELEBRATION_STRIKE_MS);
        self.strike(now, duration);
        self.spark_burst(now, CELEBRATION_SPARK_MS);
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending().map(|(at, _)| at)
    }

    /// Fires every timer due at or before `now`, each at its own deadline,
    /// and returns what happened in order.
    pub fn advance(&mut self, now: Millis) -> Vec<EffectEvent> {
        let mut events = Vec::new();
        while let Some((at, due)) = self.pending() {
            if at > now {
                break;
            }
            match due {
                Due::Strobe => self.fire_strobe(at, &mut events),
                Due::Sparks => {
                    self.sparks = PulsePhase::Idle;
                    events.push(EffectEvent::SparksHidden { at });
                }
                Due::Bolt => self.fire_bolt(at, &mut events),
                Due::Confirmation => {
                    self.confirmation = PulsePhase::Idle;
                    events.push(EffectEvent::ConfirmationHidden { at });
                }
            }
        }
        events
    }

    pub fn state(&self) -> EffectState {
        let bolt = match &self.bolt {
            BoltPhase::Idle => None,
            BoltPhase::Flashing { path, .. } | BoltPhase::Fading { path, .. } => Some(path.clone()),
        };
        EffectState {
            strobe_active: matches!(self.strobe, StrobePhase::Flashing { .. }),
            show_sparks: matches!(self.sparks, PulsePhase::Showing { .. }),
            bolt_visible: matches!(self.bolt, BoltPhase::Flashing { .. }),
            confirmation_visible: matches!(self.confirmation, PulsePhase::Showing { .. }),
            bolt,
        }
    }

    fn fire_strobe(&mut self, at: Millis, events: &mut Vec<EffectEvent>) {
        match self.strobe {
            StrobePhase::Waiting { .. } => {
                let on_for = self.draw(STROBE_ON_MS);
                self.strobe = StrobePhase::Flashing { off_at: at + on_for };
                events.push(EffectEvent::FlashOn { at });

                if self.rng.gen_range(0.0..1.0) > STROBE_SPARK_THRESHOLD {
                    let duration = self.draw(STROBE_SPARK_MS);
                    self.spark_burst(at, duration);
                }
                if self.rng.gen_range(0.0..1.0) > STROBE_STRIKE_THRESHOLD {
                    let duration = self.draw(STROBE_STRIKE_MS);
                    self.strike(at, duration);
                }
            }
            StrobePhase::Flashing { .. } => {
                events.push(EffectEvent::FlashOff { at });
                self.schedule_flash(at);
            }
            StrobePhase::Stopped => {}
        }
    }

    fn fire_bolt(&mut self, at: Millis, events: &mut Vec<EffectEvent>) {
        match std::mem::replace(&mut self.bolt, BoltPhase::Idle) {
            BoltPhase::Flashing { path, .. } => {
                self.bolt = BoltPhase::Fading {
                    path,
                    clear_at: at + BOLT_FADE_MS,
                };
                events.push(EffectEvent::BoltHidden { at });
            }
            BoltPhase::Fading { .. } => events.push(EffectEvent::BoltCleared { at }),
            BoltPhase::Idle => {}
        }
    }

    fn schedule_flash(&mut self, now: Millis) {
        let delay = self.draw(STROBE_DELAY_MS);
        self.strobe = StrobePhase::Waiting {
            flash_at: now + delay,
        };
    }

    fn draw(&mut self, (low, high): (Millis, Millis)) -> Millis {
        self.rng.gen_range(low..high)
    }

    fn pending(&self) -> Option<(Millis, Due)> {
        let strobe = match self.strobe {
            StrobePhase::Waiting { flash_at } => Some(flash_at),
            StrobePhase::Flashing { off_at } => Some(off_at),
            StrobePhase::Stopped => None,
        };
        let sparks = match self.sparks {
            PulsePhase::Showing { hide_at } => Some(hide_at),
            PulsePhase::Idle => None,
        };
        let bolt = match self.bolt {
            BoltPhase::Flashing { hide_at, .. } => Some(hide_at),
            BoltPhase::Fading { clear_at, .. } => Some(clear_at),
            BoltPhase::Idle => None,
        };
        let confirmation = match self.confirmation {
            PulsePhase::Showing { hide_at } => Some(hide_at),
            PulsePhase::Idle => None,
        };

        [
            (strobe, Due::Strobe),
            (sparks, Due::Sparks),
            (bolt, Due::Bolt),
            (confirmation, Due::Confirmation),
        ]
        .into_iter()
        .filter_map(|(at, due)| at.map(|at| (at, due)))
        .min_by_key(|(at, _)| *at)
    }
}
