//! Frame-timer animation state
//!
//! Only the timing lives here; the frames themselves belong to the atlas.

/// Current action and its frame timer
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    /// Sprite key of the running reel
    pub action: &'static str,
    /// Seconds since the action started
    pub timer: f32,
    /// Frame shown this tick
    pub frame: usize,
}

impl Animation {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            timer: 0.0,
            frame: 0,
        }
    }

    /// Switch reels; restarting the timer only when the action really changes
    pub fn change_action(&mut self, action: &'static str) {
        if self.action != action {
            self.action = action;
            self.timer = 0.0;
            self.frame = 0;
        }
    }

    /// Pick the frame for the current timer, then advance the timer by `dt`
    pub fn step(&mut self, dt: f32, period: f32, frames: usize) -> usize {
        self.frame = frame_index(self.timer, period, frames);
        self.timer += dt;
        self.frame
    }

    /// Whether the reel has played through once
    pub fn finished(&self, period: f32, frames: usize) -> bool {
        self.timer >= period * frames.max(1) as f32
    }
}

/// `floor(timer / period) mod frames`
pub fn frame_index(timer: f32, period: f32, frames: usize) -> usize {
    if frames == 0 || period <= 0.0 {
        return 0;
    }
    (timer / period).floor() as usize % frames
}
