//! Tick-driven frame sequencer.
//!
//! An `Animation` owns an ordered list of texture-atlas indices plus a hold
//! duration per frame, measured in simulation ticks. The sticky `played_once`
//! flag is the only mechanism the rest of the game uses to gate durations:
//! death poses, the grow pose and the turn pose all wait for one full cycle
//! before the owning state machine moves on.

/// Cycles through a list of atlas frame indices at a fixed per-frame delay.
#[derive(Clone, Debug, Default)]
pub struct Animation {
    frames: Vec<usize>,
    delay: u32,
    cursor: usize,
    elapsed: u32,
    played_once: bool,
}

impl Animation {
    pub fn new(frames: Vec<usize>, delay: u32) -> Self {
        Self {
            frames,
            delay,
            ..Default::default()
        }
    }

    /// Advances the sequencer by one simulation tick. The cursor moves once
    /// the current frame has been held for more than `delay` ticks; wrapping
    /// past the last frame resets it to the first and latches `played_once`.
    pub fn tick(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.elapsed += 1;
        if self.elapsed > self.delay {
            self.cursor += 1;
            self.elapsed = 0;
        }
        if self.cursor == self.frames.len() {
            self.cursor = 0;
            self.played_once = true;
        }
    }

    /// Replaces the frame list, rewinding the cursor and clearing the
    /// `played_once` latch.
    pub fn set_frames(&mut self, frames: Vec<usize>) {
        self.frames = frames;
        self.cursor = 0;
        self.elapsed = 0;
        self.played_once = false;
    }

    pub fn set_delay(&mut self, delay: u32) {
        self.delay = delay;
    }

    /// True once a full cycle has completed since the frames were last set.
    pub fn played_once(&self) -> bool {
        self.played_once
    }

    /// Atlas index of the frame currently shown, if any frames are set.
    pub fn current(&self) -> Option<usize> {
        self.frames.get(self.cursor).copied()
    }

    pub fn frames(&self) -> &[usize] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_after_full_cycle() {
        // Three frames at delay d cycle back to the first frame after
        // exactly (d + 1) * 3 ticks, latching played_once.
        let delay = 4;
        let mut anim = Animation::new(vec![10, 11, 12], delay);
        assert_eq!(anim.current(), Some(10));

        let cycle = (delay + 1) * 3;
        for tick in 1..=cycle {
            anim.tick();
            if tick < cycle {
                assert!(
                    !anim.played_once(),
                    "latched too early at tick {tick}"
                );
            }
        }
        assert_eq!(anim.current(), Some(10));
        assert!(anim.played_once());
    }

    #[test]
    fn played_once_is_sticky_until_frames_replaced() {
        let mut anim = Animation::new(vec![0, 1], 0);
        for _ in 0..10 {
            anim.tick();
        }
        assert!(anim.played_once());

        // Stays latched across further cycles.
        anim.tick();
        assert!(anim.played_once());

        anim.set_frames(vec![5]);
        assert!(!anim.played_once());
        assert_eq!(anim.current(), Some(5));
    }

    #[test]
    fn frame_advances_only_after_delay_expires() {
        let mut anim = Animation::new(vec![0, 1, 2], 5);
        for _ in 0..5 {
            anim.tick();
            assert_eq!(anim.current(), Some(0));
        }
        anim.tick();
        assert_eq!(anim.current(), Some(1));
    }

    #[test]
    fn empty_animation_ticks_without_latching() {
        let mut anim = Animation::default();
        anim.tick();
        assert_eq!(anim.current(), None);
        assert!(!anim.played_once());
    }

    #[test]
    fn single_frame_cycles_every_delay_period() {
        let mut anim = Animation::new(vec![7], 30);
        for _ in 0..30 {
            anim.tick();
        }
        assert!(!anim.played_once());
        anim.tick();
        assert!(anim.played_once());
    }
}
