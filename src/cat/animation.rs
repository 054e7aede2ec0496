/// How a clip behaves once it reaches its last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    /// Wraps around forever.
    Loop,
    /// Plays once and stops on the last frame, reporting its end.
    Toggle,
    /// Plays forward then backward, forever.
    PingPong,
}

/// Static description of one sprite animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub name: &'static str,
    pub frames: u16,
    pub fps: f32,
    pub kind: ClipKind,
    /// Height of one frame in sprite pixels.
    pub frame_height: f32,
}

impl Clip {
    /// Length of one pass, doubled for ping-pong clips. Zero for still frames.
    pub fn duration(&self) -> f32 {
        if self.fps <= 0.0 {
            return 0.0;
        }
        let once = self.frames as f32 / self.fps;
        match self.kind {
            ClipKind::PingPong => once * 2.0,
            _ => once,
        }
    }
}

const fn def(name: &'static str, frames: u16, fps: f32, kind: ClipKind, frame_height: f32) -> Clip {
    Clip {
        name,
        frames,
        fps,
        kind,
        frame_height,
    }
}

/// Every clip a cat sprite sheet provides.
const CLIPS: &[Clip] = &[
    def("Idle", 1, 0.0, ClipKind::Loop, 16.0),
    def("Idle Blink", 3, 2.0, ClipKind::Toggle, 16.0),
    def("Idle Tail", 6, 4.0, ClipKind::Toggle, 16.0),
    def("Idle Yawn", 9, 4.0, ClipKind::Toggle, 16.0),
    def("Sleeping", 3, 1.0, ClipKind::PingPong, 16.0),
    def("Walking Left", 8, 12.0, ClipKind::Loop, 16.0),
    def("Walking Right", 8, 12.0, ClipKind::Loop, 16.0),
    def("Jumping Start", 6, 40.0, ClipKind::Toggle, 24.0),
    def("Jumping Middle", 9, 10.0, ClipKind::Loop, 24.0),
    def("Jumping End", 5, 30.0, ClipKind::Toggle, 24.0),
    def("Carried", 6, 10.0, ClipKind::Loop, 24.0),
    def("Bouncing", 1, 0.0, ClipKind::Loop, 20.0),
    def("Falling", 1, 0.0, ClipKind::Loop, 16.0),
    def("Standing", 1, 0.0, ClipKind::Loop, 16.0),
    def("Sliding Left", 1, 0.0, ClipKind::Loop, 16.0),
    def("Sliding Right", 1, 0.0, ClipKind::Loop, 16.0),
    def("Eating Icon", 4, 7.0, ClipKind::Toggle, 16.0),
];

/// Prefix shared by the fidget clips played while sitting.
const IDLE_PREFIX: &str = "Idle ";

pub fn index_of(name: &str) -> Option<usize> {
    CLIPS.iter().position(|c| c.name == name)
}

pub fn clip(name: &str) -> Option<&'static Clip> {
    CLIPS.iter().find(|c| c.name == name)
}

pub fn clip_at(index: usize) -> Option<&'static Clip> {
    CLIPS.get(index)
}

/// Fidget clips ("Idle *") with their durations.
pub fn idle_clips() -> Vec<(&'static str, f32)> {
    CLIPS
        .iter()
        .filter(|c| c.name.starts_with(IDLE_PREFIX))
        .map(|c| (c.name, c.duration()))
        .collect()
}

/// Playback state of the active clip.
#[derive(Debug, Clone, Copy)]
pub struct Animator {
    pub clip: usize,
    pub frame: f32,
    pub speed: f32,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            clip: 0,
            frame: 0.0,
            speed: 1.0,
        }
    }
}

impl Animator {
    /// Switch clips. Re-selecting the current clip leaves it untouched.
    pub fn set(&mut self, name: &str) {
        match index_of(name) {
            Some(index) if index == self.clip => {}
            Some(index) => {
                self.clip = index;
                self.frame = 0.0;
                self.speed = 1.0;
            }
            None => log::warn!("Unknown animation {name:?}"),
        }
    }

    pub fn is_playing(&self, name: &str) -> bool {
        index_of(name) == Some(self.clip)
    }

    pub fn clip_name(&self) -> &'static str {
        clip_at(self.clip).map_or("", |c| c.name)
    }

    /// Advance playback. Returns true on the frame a one-shot clip finishes.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(clip) = clip_at(self.clip) else {
            return false;
        };
        let frames = clip.frames as f32;
        self.frame += clip.fps * self.speed * dt;

        match clip.kind {
            ClipKind::Toggle if self.frame >= frames && self.speed != 0.0 => {
                self.frame = frames - 1.0;
                self.speed = 0.0;
                true
            }
            ClipKind::Loop | ClipKind::PingPong if frames > 0.0 => {
                let span = if clip.kind == ClipKind::PingPong { frames * 2.0 } else { frames };
                self.frame = self.frame.rem_euclid(span);
                false
            }
            _ => false,
        }
    }

    /// Frame to draw, folding ping-pong playback back onto the sheet.
    pub fn visible_frame(&self) -> u16 {
        let Some(clip) = clip_at(self.clip) else {
            return 0;
        };
        let f = self.frame as u16;
        if clip.kind == ClipKind::PingPong && f >= clip.frames {
            (clip.frames * 2 - 1).saturating_sub(f)
        } else {
            f.min(clip.frames.saturating_sub(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_clip_durations() {
        let idle = idle_clips();
        assert_eq!(
            idle,
            vec![("Idle Blink", 1.5), ("Idle Tail", 1.5), ("Idle Yawn", 2.25)]
        );
        assert_eq!(clip("Sleeping").map(Clip::duration), Some(6.0));
        assert_eq!(clip("Idle").map(Clip::duration), Some(0.0));
    }

    #[test]
    fn toggle_clip_reports_end_once() {
        let mut anim = Animator::default();
        anim.set("Jumping End");

        let mut ends = 0;
        for _ in 0..60 {
            if anim.update(1.0 / 60.0) {
                ends += 1;
            }
        }
        assert_eq!(ends, 1);
        assert_eq!(anim.visible_frame(), 4);
    }

    #[test]
    fn reselecting_same_clip_keeps_progress() {
        let mut anim = Animator::default();
        anim.set("Walking Left");
        anim.update(0.25);
        let frame = anim.frame;

        anim.set("Walking Left");
        assert_eq!(anim.frame, frame);

        anim.set("Walking Right");
        assert_eq!(anim.frame, 0.0);
        assert!(anim.is_playing("Walking Right"));
    }

    #[test]
    fn loops_wrap_and_ping_pong_folds() {
        let mut anim = Animator::default();
        anim.set("Walking Right");
        assert!(!anim.update(1.0));
        assert!(anim.frame < 8.0);

        anim.set("Sleeping");
        anim.update(4.5);
        assert_eq!(anim.visible_frame(), 1);
    }
}
