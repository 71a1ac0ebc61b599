/// Render loop state machine tied to a viewer's connected lifetime
use std::cell::Cell;
use std::rc::Rc;

/// Shared "still attached" flag.
///
/// Cloned into every callback of one viewer attachment; detaching clears it
/// for all of them. A fresh attachment gets a fresh flag.
#[derive(Debug, Clone)]
pub struct ConnectionFlag(Rc<Cell<bool>>);

impl ConnectionFlag {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_connected(&self) -> bool {
        self.0.get()
    }

    pub fn disconnect(&self) {
        self.0.set(false);
    }
}

impl Default for ConnectionFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// What to do once a frame has been drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDecision {
    Reschedule,
    Stop,
}

/// Cooperative render loop.
///
/// The host draws a frame and then calls [`RenderLoop::end_frame`]. A frame
/// already scheduled when the viewer detaches still runs; it is the one that
/// observes the cleared flag and stops the loop.
#[derive(Debug)]
pub struct RenderLoop {
    flag: ConnectionFlag,
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    pub fn new(flag: ConnectionFlag) -> Self {
        Self {
            flag,
            state: LoopState::Running,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether the next scheduled frame should draw at all
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn end_frame(&mut self) -> FrameDecision {
        if self.state == LoopState::Stopped {
            return FrameDecision::Stop;
        }
        self.frames += 1;
        if self.flag.is_connected() {
            FrameDecision::Reschedule
        } else {
            self.state = LoopState::Stopped;
            FrameDecision::Stop
        }
    }
}
