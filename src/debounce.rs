use std::time::Duration;

pub const DEFAULT_DEBOUNCE_WAIT: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState<T> {
    Idle,
    Pending { deadline: Duration, args: T },
}

/// Last-write-wins debouncer driven by the host event loop.
///
/// Timestamps are monotonic offsets from an origin the host picks; the debouncer
/// only compares them. Each [`Debouncer::call`] supersedes whatever was pending, so a
/// burst of calls closer together than `wait` yields a single invocation carrying
/// the arguments of the last call.
pub struct Debouncer<T, F>
where
    F: FnMut(T),
{
    wait: Duration,
    state: DebounceState<T>,
    callback: F,
}

impl<T, F> Debouncer<T, F>
where
    F: FnMut(T),
{
    pub fn new(wait: Duration, callback: F) -> Self {
        Self {
            wait,
            state: DebounceState::Idle,
            callback,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn state(&self) -> &DebounceState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// When the host should call [`Debouncer::poll`] next.
    pub fn deadline(&self) -> Option<Duration> {
        match &self.state {
            DebounceState::Idle => None,
            DebounceState::Pending { deadline, .. } => Some(*deadline),
        }
    }

    pub fn call(&mut self, args: T, now: Duration) {
        // Replacing the state drops any superseded arguments.
        self.state = DebounceState::Pending {
            deadline: now.saturating_add(self.wait),
            args,
        };
    }

    /// Fires the pending call if its deadline has passed. Returns whether it fired.
    pub fn poll(&mut self, now: Duration) -> bool {
        let due = matches!(
            &self.state,
            DebounceState::Pending { deadline, .. } if now >= *deadline
        );
        if due { self.fire() } else { false }
    }

    /// Fires the pending call regardless of its deadline.
    pub fn flush(&mut self) -> bool {
        self.fire()
    }

    /// Runs the callback directly, bypassing the timer. A pending call is dropped
    /// because `args` is newer.
    pub fn invoke_now(&mut self, args: T) {
        self.state = DebounceState::Idle;
        (self.callback)(args);
    }

    pub fn cancel(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Idle => None,
            DebounceState::Pending { args, .. } => Some(args),
        }
    }

    fn fire(&mut self) -> bool {
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Idle => false,
            DebounceState::Pending { args, .. } => {
                (self.callback)(args);
                true
            }
        }
    }
}
