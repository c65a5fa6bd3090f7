use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyModifiers};

/// How often the event loop wakes up to poll the countdown and redraw.
pub const UI_TICK: Duration = Duration::from_millis(100);

/// Everything the main loop reacts to.
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where the main loop gets its input from.
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => tx.send(GameEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => tx.send(GameEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Event source fed from a channel, for headless runs and tests
pub struct ChannelEventSource {
    rx: Receiver<GameEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Hands the main loop one event per step, or a tick when input is idle.
pub struct Runner<E: EventSource> {
    event_source: E,
    interval: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, interval: Duration) -> Self {
        Self {
            event_source,
            interval,
        }
    }

    /// Blocks up to one interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }
}

/// What a key asks the game to do on the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reveal when scrambled, deal the next phrase when revealed, restart when ended.
    Advance,
    Reveal,
    Next,
    SelectPrevious,
    SelectNext,
    Increment,
    Decrement,
    ResetSelected,
    ResetAll,
    OpenSettings,
    CursorLeft,
    CursorRight,
    MoveTokenLeft,
    MoveTokenRight,
    CheckArrangement,
    Quit,
}

/// Key bindings of the main screen.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    let command = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Command::Quit,
        KeyCode::Enter | KeyCode::Char(' ') => Command::Advance,
        KeyCode::Char('r') => Command::Reveal,
        KeyCode::Char('n') => Command::Next,
        KeyCode::Up => Command::SelectPrevious,
        KeyCode::Down => Command::SelectNext,
        KeyCode::Char('+') | KeyCode::Char('=') => Command::Increment,
        KeyCode::Char('-') => Command::Decrement,
        KeyCode::Char('0') => Command::ResetSelected,
        KeyCode::Char('R') => Command::ResetAll,
        KeyCode::Char('s') => Command::OpenSettings,
        KeyCode::Left => Command::CursorLeft,
        KeyCode::Right => Command::CursorRight,
        KeyCode::Char('<') | KeyCode::Char(',') => Command::MoveTokenLeft,
        KeyCode::Char('>') | KeyCode::Char('.') => Command::MoveTokenRight,
        KeyCode::Char('c') => Command::CheckArrangement,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Resize).unwrap();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(10));

        assert!(matches!(runner.step(), GameEvent::Resize));
    }

    #[test]
    fn step_ticks_after_sender_hangs_up() {
        let (tx, rx) = mpsc::channel::<GameEvent>();
        drop(tx);
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(10));
        assert!(matches!(runner.step(), GameEvent::Tick));
    }

    #[test]
    fn key_bindings() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(command_for(key(KeyCode::Char(' '))), Some(Command::Advance));
        assert_eq!(command_for(key(KeyCode::Char('+'))), Some(Command::Increment));
        assert_eq!(command_for(key(KeyCode::Char('R'))), Some(Command::ResetAll));
        assert_eq!(command_for(key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(command_for(key(KeyCode::Char('z'))), None);
        assert_eq!(
            command_for(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(command_for(key(KeyCode::Char('c'))), Some(Command::CheckArrangement));
    }
}
