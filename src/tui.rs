use std::io::{self, Stderr};
use std::sync::Once;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Drives the "typing" animation and lets the loop notice finished tasks
pub const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Debug, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

impl AppEvent {
    /// Terminal events the chat reacts to. Key releases and repeats are dropped.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Merges terminal input and a periodic tick into one stream.
/// The reader and ticker tasks stop when the handler is dropped.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let input_tx = tx.clone();
        let reader = tokio::spawn(async move {
            let mut stream = event::EventStream::new();
            while let Some(Ok(evt)) = stream.next().await {
                if let Some(event) = AppEvent::from_terminal(evt) {
                    if input_tx.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        let ticker = tokio::spawn(ticks(tx, tick_rate));

        Self {
            rx,
            tasks: vec![reader, ticker],
        }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn ticks(tx: mpsc::UnboundedSender<AppEvent>, tick_rate: Duration) {
    let mut interval = tokio::time::interval(tick_rate);
    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    }
}

/// Switch to raw mode on the alternate screen. A panic hook puts the
/// terminal back before the panic message prints.
pub fn init() -> Result<Tui> {
    install_panic_hook();

    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(io::stderr());
    Ok(Terminal::new(backend)?)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = restore();
            original_hook(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn only_key_presses_pass_through() {
        assert!(matches!(AppEvent::from_terminal(key(KeyEventKind::Press)), Some(AppEvent::Key(_))));
        assert_eq!(AppEvent::from_terminal(key(KeyEventKind::Release)), None);
        assert_eq!(AppEvent::from_terminal(key(KeyEventKind::Repeat)), None);
        assert_eq!(AppEvent::from_terminal(Event::FocusGained), None);
        assert_eq!(AppEvent::from_terminal(Event::Resize(80, 24)), Some(AppEvent::Resize(80, 24)));
    }

    #[tokio::test]
    async fn ticks_arrive_at_the_given_rate() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = tokio::spawn(ticks(tx, Duration::from_millis(5)));

        assert_eq!(rx.recv().await, Some(AppEvent::Tick));
        assert_eq!(rx.recv().await, Some(AppEvent::Tick));
        ticker.abort();
    }

    #[tokio::test]
    async fn ticker_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        // Returns instead of looping forever
        ticks(tx, Duration::from_millis(1)).await;
    }
}
