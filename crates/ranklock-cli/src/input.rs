use crate::shutdown::ShutdownSignal;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Spawn a thread that monitors keyboard input for quit keys (Esc, q, Q).
///
/// The quit takes effect at the next tick boundary of the watch loop; a
/// poll already in flight is never interrupted.
pub fn spawn_keyboard_monitor(shutdown: Arc<ShutdownSignal>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !shutdown.is_shutdown() {
            // Poll with a timeout so the thread notices external shutdown
            if event::poll(Duration::from_millis(100)).unwrap_or(false)
                && let Ok(Event::Key(key_event)) = event::read()
                && should_quit(&key_event)
            {
                debug!("Quit key pressed: {:?}", key_event.code);
                shutdown.trigger();
                break;
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

/// Block until any key is pressed. Used for the "press any key to quit"
/// acknowledgment when the game is not running.
pub fn wait_for_any_key() {
    loop {
        if let Ok(Event::Key(_)) = event::read() {
            return;
        }
    }
}

fn should_quit(event: &KeyEvent) -> bool {
    match event.code {
        KeyCode::Esc => true,
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_keys() {
        assert!(should_quit(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(should_quit(&KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::NONE
        )));
        assert!(should_quit(&KeyEvent::new(
            KeyCode::Char('Q'),
            KeyModifiers::SHIFT
        )));
        assert!(should_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
    }

    #[test]
    fn other_keys_do_not_quit() {
        assert!(!should_quit(&KeyEvent::new(
            KeyCode::Char('a'),
            KeyModifiers::NONE
        )));
        assert!(!should_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::NONE
        )));
        assert!(!should_quit(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
    }
}
