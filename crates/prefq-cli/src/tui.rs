//! Minimal terminal runtime for the questionnaire.
//!
//! The questionnaire only changes in response to input, so there is no tick:
//! the loop blocks on the next terminal event and redraws after every event
//! that may have changed what is shown.

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;

/// Application driven by [`run`].
pub trait App {
    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, etc.).
    fn handle_event(&mut self, event: Event) -> anyhow::Result<()>;

    /// Draws the screen.
    fn draw(&self, frame: &mut Frame);
}

/// Runs `app` until [`App::should_exit`] returns true.
pub fn run<A>(app: &mut A) -> anyhow::Result<()>
where
    A: App,
{
    ratatui::run(|terminal| -> anyhow::Result<()> {
        let mut dirty = true;
        while !app.should_exit() {
            if dirty {
                terminal.draw(|frame| app.draw(frame))?;
            }
            let event = event::read()?;
            dirty = needs_redraw(&event);
            app.handle_event(event)?;
        }
        Ok(())
    })
}

fn needs_redraw(event: &Event) -> bool {
    matches!(event, Event::Key(_) | Event::Resize(..) | Event::FocusGained)
}

/// Returns the key press in `event` unless Ctrl, Alt or Super is held.
///
/// Shift is allowed so that upper-case text can be typed. Release and repeat
/// events are ignored.
pub fn plain_key_press(event: &Event) -> Option<KeyEvent> {
    let key = event.as_key_event()?;
    let blocked = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    (key.kind == KeyEventKind::Press && !key.modifiers.intersects(blocked)).then_some(key)
}
