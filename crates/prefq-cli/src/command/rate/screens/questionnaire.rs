use crossterm::event::{Event, KeyCode};
use prefq_core::{
    FeedbackStore, FileStore, Preference, SessionConfig, SessionController, SessionError,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Text,
    widgets::{Block, Gauge, Paragraph},
};

use super::ScreenTransition;
use crate::{
    command::rate::{app::RateOutcome, viewer::Viewer},
    tui,
    view::widgets::{ChoiceDisplay, HelpBar, KeyHint},
};

const MESSAGE_STYLE: Style = Style::new().fg(Color::Yellow);
const NOTE_STYLE: Style = Style::new().fg(Color::DarkGray);

#[derive(Debug)]
pub struct QuestionnaireScreen {
    session: SessionController<FileStore>,
    choices: Vec<Preference>,
    viewer: Option<Viewer>,
    message: Option<String>,
}

impl QuestionnaireScreen {
    pub fn new(
        session: SessionController<FileStore>,
        config: SessionConfig,
        viewer: Option<Viewer>,
    ) -> Self {
        let mut screen = Self {
            session,
            choices: config.choices().collect(),
            viewer,
            message: None,
        };
        screen.show_in_viewer();
        screen
    }

    pub fn outcome(&self) -> RateOutcome {
        RateOutcome::Quit {
            answered: self.session.num_answered(),
            total: self.session.len(),
        }
    }

    pub fn into_feedback(self) -> FeedbackStore<FileStore> {
        self.session.into_feedback()
    }

    fn show_in_viewer(&mut self) {
        if let (Some(viewer), Some(image)) = (&mut self.viewer, self.session.current_image()) {
            viewer.show(&image.filename);
        }
    }

    pub fn handle_event(&mut self, event: &Event) -> anyhow::Result<ScreenTransition> {
        let Some(key) = tui::plain_key_press(event) else {
            return Ok(ScreenTransition::Stay);
        };
        let before = self.session.current_index();
        let result = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(ScreenTransition::Exit),
            KeyCode::Char('v') => {
                self.show_in_viewer();
                return Ok(ScreenTransition::Stay);
            }
            KeyCode::Char(c @ '1'..='9') => match digit_choice(c) {
                Some(choice) => self.session.select_and_advance(choice),
                None => return Ok(ScreenTransition::Stay),
            },
            KeyCode::Char('-' | '0') => self.session.select_and_advance(Preference::SKIPPED),
            KeyCode::Left | KeyCode::Char('h') => self.session.retreat(),
            KeyCode::Right | KeyCode::Char('l') => self.session.advance(),
            _ => return Ok(ScreenTransition::Stay),
        };

        self.message = None;
        let state = match result {
            Ok(state) => state,
            Err(SessionError::InvalidPreference(error)) => {
                self.message = Some(error.to_string());
                return Ok(ScreenTransition::Stay);
            }
            Err(error) => return Err(error.into()),
        };
        if state.is_completed() {
            return Ok(ScreenTransition::StylePrompt);
        }
        if self.session.current_index() != before {
            self.show_in_viewer();
        }
        Ok(ScreenTransition::Stay)
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let [progress_area, image_area, message_area, help_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_progress(frame, progress_area);
        self.draw_image(frame, image_area);
        if let Some(message) = &self.message {
            frame.render_widget(
                Text::from(message.as_str()).style(MESSAGE_STYLE).centered(),
                message_area,
            );
        }
        self.draw_help(frame, help_area);
    }

    #[expect(clippy::cast_precision_loss)]
    fn draw_progress(&self, frame: &mut Frame<'_>, area: Rect) {
        let index = self.session.current_index().unwrap_or(0);
        let total = self.session.len();
        let gauge = Gauge::default()
            .block(Block::bordered().title(format!(" Question {} / {total} ", index + 1)))
            .gauge_style(Style::new().fg(Color::Green))
            .ratio((index + 1) as f64 / total as f64)
            .label(format!("{} answered", self.session.num_answered()));
        frame.render_widget(gauge, area);
    }

    fn draw_image(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::bordered().title(" Which policy do you prefer? ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [filename_area, _, choices_area, _, note_area] =
            Layout::vertical([Constraint::Length(1); 5]).areas(inner);
        if let Some(image) = self.session.current_image() {
            frame.render_widget(
                Paragraph::new(image.filename.as_str()).centered(),
                filename_area,
            );
        }
        frame.render_widget(
            ChoiceDisplay::new(&self.choices, self.session.selection()),
            choices_area,
        );

        let note = if self.session.is_current_skip_listed() {
            Some("This image cannot be rated and is recorded as skipped.")
        } else if self.viewer.is_none() {
            Some("Open the file above in an image viewer, or restart with --viewer.")
        } else {
            None
        };
        if let Some(note) = note {
            frame.render_widget(Text::from(note).style(NOTE_STYLE).centered(), note_area);
        }
    }

    fn draw_help(&self, frame: &mut Frame<'_>, area: Rect) {
        let num_policies = self.session.num_policies();
        let digits = if num_policies > 1 {
            format!("1-{num_policies}")
        } else {
            "1".to_owned()
        };
        let digit_keys = [digits.as_str()];
        let next = if self.session.is_last() {
            "Finish"
        } else {
            "Next"
        };
        let hints = [
            KeyHint::new(&digit_keys, "Choose"),
            KeyHint::new(&["-", "0"], "Skip"),
            KeyHint::new(&["←", "h"], "Previous").enabled_if(!self.session.is_first()),
            KeyHint::new(&["→", "l"], next),
            KeyHint::new(&["v"], "View").enabled_if(self.viewer.is_some()),
            KeyHint::new(&["q", "Esc"], "Quit"),
        ];
        frame.render_widget(HelpBar::new(&hints), area);
    }
}

fn digit_choice(c: char) -> Option<Preference> {
    c.to_digit(10)
        .and_then(|digit| u8::try_from(digit).ok())
        .map(Preference::policy)
}
