use std::path::{Path, PathBuf};

use chrono::Utc;
use crossterm::event::{Event, KeyCode};
use prefq_core::{
    FeedbackStore, FileStore,
    export::{ExportRequest, FeedbackDocument, ValidationError},
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Text,
    widgets::{Block, Paragraph, Wrap},
};
use tracing::info;

use super::ScreenTransition;
use crate::{
    tui,
    util::Output,
    view::widgets::{HelpBar, KeyHint},
};

const FOCUSED_BORDER: Style = Style::new().fg(Color::Cyan);
const BLURRED_BORDER: Style = Style::new().fg(Color::DarkGray);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Yellow);
const SAVED_STYLE: Style = Style::new().fg(Color::Green);

#[derive(Debug, Clone)]
pub struct StylePromptConfig {
    /// Directory the feedback document is written to
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Style,
    Annotator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Editing,
    /// Nothing was answered; waiting for y/n
    ConfirmEmpty,
    Saved(PathBuf),
}

/// Asks for the style description and writes the feedback document.
#[derive(Debug)]
pub struct StylePromptScreen {
    feedback: FeedbackStore<FileStore>,
    config: StylePromptConfig,
    style: String,
    annotator: String,
    focus: Field,
    mode: Mode,
    message: Option<String>,
}

impl StylePromptScreen {
    pub fn new(feedback: FeedbackStore<FileStore>, config: StylePromptConfig) -> Self {
        let annotator = feedback.annotator_id().unwrap_or_default();
        Self {
            feedback,
            config,
            style: String::new(),
            annotator,
            focus: Field::Style,
            mode: Mode::Editing,
            message: None,
        }
    }

    pub fn saved_path(&self) -> Option<&Path> {
        match &self.mode {
            Mode::Saved(path) => Some(path),
            _ => None,
        }
    }

    pub fn handle_event(&mut self, event: &Event) -> anyhow::Result<ScreenTransition> {
        let Some(key) = tui::plain_key_press(event) else {
            return Ok(ScreenTransition::Stay);
        };
        match self.mode {
            Mode::Saved(_) => return Ok(ScreenTransition::Exit),
            Mode::ConfirmEmpty => match key.code {
                KeyCode::Char('y' | 'Y') => self.save(true)?,
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.mode = Mode::Editing,
                _ => {}
            },
            Mode::Editing => match key.code {
                KeyCode::Esc => return Ok(ScreenTransition::Exit),
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    self.focus = match self.focus {
                        Field::Style => Field::Annotator,
                        Field::Annotator => Field::Style,
                    };
                }
                KeyCode::Enter => self.save(false)?,
                KeyCode::Backspace => {
                    self.focused_text().pop();
                }
                KeyCode::Char(c) => self.focused_text().push(c),
                _ => {}
            },
        }
        Ok(ScreenTransition::Stay)
    }

    fn focused_text(&mut self) -> &mut String {
        match self.focus {
            Field::Style => &mut self.style,
            Field::Annotator => &mut self.annotator,
        }
    }

    fn save(&mut self, allow_empty: bool) -> anyhow::Result<()> {
        self.message = None;
        self.feedback.set_annotator_id(Some(&self.annotator))?;
        let request = ExportRequest {
            style_description: self.style.clone(),
            annotator_id: None,
            allow_empty,
        };
        let document = match FeedbackDocument::from_store(&self.feedback, &request, Utc::now()) {
            Ok(document) => document,
            Err(ValidationError::NoPreferences) => {
                self.mode = Mode::ConfirmEmpty;
                return Ok(());
            }
            Err(err @ ValidationError::MissingStyleDescription) => {
                self.message = Some(err.to_string());
                self.focus = Field::Style;
                self.mode = Mode::Editing;
                return Ok(());
            }
        };

        let path = self
            .config
            .output_dir
            .join(FeedbackDocument::suggested_filename(&document.style_description));
        match Output::save_json(&document, Some(path.clone())) {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    responses = document.responses_recorded,
                    "saved feedback document"
                );
                self.mode = Mode::Saved(path);
            }
            Err(err) => {
                self.message = Some(format!("{err:#}"));
                self.mode = Mode::Editing;
            }
        }
        Ok(())
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let [intro_area, style_area, annotator_area, message_area, help_area] =
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Length(1),
            ])
            .areas(frame.area());

        let intro = format!(
            "{} of your answers are stored for lambda {}.\nDescribe the style you had in mind while choosing.",
            self.feedback.len(),
            self.feedback.lambda(),
        );
        frame.render_widget(
            Paragraph::new(intro)
                .block(Block::bordered().title(" Done "))
                .centered(),
            intro_area,
        );
        self.draw_field(frame, style_area, Field::Style, " Style description ");
        self.draw_field(frame, annotator_area, Field::Annotator, " Annotator (optional) ");

        let status = match &self.mode {
            Mode::Editing => self
                .message
                .as_deref()
                .map(|message| Text::from(message).style(MESSAGE_STYLE)),
            Mode::ConfirmEmpty => Some(
                Text::from("No image preferences were recorded. Save anyway? (y/n)")
                    .style(MESSAGE_STYLE),
            ),
            Mode::Saved(path) => Some(
                Text::from(format!(
                    "Saved to {}. Press any key to exit.",
                    path.display()
                ))
                .style(SAVED_STYLE),
            ),
        };
        if let Some(status) = status {
            frame.render_widget(status.centered(), message_area);
        }
        self.draw_help(frame, help_area);
    }

    fn draw_field(&self, frame: &mut Frame<'_>, area: Rect, field: Field, title: &str) {
        let focused = self.mode == Mode::Editing && self.focus == field;
        let text = match field {
            Field::Style => &self.style,
            Field::Annotator => &self.annotator,
        };
        let (text, border) = if focused {
            (format!("{text}_"), FOCUSED_BORDER)
        } else {
            (text.clone(), BLURRED_BORDER)
        };
        frame.render_widget(
            Paragraph::new(text)
                .block(Block::bordered().title(title).border_style(border))
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    fn draw_help(&self, frame: &mut Frame<'_>, area: Rect) {
        let hints: &[KeyHint<'_>] = match self.mode {
            Mode::Editing => &EDITING_HINTS,
            Mode::ConfirmEmpty => &CONFIRM_HINTS,
            Mode::Saved(_) => &SAVED_HINTS,
        };
        frame.render_widget(HelpBar::new(hints), area);
    }
}

const EDITING_HINTS: [KeyHint<'static>; 3] = [
    KeyHint::new(&["Enter"], "Save"),
    KeyHint::new(&["Tab"], "Switch field"),
    KeyHint::new(&["Esc"], "Quit without saving"),
];
const CONFIRM_HINTS: [KeyHint<'static>; 2] = [
    KeyHint::new(&["y"], "Save anyway"),
    KeyHint::new(&["n", "Esc"], "Back"),
];
const SAVED_HINTS: [KeyHint<'static>; 1] = [KeyHint::new(&["any key"], "Exit")];
