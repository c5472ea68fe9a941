use crossterm::event::Event;
use ratatui::Frame;

pub use self::{
    questionnaire::QuestionnaireScreen,
    style_prompt::{StylePromptConfig, StylePromptScreen},
};

mod questionnaire;
mod style_prompt;

#[derive(Debug)]
pub enum Screen {
    Questionnaire(QuestionnaireScreen),
    StylePrompt(StylePromptScreen),
}

/// What the app should do after a screen handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTransition {
    Stay,
    /// The questionnaire is completed; ask for the style description
    StylePrompt,
    Exit,
}

impl Screen {
    pub fn draw(&self, frame: &mut Frame<'_>) {
        match self {
            Screen::Questionnaire(screen) => screen.draw(frame),
            Screen::StylePrompt(screen) => screen.draw(frame),
        }
    }

    pub fn handle_event(&mut self, event: &Event) -> anyhow::Result<ScreenTransition> {
        match self {
            Screen::Questionnaire(screen) => screen.handle_event(event),
            Screen::StylePrompt(screen) => screen.handle_event(event),
        }
    }
}
