use std::path::PathBuf;

use crossterm::event::Event;
use prefq_core::{FileStore, SessionConfig, SessionController};
use ratatui::Frame;

use super::{
    screens::{QuestionnaireScreen, Screen, ScreenTransition, StylePromptConfig, StylePromptScreen},
    viewer::Viewer,
};
use crate::tui::App;

/// How the rater left the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateOutcome {
    /// The feedback document was written to this path
    Saved(PathBuf),
    /// The rater quit early; answers stay in the store
    Quit { answered: usize, total: usize },
}

#[derive(Debug)]
pub struct RateApp {
    screen: Option<Screen>,
    prompt: StylePromptConfig,
    outcome: RateOutcome,
}

impl RateApp {
    pub fn new(
        session: SessionController<FileStore>,
        config: SessionConfig,
        viewer: Option<Viewer>,
        prompt: StylePromptConfig,
    ) -> Self {
        let outcome = RateOutcome::Quit {
            answered: session.num_answered(),
            total: session.len(),
        };
        Self {
            screen: Some(Screen::Questionnaire(QuestionnaireScreen::new(
                session, config, viewer,
            ))),
            prompt,
            outcome,
        }
    }

    pub fn outcome(&self) -> &RateOutcome {
        &self.outcome
    }

    fn apply_transition(&mut self, transition: ScreenTransition) {
        match transition {
            ScreenTransition::Stay => {}
            ScreenTransition::StylePrompt => {
                if let Some(Screen::Questionnaire(questionnaire)) = self.screen.take() {
                    self.outcome = questionnaire.outcome();
                    let feedback = questionnaire.into_feedback();
                    self.screen = Some(Screen::StylePrompt(StylePromptScreen::new(
                        feedback,
                        self.prompt.clone(),
                    )));
                }
            }
            ScreenTransition::Exit => {
                match self.screen.take() {
                    Some(Screen::Questionnaire(questionnaire)) => {
                        self.outcome = questionnaire.outcome();
                    }
                    Some(Screen::StylePrompt(prompt)) => {
                        if let Some(path) = prompt.saved_path() {
                            self.outcome = RateOutcome::Saved(path.to_path_buf());
                        }
                    }
                    None => {}
                }
            }
        }
    }
}

impl App for RateApp {
    fn should_exit(&self) -> bool {
        self.screen.is_none()
    }

    fn handle_event(&mut self, event: Event) -> anyhow::Result<()> {
        if let Some(screen) = &mut self.screen {
            let transition = screen.handle_event(&event)?;
            self.apply_transition(transition);
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        if let Some(screen) = &self.screen {
            screen.draw(frame);
        }
    }
}
