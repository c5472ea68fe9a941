use prefq_core::Preference;
use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Row of answer options with the current selection highlighted.
#[derive(Debug)]
pub struct ChoiceDisplay<'a> {
    choices: &'a [Preference],
    selected: Option<Preference>,
}

impl<'a> ChoiceDisplay<'a> {
    pub fn new(choices: &'a [Preference], selected: Option<Preference>) -> Self {
        Self { choices, selected }
    }
}

const CHOICE_STYLE: Style = Style::new().fg(Color::White);
const SELECTED_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Green)
    .add_modifier(Modifier::BOLD);

fn label(choice: Preference) -> String {
    match choice.policy_number() {
        Some(policy) => format!(" [{policy}] Policy {policy} "),
        None => " [-] Skip ".to_owned(),
    }
}

impl Widget for ChoiceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let mut spans = vec![];
        for (i, choice) in self.choices.iter().copied().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            let style = if self.selected == Some(choice) {
                SELECTED_STYLE
            } else {
                CHOICE_STYLE
            };
            spans.push(Span::styled(label(choice), style));
        }
        Line::from(spans).centered().render(area, buf);
    }
}
