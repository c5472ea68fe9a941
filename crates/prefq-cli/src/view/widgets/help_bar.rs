use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// One entry of a [`HelpBar`].
#[derive(Debug, Clone, Copy)]
pub struct KeyHint<'a> {
    keys: &'a [&'a str],
    description: &'a str,
    enabled: bool,
}

impl<'a> KeyHint<'a> {
    pub const fn new(keys: &'a [&'a str], description: &'a str) -> Self {
        Self {
            keys,
            description,
            enabled: true,
        }
    }

    /// Greys the hint out unless `enabled`.
    pub const fn enabled_if(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }
}

/// Single centered line of key hints.
#[derive(Debug)]
pub struct HelpBar<'a> {
    hints: &'a [KeyHint<'a>],
}

impl<'a> HelpBar<'a> {
    pub fn new(hints: &'a [KeyHint<'a>]) -> Self {
        Self { hints }
    }
}

const KEY_STYLE: Style = Style::new().fg(Color::Cyan);
const DESCRIPTION_STYLE: Style = Style::new().fg(Color::White);
const DISABLED_STYLE: Style = Style::new().fg(Color::DarkGray);
const SEPARATOR_STYLE: Style = Style::new().fg(Color::DarkGray);

impl Widget for HelpBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let mut spans = vec![];
        for (i, hint) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", SEPARATOR_STYLE));
            }
            let (key_style, description_style) = if hint.enabled {
                (KEY_STYLE, DESCRIPTION_STYLE)
            } else {
                (DISABLED_STYLE, DISABLED_STYLE)
            };
            for (j, key) in hint.keys.iter().copied().enumerate() {
                if j > 0 {
                    spans.push(Span::styled("/", SEPARATOR_STYLE));
                }
                spans.push(Span::styled(key, key_style));
            }
            spans.push(Span::styled(" ", description_style));
            spans.push(Span::styled(hint.description, description_style));
        }
        Line::from(spans).centered().render(area, buf);
    }
}
