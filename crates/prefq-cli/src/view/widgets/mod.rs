pub use self::{
    choice_display::ChoiceDisplay,
    help_bar::{HelpBar, KeyHint},
};

mod choice_display;
mod help_bar;
