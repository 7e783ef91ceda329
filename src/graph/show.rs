use std::fmt::Display;

use owo_colors::OwoColorize;

use crate::{Show, Symbol};

use super::{Colour, TransitionGraph};

impl<S: Symbol> TransitionGraph<S> {
    /// Renders the transition table with one row per state and one column per label. Red states
    /// are printed in bold red, blue states in blue and the initial state is marked with `>`.
    pub fn table(&self) -> String {
        let alphabet = self.alphabet();
        let mut b = tabled::builder::Builder::default();

        let mut header = vec!["".to_string(), "acc".to_string()];
        header.extend(alphabet.iter().map(|label| label.show()));
        b.push_record(header);

        for (id, state) in self.states() {
            let name = if id == self.initial() {
                format!(">{}", id.show())
            } else {
                id.show()
            };
            let mut row = vec![
                match state.colour() {
                    Colour::Red => name.red().bold().to_string(),
                    Colour::Blue => name.blue().to_string(),
                    Colour::Uncoloured => name,
                },
                state.is_accepting().show(),
            ];
            row.extend(alphabet.iter().map(|label| {
                self.transition(id, label)
                    .map(|target| target.show())
                    .unwrap_or_else(|| "-".dimmed().to_string())
            }));
            b.push_record(row);
        }

        b.build().with(tabled::settings::Style::ascii()).to_string()
    }
}

impl<S: Symbol> Display for TransitionGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table())
    }
}

impl<S: Symbol> Show for TransitionGraph<S> {
    fn show(&self) -> String {
        self.table()
    }
}
