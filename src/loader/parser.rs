use super::lines::Lines;
use crate::automaton::{
    Definition, Letter, State, Symbol, TransitionFrom, TransitionTo, is_epsilon,
};
use crate::error::DefinitionError;

/// The six recognized sections, plus where the parser stands when outside
/// any of them or inside one it does not know.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    None,
    States,
    Sigma,
    StackSigma,
    Rules,
    Start,
    Accept,
    /// Unknown header: accepted, content discarded.
    Ignored,
}

impl Section {
    fn from_name(name: &str) -> Section {
        match name {
            "States" => Section::States,
            "Sigma" => Section::Sigma,
            "Stack Sigma" => Section::StackSigma,
            "Rules" => Section::Rules,
            "Start" => Section::Start,
            "Accept" => Section::Accept,
            _ => Section::Ignored,
        }
    }
}

/// Feeds the cleaned lines through the section dispatch, accumulating the
/// automaton draft. The only parse failure is a malformed rule line; every
/// referential question is left to [`Definition::validate`].
pub fn parse(src: &str) -> Result<Definition, DefinitionError> {
    let mut definition = Definition::default();
    let mut section = Section::None;

    for line in Lines::new(src) {
        let text = line.text.as_ref();
        if let Some(header) = text.strip_prefix('[') {
            section = Section::from_name(header.strip_suffix(']').unwrap_or(header));
            continue;
        }
        if text == "End" {
            section = Section::None;
            continue;
        }
        match section {
            Section::None | Section::Ignored => {}
            Section::States => {
                definition.states.insert(State::from(text));
            }
            Section::Sigma => {
                definition.alphabet.insert(Letter::from(text));
            }
            Section::StackSigma => {
                definition.stack_alphabet.insert(Symbol::from(text));
            }
            Section::Start => definition.start = Some(State::from(text)),
            Section::Accept => {
                definition.accept.insert(State::from(text));
            }
            Section::Rules => rule(text, line.number, &mut definition)?,
        }
    }
    Ok(definition)
}

fn rule(text: &str, line: usize, definition: &mut Definition) -> Result<(), DefinitionError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [source, letter, pop, push, destination] = fields[..] else {
        return Err(DefinitionError::MalformedRule {
            line,
            found: fields.len(),
        });
    };
    let from = TransitionFrom {
        state: State::from(source),
        letter: (!is_epsilon(letter)).then(|| Letter::from(letter)),
        pop: (!is_epsilon(pop)).then(|| Symbol::from(pop)),
    };
    let to = TransitionTo {
        push: (!is_epsilon(push)).then(|| Symbol::from(push)),
        state: State::from(destination),
    };
    // Replaces any earlier rule with the same key: the last write wins.
    definition.rules.insert(from, to);
    Ok(())
}
