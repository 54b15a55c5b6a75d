use std::fmt;

use thiserror::Error;

/// Which of the two declared alphabets an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alphabet {
    Input,
    Stack,
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alphabet::Input => write!(f, "input"),
            Alphabet::Stack => write!(f, "stack"),
        }
    }
}

/// The position a state name occupied when it failed a membership check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateRole {
    Start,
    Accept,
    Source,
    Destination,
}

impl fmt::Display for StateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateRole::Start => write!(f, "start"),
            StateRole::Accept => write!(f, "accept"),
            StateRole::Source => write!(f, "source"),
            StateRole::Destination => write!(f, "destination"),
        }
    }
}

/// Raised while parsing or validating a definition, before any simulation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("{0} alphabet is not defined")]
    UndefinedAlphabet(Alphabet),

    #[error("start state is not defined")]
    UndefinedStartState,

    #[error("accept states are not defined")]
    UndefinedAcceptStates,

    #[error("{role} state `{name}` is not defined in the state set")]
    InvalidState { role: StateRole, name: String },

    #[error("symbol `{name}` is not defined in the {alphabet} alphabet")]
    InvalidSymbol { alphabet: Alphabet, name: String },

    #[error("epsilon is implicit and must not be declared in the {0} alphabet")]
    EpsilonDeclared(Alphabet),

    #[error("rule on line {line} has {found} comma-separated fields, expected 5")]
    MalformedRule { line: usize, found: usize },
}

/// Raised by a simulation run. Disjoint from [`DefinitionError`]: nothing
/// here implies a defect in the automaton's definition text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("pda is not valid")]
    InvalidPda(#[from] DefinitionError),

    #[error("input string contains symbol `{symbol}` outside the input alphabet")]
    InputSymbol { symbol: String },
}
