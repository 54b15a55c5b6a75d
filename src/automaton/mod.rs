use std::borrow::Borrow;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::error::DefinitionError;

pub mod simulate;
pub mod validate;

pub use simulate::{Run, TraceEvent};

/// Canonical epsilon spelling. Definition files may also write `epsilon` in
/// any ASCII case; neither form is ever a member of a declared alphabet.
pub const EPSILON: &str = "ε";

/// True for any surface spelling of the epsilon pseudo-symbol.
pub fn is_epsilon(text: &str) -> bool {
    text == EPSILON || text.eq_ignore_ascii_case("epsilon")
}

macro_rules! label {
    ($(#[$meta:meta])* $Name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $Name(pub String);

        impl fmt::Display for $Name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $Name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $Name {
            fn from(label: &str) -> Self {
                Self(label.to_owned())
            }
        }
    };
}

label! {
    /// A named state.
    State
}
label! {
    /// A member of the input alphabet.
    Letter
}
label! {
    /// A member of the stack alphabet.
    Symbol
}

/// Lookup key of the transition relation; `None` is epsilon in both optional
/// positions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransitionFrom {
    pub state: State,
    pub letter: Option<Letter>,
    pub pop: Option<Symbol>,
}

/// Outcome of a transition: an optional push and the next state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransitionTo {
    pub push: Option<Symbol>,
    pub state: State,
}

/// A parsed automaton draft, exactly as the definition text declared it and
/// before any integrity checks. [`Definition::validate`] turns it into a
/// runnable [`Pda`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Definition {
    pub states: IndexSet<State>,
    pub alphabet: IndexSet<Letter>,
    pub stack_alphabet: IndexSet<Symbol>,
    pub rules: IndexMap<TransitionFrom, TransitionTo>,
    pub start: Option<State>,
    pub accept: IndexSet<State>,
}

/// A validated pushdown automaton. Immutable once built, so one instance can
/// back any number of simulation runs; each run owns its own state and stack.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Pda {
    pub(crate) states: IndexSet<State>,
    pub(crate) alphabet: IndexSet<Letter>,
    pub(crate) stack_alphabet: IndexSet<Symbol>,
    #[cfg_attr(feature = "serde", serde(serialize_with = "transitions_as_pairs"))]
    pub(crate) transitions: IndexMap<TransitionFrom, TransitionTo>,
    pub(crate) start: State,
    pub(crate) accept: IndexSet<State>,
}

// Struct keys have no map representation in most formats; a sequence of
// pairs does.
#[cfg(feature = "serde")]
fn transitions_as_pairs<S>(
    transitions: &IndexMap<TransitionFrom, TransitionTo>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(transitions.iter())
}

impl Pda {
    /// Parses and validates a complete definition text.
    pub fn load(src: &str) -> Result<Pda, DefinitionError> {
        crate::loader::parse(src)?.validate()
    }

    pub fn states(&self) -> &IndexSet<State> {
        &self.states
    }

    pub fn alphabet(&self) -> &IndexSet<Letter> {
        &self.alphabet
    }

    pub fn stack_alphabet(&self) -> &IndexSet<Symbol> {
        &self.stack_alphabet
    }

    pub fn transitions(&self) -> &IndexMap<TransitionFrom, TransitionTo> {
        &self.transitions
    }

    pub fn start(&self) -> &State {
        &self.start
    }

    pub fn accept(&self) -> &IndexSet<State> {
        &self.accept
    }
}
