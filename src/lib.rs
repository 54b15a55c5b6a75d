pub mod automaton;
pub mod encoding;
pub mod error;
pub mod loader;

pub use automaton::{
    Definition, EPSILON, Letter, Pda, Run, State, Symbol, TraceEvent, TransitionFrom,
    TransitionTo, is_epsilon,
};
pub use error::{Alphabet, DefinitionError, RunError, StateRole};
