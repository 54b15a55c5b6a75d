use indexmap::{IndexMap, IndexSet};

use super::{Definition, Letter, Pda, State, Symbol, TransitionFrom, TransitionTo, is_epsilon};
use crate::error::{Alphabet, DefinitionError, StateRole};

impl Definition {
    /// Gate between parsing and execution: checks referential integrity and
    /// seals the draft into an immutable [`Pda`].
    ///
    /// Checks run in a fixed order and stop at the first failure, so a given
    /// defective definition always reports the same error: input alphabet,
    /// stack alphabet, start state, accept states, then every transition in
    /// definition order.
    pub fn validate(self) -> Result<Pda, DefinitionError> {
        check(
            &self.states,
            &self.alphabet,
            &self.stack_alphabet,
            &self.rules,
            self.start.as_ref(),
            &self.accept,
        )?;
        let start = self.start.ok_or(DefinitionError::UndefinedStartState)?;
        Ok(Pda {
            states: self.states,
            alphabet: self.alphabet,
            stack_alphabet: self.stack_alphabet,
            transitions: self.rules,
            start,
            accept: self.accept,
        })
    }
}

impl Pda {
    /// Re-runs the validation checks. Always `Ok` for an automaton built by
    /// [`Definition::validate`]; the execution engine still calls this as a
    /// gate before every run.
    pub fn revalidate(&self) -> Result<(), DefinitionError> {
        check(
            &self.states,
            &self.alphabet,
            &self.stack_alphabet,
            &self.transitions,
            Some(&self.start),
            &self.accept,
        )
    }
}

fn check(
    states: &IndexSet<State>,
    alphabet: &IndexSet<Letter>,
    stack_alphabet: &IndexSet<Symbol>,
    rules: &IndexMap<TransitionFrom, TransitionTo>,
    start: Option<&State>,
    accept: &IndexSet<State>,
) -> Result<(), DefinitionError> {
    if alphabet.is_empty() {
        return Err(DefinitionError::UndefinedAlphabet(Alphabet::Input));
    }
    if stack_alphabet.is_empty() {
        return Err(DefinitionError::UndefinedAlphabet(Alphabet::Stack));
    }

    let start = start.ok_or(DefinitionError::UndefinedStartState)?;
    known_state(states, start, StateRole::Start)?;

    if accept.is_empty() {
        return Err(DefinitionError::UndefinedAcceptStates);
    }
    for state in accept {
        known_state(states, state, StateRole::Accept)?;
    }

    // A declared epsilon spelling is only an error once a transition
    // actually keys on epsilon.
    let input_epsilon = alphabet.iter().any(|letter| is_epsilon(&letter.0));
    let stack_epsilon = stack_alphabet.iter().any(|symbol| is_epsilon(&symbol.0));

    for (from, to) in rules {
        known_state(states, &from.state, StateRole::Source)?;
        match &from.letter {
            Some(letter) if !alphabet.contains(letter) => {
                return Err(DefinitionError::InvalidSymbol {
                    alphabet: Alphabet::Input,
                    name: letter.0.clone(),
                });
            }
            None if input_epsilon => {
                return Err(DefinitionError::EpsilonDeclared(Alphabet::Input));
            }
            _ => {}
        }
        known_symbol(stack_alphabet, from.pop.as_ref(), stack_epsilon)?;
        known_symbol(stack_alphabet, to.push.as_ref(), stack_epsilon)?;
        known_state(states, &to.state, StateRole::Destination)?;
    }
    Ok(())
}

fn known_state(
    states: &IndexSet<State>,
    state: &State,
    role: StateRole,
) -> Result<(), DefinitionError> {
    if states.contains(state) {
        Ok(())
    } else {
        Err(DefinitionError::InvalidState {
            role,
            name: state.0.clone(),
        })
    }
}

fn known_symbol(
    stack_alphabet: &IndexSet<Symbol>,
    symbol: Option<&Symbol>,
    epsilon_declared: bool,
) -> Result<(), DefinitionError> {
    match symbol {
        Some(symbol) if !stack_alphabet.contains(symbol) => Err(DefinitionError::InvalidSymbol {
            alphabet: Alphabet::Stack,
            name: symbol.0.clone(),
        }),
        None if epsilon_declared => Err(DefinitionError::EpsilonDeclared(Alphabet::Stack)),
        _ => Ok(()),
    }
}
