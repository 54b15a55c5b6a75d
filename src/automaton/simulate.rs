use std::fmt;

use indexmap::Equivalent;

use super::{Letter, Pda, State, Symbol, TransitionFrom, TransitionTo};
use crate::error::RunError;

/// One entry of a simulation trace: an input letter as it is consumed, or
/// the state the automaton is in after a move.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TraceEvent {
    State(State),
    Letter(Letter),
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::State(state) => write!(f, "{state}"),
            TraceEvent::Letter(letter) => write!(f, "{letter}"),
        }
    }
}

/// Outcome of one simulation run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Run {
    pub accepted: bool,
    /// Empty unless tracing was requested.
    pub trace: Vec<TraceEvent>,
}

/// Borrowed probe for the transition map; hashes and compares exactly like
/// the owned [`TransitionFrom`] key.
#[derive(Hash)]
struct FromRef<'a> {
    state: &'a State,
    letter: Option<&'a Letter>,
    pop: Option<&'a Symbol>,
}

impl Equivalent<TransitionFrom> for FromRef<'_> {
    fn equivalent(&self, key: &TransitionFrom) -> bool {
        *self.state == key.state
            && self.letter == key.letter.as_ref()
            && self.pop == key.pop.as_ref()
    }
}

/// The configuration of one run: current state plus the stack, both
/// borrowing from the automaton. Created per [`Pda::run`] call and dropped
/// with it.
struct Simulator<'a> {
    pda: &'a Pda,
    state: &'a State,
    stack: Vec<&'a Symbol>,
    trace: Vec<TraceEvent>,
    tracing: bool,
}

impl<'a> Simulator<'a> {
    fn new(pda: &'a Pda, tracing: bool) -> Self {
        Self {
            pda,
            state: &pda.start,
            stack: Vec::new(),
            trace: Vec::new(),
            tracing,
        }
    }

    fn entry(&self, letter: Option<&Letter>, pop: Option<&Symbol>) -> Option<&'a TransitionTo> {
        self.pda.transitions.get(&FromRef {
            state: self.state,
            letter,
            pop,
        })
    }

    fn follow(&mut self, to: &'a TransitionTo) {
        if let Some(push) = &to.push {
            self.stack.push(push);
        }
        self.state = &to.state;
    }

    /// One application of the closure rule, not iterated to a fixed point:
    /// with an empty stack the (ε, ε) entry applies; with a non-empty stack
    /// an entry keyed on the actual top wins over the (ε, ε) entry and pops.
    fn epsilon_closure(&mut self) {
        match self.stack.last().copied() {
            None => {
                if let Some(to) = self.entry(None, None) {
                    log::trace!("closure: `{}` -> `{}`", self.state, to.state);
                    self.follow(to);
                }
            }
            Some(top) => {
                if let Some(to) = self.entry(None, Some(top)) {
                    log::trace!("closure: `{}` -> `{}` popping `{top}`", self.state, to.state);
                    self.stack.pop();
                    self.follow(to);
                } else if let Some(to) = self.entry(None, None) {
                    log::trace!("closure: `{}` -> `{}`", self.state, to.state);
                    self.follow(to);
                }
            }
        }
    }

    /// Consumes one input letter. An epsilon-pop entry matches first and
    /// never touches the stack top (so it fires on an empty stack too);
    /// otherwise an entry keyed on the top pops it. With no matching entry
    /// the automaton stays put: a missing rule is a self-loop, not a
    /// rejection.
    fn consume(&mut self, letter: &Letter) {
        if let Some(to) = self.entry(Some(letter), None) {
            self.follow(to);
            return;
        }
        let Some(top) = self.stack.last().copied() else {
            return;
        };
        let Some(to) = self.entry(Some(letter), Some(top)) else {
            return;
        };
        self.stack.pop();
        self.follow(to);
    }

    fn emit(&mut self, event: TraceEvent) {
        if self.tracing {
            self.trace.push(event);
        }
    }
}

impl Pda {
    /// Simulates the automaton over `input` and reports acceptance.
    ///
    /// The input is trimmed and tokenized: an empty `separator` makes every
    /// character one symbol, otherwise the input splits on the literal
    /// separator (tokens are not re-trimmed). Every token must name a
    /// declared input letter, or the run fails up front with
    /// [`RunError::InputSymbol`].
    ///
    /// Epsilon-closure applies exactly twice, before the first symbol and
    /// after the last, never in between. With `trace` set, the returned
    /// [`Run`] carries the start state, each consumed letter with the state
    /// it led to, and the final state once more only if the trailing closure
    /// moved it.
    pub fn run(&self, input: &str, separator: &str, trace: bool) -> Result<Run, RunError> {
        self.revalidate()?;

        let letters = self.tokenize(input.trim(), separator)?;
        log::debug!(
            "running {} symbols from state `{}`",
            letters.len(),
            self.start
        );

        let mut simulator = Simulator::new(self, trace);
        simulator.emit(TraceEvent::State(self.start.clone()));
        simulator.epsilon_closure();

        for letter in letters {
            simulator.emit(TraceEvent::Letter(letter.clone()));
            simulator.consume(letter);
            simulator.emit(TraceEvent::State(simulator.state.clone()));
        }

        let before_closure = simulator.state;
        simulator.epsilon_closure();
        if simulator.state != before_closure {
            simulator.emit(TraceEvent::State(simulator.state.clone()));
        }

        let accepted = self.accept.contains(simulator.state);
        log::debug!(
            "finished in state `{}`, {} symbols left on the stack: {}",
            simulator.state,
            simulator.stack.len(),
            if accepted { "accepted" } else { "rejected" }
        );
        Ok(Run {
            accepted,
            trace: simulator.trace,
        })
    }

    fn tokenize<'p>(&'p self, input: &str, separator: &str) -> Result<Vec<&'p Letter>, RunError> {
        let letter = |token: &str| {
            self.alphabet.get(token).ok_or_else(|| RunError::InputSymbol {
                symbol: token.to_owned(),
            })
        };
        if separator.is_empty() {
            input
                .chars()
                .map(|c| letter(c.encode_utf8(&mut [0; 4])))
                .collect()
        } else {
            input.split(separator).map(letter).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::Definition;
    use crate::loader::parse;

    fn pda(src: &str) -> Pda {
        parse(src).unwrap().validate().unwrap()
    }

    fn states(events: &[TraceEvent]) -> Vec<&str> {
        events
            .iter()
            .map(|event| match event {
                TraceEvent::State(state) => state.0.as_str(),
                TraceEvent::Letter(letter) => letter.0.as_str(),
            })
            .collect()
    }

    const PUSH_POP: &str = "[States]\nq0\nq1\nEnd\n\
                            [Sigma]\na\nb\nEnd\n\
                            [Stack Sigma]\nZ\nEnd\n\
                            [Rules]\nq0, a, epsilon, Z, q0\nq0, b, Z, epsilon, q1\nEnd\n\
                            [Start]\nq0\nEnd\n\
                            [Accept]\nq1\nEnd\n";

    #[test]
    fn push_then_pop_accepts() {
        let run = pda(PUSH_POP).run("ab", "", true).unwrap();
        assert!(run.accepted);
        assert_eq!(states(&run.trace), ["q0", "a", "q0", "b", "q1"]);
    }

    #[test]
    fn acceptance_ignores_leftover_stack() {
        // Two pushes, one pop: a symbol stays stacked, the state decides.
        let run = pda(PUSH_POP).run("aab", "", false).unwrap();
        assert!(run.accepted);
        assert!(run.trace.is_empty());
    }

    #[test]
    fn symbol_outside_the_alphabet_fails() {
        assert_eq!(
            pda(PUSH_POP).run("abc", "", false),
            Err(RunError::InputSymbol {
                symbol: "c".to_owned()
            })
        );
    }

    #[test]
    fn separator_tokenization() {
        let run = pda(PUSH_POP).run("a a b", " ", false).unwrap();
        assert!(run.accepted);

        // Tokens are split on the literal separator and not re-trimmed.
        assert_eq!(
            pda(PUSH_POP).run("a, b", ",", false),
            Err(RunError::InputSymbol {
                symbol: " b".to_owned()
            })
        );
    }

    #[test]
    fn empty_input_with_separator_has_one_empty_token() {
        assert_eq!(
            pda(PUSH_POP).run("", ",", false),
            Err(RunError::InputSymbol {
                symbol: String::new()
            })
        );
    }

    #[test]
    fn multi_character_letters() {
        let src = "[States]\nq0\nq1\nEnd\n[Sigma]\nab\nEnd\n[Stack Sigma]\nZ\nEnd\n\
                   [Rules]\nq0, ab, epsilon, epsilon, q1\nEnd\n\
                   [Start]\nq0\nEnd\n[Accept]\nq1\nEnd\n";
        assert!(pda(src).run("ab", ";", false).unwrap().accepted);
    }

    #[test]
    fn initial_closure_accepts_empty_input() {
        let src = "[States]\nq0\nq1\nEnd\n[Sigma]\na\nEnd\n[Stack Sigma]\nZ\nEnd\n\
                   [Rules]\nq0, epsilon, epsilon, epsilon, q1\nEnd\n\
                   [Start]\nq0\nEnd\n[Accept]\nq1\nEnd\n";
        let run = pda(src).run("", "", true).unwrap();
        assert!(run.accepted);
        // The initial closure's move is not traced; only the start state is.
        assert_eq!(states(&run.trace), ["q0"]);
    }

    #[test]
    fn trailing_closure_is_traced_when_it_moves() {
        let src = "[States]\nq0\nq1\nq2\nEnd\n[Sigma]\na\nEnd\n[Stack Sigma]\nZ\nEnd\n\
                   [Rules]\nq0, a, epsilon, epsilon, q1\nq1, epsilon, epsilon, epsilon, q2\nEnd\n\
                   [Start]\nq0\nEnd\n[Accept]\nq2\nEnd\n";
        let run = pda(src).run("a", "", true).unwrap();
        assert!(run.accepted);
        assert_eq!(states(&run.trace), ["q0", "a", "q1", "q2"]);
    }

    #[test]
    fn closure_is_applied_once_not_to_a_fixed_point() {
        let src = "[States]\nq0\nq1\nq2\nq3\nEnd\n[Sigma]\na\nEnd\n[Stack Sigma]\nZ\nEnd\n\
                   [Rules]\nq0, epsilon, epsilon, epsilon, q1\nq1, epsilon, epsilon, epsilon, q2\n\
                   q2, epsilon, epsilon, epsilon, q3\nEnd\n\
                   [Start]\nq0\nEnd\n[Accept]\nq2\nEnd\n";
        // One application at each run boundary: q0 -> q1, then q1 -> q2.
        // Iterating to a fixed point would overshoot to q3.
        assert!(pda(src).run("", "", false).unwrap().accepted);
    }

    #[test]
    fn no_closure_between_symbols() {
        // q1 has an epsilon rule to q2, but between the two input symbols no
        // closure runs: `b` is consumed from q1, not q2.
        let src = "[States]\nq0\nq1\nq2\nq3\nEnd\n[Sigma]\na\nb\nEnd\n[Stack Sigma]\nZ\nEnd\n\
                   [Rules]\nq0, a, epsilon, epsilon, q1\nq1, b, epsilon, epsilon, q3\n\
                   q1, epsilon, epsilon, epsilon, q2\nEnd\n\
                   [Start]\nq0\nEnd\n[Accept]\nq3\nEnd\n";
        let run = pda(src).run("ab", "", true).unwrap();
        assert!(run.accepted);
        assert_eq!(states(&run.trace), ["q0", "a", "q1", "b", "q3"]);
    }

    #[test]
    fn missing_rule_is_a_self_loop() {
        let run = pda(PUSH_POP).run("ba", "", true).unwrap();
        // `b` finds no rule on the empty stack, `a` then pushes as usual;
        // the run ends in q0, so it is rejected, but never errors.
        assert!(!run.accepted);
        assert_eq!(states(&run.trace), ["q0", "b", "q0", "a", "q0"]);
    }

    #[test]
    fn epsilon_pop_beats_the_stack_top_when_consuming() {
        let src = "[States]\nq0\nq1\nq2\nEnd\n[Sigma]\na\nEnd\n[Stack Sigma]\nZ\nEnd\n\
                   [Rules]\nq0, epsilon, epsilon, Z, q0\n\
                   q0, a, Z, epsilon, q1\nq0, a, epsilon, epsilon, q2\nEnd\n\
                   [Start]\nq0\nEnd\n[Accept]\nq2\nEnd\n";
        // The initial closure pushes Z; consuming `a` still takes the
        // epsilon-pop entry to q2 and leaves the stack alone.
        let run = pda(src).run("a", "", false).unwrap();
        assert!(run.accepted);
    }

    #[test]
    fn closure_prefers_the_stack_top_over_epsilon_pop() {
        let src = "[States]\nq0\nq1\nq2\nq3\nEnd\n[Sigma]\na\nEnd\n[Stack Sigma]\nZ\nEnd\n\
                   [Rules]\nq0, a, epsilon, Z, q1\n\
                   q1, epsilon, Z, epsilon, q2\nq1, epsilon, epsilon, epsilon, q3\nEnd\n\
                   [Start]\nq0\nEnd\n[Accept]\nq2\nEnd\n";
        // After `a` the stack holds Z; the trailing closure takes the entry
        // keyed on Z (popping it), not the epsilon-pop entry to q3.
        let run = pda(src).run("a", "", true).unwrap();
        assert!(run.accepted);
        assert_eq!(states(&run.trace), ["q0", "a", "q1", "q2"]);
    }

    #[test]
    fn runs_are_deterministic() {
        let automaton = pda(PUSH_POP);
        let first = automaton.run("aab", "", true).unwrap();
        let second = automaton.run("aab", "", true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn borrowed_probe_matches_the_owned_key() {
        let automaton = pda(PUSH_POP);
        let owned = TransitionFrom {
            state: State::from("q0"),
            letter: Some(Letter::from("a")),
            pop: None,
        };
        let probe = FromRef {
            state: &owned.state,
            letter: owned.letter.as_ref(),
            pop: None,
        };
        assert_eq!(
            automaton.transitions.get(&probe),
            automaton.transitions.get(&owned)
        );
        assert!(automaton.transitions.get(&probe).is_some());
    }

    #[test]
    fn an_unvalidated_draft_cannot_sneak_into_a_run() {
        // Constructing a Pda goes through validate; a draft missing its
        // start state is stopped there, so run's defensive gate stays a
        // formality.
        let definition = Definition::default();
        assert!(definition.validate().is_err());
    }
}
