//! Transition history carried by applications.

use crate::core::{State, Transition};
use serde::{Deserialize, Serialize};

/// One move recorded in a history.
#[derive(Debug, PartialEq)]
pub struct Step<'a, S, T> {
    /// State before the move, `None` when visited states are not tracked
    pub from: Option<&'a S>,
    /// State after the move
    pub to: &'a S,
    /// The transition applied
    pub via: &'a T,
}

/// Resulting state plus the ordered transitions that led to it.
///
/// When visited states are tracked, `visited[i]` is the state `applied[i]`
/// was applied to, so the full path is `visited` followed by the current
/// state and `applied.len() == path.len() - 1`.
///
/// # Example
///
/// ```rust
/// use switchyard::application::History;
/// # use switchyard::{state_enum, transition_enum};
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// # pub struct A;
/// # #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// # pub struct B;
/// # state_enum! { pub enum Phase: PhaseKind { A(A), B(B) } }
/// # #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// # pub struct Go;
/// # transition_enum! { pub enum Move: MoveKind { Go(Go) } }
///
/// let history = History::<Phase, Move>::start(A.into(), true)
///     .record(Go.into(), B.into());
///
/// assert_eq!(history.state(), &Phase::from(B));
/// assert_eq!(history.path().unwrap(), vec![&Phase::from(A), &Phase::from(B)]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct History<S: State, T: Transition> {
    state: S,
    applied: Vec<T>,
    visited: Option<Vec<S>>,
}

impl<S: State, T: Transition> History<S, T> {
    /// Start an empty history at `state`.
    pub fn start(state: S, track_states: bool) -> Self {
        Self {
            state,
            applied: Vec::new(),
            visited: track_states.then(Vec::new),
        }
    }

    /// Record `transition` moving the current state to `next`.
    pub fn record(mut self, transition: T, next: S) -> Self {
        let previous = std::mem::replace(&mut self.state, next);
        if let Some(visited) = self.visited.as_mut() {
            visited.push(previous);
        }
        self.applied.push(transition);
        self
    }

    /// The resulting state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Consume the history, keeping only the resulting state.
    pub fn into_state(self) -> S {
        self.state
    }

    /// Transitions applied so far, oldest first.
    pub fn applied(&self) -> &[T] {
        &self.applied
    }

    /// States each transition was applied to, if tracked.
    pub fn visited(&self) -> Option<&[S]> {
        self.visited.as_deref()
    }

    /// Every state passed through, ending with the current one.
    pub fn path(&self) -> Option<Vec<&S>> {
        self.visited
            .as_ref()
            .map(|visited| visited.iter().chain(std::iter::once(&self.state)).collect())
    }

    /// Each recorded move with its source and target state.
    ///
    /// Without tracked states every step's `from` is `None` and `to` is the
    /// final state.
    pub fn steps(&self) -> Vec<Step<'_, S, T>> {
        self.applied
            .iter()
            .enumerate()
            .map(|(i, via)| match &self.visited {
                Some(visited) => Step {
                    from: visited.get(i),
                    to: visited.get(i + 1).unwrap_or(&self.state),
                    via,
                },
                None => Step {
                    from: None,
                    to: &self.state,
                    via,
                },
            })
            .collect()
    }

    pub(crate) fn into_parts(self) -> (S, Vec<T>, Option<Vec<S>>) {
        (self.state, self.applied, self.visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{state_enum, transition_enum};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Initial;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Processing;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Complete;

    state_enum! {
        enum TestState: TestStateKind {
            Initial(Initial),
            Processing(Processing),
            Complete(Complete),
        }
        final: [Complete]
    }

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Begin;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct Finish;

    transition_enum! {
        enum TestEvent: TestEventKind {
            Begin(Begin),
            Finish(Finish),
        }
    }

    fn two_steps(track: bool) -> History<TestState, TestEvent> {
        History::start(Initial.into(), track)
            .record(Begin.into(), Processing.into())
            .record(Finish.into(), Complete.into())
    }

    #[test]
    fn new_history_is_empty() {
        let history: History<TestState, TestEvent> = History::start(Initial.into(), true);

        assert!(history.applied().is_empty());
        assert_eq!(history.visited(), Some(&[][..]));
        assert_eq!(history.path().unwrap().len(), 1);
        assert!(history.steps().is_empty());
    }

    #[test]
    fn path_is_one_longer_than_applied() {
        let history = two_steps(true);
        let path = history.path().unwrap();

        assert_eq!(history.applied().len(), path.len() - 1);
        assert_eq!(
            path,
            vec![
                &TestState::from(Initial),
                &TestState::from(Processing),
                &TestState::from(Complete)
            ]
        );
    }

    #[test]
    fn steps_pair_states_with_transitions() {
        let history = two_steps(true);
        let steps = history.steps();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].from, Some(&TestState::from(Initial)));
        assert_eq!(steps[0].to, &TestState::from(Processing));
        assert_eq!(steps[1].from, Some(&TestState::from(Processing)));
        assert_eq!(steps[1].to, &TestState::from(Complete));
        assert_eq!(steps[1].via, &TestEvent::from(Finish));
    }

    #[test]
    fn untracked_history_keeps_only_final_state() {
        let history = two_steps(false);

        assert!(history.visited().is_none());
        assert!(history.path().is_none());
        assert_eq!(history.applied().len(), 2);
        assert!(history
            .steps()
            .iter()
            .all(|step| step.from.is_none() && step.to == &TestState::from(Complete)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = two_steps(true);

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: History<TestState, TestEvent> = serde_json::from_str(&json).unwrap();

        assert_eq!(history, deserialized);
    }
}
