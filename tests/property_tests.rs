//! Property-based tests for registries, applications and the event log.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use switchyard::application::{Application, ChainableApplication};
use switchyard::command::Persistent;
use switchyard::core::{EntityId, Identified, Variant};
use switchyard::log::LogError;
use switchyard::{
    state_enum, transition_enum, ApplyExt, Command, CommandHandler, EventLog, Projection,
    Registry, TransitionError,
};
use thiserror::Error;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Low {
    pub id: EntityId,
    pub moves: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct High {
    pub id: EntityId,
    pub moves: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Done {
    pub id: EntityId,
    pub moves: u32,
}

state_enum! {
    pub enum Ladder: LadderKind {
        Low(Low),
        High(High),
        Done(Done),
    }
    entity_id: id
    final: [Done]
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Up;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Down;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Finish;

transition_enum! {
    pub enum Climb: ClimbKind {
        Up(Up),
        Down(Down),
        Finish(Finish),
    }
}

fn registry() -> Registry<Ladder, Climb> {
    Registry::builder()
        .on(|s: &Low, _: &Up| High {
            id: s.id,
            moves: s.moves + 1,
        })
        .on(|s: &High, _: &Down| Low {
            id: s.id,
            moves: s.moves + 1,
        })
        .on(|s: &High, _: &Finish| Done {
            id: s.id,
            moves: s.moves + 1,
        })
        .build()
        .unwrap()
}

fn low(id: EntityId) -> Ladder {
    Low { id, moves: 0 }.into()
}

/// The ladder rules written out by hand, independent of the registry.
fn expected_next(state: &Ladder, transition: &Climb) -> Option<Ladder> {
    match (state, transition) {
        (Ladder::Low(low), Climb::Up(_)) => Some(
            High {
                id: low.id,
                moves: low.moves + 1,
            }
            .into(),
        ),
        (Ladder::High(high), Climb::Down(_)) => Some(
            Low {
                id: high.id,
                moves: high.moves + 1,
            }
            .into(),
        ),
        (Ladder::High(high), Climb::Finish(_)) => Some(
            Done {
                id: high.id,
                moves: high.moves + 1,
            }
            .into(),
        ),
        _ => None,
    }
}

prop_compose! {
    fn arbitrary_state()(variant in 0..3u8, moves in 0..100u32) -> Ladder {
        let id = EntityId::new();
        match variant {
            0 => Low { id, moves }.into(),
            1 => High { id, moves }.into(),
            _ => Done { id, moves }.into(),
        }
    }
}

prop_compose! {
    fn arbitrary_transition()(variant in 0..3u8) -> Climb {
        match variant {
            0 => Up.into(),
            1 => Down.into(),
            _ => Finish.into(),
        }
    }
}

/// Replays a list of transitions against a ladder, persisting what applied.
struct Replay {
    id: EntityId,
    transitions: Vec<Climb>,
}

impl Command for Replay {
    fn name(&self) -> &str {
        "Replay"
    }
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error(transparent)]
    Transition(#[from] TransitionError<Ladder, Climb>),
    #[error(transparent)]
    Log(#[from] LogError),
}

struct ReplayHandler {
    registry: Registry<Ladder, Climb>,
    projection: Projection<Ladder, Climb>,
}

impl CommandHandler for ReplayHandler {
    type Command = Replay;
    type State = Ladder;
    type Transition = Climb;
    type Error = ReplayError;

    fn invoke(&self, command: Replay) -> Result<Application<Ladder, Climb>, ReplayError> {
        let state = self.projection.fetch(command.id)?;
        let mut transitions = command.transitions.into_iter();
        let Some(first) = transitions.next() else {
            return Err(TransitionError::InvalidTransition {
                state,
                transition: Finish.into(),
            }
            .into());
        };
        let mut result = self.registry.apply_transition(state, first);
        for transition in transitions {
            result = result.then(transition);
        }
        Ok(result?.into())
    }
}

proptest! {
    #[test]
    fn registered_pairs_produce_the_registered_state(
        state in arbitrary_state(),
        transition in arbitrary_transition(),
    ) {
        let registry = registry();
        let expected = expected_next(&state, &transition);
        let from_entry = registry
            .lookup(state.kind(), transition.kind())
            .and_then(|entry| entry.invoke(&state, &transition));

        prop_assert_eq!(
            registry.accepts(state.kind(), transition.kind()),
            expected.is_some()
        );
        prop_assert_eq!(from_entry, expected.clone());
        prop_assert_eq!(registry.next_state(&state, &transition).ok(), expected);
    }

    #[test]
    fn rejected_transitions_carry_their_inputs(
        state in arbitrary_state(),
        transition in arbitrary_transition(),
    ) {
        let registry = registry();
        prop_assume!(!registry.accepts(state.kind(), transition.kind()));

        let error = registry.next_state(&state, &transition).unwrap_err();

        prop_assert_eq!(
            error,
            TransitionError::InvalidTransition { state, transition }
        );
    }

    #[test]
    fn next_state_keeps_the_entity(
        state in arbitrary_state(),
        transition in arbitrary_transition(),
    ) {
        if let Ok(next) = registry().next_state(&state, &transition) {
            prop_assert_eq!(next.entity_id(), state.entity_id());
        }
    }

    #[test]
    fn chaining_matches_folding(
        transitions in prop::collection::vec(arbitrary_transition(), 1..12)
    ) {
        let registry = registry();
        let id = EntityId::new();

        let mut rest = transitions.clone().into_iter();
        let first = rest.next().unwrap();
        let mut chained: Result<ChainableApplication<Ladder, Climb>, TransitionError<Ladder, Climb>> =
            registry.apply_transition(low(id), first);
        for transition in rest {
            chained = chained.then(transition);
        }
        let folded = registry.try_fold(low(id), transitions.clone());

        match (chained, folded) {
            (Ok(application), Ok(state)) => {
                prop_assert_eq!(application.state(), &state);
                prop_assert_eq!(application.applied(), transitions.as_slice());
                prop_assert_eq!(
                    application.history().path().unwrap().len(),
                    transitions.len() + 1
                );
            }
            (Err(chain_error), Err(fold_error)) => prop_assert_eq!(chain_error, fold_error),
            (chained, folded) => prop_assert!(
                false,
                "chain and fold disagree: {:?} vs {:?}",
                chained.map(|a| a.into_state()),
                folded
            ),
        }
    }

    #[test]
    fn persisted_log_replays_to_the_final_state(
        batches in prop::collection::vec(
            prop::collection::vec(arbitrary_transition(), 1..5),
            1..6,
        )
    ) {
        let log = Arc::new(EventLog::new());
        let projection = Projection::new(Arc::clone(&log), registry(), low);
        let handler = Persistent::new(
            ReplayHandler {
                registry: registry(),
                projection: projection.clone(),
            },
            Arc::clone(&log),
        );
        let id = EntityId::new();

        let mut expected = low(id);
        let mut persisted = 0;
        for batch in batches {
            if let Ok(application) = handler.invoke(Replay { id, transitions: batch }) {
                persisted += application.applied().len();
                expected = application.into_state();
            }
        }

        prop_assert_eq!(log.len(), persisted);
        prop_assert_eq!(projection.fetch(id).unwrap(), expected);
        let sequences: Vec<u64> = log.records().iter().map(|record| record.sequence).collect();
        prop_assert_eq!(sequences, (0..persisted as u64).collect::<Vec<_>>());
    }
}
