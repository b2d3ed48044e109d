//! Builder for constructing transition registries.

use crate::core::{State, Tag, Transition, Variant, VariantOf};
use crate::registry::error::{BuildError, BuildErrors};
use crate::registry::{Entry, Registry};
use std::collections::hash_map::Entry as Slot;
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for constructing registries with a fluent API.
///
/// Registrations are additive and order-independent for lookup. Conflicts are
/// only reported by [`build`](Self::build), which checks every registration.
pub struct RegistryBuilder<S: State + 'static, T: Transition + 'static> {
    entries: Vec<Entry<S, T>>,
    track_states: bool,
}

impl<S: State + 'static, T: Transition + 'static> RegistryBuilder<S, T> {
    /// Create an empty builder. Visited states are tracked by default.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            track_states: true,
        }
    }

    /// Register a pure transformation from one state variant to another.
    ///
    /// The source, transition and target kinds are read from the closure's
    /// payload types.
    pub fn on<S2, T2, S3, F>(mut self, transform: F) -> Self
    where
        S2: VariantOf<S> + 'static,
        T2: VariantOf<T> + 'static,
        S3: VariantOf<S> + 'static,
        F: Fn(&S2, &T2) -> S3 + Send + Sync + 'static,
    {
        self.entries.push(Entry {
            from: S2::KIND,
            via: T2::KIND,
            to: S3::KIND,
            apply: Arc::new(move |state: &S, transition: &T| {
                let from = S2::project(state)?;
                let via = T2::project(transition)?;
                Some(transform(from, via).into())
            }),
        });
        self
    }

    /// Register `transform` against every state that already has an outgoing
    /// transition, except the `excluding` kinds.
    ///
    /// The set of states is taken when this is called: states that only gain
    /// outgoing transitions through later `.on(..)` calls are not covered, so
    /// call this last.
    pub fn for_all_states<T2, S3, F>(mut self, excluding: &[S::Kind], transform: F) -> Self
    where
        T2: VariantOf<T> + 'static,
        S3: VariantOf<S> + 'static,
        F: Fn(&S, &T2) -> S3 + Send + Sync + 'static,
    {
        let mut sources: Vec<S::Kind> = Vec::new();
        for entry in &self.entries {
            if !sources.contains(&entry.from) && !excluding.contains(&entry.from) {
                sources.push(entry.from);
            }
        }

        let transform = Arc::new(transform);
        for from in sources {
            let transform = Arc::clone(&transform);
            self.entries.push(Entry {
                from,
                via: T2::KIND,
                to: S3::KIND,
                apply: Arc::new(move |state: &S, transition: &T| {
                    if state.kind() != from {
                        return None;
                    }
                    let via = T2::project(transition)?;
                    Some(transform(state, via).into())
                }),
            });
        }
        self
    }

    /// Record visited states in applications built from this registry.
    pub fn track_states(mut self, track: bool) -> Self {
        self.track_states = track;
        self
    }

    /// Build the registry.
    /// Returns every duplicate registration if any key was registered twice.
    pub fn build(self) -> Result<Registry<S, T>, BuildErrors> {
        if self.entries.is_empty() {
            return Err(BuildErrors(vec![BuildError::NoTransitions]));
        }

        let mut index = HashMap::with_capacity(self.entries.len());
        let checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| match index.entry((entry.from, entry.via)) {
                Slot::Vacant(slot) => {
                    slot.insert(position);
                    Validation::success(())
                }
                Slot::Occupied(_) => Validation::fail(BuildError::DuplicateTransition {
                    from: entry.from.name(),
                    via: entry.via.name(),
                }),
            })
            .collect();

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(Registry::from_parts(
                self.entries,
                index,
                self.track_states,
            )),
            Validation::Failure(errors) => Err(BuildErrors(errors.iter().cloned().collect())),
        }
    }
}

impl<S: State + 'static, T: Transition + 'static> Default for RegistryBuilder<S, T> {
    fn default() -> Self {
        Self::new()
    }
}
