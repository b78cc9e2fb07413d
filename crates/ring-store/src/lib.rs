use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use ring_params::DesignParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored design: the story prompt and what was generated from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: u64,
    pub prompt: String,
    pub symbols: Vec<String>,
    pub design_params: DesignParams,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewConcept {
    pub prompt: String,
    pub symbols: Vec<String>,
    pub design_params: DesignParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("concept store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence capabilities the service relies on.
///
/// `get` and `update_params` report an unknown id as `Ok(None)`.
pub trait ConceptStore: Send + Sync {
    fn create(&self, concept: NewConcept) -> Result<Concept, StoreError>;
    fn get(&self, id: u64) -> Result<Option<Concept>, StoreError>;
    /// Newest first.
    fn list(&self) -> Result<Vec<Concept>, StoreError>;
    /// Replaces only the parameters; last writer wins.
    fn update_params(
        &self,
        id: u64,
        design_params: DesignParams,
    ) -> Result<Option<Concept>, StoreError>;
}

impl<T: ConceptStore + ?Sized> ConceptStore for Arc<T> {
    fn create(&self, concept: NewConcept) -> Result<Concept, StoreError> {
        (**self).create(concept)
    }

    fn get(&self, id: u64) -> Result<Option<Concept>, StoreError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<Concept>, StoreError> {
        (**self).list()
    }

    fn update_params(
        &self,
        id: u64,
        design_params: DesignParams,
    ) -> Result<Option<Concept>, StoreError> {
        (**self).update_params(id, design_params)
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Default)]
struct StoreState {
    last_id: u64,
    concepts: BTreeMap<u64, Concept>,
}

/// Process-local store. Ids start at 1.
pub struct InMemoryConceptStore {
    state: Mutex<StoreState>,
    clock: Clock,
}

impl Default for InMemoryConceptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConceptStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            clock,
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.concepts.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("concept store lock poisoned".to_string()))
    }
}

impl ConceptStore for InMemoryConceptStore {
    fn create(&self, concept: NewConcept) -> Result<Concept, StoreError> {
        let mut state = self.lock()?;
        state.last_id += 1;

        let stored = Concept {
            id: state.last_id,
            prompt: concept.prompt,
            symbols: concept.symbols,
            design_params: concept.design_params,
            created_at: (self.clock)(),
        };
        state.concepts.insert(stored.id, stored.clone());

        tracing::debug!(id = stored.id, "concept created");
        Ok(stored)
    }

    fn get(&self, id: u64) -> Result<Option<Concept>, StoreError> {
        Ok(self.lock()?.concepts.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Concept>, StoreError> {
        let mut concepts: Vec<Concept> = self.lock()?.concepts.values().cloned().collect();
        concepts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(concepts)
    }

    fn update_params(
        &self,
        id: u64,
        design_params: DesignParams,
    ) -> Result<Option<Concept>, StoreError> {
        let mut state = self.lock()?;
        let Some(concept) = state.concepts.get_mut(&id) else {
            return Ok(None);
        };

        concept.design_params = design_params;
        tracing::debug!(id, "concept params updated");
        Ok(Some(concept.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    use chrono::{DateTime, TimeZone, Utc};
    use ring_params::{DEFAULT_PARAMS, DesignParams, Finish};

    use super::{Clock, ConceptStore, InMemoryConceptStore, NewConcept};

    fn new_concept(prompt: &str) -> NewConcept {
        NewConcept {
            prompt: prompt.to_string(),
            symbols: vec!["Rose".to_string(), "Diamond".to_string()],
            design_params: DEFAULT_PARAMS,
        }
    }

    /// Clock returning the given second offsets in order, then repeating the last.
    fn scripted_clock(seconds: Vec<i64>) -> Clock {
        let cursor = Arc::new(AtomicI64::new(0));
        Arc::new(move || {
            let index = cursor.fetch_add(1, Ordering::SeqCst) as usize;
            let offset = seconds[index.min(seconds.len() - 1)];
            Utc.timestamp_opt(1_700_000_000 + offset, 0)
                .single()
                .expect("timestamp should be valid")
        })
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let store = InMemoryConceptStore::new();
        let first = store.create(new_concept("first story")).expect("create should succeed");
        let second = store.create(new_concept("second story")).expect("create should succeed");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().expect("len should succeed"), 2);
    }

    #[test]
    fn get_returns_stored_concept_or_none() {
        let store = InMemoryConceptStore::new();
        let created = store.create(new_concept("a story")).expect("create should succeed");

        assert_eq!(store.get(created.id).expect("get should succeed"), Some(created));
        assert_eq!(store.get(99).expect("get should succeed"), None);
    }

    #[test]
    fn list_is_newest_first_with_id_tiebreak() {
        let store = InMemoryConceptStore::with_clock(scripted_clock(vec![10, 30, 30, 20]));
        for prompt in ["a", "b", "c", "d"] {
            store.create(new_concept(prompt)).expect("create should succeed");
        }

        let ids: Vec<u64> = store
            .list()
            .expect("list should succeed")
            .into_iter()
            .map(|concept| concept.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn update_params_replaces_only_params() {
        let store = InMemoryConceptStore::new();
        let created = store.create(new_concept("a story")).expect("create should succeed");
        let params = DesignParams {
            finish: Finish::Platinum,
            gem_count: 4,
            ..DEFAULT_PARAMS
        };

        let updated = store
            .update_params(created.id, params)
            .expect("update should succeed")
            .expect("concept should exist");

        assert_eq!(updated.design_params, params);
        assert_eq!(updated.prompt, created.prompt);
        assert_eq!(updated.symbols, created.symbols);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(store.get(created.id).expect("get should succeed"), Some(updated));
    }

    #[test]
    fn update_of_unknown_id_is_none() {
        let store = InMemoryConceptStore::new();
        assert_eq!(
            store
                .update_params(7, DEFAULT_PARAMS)
                .expect("update should succeed"),
            None
        );
        assert!(store.is_empty().expect("is_empty should succeed"));
    }

    #[test]
    fn concept_serializes_with_camel_case_and_rfc3339() {
        let store = InMemoryConceptStore::with_clock(scripted_clock(vec![0]));
        let concept = store.create(new_concept("a story")).expect("create should succeed");
        let value = serde_json::to_value(&concept).expect("concept should serialize");

        assert_eq!(value["id"], 1);
        assert_eq!(value["designParams"]["bandRadius"], 1.0);
        let created_at = value["createdAt"].as_str().expect("createdAt should be a string");
        let parsed: DateTime<Utc> = created_at.parse().expect("createdAt should be RFC 3339");
        assert_eq!(parsed, concept.created_at);

        let back: super::Concept =
            serde_json::from_value(value).expect("concept should deserialize");
        assert_eq!(back, concept);
    }
}
