use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::data::course::Course;
use crate::data::progress::Progress;
use crate::data::quiz::Quiz;
use crate::data::store::CatalogStore;
use crate::data::user::User;
use crate::error::CoreError;

pub mod course;
pub mod progress;
pub mod query;
pub mod scoring;
pub mod users;

/// Lock table serializing mutations per (user, course) pair so two
/// concurrent submissions cannot both observe an incomplete row and
/// double-apply a completion side effect.
#[derive(Debug, Default)]
pub(crate) struct PairLocks {
    table: Mutex<HashMap<(Uuid, Uuid), Arc<AsyncMutex<()>>>>,
}

impl PairLocks {
    pub async fn acquire(&self, user: Uuid, course: Uuid) -> OwnedMutexGuard<()> {
        let slot = {
            let mut table = self.table.lock().expect("pair lock table poisoned");
            table.entry((user, course)).or_default().clone()
        };
        slot.lock_owned().await
    }
}

/// The domain core: progress lifecycle, attempt scoring, course aggregate
/// consistency and read projections, over any [`CatalogStore`].
pub struct Engine<S> {
    store: S,
    locks: PairLocks,
}

impl<S: CatalogStore> Engine<S> {
    pub fn new(store: S) -> Engine<S> {
        Engine {
            store,
            locks: PairLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) async fn require_user(&self, id: Uuid) -> Result<User, CoreError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| CoreError::not_found("user", id))
    }

    pub(crate) async fn require_course(&self, id: Uuid) -> Result<Course, CoreError> {
        self.store
            .get_course(id)
            .await?
            .ok_or_else(|| CoreError::not_found("course", id))
    }

    pub(crate) async fn require_quiz(&self, id: Uuid) -> Result<Quiz, CoreError> {
        self.store
            .get_quiz(id)
            .await?
            .ok_or_else(|| CoreError::not_found("quiz", id))
    }

    pub(crate) async fn require_progress(
        &self,
        user: Uuid,
        course: Uuid,
    ) -> Result<Progress, CoreError> {
        self.store
            .find_progress(user, course)
            .await?
            .ok_or_else(|| CoreError::not_found("course progress", course))
    }
}
