use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::types::{EditableSet, FieldValue, Session, SessionEntry, SetField};
use crate::error::{LiftLogError, Result};
use crate::notify::{NotificationSink, Toast};
use crate::service::{DataService, Exercise};
use crate::timer::RestTimerDriver;

/// Revision bookkeeping for overlapping saves.
///
/// Saves are neither serialized nor cancelled; the backend applies whichever
/// request it handles last. The ledger only makes an out-of-order
/// acknowledgement visible in the logs, and counts finished saves so the
/// editor can wait for all of them before it is closed.
struct SaveLedger {
    issued: AtomicU64,
    acknowledged: AtomicU64,
    finished: watch::Sender<u64>,
}

impl SaveLedger {
    fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            acknowledged: AtomicU64::new(0),
            finished: watch::channel(0).0,
        }
    }

    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn acknowledge(&self, revision: u64) {
        let newest = self.acknowledged.fetch_max(revision, Ordering::SeqCst);
        if newest > revision {
            warn!(
                "Save revision {} completed after revision {}; the service may hold an older snapshot",
                revision, newest
            );
        }
    }

    /// Called once per issued save, stored or not.
    fn finish(&self) {
        self.finished.send_modify(|count| *count += 1);
    }

    /// Resolves once every save issued so far has finished.
    async fn drain(&self) {
        let target = self.issued.load(Ordering::SeqCst);
        let mut finished = self.finished.subscribe();
        if finished.wait_for(|count| *count >= target).await.is_err() {
            debug!("Save ledger closed while draining");
        }
    }
}

/// A save in flight. Dropping it does not cancel the request.
#[derive(Debug)]
pub struct PendingSave {
    revision: u64,
    handle: JoinHandle<bool>,
}

impl PendingSave {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Wait for the request to finish. `true` when the service stored it.
    pub async fn settled(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

/// Load the session for `(user_id, date)`. No stored session is an empty
/// one, not an error.
pub async fn load_session(
    service: &dyn DataService,
    user_id: &str,
    date: NaiveDate,
) -> Result<Session> {
    match service.get_workout(user_id, date).await? {
        Some(record) => {
            info!(
                "Loaded workout for {} with {} exercises",
                date,
                record.exercises.len()
            );
            Ok(Session::from_record(record))
        }
        None => {
            debug!("No workout stored for {}", date);
            Ok(Session::empty(user_id, date))
        }
    }
}

/// Edits one (user, date) workout and persists the whole session after
/// every structural change.
///
/// Local state is always mutated before the save is issued, and saves run
/// in the background, so the caller sees each change immediately. Failures
/// are reported through the notifier before being returned; callers do not
/// need to report them again. A failed save is not rolled back.
pub struct SessionEditor {
    session: Session,
    catalog: Vec<Exercise>,
    service: Arc<dyn DataService>,
    timer: Arc<RestTimerDriver>,
    notifier: Arc<dyn NotificationSink>,
    ledger: Arc<SaveLedger>,
    /// Field edits made since the last commit.
    uncommitted: bool,
}

impl SessionEditor {
    pub fn new(
        session: Session,
        catalog: Vec<Exercise>,
        service: Arc<dyn DataService>,
        timer: Arc<RestTimerDriver>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            session,
            catalog,
            service,
            timer,
            notifier,
            ledger: Arc::new(SaveLedger::new()),
            uncommitted: false,
        }
    }

    /// Load the session and the user's exercise catalog. Load failures are
    /// reported and leave the editor on an empty session.
    pub async fn open(
        user_id: &str,
        date: NaiveDate,
        service: Arc<dyn DataService>,
        timer: Arc<RestTimerDriver>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let session = match load_session(service.as_ref(), user_id, date).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to load workout for {}: {}", date, e);
                notifier.toast(Toast::error(e.user_message()));
                Session::empty(user_id, date)
            }
        };

        let catalog = match service.list_exercises(user_id).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Failed to load exercise catalog: {}", e);
                notifier.toast(Toast::error(e.user_message()));
                Vec::new()
            }
        };

        Self::new(session, catalog, service, timer, notifier)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &[Exercise] {
        &self.catalog
    }

    pub fn timer(&self) -> &Arc<RestTimerDriver> {
        &self.timer
    }

    pub fn has_uncommitted_edits(&self) -> bool {
        self.uncommitted
    }

    fn reject(&self, err: LiftLogError) -> LiftLogError {
        debug!("Rejected edit: {}", err);
        self.notifier.toast(Toast::error(err.user_message()));
        err
    }

    /// Append a catalog exercise with no sets. An exercise already in the
    /// session is rejected and nothing changes.
    pub fn add_exercise(&mut self, exercise: &Exercise) -> Result<PendingSave> {
        if self.session.contains(&exercise.id) {
            return Err(self.reject(LiftLogError::Validation(format!(
                "{} is already in this workout",
                exercise.name
            ))));
        }

        self.session.entries.push(SessionEntry {
            exercise_id: exercise.id.clone(),
            exercise_name: exercise.name.clone(),
            sets: Vec::new(),
        });
        info!("Added {} to workout {}", exercise.name, self.session.date);
        self.notifier
            .toast(Toast::success(format!("{} added", exercise.name)));
        Ok(self.persist())
    }

    /// Create a catalog exercise by name and add it to the session.
    pub async fn create_and_add_exercise(&mut self, name: &str) -> Result<PendingSave> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject(LiftLogError::Validation(
                "Enter an exercise name".to_string(),
            )));
        }

        let exercise = self
            .service
            .create_exercise(&self.session.user_id, name)
            .await
            .map_err(|e| self.reject(e))?;
        if !self.catalog.iter().any(|e| e.id == exercise.id) {
            self.catalog.push(exercise.clone());
        }
        self.add_exercise(&exercise)
    }

    /// Remove an exercise and its sets. Unknown ids change nothing and
    /// issue no save.
    pub fn remove_exercise(&mut self, exercise_id: &str) -> Option<PendingSave> {
        let position = self
            .session
            .entries
            .iter()
            .position(|e| e.exercise_id == exercise_id)?;
        let removed = self.session.entries.remove(position);
        info!("Removed {} from workout {}", removed.exercise_name, self.session.date);
        self.notifier
            .toast(Toast::success(format!("{} removed", removed.exercise_name)));
        Some(self.persist())
    }

    /// Append an empty set. Every set after the first starts the rest timer.
    pub fn add_set(&mut self, exercise_id: &str) -> Result<PendingSave> {
        let set_count = match self.session.entry_mut(exercise_id) {
            Some(entry) => {
                entry.sets.push(EditableSet::empty());
                entry.sets.len()
            }
            None => return Err(self.reject(unknown_exercise(exercise_id))),
        };
        debug!("Exercise {} now has {} sets", exercise_id, set_count);

        let save = self.persist();
        if set_count > 1 {
            self.timer.start();
        }
        Ok(save)
    }

    /// Remove the set at `index`; the remaining sets keep their order.
    pub fn remove_set(&mut self, exercise_id: &str, index: usize) -> Result<PendingSave> {
        let removed = match self.session.entry_mut(exercise_id) {
            Some(entry) if index < entry.sets.len() => {
                entry.sets.remove(index);
                true
            }
            Some(_) => false,
            None => return Err(self.reject(unknown_exercise(exercise_id))),
        };
        if !removed {
            return Err(self.reject(LiftLogError::Validation(format!(
                "Set {} does not exist",
                index + 1
            ))));
        }
        Ok(self.persist())
    }

    /// Store raw editing input for one field. Nothing is saved until
    /// [`commit_set_edits`](Self::commit_set_edits).
    pub fn update_set_field(
        &mut self,
        exercise_id: &str,
        index: usize,
        field: SetField,
        raw: &str,
    ) -> Result<()> {
        let value = FieldValue::parse(field, raw).map_err(|e| self.reject(e))?;
        let slot = match self.session.entry_mut(exercise_id) {
            Some(entry) => entry.sets.get_mut(index).map(|set| set.field_mut(field)),
            None => return Err(self.reject(unknown_exercise(exercise_id))),
        };
        match slot {
            Some(slot) => {
                *slot = value;
                self.uncommitted = true;
                Ok(())
            }
            None => Err(self.reject(LiftLogError::Validation(format!(
                "Set {} does not exist",
                index + 1
            )))),
        }
    }

    /// Normalize every set in the session and save it. Running it again with
    /// no edits in between saves the same snapshot.
    pub fn commit_set_edits(&mut self) -> PendingSave {
        self.session.commit();
        self.uncommitted = false;
        self.persist()
    }

    /// Leave the session: commit outstanding field edits, then wait until
    /// every save issued by this editor has finished. Returns whether the
    /// last save was stored.
    pub async fn close(mut self) -> bool {
        let last = if self.uncommitted {
            Some(self.commit_set_edits())
        } else {
            None
        };
        self.ledger.drain().await;
        let stored = match last {
            Some(save) => save.settled().await,
            None => true,
        };
        info!("Closed workout {}", self.session.date);
        stored
    }

    /// Start a rest countdown by hand.
    pub fn start_rest(&self) {
        self.timer.start();
    }

    /// Upsert the full current session in the background.
    pub fn persist(&self) -> PendingSave {
        let revision = self.ledger.issue();
        let body = self.session.snapshot();
        let user_id = self.session.user_id.clone();
        let service = self.service.clone();
        let notifier = self.notifier.clone();
        let ledger = self.ledger.clone();

        debug!(
            "Issuing save revision {} for {} ({} exercises)",
            revision,
            body.date,
            body.exercises.len()
        );
        let handle = tokio::spawn(async move {
            let stored = match service.save_workout(&user_id, &body).await {
                Ok(_) => {
                    ledger.acknowledge(revision);
                    debug!("Save revision {} stored", revision);
                    true
                }
                Err(e) => {
                    warn!("Save revision {} failed: {}", revision, e);
                    notifier.toast(Toast::error(format!(
                        "Workout not saved. {}",
                        e.user_message()
                    )));
                    false
                }
            };
            ledger.finish();
            stored
        });

        PendingSave { revision, handle }
    }
}

fn unknown_exercise(exercise_id: &str) -> LiftLogError {
    LiftLogError::Validation(format!("Exercise {} is not in this workout", exercise_id))
}
