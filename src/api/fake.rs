//! In-memory [`TrainingApi`] for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use super::types::*;
use super::TrainingApi;
use crate::error::ApiError;
use crate::session::FinalizePayloadEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Session,
    Exercises,
    Catalog,
    Finalize,
}

type Hook = Box<dyn Fn(Call) + Send + Sync>;

pub struct FakeApi {
    pub session: Mutex<TrainingSession>,
    pub plans: Vec<SessionExercisePlan>,
    pub catalog: Vec<CatalogExercise>,
    pub finalize_message: Option<String>,
    calls: Mutex<Vec<(Call, String)>>,
    catalog_args: Mutex<Vec<(u32, u32)>>,
    finalized: Mutex<Vec<Vec<FinalizePayloadEntry>>>,
    failures: Mutex<HashMap<Call, ApiError>>,
    hook: Mutex<Option<Hook>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

pub fn session(owner: i64) -> TrainingSession {
    TrainingSession {
        id: 10,
        owner_user_id: owner,
        started_at: Some(Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()),
        finished_at: None,
        title: Some("Push day".to_string()),
    }
}

impl FakeApi {
    pub fn new(session: TrainingSession) -> Self {
        Self {
            session: Mutex::new(session),
            plans: vec![
                SessionExercisePlan {
                    exercise_id: 1,
                    series: 3,
                    repetitions: 10,
                    weight: Some("20".to_string()),
                    notes: None,
                },
                SessionExercisePlan {
                    exercise_id: 2,
                    series: 4,
                    repetitions: 8,
                    weight: None,
                    notes: Some("slow eccentric".to_string()),
                },
            ],
            catalog: vec![
                CatalogExercise { id: 1, name: "Bench press".to_string() },
                CatalogExercise { id: 2, name: "Overhead press".to_string() },
            ],
            finalize_message: Some("Training finished".to_string()),
            calls: Mutex::new(Vec::new()),
            catalog_args: Mutex::new(Vec::new()),
            finalized: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            hook: Mutex::new(None),
            gate: Mutex::new(None),
        }
    }

    pub fn fail(&self, call: Call, err: ApiError) {
        self.failures.lock().unwrap().insert(call, err);
    }

    /// Run `hook` before each call is answered.
    pub fn on_call(&self, hook: impl Fn(Call) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    /// Hold finalize responses until the returned gate is notified.
    pub fn gate_finalize(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn catalog_args(&self) -> Vec<(u32, u32)> {
        self.catalog_args.lock().unwrap().clone()
    }

    pub fn finalized(&self) -> Vec<Vec<FinalizePayloadEntry>> {
        self.finalized.lock().unwrap().clone()
    }

    fn record(&self, call: Call, token: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push((call, token.to_string()));
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(call);
        }
        match self.failures.lock().unwrap().remove(&call) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TrainingApi for FakeApi {
    async fn get_session(&self, token: &str, _session_id: i64) -> Result<TrainingSession, ApiError> {
        self.record(Call::Session, token)?;
        Ok(self.session.lock().unwrap().clone())
    }

    async fn get_session_exercises(
        &self,
        token: &str,
        _session_id: i64,
    ) -> Result<Vec<SessionExercisePlan>, ApiError> {
        self.record(Call::Exercises, token)?;
        Ok(self.plans.clone())
    }

    async fn get_exercise_catalog(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> Result<CatalogPage, ApiError> {
        self.record(Call::Catalog, token)?;
        self.catalog_args.lock().unwrap().push((page, page_size));
        Ok(CatalogPage {
            data: self.catalog.clone(),
        })
    }

    async fn finalize_session(
        &self,
        token: &str,
        _session_id: i64,
        entries: &[FinalizePayloadEntry],
    ) -> Result<FinalizeResponse, ApiError> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.record(Call::Finalize, token)?;
        self.finalized.lock().unwrap().push(entries.to_vec());
        Ok(FinalizeResponse {
            message: self.finalize_message.clone(),
        })
    }
}
