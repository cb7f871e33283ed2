use crate::models::AppData;
use crate::onboarding::Sequencer;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    /// Live onboarding sequencers, one per user. Deliberately not
    /// persisted: abandoning the flow resets it, like closing the page.
    pub onboarding: Arc<Mutex<HashMap<Uuid, Sequencer>>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            onboarding: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
