use crate::calendar::DayBoundary;
use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub day_boundary: DayBoundary,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, day_boundary: DayBoundary, data: AppData) -> Self {
        Self {
            data_path,
            day_boundary,
            data: Arc::new(Mutex::new(data)),
        }
    }
}
