use serde::Serialize;

use crate::{config::PlatformConfig, db::AcademyStore, error::AppError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_enrollments: i64,
    pub average_progress: f64,
    pub platform: String,
    pub instructor: String,
}

pub async fn platform_stats(
    store: &dyn AcademyStore,
    platform: &PlatformConfig,
) -> Result<PlatformStats, AppError> {
    let on_err = || AppError::store("Failed to fetch stats");
    let total_users = store.count_active_users().await.map_err(on_err())?;
    let total_enrollments = store.count_progress_rows().await.map_err(on_err())?;
    let average_progress = store.average_progress().await.map_err(on_err())?;
    Ok(PlatformStats {
        total_users,
        total_enrollments,
        average_progress,
        platform: platform.name.clone(),
        instructor: platform.instructor.clone(),
    })
}
