use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::colleges::{locate, CollegeSearch, Coordinate};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl LocationQuery {
    /// Both or neither; a missing location means the client fell back.
    fn center(&self) -> Result<Option<Coordinate>, AppError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let center = Coordinate { lat, lon };
                center.validate().map_err(AppError::Validation)?;
                Ok(Some(center))
            }
            (None, None) => Ok(None),
            _ => Err(AppError::Validation(
                "lat and lon must be given together".to_string(),
            )),
        }
    }
}

/// GET /api/v1/colleges?lat=&lon=
pub async fn handle_nearby_colleges(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<CollegeSearch>, AppError> {
    let center = query.center()?;
    let search = locate(
        state.colleges.as_ref(),
        center,
        state.config.default_location,
        state.config.college_search_radius_m,
    )
    .await;
    Ok(Json(search))
}
