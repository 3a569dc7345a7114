use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::history::{
        ClearHistoryResponse, DeleteGenerationResponse, HistoryItemResponse, HistoryService,
        HistoryServiceApi,
    },
    error::AppResult,
};

pub struct HistoryController {
    history_service: Arc<HistoryService>,
}

impl HistoryController {
    pub fn new(history_service: Arc<HistoryService>) -> Self {
        Self { history_service }
    }

    /// GET /api/history - Past generations, newest first
    pub async fn list(
        State(controller): State<Arc<HistoryController>>,
    ) -> AppResult<Json<Vec<HistoryItemResponse>>> {
        let items = controller.history_service.list().await?;
        Ok(Json(items))
    }

    /// DELETE /api/history/:filename
    pub async fn delete(
        State(controller): State<Arc<HistoryController>>,
        Path(filename): Path<String>,
    ) -> AppResult<Json<DeleteGenerationResponse>> {
        let response = controller.history_service.delete(&filename).await?;
        Ok(Json(response))
    }

    /// DELETE /api/history
    pub async fn clear(
        State(controller): State<Arc<HistoryController>>,
    ) -> AppResult<Json<ClearHistoryResponse>> {
        let response = controller.history_service.clear().await?;
        Ok(Json(response))
    }
}
