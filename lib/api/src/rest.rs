use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use advertx_core::AdvertId;
use advertx_refresh::{CycleOutcome, RefreshCoordinator};
use advertx_storage::CacheSnapshot;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Error codes carried in JSON error bodies.
const CODE_NOT_COMPARED: u8 = 0x01;
const CODE_INVALID_ID: u8 = 0x02;

#[derive(Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u8>,
    description: String,
}

impl ErrorBody {
    fn new(code: Option<u8>, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    fn not_compared() -> Self {
        Self::new(
            Some(CODE_NOT_COMPARED),
            "Adverts have not been compared yet, try again later.",
        )
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    phase: String,
    snapshot: Option<SnapshotInfo>,
}

#[derive(Serialize)]
struct SnapshotInfo {
    created_at: String,
    age_secs: u64,
    adverts: usize,
    links: usize,
}

/// Shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<RefreshCoordinator>,
    pub api_key: String,
}

impl ApiState {
    pub fn new(coordinator: Arc<RefreshCoordinator>, api_key: impl Into<String>) -> Self {
        Self {
            coordinator,
            api_key: api_key.into(),
        }
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: ApiState, port: u16) -> std::io::Result<()> {
        info!(port, "REST API listening");
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET"])
                .max_age(3600);

            App::new()
                .wrap(cors)
                .configure(Self::routes(state.clone()))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Route table, shared with the in-process tests.
    pub fn routes(state: ApiState) -> impl FnOnce(&mut web::ServiceConfig) {
        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(web::Data::new(state))
                .route("/posted.json", web::get().to(posted))
                .route("/api/get/{key}/{id}", web::get().to(links_for))
                .route("/health", web::get().to(health));
        }
    }
}

fn servable(outcome: CycleOutcome) -> Option<Arc<CacheSnapshot>> {
    match outcome {
        Ok(snapshot) => Some(snapshot),
        Err(failure) => {
            warn!(kind = failure.kind(), "no snapshot to serve: {}", failure);
            None
        }
    }
}

async fn posted(state: web::Data<ApiState>) -> ActixResult<HttpResponse> {
    match servable(state.coordinator.get_current_or_trigger_refresh().await) {
        Some(snapshot) => Ok(HttpResponse::Ok().json(snapshot.as_ref())),
        None => Ok(HttpResponse::ServiceUnavailable().json(ErrorBody::not_compared())),
    }
}

async fn links_for(
    state: web::Data<ApiState>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (key, id) = path.into_inner();
    if key != state.api_key {
        return Ok(HttpResponse::Forbidden().json(ErrorBody::new(None, "Invalid API key.")));
    }

    let id: AdvertId = match id.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(ErrorBody::new(
                Some(CODE_INVALID_ID),
                "Invalid advert data, expected for number.",
            )))
        }
    };

    let snapshot = match servable(state.coordinator.get_current_or_trigger_refresh().await) {
        Some(snapshot) => snapshot,
        None => return Ok(HttpResponse::ServiceUnavailable().json(ErrorBody::not_compared())),
    };

    // Answer from the snapshot just checked, not whatever is current now.
    match snapshot.content.links_for(id) {
        Some(links) => Ok(HttpResponse::Ok().json(links)),
        None => Ok(HttpResponse::NotFound().json(ErrorBody::new(
            None,
            format!("Advert {} is not in the current snapshot", id),
        ))),
    }
}

async fn health(state: web::Data<ApiState>) -> ActixResult<HttpResponse> {
    let snapshot = state.coordinator.current().map(|snapshot| SnapshotInfo {
        created_at: snapshot.created_at.to_rfc3339(),
        age_secs: snapshot.age_at(Utc::now()).as_secs(),
        adverts: snapshot.content.len(),
        links: snapshot.content.link_count(),
    });

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        phase: format!("{:?}", state.coordinator.phase()).to_lowercase(),
        snapshot,
    }))
}
