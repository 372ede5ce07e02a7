use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing::{info, warn};

use crate::api::{
    ApiDispatchRequest, ApiDispatchResponse, ApiReportResponse, ApiSourceStatus, ReportQuery,
};
use feedback_triage::cache::SourceCache;
use feedback_triage::config::TriageConfig;
use feedback_triage::dispatch::{
    dispatch_report, parse_recipients, DispatchProgress, ProgressChannels, SendGridClient,
};
use feedback_triage::error::DispatchError;
use feedback_triage::report::export::{export_filename, priority_csv};
use feedback_triage::report::render_report;
use feedback_triage::{analyze, now, TriageRun};

#[derive(Clone)]
struct AppState {
    config: Arc<TriageConfig>,
    cache: Arc<SourceCache>,
    mailer: Result<SendGridClient, Arc<DispatchError>>,
    channels: ProgressChannels<StreamEvent>,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    #[serde(flatten)]
    progress: DispatchProgress,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

#[derive(Serialize)]
struct ReloadResponse {
    dropped: usize,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs, config: TriageConfig) -> Result<(), String> {
    let mailer = SendGridClient::from_config(&config.dispatch, args.api_key.clone()).map_err(Arc::new);
    if let Err(err) = &mailer {
        warn!(error = %err, "report dispatch disabled");
    }

    let state = AppState {
        config: Arc::new(config),
        cache: Arc::new(SourceCache::new()),
        mailer,
        channels: ProgressChannels::new(Duration::from_secs(10)),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/report", get(report_handler))
        .route("/api/report.csv", get(report_csv_handler))
        .route("/api/reload", post(reload_handler))
        .route("/api/dispatch", post(dispatch_handler))
        .route("/api/dispatch/stream", get(stream_handler))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(%addr, "serving feedback reports");
    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn current_run(
    state: &AppState,
    query: &ReportQuery,
) -> Result<(TriageRun, ApiSourceStatus, usize), (StatusCode, String)> {
    let mut config = (*state.config).clone();
    query
        .apply(&mut config)
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;

    let now = now();
    let loaded = state.cache.get_or_load(&config, now).await;
    let source = ApiSourceStatus::from_loaded(config.source.path.display().to_string(), &loaded);
    let run = analyze(&loaded.records, &config, now);
    Ok((run, source, config.report.table_len()))
}

async fn report_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiReportResponse>, (StatusCode, String)> {
    let (run, source, table_len) = current_run(&state, &query).await?;
    Ok(Json(ApiReportResponse::from_run(run, source, table_len)))
}

async fn report_csv_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (run, _, table_len) = current_run(&state, &query).await?;
    let rows = &run.priorities[..table_len.min(run.priorities.len())];
    let body = priority_csv(rows).map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(run.generated_at));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

async fn reload_handler(State(state): State<AppState>) -> Json<ReloadResponse> {
    let dropped = state.cache.invalidate().await;
    Json(ReloadResponse { dropped })
}

async fn dispatch_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiDispatchRequest>,
) -> Result<Json<ApiDispatchResponse>, (StatusCode, String)> {
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);

    let mailer = state
        .mailer
        .as_ref()
        .map_err(|err| (StatusCode::SERVICE_UNAVAILABLE, err.to_string()))?;
    let recipients = parse_recipients(&request.recipients);
    if recipients.is_empty() {
        let err = DispatchError::Unconfigured {
            missing: vec!["recipients"],
        };
        return Err((StatusCode::BAD_REQUEST, err.to_string()));
    }

    let query = ReportQuery {
        top_n: None,
        sentiment: None,
    };
    let (run, _, _) = current_run(&state, &query).await?;
    let mut warnings = Vec::new();
    if run.priorities.is_empty() {
        warnings.push("no feedback records; sending an empty report".to_string());
    }
    let report = render_report(&run).map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    let channel = state.channels.open(&request_id).await;
    let result = dispatch_report(mailer, &report, &recipients, |progress| {
        send_event(&channel, progress);
    })
    .await;
    state.channels.release(&request_id);
    let outcome = result.map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;

    if !outcome.failures.is_empty() {
        warnings.push(format!(
            "sent to {}/{} recipients",
            outcome.success_count, outcome.attempted
        ));
    }

    Ok(Json(ApiDispatchResponse {
        request_id,
        outcome,
        warnings,
    }))
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    let sender = state.channels.open(&query.request_id).await;
    let receiver = sender.subscribe();
    state.channels.release_when_idle(&query.request_id);
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data)))
        }
        Err(_) => None,
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

fn send_event(sender: &broadcast::Sender<StreamEvent>, progress: DispatchProgress) {
    let _ = sender.send(StreamEvent {
        progress,
        timestamp_ms: now_ms(),
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("dispatch-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
