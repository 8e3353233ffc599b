use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use channelpulse_core::domain::channel::{self, Channel, ChannelId};
use channelpulse_core::domain::insight::EnrichedInsight;
use channelpulse_core::domain::metrics::{ChannelComparison, ChartPoint, Metric, PeriodSummary};
use channelpulse_core::{render, Engine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = channelpulse_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Built once; handlers only read it.
    let engine = Engine::initialize(settings.seed, &settings.synth)?;

    let state = AppState {
        engine: Arc::new(engine),
        insight_delay: settings.insight_delay,
        chart_days: settings.chart_days,
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        let err = anyhow::Error::new(e);
        sentry_anyhow::capture_anyhow(&err);
        return Err(err);
    }

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/channels", get(list_channels))
        .route("/channels/:channel", get(get_channel))
        .route("/channels/:channel/summary", get(get_summary))
        .route("/channels/:channel/chart", get(get_chart))
        .route("/channels/:channel/report", get(get_report))
        .route("/comparison", get(get_comparison))
        .route("/insights", get(get_insight))
        .route("/insights/generate", post(generate_insight))
        .route("/insights/voice", get(get_voice_script))
        .route("/insights/implement", post(implement_recommendation))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    engine: Arc<Engine>,
    insight_delay: Duration,
    chart_days: usize,
}

#[derive(Debug, Deserialize)]
struct ChartParams {
    metric: Option<String>,
    days: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct InsightParams {
    focus: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiChart {
    channel: ChannelId,
    metric: Metric,
    points: Vec<ChartPoint>,
}

#[derive(Debug, Serialize)]
struct ApiInsight {
    insight_id: Uuid,
    generated_at: DateTime<Utc>,
    insight: EnrichedInsight,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    message: &'static str,
}

async fn list_channels() -> Json<Vec<&'static Channel>> {
    Json(channel::catalog().collect())
}

async fn get_channel(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Json<&'static Channel>, StatusCode> {
    let id = parse_channel(&channel)?;
    Ok(Json(state.engine.channel(id)))
}

async fn get_summary(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<Json<PeriodSummary>, StatusCode> {
    let id = parse_channel(&channel)?;
    let summary = state.engine.summarize(id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(summary))
}

async fn get_chart(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<Json<ApiChart>, StatusCode> {
    let id = parse_channel(&channel)?;
    let metric = match params.metric.as_deref() {
        Some(s) => s.parse::<Metric>().map_err(|e| {
            tracing::debug!(error = %e, "rejecting chart request");
            StatusCode::BAD_REQUEST
        })?,
        None => Metric::default(),
    };
    let days = params.days.unwrap_or(state.chart_days);
    if days == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    Ok(Json(ApiChart {
        channel: id,
        metric,
        points: state.engine.chart(id, metric, days),
    }))
}

async fn get_comparison(State(state): State<AppState>) -> Json<Vec<ChannelComparison>> {
    Json(state.engine.compare())
}

async fn get_insight(
    State(state): State<AppState>,
    Query(params): Query<InsightParams>,
) -> Result<Json<ApiInsight>, StatusCode> {
    let focus = parse_focus(params.focus.as_deref())?;
    Ok(Json(fresh_insight(&state.engine, focus)))
}

async fn generate_insight(
    State(state): State<AppState>,
    Query(params): Query<InsightParams>,
) -> Result<Json<ApiInsight>, StatusCode> {
    let focus = parse_focus(params.focus.as_deref())?;

    // Simulated processing time; a timer, so other requests keep being served.
    if !state.insight_delay.is_zero() {
        tokio::time::sleep(state.insight_delay).await;
    }

    let insight = fresh_insight(&state.engine, focus);
    tracing::info!(
        insight_id = %insight.insight_id,
        focus = ?focus,
        title = insight.insight.template.title,
        "generated insight"
    );
    Ok(Json(insight))
}

async fn get_voice_script(
    State(state): State<AppState>,
    Query(params): Query<InsightParams>,
) -> Result<String, StatusCode> {
    let focus = parse_focus(params.focus.as_deref())?;
    let insight = fresh_insight(&state.engine, focus);
    Ok(render::voice_script(&insight.insight))
}

async fn implement_recommendation() -> Json<ApiMessage> {
    Json(ApiMessage {
        message: render::IMPLEMENTATION_ACK,
    })
}

async fn get_report(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let id = parse_channel(&channel)?;
    let summary = state.engine.summarize(id);
    let insight = fresh_insight(&state.engine, Some(id));
    let report = render::build_report(
        id.channel(),
        summary.as_ref(),
        &insight.insight,
        insight.generated_at.naive_utc(),
    );

    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        report,
    ))
}

fn fresh_insight(engine: &Engine, focus: Option<ChannelId>) -> ApiInsight {
    let insight = engine.select_insight(focus, &mut rand::thread_rng());
    ApiInsight {
        insight_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        insight,
    }
}

fn parse_channel(raw: &str) -> Result<ChannelId, StatusCode> {
    raw.parse::<ChannelId>().map_err(|e| {
        tracing::debug!(error = %e, "channel lookup failed");
        StatusCode::NOT_FOUND
    })
}

fn parse_focus(raw: Option<&str>) -> Result<Option<ChannelId>, StatusCode> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<ChannelId>().map(Some).map_err(|e| {
            tracing::debug!(error = %e, "rejecting insight focus");
            StatusCode::BAD_REQUEST
        }),
        None => Ok(None),
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &channelpulse_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use channelpulse_core::synth::SynthOptions;

    fn test_state(insight_delay: Duration) -> AppState {
        AppState {
            engine: Arc::new(Engine::initialize(Some(17), &SynthOptions::default()).unwrap()),
            insight_delay,
            chart_days: 30,
        }
    }

    fn focus(s: &str) -> Query<InsightParams> {
        Query(InsightParams {
            focus: Some(s.to_string()),
        })
    }

    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let state = test_state(Duration::ZERO);
        let err = get_summary(State(state), Path("tiktok".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);

        let err = get_channel(State(test_state(Duration::ZERO)), Path("myspace".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn summary_for_known_channel() {
        let state = test_state(Duration::ZERO);
        let Json(summary) = get_summary(State(state), Path("instagram".to_string()))
            .await
            .unwrap();
        assert_eq!(summary.channel.id, ChannelId::Instagram);
        assert!(summary.current.traffic > 0);
    }

    #[tokio::test]
    async fn chart_defaults_to_revenue_over_configured_days() {
        let state = test_state(Duration::ZERO);
        let Json(chart) = get_chart(
            State(state),
            Path("google".to_string()),
            Query(ChartParams {
                metric: None,
                days: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(chart.metric, Metric::Revenue);
        assert_eq!(chart.points.len(), 30);
    }

    #[tokio::test]
    async fn chart_rejects_unknown_metric() {
        let state = test_state(Duration::ZERO);
        let err = get_chart(
            State(state),
            Path("google".to_string()),
            Query(ChartParams {
                metric: Some("clicks".to_string()),
                days: Some(7),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn focused_insight_is_relevant() {
        let state = test_state(Duration::ZERO);
        for _ in 0..20 {
            let Json(api) = get_insight(State(state.clone()), focus("linkedin"))
                .await
                .unwrap();
            assert!(api.insight.template.is_relevant_to(ChannelId::Linkedin));
            assert!(api.insight.dynamic_data.is_some());
        }
    }

    #[tokio::test]
    async fn insight_payload_inlines_template_fields() {
        let state = test_state(Duration::ZERO);
        let Json(api) = get_insight(State(state), focus("instagram")).await.unwrap();
        let value = serde_json::to_value(&api).unwrap();
        assert!(value["insight_id"].is_string());
        assert!(value["insight"]["title"].is_string());
        assert!(value["insight"]["dynamic_data"]["improvement_potential"].is_number());
    }

    #[tokio::test]
    async fn unknown_focus_is_bad_request() {
        let state = test_state(Duration::ZERO);
        let err = get_insight(State(state), focus("tiktok")).await.unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_focus_means_no_focus() {
        let state = test_state(Duration::ZERO);
        let Json(api) = get_insight(State(state), focus("  ")).await.unwrap();
        assert!(!api.insight.focus_fallback);
    }

    #[tokio::test]
    async fn generate_waits_for_configured_delay() {
        let delay = Duration::from_millis(20);
        let state = test_state(delay);
        let started = std::time::Instant::now();
        let Json(api) = generate_insight(State(state), Query(InsightParams::default()))
            .await
            .unwrap();
        assert!(started.elapsed() >= delay);
        assert!(api.insight.dynamic_data.is_some());
    }

    #[tokio::test]
    async fn comparison_covers_all_channels() {
        let state = test_state(Duration::ZERO);
        let Json(rows) = get_comparison(State(state)).await;
        assert_eq!(rows.len(), ChannelId::ALL.len());
    }

    #[tokio::test]
    async fn voice_script_and_ack() {
        let state = test_state(Duration::ZERO);
        let script = get_voice_script(State(state), focus("blog")).await.unwrap();
        assert!(script.starts_with("Here's your AI-powered insight:"));

        let Json(ack) = implement_recommendation().await;
        assert!(ack.message.contains("Implemented Successfully"));
    }

    #[test]
    fn router_builds() {
        let _ = router(test_state(Duration::ZERO));
    }
}
