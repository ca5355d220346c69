//! Tracing, trace-context propagation and Prometheus metrics for the platform.
//!
//! Logs always go to stdout through `tracing_subscriber::fmt`. Span export over
//! OTLP is switched on only when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//!
//! The counters below are the only metrics handlers emit; their names are
//! part of the dashboard contract.
use anyhow::Context as _;
use axum::Router;
use axum::http::HeaderMap;
use axum::routing::get;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logins by `role` and `outcome` (`success` / `failure`).
pub const LOGINS_TOTAL: &str = "campus_logins_total";
/// Graded assessment attempts.
pub const ATTEMPTS_SUBMITTED_TOTAL: &str = "campus_attempts_submitted_total";
/// Compensating deletes by `workflow` and `outcome` (`applied` / `failed`).
pub const COMPENSATIONS_TOTAL: &str = "campus_compensations_total";

const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Environment variables copied onto the OTel resource, in order.
const RESOURCE_ENV: &[(&str, &str)] = &[
    ("CAMPUS_SERVICE_INSTANCE_ID", "service.instance.id"),
    ("K8S_NAMESPACE_NAME", "k8s.namespace.name"),
    ("K8S_POD_NAME", "k8s.pod.name"),
    ("DEPLOYMENT_ENVIRONMENT", "deployment.environment"),
];

static SUBSCRIBER: OnceLock<()> = OnceLock::new();
static PROPAGATOR: OnceLock<()> = OnceLock::new();
static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn record_login(role: &'static str, outcome: &'static str) {
    metrics::counter!(LOGINS_TOTAL, "role" => role, "outcome" => outcome).increment(1);
}

pub fn record_attempt_submitted() {
    metrics::counter!(ATTEMPTS_SUBMITTED_TOTAL).increment(1);
}

pub fn record_compensation(workflow: &'static str, outcome: &'static str) {
    metrics::counter!(COMPENSATIONS_TOTAL, "workflow" => workflow, "outcome" => outcome)
        .increment(1);
}

/// Install the global subscriber, propagator and metrics recorder.
///
/// Safe to call more than once; later calls reuse what the first one set up.
pub fn init_observability(service_name: &str) -> anyhow::Result<PrometheusHandle> {
    install_propagator();
    SUBSCRIBER.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer());
        let installed = match otlp_tracer_provider(service_name) {
            Some(provider) => {
                let tracer = provider.tracer(service_name.to_string());
                global::set_tracer_provider(provider);
                registry
                    .with(tracing_opentelemetry::layer().with_tracer(tracer))
                    .try_init()
            }
            None => registry.try_init(),
        };
        if installed.is_err() {
            // Another subscriber already owns the global slot.
            tracing::debug!("tracing subscriber already installed");
        }
    });
    metrics_recorder()
}

fn otlp_tracer_provider(service_name: &str) -> Option<SdkTracerProvider> {
    std::env::var(OTLP_ENDPOINT_ENV).ok()?;
    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
    {
        Ok(exporter) => exporter,
        Err(err) => {
            eprintln!("otlp exporter disabled: {err}");
            return None;
        }
    };
    let resource = Resource::builder_empty()
        .with_attributes(resource_attributes(service_name, |key| {
            std::env::var(key).ok()
        }))
        .build();
    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

fn resource_attributes(
    service_name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<KeyValue> {
    let mut attrs = vec![KeyValue::new("service.name", service_name.to_string())];
    for (env_key, attr_key) in RESOURCE_ENV {
        let value = lookup(env_key).or_else(|| {
            (*attr_key == "service.instance.id")
                .then(|| lookup("HOSTNAME"))
                .flatten()
        });
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            attrs.push(KeyValue::new(*attr_key, value));
        }
    }
    attrs
}

fn install_propagator() {
    PROPAGATOR.get_or_init(|| {
        global::set_text_map_propagator(TraceContextPropagator::new());
    });
}

/// Parent context carried by an incoming request's `traceparent` header.
pub fn trace_context_from_headers(headers: &HeaderMap) -> opentelemetry::Context {
    install_propagator();
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

fn metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    if let Some(handle) = RECORDER.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("install metrics recorder")?;
    Ok(RECORDER.get_or_init(|| handle).clone())
}

fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// Serve `/metrics` on its own listener until the task is aborted.
pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics listening");
    axum::serve(listener, metrics_router(handle).into_make_service()).await
}
