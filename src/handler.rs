//! Cache-aside cutout request orchestration
//!
//! One request runs the strictly sequential pipeline
//! validate -> check cache -> resolve -> fetch -> encode -> store ->
//! respond. There is deliberately no mutual exclusion between
//! concurrent requests for the same cache key: both may compute and
//! both may write, the last writer wins, and the stored artifact is
//! content-equivalent either way because the computation is
//! deterministic. No retries are performed here; transient upstream
//! failures surface immediately.

use crate::cache_key::derive_cache_key;
use crate::config::ServiceConfig;
use crate::engine::{CutoutEngine, ImageEncoder};
use crate::error::Result;
use crate::format::ImageFormat;
use crate::metrics::ServiceMetrics;
use crate::object_store::ObjectStore;
use crate::request::{CutoutRequest, GatewayRequest, ResponseEnvelope};
use crate::resolver::resolve;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of one served request, before envelope encoding
struct Served {
    body: Bytes,
    format: ImageFormat,
    cache_hit: bool,
}

/// The cutout request orchestrator.
///
/// Holds the deployment configuration and the three external
/// collaborators; each call to [`CutoutService::handle`] is an
/// independent, stateless invocation.
pub struct CutoutService {
    config: ServiceConfig,
    store: Arc<dyn ObjectStore>,
    engine: Arc<dyn CutoutEngine>,
    encoder: Arc<dyn ImageEncoder>,
    metrics: ServiceMetrics,
}

impl CutoutService {
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn ObjectStore>,
        engine: Arc<dyn CutoutEngine>,
        encoder: Arc<dyn ImageEncoder>,
        metrics: ServiceMetrics,
    ) -> Self {
        CutoutService {
            config,
            store,
            engine,
            encoder,
            metrics,
        }
    }

    /// Handle one gateway request, always producing a response
    /// envelope.
    ///
    /// Client errors report their cause in the body; server-class
    /// failures are logged and reported generically.
    pub async fn handle(&self, request: &GatewayRequest) -> ResponseEnvelope {
        match self.process(request).await {
            Ok(served) => {
                let outcome = if served.cache_hit { "hit" } else { "miss" };
                self.metrics
                    .requests_total
                    .with_label_values(&[served.format.extension(), outcome])
                    .inc();
                ResponseEnvelope::success(&served.body, served.format)
            }
            Err(e) => {
                let format_label = ImageFormat::negotiate(request.param("format"))
                    .map(|format| format.extension())
                    .unwrap_or("invalid");
                self.metrics
                    .requests_total
                    .with_label_values(&[format_label, "error"])
                    .inc();
                if e.is_client_error() {
                    info!("rejected request for path={}: {}", request.path, e);
                } else {
                    error!("request failed for path={}: {}", request.path, e);
                }
                ResponseEnvelope::from_error(&e)
            }
        }
    }

    /// Run the cache-aside pipeline for one request.
    ///
    /// All input validation happens before any I/O; the cache bucket
    /// must be configured before the cache is consulted.
    async fn process(&self, request: &GatewayRequest) -> Result<Served> {
        let cutout_request = CutoutRequest::from_gateway(request)?;
        let format = cutout_request.format;

        let bucket = self.config.require_cache_bucket()?;
        let key = derive_cache_key(&request.path, &request.query)?;

        if self.store.exists(bucket, &key).await? {
            // Hit/miss is keyed purely by the derived file name; cached
            // content is not re-validated against the parameters.
            info!("cache hit for key={}", key);
            self.metrics.cache_hits_total.inc();
            let body = self.store.get(bucket, &key).await?;
            return Ok(Served {
                body,
                format,
                cache_hit: true,
            });
        }

        info!("cache miss for key={}", key);
        self.metrics.cache_misses_total.inc();

        let url = resolve(&cutout_request.lid, &self.config.resolver_config())?;
        debug!("resolved lid={} to url={}", cutout_request.lid, url);

        let timer = self.metrics.compute_duration_seconds.start_timer();
        let cutout = self
            .engine
            .fetch_and_cut(
                &url,
                cutout_request.ra_deg,
                cutout_request.dec_deg,
                &cutout_request.size,
            )
            .await?;

        let body = if format.is_native() {
            cutout.to_fits()
        } else {
            self.encoder.encode(&cutout.pixels, format).await?
        };
        timer.observe_duration();

        // Store before responding so the next identical request can
        // hit, but never fail the request over a store error: the
        // computed result is already in hand.
        if let Err(e) = self
            .store
            .put(bucket, &key, body.clone(), format.content_type())
            .await
        {
            warn!("cache store failed for key={}: {}", key, e);
            self.metrics.cache_store_failures_total.inc();
        }

        Ok(Served {
            body,
            format,
            cache_hit: false,
        })
    }
}
