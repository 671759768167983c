//! Request and sign-in counters.
//!
//! Recording is always on; values are only exported when a Prometheus
//! listener has been installed via [`init_metrics`].

use std::net::SocketAddr;
use tracing::{info, warn};

pub const LISTINGS_REQUESTS: &str = "hill_guide_listings_requests_total";
pub const LISTINGS_ERRORS: &str = "hill_guide_listings_errors_total";
pub const SIGNINS_ALLOWED: &str = "hill_guide_signins_allowed_total";
pub const SIGNINS_DENIED: &str = "hill_guide_signins_denied_total";
pub const CHECKOUTS: &str = "hill_guide_cart_checkouts_total";

pub fn init_metrics(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            register();
            info!("Prometheus exporter listening on http://{addr}/metrics");
        }
        Err(e) => warn!("Prometheus exporter install failed: {e}"),
    }
}

/// Pre-register so every series shows up before first use.
fn register() {
    let _ = ::metrics::counter!(LISTINGS_REQUESTS);
    let _ = ::metrics::counter!(LISTINGS_ERRORS);
    let _ = ::metrics::counter!(SIGNINS_ALLOWED);
    let _ = ::metrics::counter!(SIGNINS_DENIED);
    let _ = ::metrics::counter!(CHECKOUTS);
}

pub struct ServerMetrics;

impl ServerMetrics {
    pub fn record_listings_request() {
        ::metrics::counter!(LISTINGS_REQUESTS).increment(1);
    }

    pub fn record_listings_error() {
        ::metrics::counter!(LISTINGS_ERRORS).increment(1);
    }

    pub fn record_signin(allowed: bool) {
        if allowed {
            ::metrics::counter!(SIGNINS_ALLOWED).increment(1);
        } else {
            ::metrics::counter!(SIGNINS_DENIED).increment(1);
        }
    }

    pub fn record_checkout() {
        ::metrics::counter!(CHECKOUTS).increment(1);
    }
}
