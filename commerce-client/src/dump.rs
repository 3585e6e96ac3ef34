//! Request/response dumping
//!
//! Debug dumping is a cross-cutting concern, so it hangs off the client
//! as injected hooks rather than a hardcoded flag inside the call path.

/// Hooks invoked around every HTTP exchange when installed
pub trait DumpHooks: Send + Sync {
    fn on_request(&self, method: &str, url: &str, body: Option<&str>);
    fn on_response(&self, status: u16, body: &str);
}

/// Dump implementation that logs full exchanges through `tracing`
///
/// Bodies go out at debug level under the `commerce_client::dump`
/// target, so they can be switched on per-target without flooding the
/// rest of the logs.
#[derive(Debug, Default)]
pub struct TracingDump;

impl DumpHooks for TracingDump {
    fn on_request(&self, method: &str, url: &str, body: Option<&str>) {
        tracing::debug!(
            target: "commerce_client::dump",
            method,
            url,
            body = body.unwrap_or(""),
            "request"
        );
    }

    fn on_response(&self, status: u16, body: &str) {
        tracing::debug!(
            target: "commerce_client::dump",
            status,
            body,
            "response"
        );
    }
}
