//! Optional Sentry error tracking integration.
//!
//! Initializes the Sentry SDK with the provided DSN and environment.
//! Request payloads and headers are never attached, since they carry
//! lead contact details. The returned guard must be held for the
//! lifetime of the application so that queued events are flushed.

pub fn init(dsn: &str, environment: Option<&str>) -> sentry::ClientInitGuard {
    let parsed_dsn = match dsn.parse() {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(error = %e, "invalid Sentry DSN, error tracking disabled");
            None
        }
    };

    sentry::init(sentry::ClientOptions {
        dsn: parsed_dsn,
        environment: environment.map(|e| e.to_string().into()),
        release: sentry::release_name!(),
        send_default_pii: false,
        attach_stacktrace: true,
        ..Default::default()
    })
}
