use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("gpterm.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("gpterm.client.request_errors");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("gpterm.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("gpterm.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("gpterm.stream.bytes");

pub(crate) static SESSION_SAVES: Counter = Counter::new("gpterm.session.saves");
pub(crate) static SESSION_LOADS: Counter = Counter::new("gpterm.session.loads");
pub(crate) static TOPIC_FALLBACKS: Counter = Counter::new("gpterm.topic.fallbacks");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&SESSION_SAVES);
    collector.register_counter(&SESSION_LOADS);
    collector.register_counter(&TOPIC_FALLBACKS);
}
