use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("dashscope.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("dashscope.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("dashscope.client.request_duration_seconds");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("dashscope.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("dashscope.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("dashscope.stream.bytes");
pub(crate) static STREAM_DELTAS: Counter = Counter::new("dashscope.stream.deltas");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_counter(&STREAM_DELTAS);
}
