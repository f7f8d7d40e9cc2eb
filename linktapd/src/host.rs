use linktap_api::{driver::PropertySink, Value};
use std::{future::Future, sync::Arc};
use tracing::info;

// The daemon doesn't store property values. Every update a valve
// reports is written to the log.

pub struct LogSink {
    tap: Arc<str>,
}

impl LogSink {
    pub fn new(tap: Arc<str>) -> Self {
        LogSink { tap }
    }
}

impl PropertySink for LogSink {
    fn report(
        &self,
        name: &'static str,
        value: Value,
    ) -> impl Future<Output = ()> + Send {
        info!("{}:{} = {}", &self.tap, name, value);
        std::future::ready(())
    }
}
