//! Process-wide health counters
//!
//! Observational only: nothing here feeds control-flow decisions. The one
//! health input that does (the per-endpoint backoff strike count) lives with
//! the endpoint implementations.

use metrics::{counter, gauge};

/// A read was issued against a source endpoint
pub fn record_read_issued(reader: &str) {
    counter!("relay_reads_issued_total", "reader" => reader.to_string()).increment(1);
}

/// A read failed with a transient error
pub fn record_read_error(reader: &str) {
    counter!("relay_reads_errored_total", "reader" => reader.to_string()).increment(1);
}

/// A read result could not be transformed into typed values
pub fn record_job_errored(reader: &str) {
    counter!("relay_jobs_errored_total", "reader" => reader.to_string()).increment(1);
}

/// One job was shipped to a destination
pub fn record_job_recorded(recorder: &str) {
    counter!("relay_jobs_recorded_total", "recorder" => recorder.to_string()).increment(1);
}

/// One job was dropped because a recorder queue was full
pub fn record_job_dropped(recorder: &str) {
    counter!("relay_jobs_dropped_total", "recorder" => recorder.to_string()).increment(1);
}

/// A record call blew past its derived deadline and was abandoned
pub fn record_job_abandoned(recorder: &str) {
    counter!("relay_jobs_abandoned_total", "recorder" => recorder.to_string()).increment(1);
}

/// A record call failed with a transient error
pub fn record_record_error(recorder: &str) {
    counter!("relay_records_errored_total", "recorder" => recorder.to_string()).increment(1);
}

/// An engine entered its running loop
pub fn record_engine_started() {
    gauge!("relay_engines_running").increment(1.0);
    counter!("relay_engines_started_total").increment(1);
}

/// An engine terminated
pub fn record_engine_stopped() {
    gauge!("relay_engines_running").decrement(1.0);
}
