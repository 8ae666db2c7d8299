use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

use crate::prober::ProbeOutcome;

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static OUTCOME_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new("probe_outcomes_total", "Connection attempts by outcome");
    let ctr = IntCounterVec::new(opts, &["outcome"]).expect("creating outcome counter");
    REGISTRY
        .register(Box::new(ctr.clone()))
        .expect("registering outcome counter");
    ctr
});

static VERDICT_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new("host_checks_total", "Host checks by verdict");
    let ctr = IntCounterVec::new(opts, &["verdict"]).expect("creating verdict counter");
    REGISTRY
        .register(Box::new(ctr.clone()))
        .expect("registering verdict counter");
    ctr
});

static CHECK_DURATION: Lazy<Histogram> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "host_check_duration_seconds",
        "Wall-clock time of a host check",
    )
    .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]);
    let hist = Histogram::with_opts(opts).expect("creating histogram");
    REGISTRY
        .register(Box::new(hist.clone()))
        .expect("registering histogram");
    hist
});

pub fn inc_outcome(outcome: ProbeOutcome) {
    OUTCOME_COUNTER.with_label_values(&[outcome.as_str()]).inc();
}

pub fn observe_check(host_up: bool, elapsed: Duration) {
    let verdict = if host_up { "up" } else { "down" };
    VERDICT_COUNTER.with_label_values(&[verdict]).inc();
    CHECK_DURATION.observe(elapsed.as_secs_f64());
}

/// Text exposition of everything recorded so far.
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let mf = REGISTRY.gather();
    let mut buf = Vec::new();
    encoder.encode(&mf, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
