use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::foundation::error::{RunpaceError, RunpaceResult};
use crate::metrics::counters::{
    CounterProvider, CpuCounters, CpuInstance, RawLoad, list_available_instances,
};
use crate::metrics::sample::{HISTORY_CAPACITY, LoadSample, SampleHistory};

/// Tuning knobs for [`MetricSampler`].
#[derive(Clone, Debug)]
pub struct SamplerOpts {
    /// Number of samples kept in the rolling history.
    pub history_capacity: usize,
    /// Upper bound on a single counter read. Slower reads yield a degraded sample.
    pub read_timeout: Duration,
}

impl Default for SamplerOpts {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            read_timeout: Duration::from_millis(500),
        }
    }
}

/// Periodically samples CPU counters for one instance into a rolling history.
///
/// Counter reads run on a dedicated reader thread so that a stalled counter subsystem costs at
/// most `read_timeout` per [`MetricSampler::sample`] call.
pub struct MetricSampler {
    provider: Arc<dyn CounterProvider>,
    instance: CpuInstance,
    reader: Option<CounterReader>,
    history: SampleHistory,
    opts: SamplerOpts,
}

impl std::fmt::Debug for MetricSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricSampler")
            .field("instance", &self.instance)
            .field("has_counters", &self.reader.is_some())
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl MetricSampler {
    /// Open counters for `instance`, falling back to the aggregate when the instance is
    /// unavailable.
    ///
    /// Fails only when the aggregate itself cannot be opened.
    #[tracing::instrument(skip(provider, opts))]
    pub fn initialize(
        provider: Arc<dyn CounterProvider>,
        instance: CpuInstance,
        opts: SamplerOpts,
    ) -> RunpaceResult<Self> {
        let (active, counters) = open_with_fallback(provider.as_ref(), &instance)?;
        let reader = CounterReader::spawn(counters, &active)?;
        Ok(Self {
            provider,
            instance: active,
            reader: Some(reader),
            history: SampleHistory::new(opts.history_capacity),
            opts,
        })
    }

    /// Switch to another instance. No-op when `instance` is already active.
    ///
    /// The current counters are released before the new ones are opened. If neither the
    /// requested instance nor the aggregate can be opened, the error is returned and the sampler
    /// keeps producing degraded samples until a later change succeeds.
    pub fn change_instance(&mut self, instance: CpuInstance) -> RunpaceResult<()> {
        if instance == self.instance && self.reader.is_some() {
            return Ok(());
        }

        self.reader = None;
        let (active, counters) = open_with_fallback(self.provider.as_ref(), &instance)?;
        self.reader = Some(CounterReader::spawn(counters, &active)?);
        tracing::info!(requested = %instance, active = %active, "cpu instance changed");
        self.instance = active;
        Ok(())
    }

    /// Read the counters once and append the result to the history.
    ///
    /// Never fails: a read error or timeout appends [`LoadSample::degraded`].
    pub fn sample(&mut self) -> LoadSample {
        let timeout = self.opts.read_timeout;
        let res = match self.reader.as_mut() {
            Some(reader) => reader.read(timeout),
            None => Err(RunpaceError::counter("no open counters")),
        };
        let sample = match res {
            Ok(raw) => LoadSample::from_raw(raw),
            Err(err) => {
                tracing::warn!(instance = %self.instance, error = %err, "cpu counter read failed");
                LoadSample::degraded()
            }
        };
        self.history.push(sample);
        sample
    }

    /// Most recent sample, or a zeroed sample before the first [`MetricSampler::sample`].
    pub fn latest(&self) -> LoadSample {
        self.history.latest().unwrap_or_default()
    }

    /// Rolling sample history.
    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    /// Instance currently sampled (after any fallback).
    pub fn instance(&self) -> &CpuInstance {
        &self.instance
    }

    /// Selectable instances of this sampler's provider. See [`list_available_instances`].
    pub fn available_instances(&self) -> Vec<CpuInstance> {
        list_available_instances(self.provider.as_ref())
    }
}

fn open_with_fallback(
    provider: &dyn CounterProvider,
    requested: &CpuInstance,
) -> RunpaceResult<(CpuInstance, Box<dyn CpuCounters>)> {
    match provider.open(requested) {
        Ok(counters) => Ok((requested.clone(), counters)),
        Err(err) if !requested.is_total() => {
            tracing::warn!(
                requested = %requested,
                error = %err,
                "cpu instance unavailable, falling back to aggregate"
            );
            let counters = provider.open(&CpuInstance::Total)?;
            Ok((CpuInstance::Total, counters))
        }
        Err(err) => Err(err),
    }
}

type ReadReply = (u64, RunpaceResult<RawLoad>);

/// Owns a [`CpuCounters`] on a worker thread and serves read requests.
///
/// Dropping the reader closes the request channel; the worker exits (releasing its counters)
/// once any in-flight read returns.
struct CounterReader {
    requests: mpsc::Sender<u64>,
    replies: mpsc::Receiver<ReadReply>,
    next_seq: u64,
}

impl CounterReader {
    fn spawn(counters: Box<dyn CpuCounters>, instance: &CpuInstance) -> RunpaceResult<Self> {
        let (req_tx, req_rx) = mpsc::channel::<u64>();
        let (rep_tx, rep_rx) = mpsc::channel::<ReadReply>();

        std::thread::Builder::new()
            .name(format!("runpace-counters-{instance}"))
            .spawn(move || {
                let mut counters = counters;
                while let Ok(mut seq) = req_rx.recv() {
                    // Requests queued behind a stalled read collapse into one read for the
                    // newest; each read advances the counters' baseline.
                    while let Ok(newer) = req_rx.try_recv() {
                        seq = newer;
                    }
                    if rep_tx.send((seq, counters.read())).is_err() {
                        break;
                    }
                }
            })
            .context("spawn counter reader thread")?;

        Ok(Self {
            requests: req_tx,
            replies: rep_rx,
            next_seq: 0,
        })
    }

    fn read(&mut self, timeout: Duration) -> RunpaceResult<RawLoad> {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.requests
            .send(seq)
            .map_err(|_| RunpaceError::counter("counter reader stopped"))?;

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(remaining) {
                Ok((got, res)) if got == seq => return res,
                // Late reply to a read that already timed out.
                Ok(_) => continue,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    return Err(RunpaceError::counter(format!(
                        "counter read timed out after {} ms",
                        timeout.as_millis()
                    )));
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(RunpaceError::counter("counter reader stopped"));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/metrics/sampler.rs"]
mod tests;
