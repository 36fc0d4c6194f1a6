//! Bulk reachability probing
//!
//! Checks whether dataset URLs still serve a page. Each probe is a sync
//! `ureq` GET with a per-request timeout, run on a helper thread that the
//! caller waits on for at most a hard deadline. Failures never propagate:
//! they degrade to [`Reachability::Unreachable`] or
//! [`Reachability::TimedOut`].
//!
//! Feature extraction never calls into this module.

use std::path::Path;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::IndexedRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::RawRecord;
use crate::error::PhishResult;

/// Desktop browser User-Agents, one picked at random per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15",
];

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    /// HTTP 200 with a non-blank body.
    Reachable,
    /// Any other status, a blank body, or a transport error.
    Unreachable,
    /// No answer before the hard deadline.
    TimedOut,
}

impl std::fmt::Display for Reachability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reachability::Reachable => write!(f, "reachable"),
            Reachability::Unreachable => write!(f, "unreachable"),
            Reachability::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Prober settings (`[probe]` in `phishnet.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Timeout applied to the HTTP request itself.
    pub request_timeout_ms: u64,
    /// Longest the caller waits for a probe.
    pub deadline_ms: u64,
    /// Probes in flight at once.
    pub workers: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5_000,
            deadline_ms: 10_000,
            workers: 8,
        }
    }
}

impl ProbeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

fn user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

fn fetch(url: &str, timeout: Duration, user_agent: &str) -> Reachability {
    let agent = ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent();

    match agent.get(url).header("User-Agent", user_agent).call() {
        Ok(response) => {
            let status = response.status().as_u16();
            if status != 200 {
                debug!("{} answered {}", url, status);
                return Reachability::Unreachable;
            }
            match response.into_body().read_to_vec() {
                Ok(body) if body.iter().any(|b| !b.is_ascii_whitespace()) => {
                    Reachability::Reachable
                }
                Ok(_) => Reachability::Unreachable,
                Err(e) => {
                    debug!("{}: failed reading body: {}", url, e);
                    Reachability::Unreachable
                }
            }
        }
        Err(e) => {
            debug!("{}: request failed: {}", url, e);
            Reachability::Unreachable
        }
    }
}

/// Probe one URL, waiting at most `config.deadline()`.
pub fn probe(url: &str, config: &ProbeConfig) -> Reachability {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let owned = url.to_string();
    let timeout = config.request_timeout();
    let ua = user_agent();

    // The worker is detached; if the deadline passes first its send fails
    let spawned = std::thread::Builder::new()
        .name("phishnet-probe".into())
        .spawn(move || {
            let _ = tx.send(fetch(&owned, timeout, ua));
        });
    if let Err(e) = spawned {
        warn!("Could not start probe thread for {}: {}", url, e);
        return Reachability::Unreachable;
    }

    match rx.recv_timeout(config.deadline()) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            debug!("{}: no answer within {:?}", url, config.deadline());
            Reachability::TimedOut
        }
        Err(RecvTimeoutError::Disconnected) => Reachability::Unreachable,
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    if !console::Term::stderr().is_term() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("█▓▒░  "));
    }
    bar
}

/// Probe every URL on a pool of `config.workers` threads. Results keep
/// input order.
pub fn probe_all<S: AsRef<str> + Sync>(urls: &[S], config: &ProbeConfig) -> Vec<Reachability> {
    let bar = progress_bar(urls.len());
    bar.set_message("probing");

    let run = || -> Vec<Reachability> {
        urls.par_iter()
            .map(|u| {
                let r = probe(u.as_ref(), config);
                bar.inc(1);
                r
            })
            .collect()
    };

    let results = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!("Falling back to the global pool: {}", e);
            run()
        }
    };

    bar.finish_and_clear();
    results
}

#[derive(Serialize)]
struct ReportRow<'a> {
    url: &'a str,
    reachability: Reachability,
    status: &'a str,
}

/// Write `url,reachability,status` rows for a probed dataset.
pub fn write_report(
    path: &Path,
    records: &[RawRecord],
    results: &[Reachability],
) -> PhishResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    for (record, &reachability) in records.iter().zip(results) {
        writer.serialize(ReportRow {
            url: &record.url,
            reachability,
            status: &record.status,
        })?;
    }
    writer.flush()?;
    Ok(())
}
