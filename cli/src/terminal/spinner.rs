use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use colored::*;
use domov_common::progress::{ProgressLevel, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

const HINT_DELAY: Duration = Duration::from_secs(4);
const MESSAGE_READ_TIME: Duration = Duration::from_millis(800);
const HINTS: &[&str] = &[
    "Slow portals are cut off by --source-timeout",
    "Plain searches repeated within the staleness window are answered from cache",
    "Press Ctrl+C to stop",
];

struct ActiveSpinner {
    bar: ProgressBar,
    tx: Sender<String>,
}

static ACTIVE: Mutex<Option<ActiveSpinner>> = Mutex::new(None);

fn active() -> MutexGuard<'static, Option<ActiveSpinner>> {
    ACTIVE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁",
        ])
}

/// Shows a spinner until [`finish`] is called. Starting a new one replaces
/// the previous spinner.
pub fn start(message: &str) {
    let bar = ProgressBar::new_spinner();
    bar.set_style(style());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));

    let (tx, rx) = mpsc::channel::<String>();
    let worker = bar.clone();

    // Coalesces bursts of status updates and rotates hints while idle.
    thread::spawn(move || {
        let mut hint_index = 0;
        let mut next_hint = Instant::now() + HINT_DELAY;

        while !worker.is_finished() {
            let wait = next_hint.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(mut msg) => {
                    while let Ok(newer) = rx.try_recv() {
                        msg = newer;
                    }
                    worker.set_message(msg);
                    thread::sleep(MESSAGE_READ_TIME);
                    next_hint = Instant::now() + HINT_DELAY;
                }
                Err(RecvTimeoutError::Timeout) => {
                    let hint = HINTS[hint_index % HINTS.len()];
                    worker.set_message(format!("{}", hint.italic().white()));
                    hint_index += 1;
                    next_hint = Instant::now() + HINT_DELAY;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });

    if let Some(previous) = active().replace(ActiveSpinner { bar, tx }) {
        previous.bar.finish_and_clear();
    }
}

pub fn finish() {
    if let Some(spinner) = active().take() {
        spinner.bar.finish_and_clear();
    }
}

pub fn set_status(message: String) {
    if let Some(spinner) = active().as_ref() {
        let _ = spinner.tx.send(message);
    }
}

/// Runs `f` with the spinner hidden so output doesn't tear through it.
pub fn suspend<F: FnOnce() -> R, R>(f: F) -> R {
    let bar = active().as_ref().map(|spinner| spinner.bar.clone());
    match bar {
        Some(bar) => bar.suspend(f),
        None => f(),
    }
}

/// Mirrors informational progress onto the spinner line.
pub struct SpinnerReporter;

impl ProgressReporter for SpinnerReporter {
    fn report(&self, message: &str, level: ProgressLevel) {
        if level != ProgressLevel::Info {
            return;
        }
        let first_line = message.lines().next().unwrap_or_default();
        set_status(first_line.to_string());
    }
}

pub struct SpinnerWriter;

impl std::io::Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        let msg = msg.trim_end();
        suspend(|| eprintln!("{msg}"));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
