//! Shared stubs for integration tests
//! Provides a manual clock, scripted snapshot sources and commit gateways
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reservation_service::error::SnapshotError;
use reservation_service::models::{CommitResult, RawRow, Snapshot};
use reservation_service::services::{Clock, CommitGateway, SnapshotSource};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================
// Time
// ============================================

pub fn service_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
}

pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    service_date().and_hms_opt(hour, minute, 0).unwrap()
}

/// Clock that only moves when the loop sleeps.
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
    pub sleeps: AtomicU32,
}

impl ManualClock {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        let step = chrono::Duration::from_std(duration).unwrap();
        let mut now = self.now.lock().unwrap();
        *now += step;
    }
}

/// Clock whose sleep never finishes; only cancellation gets the loop out.
pub struct StuckClock(pub NaiveDateTime);

#[async_trait]
impl Clock for StuckClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }

    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await
    }
}

// ============================================
// Snapshots
// ============================================

pub fn row(departure: &str, standard: &str, premium: &str, handle: u32) -> RawRow<u32> {
    RawRow {
        departure: format!("수서\n{}", departure),
        standard: standard.to_string(),
        premium: premium.to_string(),
        handle,
    }
}

/// Plays back one scripted response per acquisition, repeating the last one.
pub struct ScriptedSource {
    script: Vec<Result<Vec<RawRow<u32>>, SnapshotError>>,
    pub calls: AtomicU32,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Vec<RawRow<u32>>, SnapshotError>>) -> Self {
        Self {
            script,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    type Handle = u32;

    async fn acquire_snapshot(&self) -> Result<Snapshot<u32>, SnapshotError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        let step = self
            .script
            .get(call)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()));
        step.map(|rows| Snapshot::new(service_date(), rows))
    }
}

/// Source whose acquisition never completes.
pub struct HangingSource;

#[async_trait]
impl SnapshotSource for HangingSource {
    type Handle = u32;

    async fn acquire_snapshot(&self) -> Result<Snapshot<u32>, SnapshotError> {
        std::future::pending().await
    }
}

// ============================================
// Commit gateway
// ============================================

pub struct StubGateway {
    result: CommitResult,
    confirmed: bool,
    pub handles: Mutex<Vec<u32>>,
    pub confirmations: AtomicU32,
}

impl StubGateway {
    pub fn new(result: CommitResult, confirmed: bool) -> Self {
        Self {
            result,
            confirmed,
            handles: Mutex::new(Vec::new()),
            confirmations: AtomicU32::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.handles.lock().unwrap().len()
    }
}

#[async_trait]
impl CommitGateway<u32> for StubGateway {
    async fn attempt_commit(&self, handle: &u32) -> CommitResult {
        self.handles.lock().unwrap().push(*handle);
        self.result
    }

    async fn confirm_commit(&self) -> bool {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        self.confirmed
    }
}
