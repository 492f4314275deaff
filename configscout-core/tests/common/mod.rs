//! Scripted in-memory connector shared by the scan tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use configscout_core::{
    ConfigRecord, ConfigSession, ConnectionError, ConnectionParams, Connector, QueryError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// What the fake server answers.
#[derive(Debug, Clone)]
pub struct Script {
    pub connect: Result<(), ConnectionError>,
    pub auth: Result<ConfigRecord, QueryError>,
    pub lookups: HashMap<String, Result<Vec<ConfigRecord>, QueryError>>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            connect: Ok(()),
            auth: Ok(ConfigRecord::authentication_mode("Mixed Mode")),
            lookups: HashMap::new(),
        }
    }
}

impl Script {
    pub fn with_row(mut self, record: ConfigRecord) -> Self {
        if let Ok(rows) = self
            .lookups
            .entry(record.name.clone())
            .or_insert_with(|| Ok(Vec::new()))
        {
            rows.push(record);
        }
        self
    }

    pub fn with_failure(mut self, target: &str, message: &str) -> Self {
        self.lookups.insert(
            target.to_string(),
            Err(QueryError::Driver {
                target: target.to_string(),
                state: Some(1),
                code: Some(15281),
                message: message.to_string(),
            }),
        );
        self
    }
}

/// Observations made by the fake server.
#[derive(Debug, Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub lookups: Mutex<Vec<String>>,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[derive(Debug)]
pub struct ScriptedConnector {
    pub script: Script,
    pub counters: Arc<Counters>,
    /// When set, `open` waits for a permit before answering.
    pub gate: Option<Arc<Semaphore>>,
}

impl ScriptedConnector {
    pub fn new(script: Script) -> (Self, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        (
            Self {
                script,
                counters: Arc::clone(&counters),
                gate: None,
            },
            counters,
        )
    }

    pub fn gated(script: Script, gate: Arc<Semaphore>) -> (Self, Arc<Counters>) {
        let (mut connector, counters) = Self::new(script);
        connector.gate = Some(gate);
        (connector, counters)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    async fn open(&self, _params: &ConnectionParams) -> Result<ScriptedSession, ConnectionError> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        self.script.connect.clone()?;

        Ok(ScriptedSession {
            script: self.script.clone(),
            counters: Arc::clone(&self.counters),
        })
    }

    fn driver_name(&self) -> &'static str {
        "scripted"
    }
}

#[derive(Debug)]
pub struct ScriptedSession {
    script: Script,
    counters: Arc<Counters>,
}

#[async_trait]
impl ConfigSession for ScriptedSession {
    async fn probe_auth_mode(&mut self) -> Result<ConfigRecord, QueryError> {
        self.script.auth.clone()
    }

    async fn query_config(&mut self, name: &str) -> Result<Vec<ConfigRecord>, QueryError> {
        self.counters.lookups.lock().unwrap().push(name.to_string());
        self.script
            .lookups
            .get(name)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn close(self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Catalog-shaped record for `name`.
pub fn catalog_record(name: &str, value: &str, running: &str) -> ConfigRecord {
    ConfigRecord {
        name: name.to_string(),
        value: value.to_string(),
        default_value: "0".to_string(),
        running_value: running.to_string(),
        description: format!("{name} option"),
    }
}

pub fn params() -> ConnectionParams {
    ConnectionParams::new("db01", "master")
}
