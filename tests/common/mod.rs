//! Shared test payloads for exercising the lifecycle engine.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use modvisor::{HookError, Module, ModuleHost, UnloadDecision};

/// Shared observation state recorded by a [`TestModule`]'s hooks.
#[derive(Default)]
pub struct Probe {
    pub load_calls: AtomicUsize,
    pub suspend_calls: AtomicUsize,
    pub resume_calls: AtomicUsize,
    pub unload_calls: AtomicUsize,
    order: Mutex<Vec<String>>,
}

impl Probe {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hook entry/exit marks, in execution order.
    pub fn order(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }

    pub fn mark(&self, what: impl Into<String>) {
        self.order.lock().unwrap().push(what.into());
    }
}

/// Configurable payload: counts hook invocations, optionally fails or
/// vetoes, optionally sleeps inside `on_load`.
pub struct TestModule {
    name: String,
    probe: Arc<Probe>,
    fail_load: bool,
    fail_suspend: bool,
    fail_unload: bool,
    veto: Option<String>,
    load_delay: Option<Duration>,
}

impl TestModule {
    pub fn new(name: &str, probe: &Arc<Probe>) -> Self {
        Self {
            name: name.to_string(),
            probe: Arc::clone(probe),
            fail_load: false,
            fail_suspend: false,
            fail_unload: false,
            veto: None,
            load_delay: None,
        }
    }

    pub fn fail_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn fail_suspend(mut self) -> Self {
        self.fail_suspend = true;
        self
    }

    pub fn fail_unload(mut self) -> Self {
        self.fail_unload = true;
        self
    }

    pub fn veto(mut self, reason: &str) -> Self {
        self.veto = Some(reason.to_string());
        self
    }

    pub fn load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }
}

#[async_trait]
impl Module for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_load(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
        self.probe.mark(format!("{}:load:start", self.name));
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        self.probe.load_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.mark(format!("{}:load:end", self.name));
        if self.fail_load {
            return Err(HookError::failed("load refused"));
        }
        Ok(())
    }

    async fn on_suspend(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
        self.probe.mark(format!("{}:suspend:start", self.name));
        self.probe.suspend_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.mark(format!("{}:suspend:end", self.name));
        if self.fail_suspend {
            return Err(HookError::failed("flush failed"));
        }
        Ok(())
    }

    async fn on_resume(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
        self.probe.resume_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_unload(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
        self.probe.unload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_unload {
            return Err(HookError::failed("teardown failed"));
        }
        Ok(())
    }

    async fn on_should_unload(&self, _host: &Arc<ModuleHost>) -> UnloadDecision {
        match &self.veto {
            Some(reason) => UnloadDecision::reject(reason.clone()),
            None => UnloadDecision::approve(),
        }
    }
}
