//! Scripted engine and recording logger shared by use case tests.

use crate::ports::attempt_logger::{AttemptEvent, AttemptLogger};
use crate::ports::generation_engine::{EngineError, GenerationEngine, GenerationRequest};
use async_trait::async_trait;
use fncall_domain::{EngineKind, ToolParameter, ToolSchema, ToolSet};
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct Step {
    delay: Duration,
    outcome: Result<String, EngineError>,
}

impl Step {
    pub(crate) fn ok(text: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(text.to_string()),
        }
    }

    pub(crate) fn fail(error: EngineError) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(error),
        }
    }

    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct Route {
    needle: String,
    steps: Vec<Step>,
    next: AtomicUsize,
}

/// Engine that replays scripted steps in call order.
///
/// Routes pick a script by a substring of the last user turn; calls past
/// the end of a script repeat its last step.
pub(crate) struct ScriptedEngine {
    kind: EngineKind,
    default: Route,
    routes: Vec<Route>,
    requests: Mutex<Vec<GenerationRequest>>,
    started: AtomicUsize,
    finished: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedEngine {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            kind: EngineKind::OnDevice,
            default: Route {
                needle: String::new(),
                steps,
                next: AtomicUsize::new(0),
            },
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn cloud(steps: Vec<Step>) -> Self {
        Self {
            kind: EngineKind::Cloud,
            ..Self::new(steps)
        }
    }

    pub(crate) fn route(mut self, needle: &str, steps: Vec<Step>) -> Self {
        self.routes.push(Route {
            needle: needle.to_string(),
            steps,
            next: AtomicUsize::new(0),
        });
        self
    }

    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub(crate) fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_step(&self, request: &GenerationRequest) -> Step {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.is_user())
            .map(|m| m.content.as_str())
            .unwrap_or("");
        let route = self
            .routes
            .iter()
            .find(|r| last_user.contains(&r.needle))
            .unwrap_or(&self.default);
        let index = route.next.fetch_add(1, Ordering::SeqCst);
        route
            .steps
            .get(index)
            .or(route.steps.last())
            .cloned()
            .unwrap_or_else(|| Step::fail(EngineError::EmptyOutput))
    }
}

#[async_trait]
impl GenerationEngine for ScriptedEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, EngineError> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self.next_step(request);

        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Decrements even when the attempt is aborted mid-sleep
        struct InFlight<'a>(&'a AtomicUsize);
        impl Drop for InFlight<'_> {
            fn drop(&mut self) {
                self.0.fetch_sub(1, Ordering::SeqCst);
            }
        }
        let _guard = InFlight(&self.in_flight);

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        step.outcome
    }
}

/// Logger that keeps every event in memory.
#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<(&'static str, Value)>>,
}

impl RecordingLogger {
    pub(crate) fn events(&self) -> Vec<(&'static str, Value)> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn event_types(&self) -> Vec<&'static str> {
        self.events().into_iter().map(|(t, _)| t).collect()
    }
}

impl AttemptLogger for RecordingLogger {
    fn log(&self, event: AttemptEvent) {
        self.events.lock().unwrap().push((event.event_type, event.payload));
    }
}

pub(crate) fn weather_tools() -> ToolSet {
    ToolSet::new(vec![
        ToolSchema::new("get_weather", "Get current weather for a location")
            .with_parameter(ToolParameter::new("location", "string", true).with_description("City name"))
            .unwrap(),
    ])
    .unwrap()
}

pub(crate) fn assistant_tools() -> ToolSet {
    ToolSet::new(vec![
        ToolSchema::new("get_weather", "Get current weather for a location")
            .with_parameter(ToolParameter::new("location", "string", true).with_description("City name"))
            .unwrap(),
        ToolSchema::new("set_alarm", "Set an alarm for a given time")
            .with_parameter(ToolParameter::new("hour", "integer", true).with_description("Hour to set the alarm for"))
            .unwrap(),
        ToolSchema::new("send_message", "Send a message to a contact")
            .with_parameter(ToolParameter::new("recipient", "string", true).with_description("Name of the person"))
            .unwrap(),
    ])
    .unwrap()
}
