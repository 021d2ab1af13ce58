//! Per-session lifecycle driver
//!
//! [`LifecycleDriver`] is the state machine that enacts an endpoint's
//! [`Scenario`] on one [`Session`]. It performs no I/O of its own: the
//! session provider feeds it [`SessionEvent`]s through [`handle`] and sleeps
//! until [`next_deadline`] to deliver timer expirations.
//!
//! # State machines
//!
//! ```text
//! ClientCloses             Pending → Open ───────────────────────────────→ Closed
//! ServerClosesImmediately  Pending → Closing ────────────────────────────→ Closed
//! ServerClosesDelayed      Pending → WaitingToSend → WaitingToClose → Closing → Closed
//! AcknowledgedEcho         Pending → Open (echo) ────────────────────────→ Closed
//! Passive                  Pending → Open ───────────────────────────────→ Closed
//! ```
//!
//! A `Closed` event from any state cancels every pending timer; nothing the
//! driver does afterwards reaches the transport.
//!
//! [`handle`]: LifecycleDriver::handle
//! [`next_deadline`]: LifecycleDriver::next_deadline

use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{MESSAGE_EVENT, SessionVariant};
use crate::echo::EchoGroup;
use crate::endpoint::{Endpoint, Phase};
use crate::error::SessionError;
use crate::scenario::Scenario;
use crate::session::{
    Acknowledgement, ScheduledAction, Session, SessionEvent, TimerHandle, Timers,
};

/// Scenario state of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, connect not yet handled
    Pending,
    /// Connected; the server will not act on its own
    Open,
    /// Delayed scenario: greeting timer running
    WaitingToSend,
    /// Delayed scenario: greeting sent, close timer running
    WaitingToClose,
    /// Close issued, waiting for the provider to confirm
    Closing,
    /// Connection gone
    Closed,
}

/// State machine running one endpoint's scenario on one session
#[derive(Debug)]
pub struct LifecycleDriver {
    endpoint: Arc<Endpoint>,
    session: Session,
    state: LifecycleState,
    timers: Timers,
    group: Option<Arc<EchoGroup>>,
}

impl LifecycleDriver {
    /// Bind a driver to a freshly accepted session
    ///
    /// `group` is the endpoint's echo group; it is only consulted by the
    /// acknowledged-echo scenario.
    pub fn new(endpoint: Arc<Endpoint>, session: Session, group: Option<Arc<EchoGroup>>) -> Self {
        Self {
            endpoint,
            session,
            state: LifecycleState::Pending,
            timers: Timers::new(),
            group,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.state == LifecycleState::Closed
    }

    /// Number of timers still pending
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest timer the provider must wake the driver for
    pub fn next_deadline(&self) -> Option<(TimerHandle, Instant)> {
        self.timers.next_due()
    }

    /// Process one event
    ///
    /// Errors never escape: stale actions are logged at debug level and
    /// transport failures at warn, both scoped to this session.
    pub fn handle(&mut self, event: SessionEvent, now: Instant) {
        let result = match event {
            SessionEvent::Connected => self.on_connect(now),
            SessionEvent::Message(payload) => {
                self.on_message(&payload);
                Ok(())
            }
            SessionEvent::NamedEvent { name, data, ack } => {
                self.on_named_event(&name, &data, ack);
                Ok(())
            }
            SessionEvent::TimerFired(handle) => self.on_timer(handle, now),
            SessionEvent::Closed => {
                self.on_close(now);
                Ok(())
            }
        };

        if let Err(e) = result {
            if e.is_stale() {
                debug!(endpoint = %self.endpoint.name(), "discarding stale action: {}", e);
            } else {
                warn!(endpoint = %self.endpoint.name(), "session command failed: {}", e);
            }
        }
    }

    fn on_connect(&mut self, now: Instant) -> Result<(), SessionError> {
        if self.state != LifecycleState::Pending {
            debug!(session = %self.session.id(), "duplicate connect ignored");
            return Ok(());
        }
        self.endpoint.log_phase(Phase::Open, self.session.id());
        let variant = self.endpoint.variant();

        match self.endpoint.scenario() {
            Scenario::ClientCloses { greeting } => {
                self.state = LifecycleState::Open;
                greet(&mut self.session, variant, greeting, now)
            }
            Scenario::ServerClosesImmediately { greeting } => {
                self.state = LifecycleState::Open;
                greet(&mut self.session, variant, greeting, now)?;
                self.state = LifecycleState::Closing;
                self.session.close(now)
            }
            Scenario::ServerClosesDelayed { send_after, .. } => {
                self.timers
                    .schedule(ScheduledAction::SendGreeting, now, *send_after);
                self.state = LifecycleState::WaitingToSend;
                Ok(())
            }
            Scenario::AcknowledgedEcho { .. } => {
                if let Some(group) = &self.group {
                    group.join(self.session.id(), self.session.transport());
                } else {
                    warn!(endpoint = %self.endpoint.name(), "echo endpoint has no group");
                }
                self.state = LifecycleState::Open;
                Ok(())
            }
            Scenario::Passive => {
                self.state = LifecycleState::Open;
                Ok(())
            }
        }
    }

    fn on_timer(&mut self, handle: TimerHandle, now: Instant) -> Result<(), SessionError> {
        let Some(action) = self.timers.fire(handle) else {
            return Err(SessionError::StaleAction {
                session_id: self.session.id().to_string(),
                action: "timer",
                status: self.session.status().as_str(),
            });
        };

        // Only the delayed scenario schedules timers.
        let variant = self.endpoint.variant();
        let Scenario::ServerClosesDelayed {
            greeting,
            close_after,
            ..
        } = self.endpoint.scenario()
        else {
            return Ok(());
        };

        match action {
            ScheduledAction::SendGreeting => {
                greet(&mut self.session, variant, greeting, now)?;
                self.state = LifecycleState::WaitingToClose;
                self.timers.schedule(ScheduledAction::Close, now, *close_after);
                Ok(())
            }
            ScheduledAction::Close => {
                self.state = LifecycleState::Closing;
                self.session.close(now)
            }
        }
    }

    fn on_message(&mut self, payload: &str) {
        debug!(
            endpoint = %self.endpoint.name(),
            session = %self.session.id(),
            "ignoring message: {}",
            payload
        );
    }

    fn on_named_event(&mut self, name: &str, data: &Value, ack: Option<Acknowledgement>) {
        if self.endpoint.variant() == SessionVariant::Enhanced {
            info!(
                endpoint = %self.endpoint.name(),
                session = %self.session.id(),
                "{} got message: {}",
                self.endpoint.name(),
                data
            );
        }

        let echo_event = match self.endpoint.scenario() {
            Scenario::AcknowledgedEcho { event } if event == name => Some(event),
            _ => None,
        };

        match (echo_event, &self.group) {
            (Some(event), Some(group)) if self.state == LifecycleState::Open => {
                group.broadcast_and_ack(event, data, ack);
            }
            _ => {
                debug!(
                    endpoint = %self.endpoint.name(),
                    session = %self.session.id(),
                    "ignoring event {}",
                    name
                );
                // Never leave a client waiting on an ack.
                if let Some(ack) = ack {
                    ack.complete();
                }
            }
        }
    }

    fn on_close(&mut self, now: Instant) {
        let cancelled = self.timers.cancel_all();
        if cancelled > 0 {
            debug!(
                session = %self.session.id(),
                cancelled, "cancelled pending timers on close"
            );
        }

        if let Some(group) = &self.group {
            group.leave(self.session.id());
        }

        if self.session.mark_closed(now) {
            debug!(
                session = %self.session.id(),
                "session lasted {:?}",
                self.session.elapsed(now)
            );
            self.endpoint.log_phase(Phase::Close, self.session.id());
        }
        self.state = LifecycleState::Closed;
    }
}

/// Deliver a scenario greeting in the session's own framing
///
/// Enhanced sessions have no bare message frame, so the greeting travels as
/// a [`MESSAGE_EVENT`] event.
fn greet(
    session: &mut Session,
    variant: SessionVariant,
    greeting: &str,
    now: Instant,
) -> Result<(), SessionError> {
    match variant {
        SessionVariant::Basic => session.send(greeting, now),
        SessionVariant::Enhanced => {
            session.emit(MESSAGE_EVENT, Value::String(greeting.to_string()), now)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::config::{FixtureConfig, ScenarioConfig};
    use crate::echo::EchoGroups;
    use crate::endpoint::EndpointRegistry;
    use crate::session::state::testing::RecordingTransport;
    use crate::session::{Mark, Outbound, SessionStatus};

    const D1: Duration = Duration::from_millis(1000);
    const D2: Duration = Duration::from_millis(1000);

    fn registry() -> EndpointRegistry {
        EndpointRegistry::from_config(&FixtureConfig::default()).unwrap()
    }

    fn driver_for(path: &str, id: &str, now: Instant) -> (LifecycleDriver, Arc<RecordingTransport>) {
        driver_with_group(&registry(), None, path, id, now)
    }

    fn driver_with_group(
        registry: &EndpointRegistry,
        groups: Option<&EchoGroups>,
        path: &str,
        id: &str,
        now: Instant,
    ) -> (LifecycleDriver, Arc<RecordingTransport>) {
        let endpoint = registry.route(path).unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let session = Session::new(id, endpoint.path(), transport.clone(), now);
        let group = groups.map(|g| g.group(endpoint.path()));
        (LifecycleDriver::new(endpoint, session, group), transport)
    }

    fn hello() -> Outbound {
        Outbound::Message("Hello!".to_string())
    }

    /// Deliver every timer due at or before `until`, like the provider loop
    fn run_until(driver: &mut LifecycleDriver, until: Instant) {
        while let Some((handle, due)) = driver.next_deadline() {
            if due > until {
                break;
            }
            driver.handle(SessionEvent::TimerFired(handle), due);
        }
    }

    fn marks(driver: &LifecycleDriver) -> Vec<(Mark, Duration)> {
        let start = driver.session().log()[0].at;
        driver
            .session()
            .log()
            .iter()
            .map(|e| (e.mark, e.at - start))
            .collect()
    }

    // ==================== ClientCloses ====================

    #[test]
    fn client_closes_greets_once_and_never_closes() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/client_close/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        driver.handle(SessionEvent::Message("anything".to_string()), t0);
        run_until(&mut driver, t0 + Duration::from_secs(60));

        assert_eq!(transport.frames(), vec![hello()]);
        assert_eq!(driver.state(), LifecycleState::Open);
        assert!(driver.session().is_open());
        assert!(driver.next_deadline().is_none());
    }

    #[test]
    fn client_closes_transitions_to_closed_on_remote_close() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/client_close/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        driver.handle(SessionEvent::Closed, t0 + Duration::from_millis(30));

        assert!(driver.is_closed());
        assert_eq!(driver.session().status(), SessionStatus::Closed);
        assert_eq!(transport.frames(), vec![hello()]);
    }

    // ==================== ServerClosesImmediately ====================

    #[test]
    fn server_closes_immediately_sends_then_closes() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/hello/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        assert_eq!(driver.state(), LifecycleState::Closing);
        assert_eq!(transport.frames(), vec![hello(), Outbound::Close]);

        driver.handle(SessionEvent::Closed, t0);
        assert!(driver.is_closed());
        assert_eq!(
            marks(&driver),
            vec![
                (Mark::Connected, Duration::ZERO),
                (Mark::Sent, Duration::ZERO),
                (Mark::CloseIssued, Duration::ZERO),
                (Mark::Closed, Duration::ZERO),
            ]
        );
    }

    // ==================== ServerClosesDelayed ====================

    #[test]
    fn delayed_sends_at_d1_and_closes_at_d1_plus_d2() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/hello_delay/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        assert_eq!(driver.state(), LifecycleState::WaitingToSend);

        run_until(&mut driver, t0 + D1 - Duration::from_millis(1));
        assert!(transport.frames().is_empty(), "no send before D1");

        run_until(&mut driver, t0 + D1);
        assert_eq!(transport.frames(), vec![hello()]);
        assert_eq!(driver.state(), LifecycleState::WaitingToClose);

        run_until(&mut driver, t0 + D1 + D2);
        assert_eq!(transport.frames(), vec![hello(), Outbound::Close]);
        assert_eq!(driver.state(), LifecycleState::Closing);

        driver.handle(SessionEvent::Closed, t0 + D1 + D2);
        assert_eq!(
            marks(&driver),
            vec![
                (Mark::Connected, Duration::ZERO),
                (Mark::Sent, D1),
                (Mark::CloseIssued, D1 + D2),
                (Mark::Closed, D1 + D2),
            ]
        );
    }

    #[test]
    fn delayed_remote_close_before_send_cancels_everything() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/hello_delay/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        let (pending, _) = driver.next_deadline().unwrap();

        driver.handle(SessionEvent::Closed, t0 + Duration::from_millis(500));
        assert_eq!(driver.pending_timers(), 0);

        // A wakeup that was already in flight fires late.
        driver.handle(SessionEvent::TimerFired(pending), t0 + D1);
        run_until(&mut driver, t0 + Duration::from_secs(10));

        assert!(transport.frames().is_empty());
        assert_eq!(
            marks(&driver),
            vec![
                (Mark::Connected, Duration::ZERO),
                (Mark::Closed, Duration::from_millis(500)),
            ]
        );
    }

    #[test]
    fn delayed_remote_close_between_send_and_close_suppresses_close() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/hello_delay/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        run_until(&mut driver, t0 + D1);
        let (close_timer, _) = driver.next_deadline().unwrap();

        driver.handle(SessionEvent::Closed, t0 + D1 + Duration::from_millis(100));
        driver.handle(SessionEvent::TimerFired(close_timer), t0 + D1 + D2);

        assert_eq!(transport.frames(), vec![hello()]);
        assert!(driver.is_closed());
    }

    #[test]
    fn delayed_with_zero_delays_still_orders_send_before_close() {
        let mut registry = EndpointRegistry::new();
        registry
            .register(
                "/zero/engine.io",
                &ScenarioConfig::ServerClosesDelayed {
                    greeting: Some("Hello!".to_string()),
                    send_delay_ms: Some(0),
                    close_delay_ms: Some(0),
                },
                SessionVariant::Basic,
            )
            .unwrap();
        let t0 = Instant::now();
        let (mut driver, transport) =
            driver_with_group(&registry, None, "/zero/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        run_until(&mut driver, t0);

        assert_eq!(transport.frames(), vec![hello(), Outbound::Close]);
    }

    // ==================== AcknowledgedEcho ====================

    fn counting_ack(calls: &Arc<AtomicUsize>) -> Option<Acknowledgement> {
        let counter = Arc::clone(calls);
        Some(Acknowledgement::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn msg(data: Value, ack: Option<Acknowledgement>) -> SessionEvent {
        SessionEvent::NamedEvent {
            name: "msg".to_string(),
            data,
            ack,
        }
    }

    #[test]
    fn echo_fans_out_to_all_members_including_sender() {
        let registry = registry();
        let groups = EchoGroups::new();
        let t0 = Instant::now();
        let mut sessions: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| {
                driver_with_group(&registry, Some(&groups), "/echo_ack/socket.io", id, t0)
            })
            .collect();
        for (driver, _) in &mut sessions {
            driver.handle(SessionEvent::Connected, t0);
        }

        let calls = Arc::new(AtomicUsize::new(0));
        sessions[1]
            .0
            .handle(msg(json!("ping"), counting_ack(&calls)), t0);

        let expected = Outbound::Event {
            name: "msg".to_string(),
            data: json!("ping"),
        };
        for (_, transport) in &sessions {
            assert_eq!(transport.frames(), vec![expected.clone()]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn echo_close_leaves_group_before_next_broadcast() {
        let registry = registry();
        let groups = EchoGroups::new();
        let t0 = Instant::now();
        let (mut a, a_transport) =
            driver_with_group(&registry, Some(&groups), "/echo_ack/socket.io", "a", t0);
        let (mut b, b_transport) =
            driver_with_group(&registry, Some(&groups), "/echo_ack/socket.io", "b", t0);
        a.handle(SessionEvent::Connected, t0);
        b.handle(SessionEvent::Connected, t0);

        b.handle(SessionEvent::Closed, t0);
        let group = groups.group("/echo_ack/socket.io");
        assert!(!group.contains("b"));

        a.handle(msg(json!(42), None), t0);
        assert_eq!(a_transport.frames().len(), 1);
        assert!(b_transport.frames().is_empty());
    }

    #[test]
    fn echo_ignores_other_event_names_but_still_acks() {
        let registry = registry();
        let groups = EchoGroups::new();
        let t0 = Instant::now();
        let (mut driver, transport) =
            driver_with_group(&registry, Some(&groups), "/echo_ack/socket.io", "a", t0);
        driver.handle(SessionEvent::Connected, t0);

        let calls = Arc::new(AtomicUsize::new(0));
        let ack = counting_ack(&calls);
        driver.handle(
            SessionEvent::NamedEvent {
                name: "other".to_string(),
                data: json!(1),
                ack,
            },
            t0,
        );

        assert!(transport.frames().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn echo_never_closes_on_its_own() {
        let registry = registry();
        let groups = EchoGroups::new();
        let t0 = Instant::now();
        let (mut driver, _transport) =
            driver_with_group(&registry, Some(&groups), "/echo_ack/socket.io", "a", t0);
        driver.handle(SessionEvent::Connected, t0);

        assert_eq!(driver.state(), LifecycleState::Open);
        assert!(driver.next_deadline().is_none());
        assert_eq!(groups.member_count(), 1);
    }

    // ==================== Lifecycle log lines ====================

    /// Collects formatted `tracing` output for one test
    #[derive(Clone, Default)]
    struct LogCapture(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogCapture {
        fn record(&self, f: impl FnOnce()) {
            let writer = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_writer(move || writer.clone())
                .with_ansi(false)
                .without_time()
                .with_max_level(tracing::Level::INFO)
                .finish();
            tracing::subscriber::with_default(subscriber, f);
        }

        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn line_of(lines: &[String], needle: &str) -> usize {
        lines
            .iter()
            .position(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("no line containing {needle:?} in {lines:#?}"))
    }

    #[test]
    fn basic_endpoint_logs_opened_then_closed() {
        let logs = LogCapture::default();
        logs.record(|| {
            let t0 = Instant::now();
            let (mut driver, _transport) = driver_for("/hello_delay/engine.io", "s1", t0);
            driver.handle(SessionEvent::Connected, t0);
            driver.handle(SessionEvent::Message("hi".to_string()), t0);
            run_until(&mut driver, t0 + D1 + D2);
            driver.handle(SessionEvent::Closed, t0 + D1 + D2);
        });

        let lines = logs.lines();
        assert!(line_of(&lines, "hello_delay opened") < line_of(&lines, "hello_delay closed"));
        assert!(lines.iter().all(|line| !line.contains("got message")));
        assert_eq!(lines.len(), 2, "{lines:#?}");
    }

    #[test]
    fn enhanced_endpoint_logs_connect_message_disconnect() {
        let logs = LogCapture::default();
        logs.record(|| {
            let registry = registry();
            let groups = EchoGroups::new();
            let t0 = Instant::now();
            let (mut driver, _transport) =
                driver_with_group(&registry, Some(&groups), "/echo_ack/socket.io", "a", t0);
            driver.handle(SessionEvent::Connected, t0);
            driver.handle(msg(json!("hi"), None), t0);
            driver.handle(SessionEvent::Closed, t0);
        });

        let lines = logs.lines();
        let connected = line_of(&lines, "echo_ack connected");
        let message = line_of(&lines, "echo_ack got message: \"hi\"");
        let disconnected = line_of(&lines, "echo_ack disconnected");
        assert!(connected < message && message < disconnected, "{lines:#?}");
    }

    // ==================== Passive & misc ====================

    #[test]
    fn passive_endpoint_takes_no_action() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        driver.handle(SessionEvent::Message("hi".to_string()), t0);
        driver.handle(SessionEvent::Closed, t0);

        assert!(transport.frames().is_empty());
        assert!(driver.is_closed());
    }

    #[test]
    fn duplicate_connect_does_not_resend() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/client_close/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        driver.handle(SessionEvent::Connected, t0);

        assert_eq!(transport.frames(), vec![hello()]);
    }

    #[test]
    fn repeated_close_is_harmless() {
        let t0 = Instant::now();
        let (mut driver, _transport) = driver_for("/hello/engine.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        driver.handle(SessionEvent::Closed, t0);
        driver.handle(SessionEvent::Closed, t0);

        let closes = driver
            .session()
            .log()
            .iter()
            .filter(|e| e.mark == Mark::Closed)
            .count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn enhanced_greeting_is_emitted_as_message_event() {
        let mut registry = EndpointRegistry::new();
        registry
            .register(
                "/hello/socket.io",
                &ScenarioConfig::ServerClosesImmediately {
                    greeting: Some("Hello!".to_string()),
                },
                SessionVariant::Enhanced,
            )
            .unwrap();
        let t0 = Instant::now();
        let (mut driver, transport) =
            driver_with_group(&registry, None, "/hello/socket.io", "s1", t0);

        driver.handle(SessionEvent::Connected, t0);
        driver.handle(SessionEvent::Closed, t0 + Duration::from_millis(5));

        assert_eq!(
            transport.frames(),
            vec![
                Outbound::Event {
                    name: "message".to_string(),
                    data: json!("Hello!"),
                },
                Outbound::Close,
            ]
        );
        assert_eq!(
            marks(&driver),
            vec![
                (Mark::Connected, Duration::ZERO),
                (Mark::Emitted, Duration::ZERO),
                (Mark::CloseIssued, Duration::ZERO),
                (Mark::Closed, Duration::from_millis(5)),
            ]
        );
        assert_eq!(
            driver.session().elapsed(t0 + Duration::from_millis(5)),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn transport_failure_is_contained() {
        let t0 = Instant::now();
        let (mut driver, transport) = driver_for("/hello/engine.io", "s1", t0);
        transport.fail.store(true, Ordering::SeqCst);

        driver.handle(SessionEvent::Connected, t0);
        driver.handle(SessionEvent::Closed, t0);

        assert!(driver.is_closed());
    }
}
