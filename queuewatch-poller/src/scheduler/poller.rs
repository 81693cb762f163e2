//! Queue poller
//!
//! Drives one poll session: polls the status endpoint on a fixed interval,
//! feeds every result through the session's state machine and carries out
//! the effects it returns. Timer ticks, poll completions, the pending redirect
//! and user abandonment are all handled on this one task, so the session is
//! never touched concurrently.

use anyhow::{Result, bail};
use queuewatch_core::{Destination, Effect, Outcome, PollEvent, PollSession, RequestId, Status};
use reqwest::Url;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::repository::StatusRepository;
use crate::service::{Routes, Sinks};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The session finished and the user was sent to `url`
    Finished { outcome: Outcome, url: Url },
    /// The user left before the session navigated anywhere
    Abandoned,
}

/// Loop bookkeeping that lives outside the state machine
#[derive(Default)]
struct Driver {
    polling: bool,
    in_flight: bool,
    redirect: Option<(Instant, Destination)>,
    navigated: Option<Url>,
}

/// Queue poller that tracks a single job until it reaches a terminal state
pub struct QueuePoller {
    poll_interval: Duration,
    repository: Arc<dyn StatusRepository>,
    routes: Routes,
    sinks: Sinks,
}

impl QueuePoller {
    /// Creates a new queue poller
    pub fn new(
        config: &Config,
        repository: Arc<dyn StatusRepository>,
        routes: Routes,
        sinks: Sinks,
    ) -> Self {
        Self {
            poll_interval: config.poll_interval,
            repository,
            routes,
            sinks,
        }
    }

    /// Tracks `raw_request_id` until navigation or abandonment
    ///
    /// The first poll is issued immediately, later ones every poll interval.
    /// A tick that fires while a poll is still outstanding is skipped.
    /// `abandon` resolves when the user walks away.
    pub async fn run<A>(&self, raw_request_id: Option<&str>, abandon: A) -> Result<RunOutcome>
    where
        A: Future<Output = ()>,
    {
        let (mut session, effects) = PollSession::start(raw_request_id);

        match (session.request_id(), session.rejection()) {
            (Some(request_id), _) => info!(
                "Tracking request {} (interval: {:?})",
                request_id, self.poll_interval
            ),
            (None, Some(reason)) => warn!("Not polling: {}", reason),
            (None, None) => {}
        }

        let mut driver = Driver {
            polling: session.is_tracking(),
            ..Driver::default()
        };
        self.execute(&session, effects, &mut driver);

        let (tx, mut rx) = mpsc::channel::<PollEvent>(1);
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(abandon);

        loop {
            if let Some(url) = driver.navigated.take() {
                let Some(outcome) = session.outcome() else {
                    bail!("navigated to {} before the session finished", url);
                };
                info!("Session finished: {:?}", outcome);
                return Ok(RunOutcome::Finished { outcome, url });
            }

            let redirect_at = driver.redirect.as_ref().map(|(at, _)| *at);

            tokio::select! {
                biased;

                _ = &mut abandon => {
                    if let Some(request_id) = session.request_id().filter(|_| session.is_tracking()) {
                        info!("Abandoned while tracking request {}, sending cancellation", request_id);
                        self.sinks.beacon.send(request_id);
                    } else {
                        debug!("Abandoned with no request being tracked");
                    }
                    return Ok(RunOutcome::Abandoned);
                }

                Some(event) = rx.recv() => {
                    driver.in_flight = false;
                    let effects = session.apply(&event);
                    self.execute(&session, effects, &mut driver);
                }

                _ = sleep_until(redirect_at), if redirect_at.is_some() => {
                    if let Some((_, destination)) = driver.redirect.take() {
                        self.navigate(&destination, &mut driver);
                    }
                }

                _ = ticker.tick(), if driver.polling => {
                    if driver.in_flight {
                        debug!("Previous status poll still in flight, skipping tick");
                        continue;
                    }
                    if let Some(request_id) = session.request_id() {
                        driver.in_flight = true;
                        self.spawn_poll(request_id.clone(), tx.clone());
                    }
                }
            }
        }
    }

    /// Carries out the effects of one transition, in order
    fn execute(&self, session: &PollSession, effects: Vec<Effect>, driver: &mut Driver) {
        for effect in effects {
            match effect {
                Effect::StopPolling => {
                    driver.polling = false;
                    info!("Polling stopped: {:?}", session.outcome());
                }
                Effect::Render(view) => self.sinks.renderer.render(&view),
                Effect::SendHeartbeat(status) => {
                    if let Some(request_id) = session.request_id() {
                        self.spawn_heartbeat(request_id.clone(), status);
                    }
                }
                Effect::Navigate(destination) => self.navigate(&destination, driver),
                Effect::ScheduleRedirect { destination, after } => {
                    info!("Redirecting to {:?} in {:?}", destination, after);
                    driver.redirect = Some((Instant::now() + after, destination));
                }
            }
        }
    }

    fn navigate(&self, destination: &Destination, driver: &mut Driver) {
        let url = self.routes.url_for(destination);
        self.sinks.navigator.navigate(&url);
        driver.navigated = Some(url);
    }

    /// Spawns a task for one status request; its result comes back on `tx`
    fn spawn_poll(&self, request_id: RequestId, tx: mpsc::Sender<PollEvent>) {
        let repository = Arc::clone(&self.repository);

        tokio::spawn(async move {
            debug!("Polling status of request {}", request_id);

            let event = match repository.fetch_status(&request_id).await {
                Ok(snapshot) => {
                    debug!("Request {} is {}", request_id, snapshot.status);
                    PollEvent::Snapshot(snapshot)
                }
                Err(e) => {
                    error!("Status poll failed: {:#}", e);
                    PollEvent::TransportFailure(format!("{:#}", e))
                }
            };

            // A closed channel means the run already ended
            let _ = tx.send(event).await;
        });
    }

    /// Spawns a fire-and-forget heartbeat
    fn spawn_heartbeat(&self, request_id: RequestId, status: Status) {
        let repository = Arc::clone(&self.repository);

        tokio::spawn(async move {
            debug!("Sending heartbeat for request {} ({})", request_id, status);

            if let Err(e) = repository.send_heartbeat(&request_id).await {
                warn!("Failed to send heartbeat: {:#}", e);
            }
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{CancelBeacon, Navigator, Renderer};
    use crate::test_support::*;
    use queuewatch_core::StatusSnapshot;

    struct Harness {
        repository: Arc<ScriptedRepository>,
        renderer: Arc<RecordingRenderer>,
        navigator: Arc<RecordingNavigator>,
        beacon: Arc<RecordingBeacon>,
        poller: QueuePoller,
    }

    fn harness(repository: ScriptedRepository) -> Harness {
        let repository = Arc::new(repository);
        let renderer = Arc::new(RecordingRenderer::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let beacon = Arc::new(RecordingBeacon::default());

        let sinks = Sinks {
            renderer: renderer.clone() as Arc<dyn Renderer>,
            navigator: navigator.clone() as Arc<dyn Navigator>,
            beacon: beacon.clone() as Arc<dyn CancelBeacon>,
        };
        let routes = Routes::new("http://localhost:5000", "/", "/show_results").unwrap();
        let poller = QueuePoller::new(
            &Config::default(),
            repository.clone() as Arc<dyn StatusRepository>,
            routes,
            sinks,
        );

        Harness {
            repository,
            renderer,
            navigator,
            beacon,
            poller,
        }
    }

    fn never() -> std::future::Pending<()> {
        std::future::pending()
    }

    fn offsets(start: Instant, instants: &[Instant]) -> Vec<Duration> {
        instants.iter().map(|i| *i - start).collect()
    }

    fn home() -> Url {
        Url::parse("http://localhost:5000/").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_request_id_never_polls() {
        let h = harness(ScriptedRepository::new(Vec::new()));
        let start = Instant::now();

        let outcome = h.poller.run(None, never()).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Finished {
                outcome: Outcome::InvalidRequest,
                url: home(),
            }
        );
        assert!(h.repository.polls().is_empty());
        assert_eq!(
            h.renderer.last().status_text,
            "Invalid request ID. Redirecting to home..."
        );

        let visits = h.navigator.visits();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].1 - start, Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_completed_and_opens_results() {
        let h = harness(ScriptedRepository::new(vec![
            Ok(snapshot(Status::Pending)),
            Ok(snapshot(Status::Pending)),
            Ok(snapshot(Status::Processing)),
            Ok(completed_with_redirect()),
        ]));
        let start = Instant::now();

        let outcome = h.poller.run(Some("abc123"), never()).await.unwrap();

        let RunOutcome::Finished { outcome, url } = outcome else {
            panic!("expected a finished run");
        };
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/show_results?request_id=abc123&train_name=Intercity+Express&date=2025-06-01"
        );

        assert_eq!(
            offsets(start, &h.repository.polls()),
            vec![
                Duration::ZERO,
                Duration::from_millis(3000),
                Duration::from_millis(6000),
                Duration::from_millis(9000),
            ]
        );
        assert_eq!(h.navigator.visits()[0].1 - start, Duration::from_millis(9000));
        assert_eq!(h.renderer.last().progress, 100);
        assert!(h.beacon.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_once_per_active_status_change() {
        let h = harness(ScriptedRepository::new(vec![
            Ok(snapshot(Status::Pending)),
            Ok(snapshot(Status::Pending)),
            Ok(snapshot(Status::Processing)),
            Ok(snapshot(Status::Processing)),
            Ok(completed_with_redirect()),
        ]));

        h.poller.run(Some("abc123"), never()).await.unwrap();
        // Let detached heartbeat tasks finish
        time::sleep(Duration::from_millis(10)).await;

        let id: RequestId = "abc123".parse().unwrap();
        assert_eq!(h.repository.heartbeats(), vec![id.clone(), id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_failure_does_not_stop_polling() {
        let h = harness(
            ScriptedRepository::new(vec![
                Ok(snapshot(Status::Pending)),
                Ok(snapshot(Status::Processing)),
                Ok(completed_with_redirect()),
            ])
            .failing_signals(),
        );

        let outcome = h.poller.run(Some("abc123"), never()).await.unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Finished {
                outcome: Outcome::Completed,
                ..
            }
        ));
        assert_eq!(h.repository.polls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_stops_and_goes_home() {
        let h = harness(ScriptedRepository::new(vec![
            Ok(snapshot(Status::Pending)),
            Err("connection refused".to_string()),
        ]));
        let start = Instant::now();

        let outcome = h.poller.run(Some("abc123"), never()).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Finished {
                outcome: Outcome::TransportError,
                url: home(),
            }
        );
        assert_eq!(h.repository.polls().len(), 2);

        let view = h.renderer.last();
        assert_eq!(view.status_text, "Failed to connect to server. Please try again.");
        assert!(view.home_visible);
        assert!(!view.spinner_visible);

        // Failure observed at 3000 ms, home 3000 ms later
        assert_eq!(h.navigator.visits()[0].1 - start, Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_without_redirect_goes_home() {
        let h = harness(ScriptedRepository::new(vec![
            Ok(snapshot(Status::Processing)),
            Ok(snapshot(Status::Completed)),
        ]));
        let start = Instant::now();

        let outcome = h.poller.run(Some("abc123"), never()).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Finished {
                outcome: Outcome::CompletedWithoutRedirect,
                url: home(),
            }
        );
        assert!(h.renderer.last().status_text.contains("redirect data missing"));
        assert_eq!(h.navigator.visits().len(), 1);
        assert_eq!(h.navigator.visits()[0].1 - start, Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_render_with_position() {
        let h = harness(ScriptedRepository::new(vec![
            Ok(StatusSnapshot {
                position: Some(5),
                estimated_time_seconds: Some(30),
                ..snapshot(Status::Pending)
            }),
            Ok(snapshot(Status::Failed)),
        ]));

        h.poller.run(Some("abc123"), never()).await.unwrap();

        let views = h.renderer.views();
        // Initial "Checking status..." render, then the pending one
        let pending = &views[1];
        assert!(pending.status_text.contains("position 5"));
        assert!(pending.status_text.contains("30"));
        assert_eq!(pending.progress, 25);
        assert_eq!(pending.position_text, "Position: 5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_poll_skips_overlapping_ticks() {
        let h = harness(
            ScriptedRepository::new(vec![
                Ok(snapshot(Status::Pending)),
                Ok(snapshot(Status::Cancelled)),
            ])
            .with_status_delay(Duration::from_millis(5000)),
        );
        let start = Instant::now();

        let outcome = h.poller.run(Some("abc123"), never()).await.unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Finished {
                outcome: Outcome::Cancelled,
                ..
            }
        ));
        // Tick at 3000 ms is skipped while the first poll is outstanding
        assert_eq!(
            offsets(start, &h.repository.polls()),
            vec![Duration::ZERO, Duration::from_millis(6000)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandon_while_tracking_sends_one_beacon() {
        let h = harness(ScriptedRepository::new(Vec::new()));

        let outcome = h
            .poller
            .run(
                Some("abc123"),
                time::sleep(Duration::from_millis(4000)),
            )
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Abandoned);
        assert_eq!(h.beacon.sent(), vec!["abc123".parse::<RequestId>().unwrap()]);
        assert!(h.navigator.visits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandon_after_terminal_sends_no_beacon() {
        let h = harness(ScriptedRepository::new(vec![Ok(snapshot(Status::Failed))]));

        // Failure at 0 ms, redirect due at 3000 ms, user leaves at 1000 ms
        let outcome = h
            .poller
            .run(
                Some("abc123"),
                time::sleep(Duration::from_millis(1000)),
            )
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Abandoned);
        assert!(h.beacon.sent().is_empty());
        assert_eq!(h.repository.polls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandon_without_request_id_sends_no_beacon() {
        let h = harness(ScriptedRepository::new(Vec::new()));

        let outcome = h
            .poller
            .run(Some(""), time::sleep(Duration::from_millis(500)))
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Abandoned);
        assert!(h.beacon.sent().is_empty());
        assert!(h.repository.polls().is_empty());
    }
}
