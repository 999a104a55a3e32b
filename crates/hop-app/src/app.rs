//! The async event loop.
//!
//! One task owns the [`Navigator`].  Fixes, user commands, and finished route
//! fetches arrive on channels and are applied one at a time, so navigation
//! state is never touched concurrently.  Route fetches run on spawned tasks
//! and never block position processing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use hop_camera::CameraSink;
use hop_core::StopId;
use hop_nav::RawFix;
use hop_route::{RouteRequest, RouteResponse, RouteResult, RoutingService};
use hop_store::KeyValueStore;

use crate::{AppError, AppResult, LocationSource, NavObserver, Navigator, PermissionState};

/// In-flight route fetches reported back to the loop.
const COMPLETION_CHANNEL_CAPACITY: usize = 8;

/// A user action delivered to [`run`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    SelectStop(StopId),
    ClearSelection,
    StartNavigation,
    StopNavigation,
    ToggleNavigation,
    Recenter,
    Overview,
    /// Leave the loop.
    Shutdown,
}

impl<S: CameraSink, K: KeyValueStore> Navigator<S, K> {
    /// Apply one command.  [`Command::Shutdown`] is a no-op here; the loop
    /// handles it.
    pub fn apply<O: NavObserver>(&mut self, command: Command, obs: &mut O) -> AppResult<()> {
        match command {
            Command::SelectStop(id) => self.select_stop(id.as_str(), obs)?,
            Command::ClearSelection => self.close(obs),
            Command::StartNavigation => {
                self.start_navigation(obs)?;
            }
            Command::StopNavigation => self.stop_navigation(obs),
            Command::ToggleNavigation => {
                self.toggle_navigation(obs)?;
            }
            Command::Recenter => {
                self.recenter();
            }
            Command::Overview => {
                self.overview();
            }
            Command::Shutdown => {}
        }
        Ok(())
    }
}

struct RouteCompletion {
    request: RouteRequest,
    outcome: RouteResult<RouteResponse>,
}

/// Drive `navigator` until shutdown.
///
/// Starts `source`; a permission refusal is reported to the observer and the
/// loop keeps serving commands without positions.  The loop ends on
/// [`Command::Shutdown`], when the fix stream ends, or when both the fix
/// stream and the command channel are gone.  Rejected commands are logged
/// and do not end the loop.
pub async fn run<S, K, L, O>(
    navigator:    &mut Navigator<S, K>,
    routing:      Arc<dyn RoutingService>,
    source:       &mut L,
    mut commands: mpsc::Receiver<Command>,
    observer:     &mut O,
) -> AppResult<()>
where
    S: CameraSink,
    K: KeyValueStore,
    L: LocationSource + ?Sized,
    O: NavObserver,
{
    let mut fixes = match source.start().await {
        Ok(rx) => {
            navigator.set_permission(PermissionState::Granted, observer);
            Some(rx)
        }
        Err(AppError::PermissionDenied) => {
            warn!("location permission denied; continuing without positions");
            navigator.set_permission(PermissionState::Denied, observer);
            None
        }
        Err(e) => return Err(e),
    };

    let (done_tx, mut done_rx) = mpsc::channel::<RouteCompletion>(COMPLETION_CHANNEL_CAPACITY);
    let mut commands_open = true;

    loop {
        if let Some(request) = navigator.take_route_request() {
            spawn_fetch(&routing, request, done_tx.clone());
        }
        if !commands_open && fixes.is_none() {
            debug!("no inputs left");
            break;
        }

        tokio::select! {
            biased;

            command = commands.recv(), if commands_open => match command {
                Some(Command::Shutdown) => {
                    info!("shutdown requested");
                    break;
                }
                Some(command) => {
                    if let Err(e) = navigator.apply(command, observer) {
                        warn!(error = %e, "command rejected");
                    }
                }
                None => commands_open = false,
            },

            Some(done) = done_rx.recv() => {
                navigator.complete_route(done.request, done.outcome, observer);
            }

            fix = next_fix(&mut fixes) => match fix {
                Some(fix) => {
                    navigator.on_fix(&fix, observer);
                }
                None => {
                    info!("location stream ended");
                    break;
                }
            },
        }
    }

    source.stop();
    Ok(())
}

fn spawn_fetch(
    routing: &Arc<dyn RoutingService>,
    request: RouteRequest,
    done:    mpsc::Sender<RouteCompletion>,
) {
    let routing = Arc::clone(routing);
    debug!(stop = %request.destination.id, "fetching route");
    tokio::spawn(async move {
        let outcome = routing
            .walking_route(request.origin, request.destination.position())
            .await;
        // The loop may already be gone.
        let _ = done.send(RouteCompletion { request, outcome }).await;
    });
}

/// Next fix, or pending forever when there is no source.
async fn next_fix(fixes: &mut Option<mpsc::Receiver<RawFix>>) -> Option<RawFix> {
    match fixes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
