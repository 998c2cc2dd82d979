//! Process-global bridge state.
//!
//! Every boundary call takes the [`BRIDGE`] lock for its whole duration.
//! The state is `None` before `init` and after `term`.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::{const_mutex, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::BridgeConfig;
use crate::dispatch::{self, Reply};
use crate::engine::Engine;
use crate::error::{JpcError, Result};
use crate::search::ScoringParams;

/// Engine plus the volatile scoring parameters of one process lifetime.
#[derive(Debug)]
pub struct Bridge {
    engine: Engine,
    scoring: ScoringParams,
}

impl Bridge {
    /// Build the bridge state from a configuration.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let scoring = ScoringParams::new(config.default_k1, config.default_b)?;
        Ok(Bridge {
            engine: Engine::new(config)?,
            scoring,
        })
    }

    /// Current scoring parameters.
    pub fn scoring(&self) -> ScoringParams {
        self.scoring
    }
}

static BRIDGE: Mutex<Option<Bridge>> = const_mutex(None);

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A host that already installed a global subscriber keeps it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Start a process lifetime.
pub fn init() -> Result<()> {
    let mut state = BRIDGE.lock();
    if state.is_some() {
        return Err(JpcError::lifecycle("init called while the bridge is live"));
    }

    let config = BridgeConfig::from_env()?;
    init_tracing(&config.log_filter);

    *state = Some(Bridge::new(config)?);
    info!("bridge initialized");
    Ok(())
}

/// End the process lifetime, dropping every session.
pub fn term(label: Option<&str>) -> Result<()> {
    let mut state = BRIDGE.lock();
    let Some(bridge) = state.take() else {
        return Err(JpcError::lifecycle("term called without a live bridge"));
    };
    info!(
        label = label.unwrap_or(""),
        sessions = bridge.engine.num_sessions(),
        "bridge terminated"
    );
    Ok(())
}

/// Replace the BM25 parameters used by every later search.
pub fn set_k_and_b(k1: f32, b: f32) -> Result<()> {
    let mut state = BRIDGE.lock();
    let bridge = state
        .as_mut()
        .ok_or_else(|| JpcError::lifecycle("set_k_and_b called without a live bridge"))?;
    bridge.scoring = ScoringParams::new(k1, b)?;
    info!(k1, b, "scoring parameters set");
    Ok(())
}

/// The live scoring parameters, if there is a bridge.
pub fn scoring() -> Option<ScoringParams> {
    BRIDGE.lock().as_ref().map(Bridge::scoring)
}

/// Whether `init` has run and `term` has not.
pub fn is_live() -> bool {
    BRIDGE.lock().is_some()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Run one request against the live bridge.
pub fn dispatch(bytes: &[u8]) -> Reply {
    let mut state = BRIDGE.lock();
    let Some(bridge) = state.as_mut() else {
        warn!("request before init");
        return Reply {
            id: String::new(),
            result: Err(JpcError::lifecycle("init has not been called")),
        };
    };

    let scoring = bridge.scoring;
    let engine = &mut bridge.engine;
    match catch_unwind(AssertUnwindSafe(|| {
        dispatch::dispatch(engine, &scoring, bytes)
    })) {
        Ok(reply) => reply,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(panic = message, "engine panicked");
            Reply {
                id: String::new(),
                result: Err(JpcError::bad_state(format!("engine panicked: {message}"))),
            }
        }
    }
}
