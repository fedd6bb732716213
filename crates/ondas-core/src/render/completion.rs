//! Render-completion adapter.
//!
//! Native engines report the end of an offline render in one of two ways:
//!
//! - **Future style**: [`start_rendering()`](NativeEngine::start_rendering)
//!   returns a completion future.
//! - **Event style**: `start_rendering()` returns `None` and the engine later
//!   fires the listener registered with
//!   [`set_oncomplete()`](NativeEngine::set_oncomplete).
//!
//! [`render_to_completion()`] hides the difference. Which style an engine
//! flavor uses is probed once through the [`CapabilityCache`] and never
//! re-decided.

use std::rc::Rc;

use futures::channel::oneshot;

use crate::buffer::AudioBuffer;
use crate::capability::{CapabilityCache, CapabilityKey, Probe};
use crate::error::{EngineError, RenderError};
use crate::native::NativeEngine;

/// Capability name for "start_rendering returns a completion future".
pub const FUTURE_COMPLETION: &str = "future-completion";

/// Starts `engine` and waits for its rendered buffer.
///
/// Event-style engines get a silent keep-alive source connected to their
/// destination when nothing else feeds it, since some never complete with an
/// unconnected graph. The keep-alive is disconnected once rendering is done.
pub async fn render_to_completion<E: NativeEngine>(
    engine: &Rc<E>,
    capabilities: &CapabilityCache,
) -> Result<AudioBuffer, RenderError> {
    if supports_future_completion(engine.as_ref(), capabilities).await {
        render_with_future(engine.as_ref()).await
    } else {
        render_with_event(engine.as_ref()).await
    }
}

/// Returns whether engines of `engine`'s flavor complete through a future.
///
/// The first call per flavor starts a throwaway probe instance; failures to
/// create or start it count as "no".
pub async fn supports_future_completion<E: NativeEngine>(
    engine: &E,
    capabilities: &CapabilityCache,
) -> bool {
    let key = CapabilityKey::new(FUTURE_COMPLETION, engine.flavor());
    capabilities
        .probe(key, || {
            let probe = engine.probe_instance()?;
            let completion = probe.start_rendering()?;
            Ok(Probe::Ready(completion.is_some()))
        })
        .resolve()
        .await
}

async fn render_with_future<E: NativeEngine>(engine: &E) -> Result<AudioBuffer, RenderError> {
    #[cfg(feature = "tracing")]
    tracing::debug!("render_complete: {} via future", engine.flavor());
    let completion = engine
        .start_rendering()
        .map_err(RenderError::Completion)?
        .ok_or_else(|| {
            RenderError::Completion(EngineError::invalid_state(
                "engine returned no completion future",
            ))
        })?;
    completion.await.map_err(RenderError::Completion)
}

async fn render_with_event<E: NativeEngine>(engine: &E) -> Result<AudioBuffer, RenderError> {
    #[cfg(feature = "tracing")]
    tracing::debug!("render_complete: {} via event", engine.flavor());

    let keepalive = if engine.has_active_output() {
        None
    } else {
        let silent = engine
            .create_silent_node()
            .map_err(RenderError::Completion)?;
        engine
            .connect(&silent, 0, &engine.destination(), 0)
            .map_err(RenderError::Completion)?;
        Some(silent)
    };

    let (tx, rx) = oneshot::channel();
    engine.set_oncomplete(Box::new(move |result| {
        let _ = tx.send(result);
    }));

    let result = match engine.start_rendering() {
        // Flavor reported event style but handed out a future anyway.
        Ok(Some(completion)) => completion.await,
        Ok(None) => rx.await.unwrap_or_else(|_| {
            Err(EngineError::invalid_state(
                "completion listener dropped before firing",
            ))
        }),
        Err(error) => Err(error),
    };

    if let Some(silent) = keepalive {
        if let Err(_error) = engine.disconnect(&silent) {
            #[cfg(feature = "tracing")]
            tracing::debug!("render_complete: keep-alive disconnect failed: {_error}");
        }
    }

    result.map_err(RenderError::Completion)
}
