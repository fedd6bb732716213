//! The native offline engine contract.
//!
//! A [`NativeEngine`] is one offline rendering context: it owns native nodes,
//! connects them, and renders a fixed number of frames into an
//! [`AudioBuffer`]. The render coordinator only ever talks to the engine
//! through this trait, so the DSP backend is swappable (the reference engine
//! lives in `ondas-engine`; tests use stubs).
//!
//! All methods take `&self`. Engines are shared through `Rc` by a render
//! session and its in-flight futures, so they use interior mutability.

use std::fmt::Debug;

use futures::future::LocalBoxFuture;

use crate::buffer::AudioBuffer;
use crate::error::EngineError;

/// Completion future returned by engines that signal completion with a future.
pub type CompletionFuture = LocalBoxFuture<'static, Result<AudioBuffer, EngineError>>;

/// One-shot completion listener for engines that signal completion with an
/// event.
pub type CompletionListener = Box<dyn FnOnce(Result<AudioBuffer, EngineError>)>;

/// A native offline rendering engine.
pub trait NativeEngine: 'static {
    /// Handle to a native node owned by this engine.
    type Node: Clone + Debug + 'static;

    /// Name of this engine's behavior family.
    ///
    /// Capability probes are cached per flavor: two engines with the same
    /// flavor must answer every probe identically.
    fn flavor(&self) -> &'static str;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Number of frames the engine renders.
    fn length(&self) -> usize;

    /// Number of output channels.
    fn number_of_channels(&self) -> usize;

    /// The engine's destination node.
    fn destination(&self) -> Self::Node;

    /// Connects `output` of `source` to `input` of `destination`.
    fn connect(
        &self,
        source: &Self::Node,
        output: u32,
        destination: &Self::Node,
        input: u32,
    ) -> Result<(), EngineError>;

    /// Connects `output` of `source` to the named param of `destination`.
    fn connect_param(
        &self,
        source: &Self::Node,
        output: u32,
        destination: &Self::Node,
        param: &str,
    ) -> Result<(), EngineError>;

    /// Removes every outgoing connection of `source`.
    fn disconnect(&self, source: &Self::Node) -> Result<(), EngineError>;

    /// Returns true if anything feeds the destination node.
    fn has_active_output(&self) -> bool;

    /// Creates a source node that outputs silence for the whole render.
    fn create_silent_node(&self) -> Result<Self::Node, EngineError>;

    /// Registers a one-shot completion listener.
    ///
    /// Engines that complete through a future may ignore the listener.
    fn set_oncomplete(&self, listener: CompletionListener);

    /// Starts rendering.
    ///
    /// Returns `Some(future)` for engines that signal completion with a
    /// future, `None` for engines that only fire the completion listener.
    /// Rendering may be started at most once per engine.
    fn start_rendering(&self) -> Result<Option<CompletionFuture>, EngineError>;

    /// Creates a throwaway engine of the same flavor for capability probing.
    fn probe_instance(&self) -> Result<Self, EngineError>
    where
        Self: Sized;
}
