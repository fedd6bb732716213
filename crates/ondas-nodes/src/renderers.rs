//! Renderers that turn catalog proxy nodes into native nodes.
//!
//! Every catalog node gets a [`CatalogRenderer`] holding its options; the
//! graph's destination gets a [`DestinationRenderer`].
//!
//! Constant sources depend on an optional engine feature. When the engine's
//! flavor cannot create one natively, the renderer emulates it with a looping
//! one-sample buffer source feeding a gain node, and routes connections to
//! the `offset` param onto that gain node's `gain` param.

use std::rc::Rc;

use futures::FutureExt;
use ondas_core::{
    AudioBuffer, CapabilityCache, CapabilityKey, EngineError, NativeEngine, NodeRenderer, Probe,
    ProbeResult, RenderRequest, Rendered, Target, WiringRecord,
};

use crate::factory::NodeFactory;
use crate::options::{BufferSourceOptions, ConstantSourceOptions, GainOptions, NodeOptions};

/// Capability name for native constant source support.
pub const CONSTANT_SOURCE: &str = "constant-source";

/// Probes (once per engine flavor) whether `engine` creates constant sources
/// natively.
pub fn constant_source_support<E: NodeFactory>(
    engine: &E,
    capabilities: &CapabilityCache,
) -> ProbeResult {
    let key = CapabilityKey::new(CONSTANT_SOURCE, engine.flavor());
    capabilities.probe(key, || {
        let probe = engine.probe_instance()?;
        let created = probe.create_constant_source(&ConstantSourceOptions::default());
        Ok(Probe::Ready(created.is_ok()))
    })
}

/// Renders the engine's own destination node.
#[derive(Debug, Default, Clone, Copy)]
pub struct DestinationRenderer;

impl<E: NativeEngine> NodeRenderer<E> for DestinationRenderer {
    fn render(&self, request: RenderRequest<'_, E>) -> Result<Rendered<E::Node>, EngineError> {
        Ok(Rendered::Ready(request.engine.destination()))
    }
}

/// Renders one catalog node from its options.
#[derive(Debug, Clone)]
pub struct CatalogRenderer {
    options: NodeOptions,
}

impl CatalogRenderer {
    /// Creates a renderer for already validated options.
    pub fn new(options: NodeOptions) -> Self {
        Self { options }
    }

    /// The options this renderer builds from.
    pub fn options(&self) -> &NodeOptions {
        &self.options
    }
}

impl<E: NodeFactory> NodeRenderer<E> for CatalogRenderer {
    fn render(&self, request: RenderRequest<'_, E>) -> Result<Rendered<E::Node>, EngineError> {
        let engine = request.engine.as_ref();
        let native = match &self.options {
            NodeOptions::Gain(o) => engine.create_gain(o)?,
            NodeOptions::Oscillator(o) => engine.create_oscillator(o)?,
            NodeOptions::BufferSource(o) => engine.create_buffer_source(o)?,
            NodeOptions::Delay(o) => engine.create_delay(o)?,
            NodeOptions::BiquadFilter(o) => engine.create_biquad_filter(o)?,
            NodeOptions::WaveShaper(o) => engine.create_wave_shaper(o)?,
            NodeOptions::StereoPanner(o) => engine.create_stereo_panner(o)?,
            NodeOptions::ConstantSource(o) => {
                let support = constant_source_support(engine, request.capabilities);
                return match support.now() {
                    Some(native) => create_constant_source(engine, o, native).map(Rendered::Ready),
                    None => {
                        let engine = Rc::clone(request.engine);
                        let options = *o;
                        Ok(Rendered::Pending(
                            async move {
                                let native = support.resolve().await;
                                create_constant_source(engine.as_ref(), &options, native)
                            }
                            .boxed_local(),
                        ))
                    }
                };
            }
        };
        Ok(Rendered::Ready(native))
    }

    fn wire(
        &self,
        engine: &E,
        capabilities: &CapabilityCache,
        upstream: &E::Node,
        record: &WiringRecord,
        native: &E::Node,
    ) -> Result<(), EngineError> {
        match record.target {
            Target::Input { input, .. } => engine.connect(upstream, record.output, native, input),
            Target::Param { param, .. } => {
                let emulated = matches!(self.options, NodeOptions::ConstantSource(_))
                    && param == "offset"
                    && capabilities.get(CapabilityKey::new(CONSTANT_SOURCE, engine.flavor()))
                        == Some(false);
                let param = if emulated { "gain" } else { param };
                engine.connect_param(upstream, record.output, native, param)
            }
        }
    }
}

fn create_constant_source<E: NodeFactory>(
    engine: &E,
    options: &ConstantSourceOptions,
    native: bool,
) -> Result<E::Node, EngineError> {
    if native {
        return engine.create_constant_source(options);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "constant_source: emulating with buffer source + gain on {}",
        engine.flavor()
    );
    let unit = AudioBuffer::from_channels(vec![vec![1.0]], engine.sample_rate());
    let source = engine.create_buffer_source(&BufferSourceOptions {
        looping: true,
        timing: options.timing,
        ..BufferSourceOptions::with_buffer(unit)
    })?;
    let gain = engine.create_gain(&GainOptions {
        gain: options.offset,
    })?;
    engine.connect(&source, 0, &gain, 0)?;
    Ok(gain)
}
