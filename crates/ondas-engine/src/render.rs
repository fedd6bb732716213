//! Quantum-by-quantum execution of a compiled schedule.

use ondas_core::AudioBuffer;

use crate::bus::{Bus, QUANTUM};
use crate::network::{NativeNode, Network};
use crate::options::EngineOptions;
use crate::processor::Quantum;
use crate::schedule::{CompiledSchedule, Feeds, RenderStep, compile};

/// Renders `options.length` frames of `network` into a buffer with
/// `options.channels` channels.
pub(crate) fn render_network(network: &mut Network, options: &EngineOptions) -> AudioBuffer {
    let schedule = compile(network);
    for &node in &schedule.cycle_delays {
        if let Some(delay) = network.nodes[node].processor.as_delay_mut() {
            delay.clamp_below(QUANTUM as f32);
        }
    }

    let mut outputs = vec![Bus::default(); network.nodes.len()];
    let mut input = Bus::default();
    let mut params: Vec<[f32; QUANTUM]> = Vec::new();
    let mut rendered = AudioBuffer::new(options.channels, options.length, options.sample_rate);

    for start in (0..options.length).step_by(QUANTUM) {
        let quantum = Quantum {
            sample_rate: options.sample_rate,
            start,
        };
        run_quantum(network, &schedule, &quantum, &mut outputs, &mut input, &mut params);

        let frames = QUANTUM.min(options.length - start);
        let destination = &outputs[Network::DESTINATION];
        for channel in 0..options.channels {
            rendered.channel_mut(channel)[start..start + frames]
                .copy_from_slice(&destination.channel(channel)[..frames]);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "engine_render: {} frames, {} steps per quantum, peak {:.3}",
        options.length,
        schedule.steps.len(),
        rendered.peak()
    );
    rendered
}

fn run_quantum(
    network: &mut Network,
    schedule: &CompiledSchedule,
    quantum: &Quantum,
    outputs: &mut [Bus],
    input: &mut Bus,
    params: &mut Vec<[f32; QUANTUM]>,
) {
    for step in &schedule.steps {
        match *step {
            RenderStep::Process(node) => {
                let feeds = &schedule.feeds[node];
                let native = &mut network.nodes[node];
                gather_input(native, feeds, outputs, input);
                gather_params(native, feeds, outputs, params);
                let mut output = std::mem::take(&mut outputs[node]);
                native.processor.process(quantum, input, params, &mut output);
                outputs[node] = output;
            }
            RenderStep::Mute(node) => outputs[node].reset(1),
            RenderStep::EmitDelay(node) => {
                let feeds = &schedule.feeds[node];
                let native = &mut network.nodes[node];
                gather_params(native, feeds, outputs, params);
                if let Some(delay) = native.processor.as_delay_mut() {
                    delay.emit(quantum, params, &mut outputs[node]);
                }
            }
            RenderStep::AbsorbDelay(node) => {
                let feeds = &schedule.feeds[node];
                let native = &mut network.nodes[node];
                gather_input(native, feeds, outputs, input);
                if let Some(delay) = native.processor.as_delay_mut() {
                    delay.absorb(input);
                }
            }
        }
    }
}

/// Mixes every connected output into `input`, sized for the node.
fn gather_input(node: &NativeNode, feeds: &Feeds, outputs: &[Bus], input: &mut Bus) {
    let widest = feeds
        .inputs
        .iter()
        .map(|&source| outputs[source].channel_count())
        .max()
        .unwrap_or(1);
    input.reset(node.processor.input_channels(widest));
    for &source in &feeds.inputs {
        input.mix_from(&outputs[source]);
    }
}

/// Computes each param's per-frame value: base value plus the mono sum of
/// its connected outputs, clamped to the param's range.
fn gather_params(
    node: &NativeNode,
    feeds: &Feeds,
    outputs: &[Bus],
    params: &mut Vec<[f32; QUANTUM]>,
) {
    params.clear();
    for (index, param) in node.params.iter().enumerate() {
        let mut values = [param.value; QUANTUM];
        for &(_, source) in feeds.params.iter().filter(|(p, _)| *p == index) {
            outputs[source].add_mono_into(&mut values);
        }
        for value in &mut values {
            *value = value.clamp(param.min, param.max);
        }
        params.push(values);
    }
}
