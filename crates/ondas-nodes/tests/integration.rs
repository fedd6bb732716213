//! Integration tests for graph construction, disconnect policies and
//! catalog rendering.

mod common;

use std::rc::Rc;

use common::Recorder;
use futures::executor::block_on;
use ondas_core::{CapabilityCache, CapabilityKey, RenderSession};
use ondas_nodes::{
    AudioGraph, CONSTANT_SOURCE, ConstantSourceOptions, DelayOptions, GainOptions, NodeError,
    NodeKind, NodeOptions, OscillatorOptions, Waveform,
};

fn render(graph: &AudioGraph<Recorder>, engine: Recorder, cache: &CapabilityCache) -> Rc<Recorder> {
    let engine = Rc::new(engine);
    let session = RenderSession::new(Rc::clone(graph.proxy()), Rc::clone(&engine), cache.clone());
    block_on(session.render(graph.destination())).unwrap();
    engine
}

#[test]
fn add_validates_options() {
    let mut graph = AudioGraph::<Recorder>::new();
    let err = graph
        .delay(DelayOptions {
            delay_time: 5.0,
            max_delay_time: 1.0,
        })
        .unwrap_err();
    assert!(matches!(err, NodeError::InvalidOptions { kind: "delay", .. }));
    assert_eq!(graph.node_count(), 1);

    let osc = graph.oscillator(OscillatorOptions::default()).unwrap();
    assert_eq!(graph.kind(osc), Some(NodeKind::Oscillator));
    assert_eq!(graph.kind(graph.destination()), Some(NodeKind::Destination));
}

#[test]
fn connect_checks_endpoints() {
    let mut graph = AudioGraph::<Recorder>::new();
    let osc = graph.oscillator(OscillatorOptions::default()).unwrap();
    let amp = graph.gain(GainOptions::default()).unwrap();

    assert_eq!(
        graph.connect(amp, osc),
        Err(NodeError::IndexSize { index: 0, count: 0 })
    );
    assert_eq!(
        graph.connect_output(osc, 1, amp, 0),
        Err(NodeError::IndexSize { index: 1, count: 1 })
    );
    assert!(matches!(
        graph.connect_param(osc, 0, amp, "frequency"),
        Err(NodeError::InvalidAccess(_))
    ));
    graph.connect_param(osc, 0, amp, "gain").unwrap();
    assert_eq!(graph.connection_count(), 1);
}

#[test]
fn disconnect_all_never_fails_for_known_nodes() {
    let mut graph = AudioGraph::<Recorder>::new();
    let osc = graph.oscillator(OscillatorOptions::default()).unwrap();
    assert_eq!(graph.disconnect(osc), Ok(0));

    let amp = graph.gain(GainOptions::default()).unwrap();
    graph.connect(osc, amp).unwrap();
    graph.connect_param(osc, 0, amp, "gain").unwrap();
    assert_eq!(graph.disconnect(osc), Ok(2));
    assert_eq!(graph.connection_count(), 0);
}

#[test]
fn disconnect_output_checks_range() {
    let mut graph = AudioGraph::<Recorder>::new();
    let osc = graph.oscillator(OscillatorOptions::default()).unwrap();
    let dest = graph.destination();
    graph.connect(osc, dest).unwrap();

    assert_eq!(
        graph.disconnect_output(osc, 3),
        Err(NodeError::IndexSize { index: 3, count: 1 })
    );
    assert_eq!(graph.disconnect_output(osc, 0), Ok(1));
}

#[test]
fn disconnect_from_destination_node_only() {
    let mut graph = AudioGraph::<Recorder>::new();
    let osc = graph.oscillator(OscillatorOptions::default()).unwrap();
    let a = graph.gain(GainOptions::default()).unwrap();
    let b = graph.gain(GainOptions::default()).unwrap();
    graph.connect(osc, a).unwrap();
    graph.connect(osc, a).unwrap();
    graph.connect(osc, b).unwrap();
    graph.connect_param(osc, 0, a, "gain").unwrap();

    assert_eq!(graph.disconnect_from(osc, a), Ok(2));
    // The param connection to `a` and the input connection to `b` remain.
    assert_eq!(graph.connection_count(), 2);
    assert!(matches!(
        graph.disconnect_from(osc, a),
        Err(NodeError::InvalidAccess(_))
    ));

    assert_eq!(graph.disconnect_param(osc, a, "gain"), Ok(1));
    assert!(matches!(
        graph.disconnect_param(osc, a, "gain"),
        Err(NodeError::InvalidAccess(_))
    ));
    assert_eq!(graph.connection_count(), 1);
}

#[test]
fn disconnect_exact_matches_output_and_input() {
    let mut graph = AudioGraph::<Recorder>::new();
    let osc = graph.oscillator(OscillatorOptions::default()).unwrap();
    let amp = graph.gain(GainOptions::default()).unwrap();
    graph.connect(osc, amp).unwrap();

    assert_eq!(
        graph.disconnect_exact(osc, 0, amp, 2),
        Err(NodeError::IndexSize { index: 2, count: 1 })
    );
    assert_eq!(graph.disconnect_exact(osc, 0, amp, 0), Ok(1));
    assert!(matches!(
        graph.disconnect_exact(osc, 0, amp, 0),
        Err(NodeError::InvalidAccess(_))
    ));
}

#[test]
fn renders_catalog_nodes_in_dependency_order() {
    let mut graph = AudioGraph::<Recorder>::new();
    let osc = graph
        .oscillator(OscillatorOptions {
            waveform: Waveform::Square,
            ..Default::default()
        })
        .unwrap();
    let lfo = graph.oscillator(OscillatorOptions::default()).unwrap();
    let amp = graph.gain(GainOptions { gain: 0.5 }).unwrap();
    graph.connect(osc, amp).unwrap();
    graph.connect_param(lfo, 0, amp, "gain").unwrap();
    let dest = graph.destination();
    graph.connect(amp, dest).unwrap();

    let engine = render(&graph, Recorder::new("full", true), &CapabilityCache::new());
    assert_eq!(engine.nodes(), vec!["oscillator", "oscillator", "gain"]);
    assert_eq!(
        engine.connections(),
        vec![
            "oscillator#1 -> gain#3[0]",
            "oscillator#2 -> gain#3.gain",
            "gain#3 -> destination#0[0]",
        ]
    );
}

#[test]
fn constant_source_is_native_when_supported() {
    let mut graph = AudioGraph::<Recorder>::new();
    let lfo = graph.oscillator(OscillatorOptions::default()).unwrap();
    let offset = graph.constant_source(ConstantSourceOptions::default()).unwrap();
    graph.connect_param(lfo, 0, offset, "offset").unwrap();
    let dest = graph.destination();
    graph.connect(offset, dest).unwrap();

    let cache = CapabilityCache::new();
    let engine = render(&graph, Recorder::new("full", true), &cache);
    assert_eq!(engine.nodes(), vec!["oscillator", "constant-source"]);
    assert!(engine
        .connections()
        .contains(&"oscillator#1 -> constant-source#2.offset".to_string()));
    assert_eq!(cache.get(CapabilityKey::new(CONSTANT_SOURCE, "full")), Some(true));
}

#[test]
fn constant_source_is_emulated_when_unsupported() {
    let mut graph = AudioGraph::<Recorder>::new();
    let lfo = graph.oscillator(OscillatorOptions::default()).unwrap();
    let offset = graph
        .constant_source(ConstantSourceOptions {
            offset: 0.25,
            ..Default::default()
        })
        .unwrap();
    graph.connect_param(lfo, 0, offset, "offset").unwrap();
    let dest = graph.destination();
    graph.connect(offset, dest).unwrap();

    let cache = CapabilityCache::new();
    let engine = render(&graph, Recorder::new("legacy", false), &cache);
    assert_eq!(engine.nodes(), vec!["oscillator", "buffer-source", "gain"]);
    assert_eq!(
        engine.connections(),
        vec![
            "buffer-source#2 -> gain#3[0]",
            "oscillator#1 -> gain#3.gain",
            "gain#3 -> destination#0[0]",
        ]
    );
    let sources = engine.buffer_sources();
    let unit = &sources[0];
    assert!(unit.looping);
    assert_eq!(unit.buffer.as_ref().map(|b| b.length()), Some(1));
    assert_eq!(cache.get(CapabilityKey::new(CONSTANT_SOURCE, "legacy")), Some(false));
}

#[test]
fn edits_show_up_in_next_render() {
    let mut graph = AudioGraph::<Recorder>::new();
    let osc = graph.oscillator(OscillatorOptions::default()).unwrap();
    let dest = graph.destination();
    graph.connect(osc, dest).unwrap();

    let cache = CapabilityCache::new();
    let first = render(&graph, Recorder::new("full", true), &cache);
    assert_eq!(first.nodes(), vec!["oscillator"]);

    graph.disconnect(osc).unwrap();
    let second = render(&graph, Recorder::new("full", true), &cache);
    assert!(second.nodes().is_empty());
    assert!(second.connections().is_empty());
}

#[test]
fn render_returns_buffer() {
    let mut graph = AudioGraph::<Recorder>::new();
    let osc = graph.oscillator(OscillatorOptions::default()).unwrap();
    let dest = graph.destination();
    graph.connect(osc, dest).unwrap();

    let buffer = block_on(graph.render_with(Recorder::new("full", true), &CapabilityCache::new())).unwrap();
    assert_eq!(buffer.length(), 128);
}

#[test]
fn options_parse_from_toml() {
    let options: NodeOptions = toml::from_str(
        r#"
        type = "oscillator"
        waveform = "square"
        frequency = 220.0
        start = 0.5
        "#,
    )
    .unwrap();
    let NodeOptions::Oscillator(osc) = options else {
        panic!("expected oscillator options");
    };
    assert_eq!(osc.waveform, Waveform::Square);
    assert_eq!(osc.frequency, 220.0);
    assert_eq!(osc.detune, 0.0);
    assert_eq!(osc.timing.start, 0.5);
    assert_eq!(osc.timing.stop, None);
}

#[test]
fn options_parse_from_json() {
    let options: NodeOptions =
        serde_json::from_str(r#"{"type": "biquad-filter", "filter": "highpass", "frequency": 1200}"#)
            .unwrap();
    assert_eq!(options.kind(), NodeKind::BiquadFilter);
    assert!(options.validate().is_ok());

    let bad: Result<NodeOptions, _> = serde_json::from_str(r#"{"type": "reverb"}"#);
    assert!(bad.is_err());
}
