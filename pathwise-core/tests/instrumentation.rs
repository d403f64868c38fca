//! Tracing emitted by the core operations.

use pathwise_core::{
    EquivalenceClass, GeneratorConfig, GraphGenerator, GraphRequest, floyd_warshall,
};
use pathwise_test_support::tracing::RecordingLayer;
use tracing::Level;
use tracing_subscriber::{Registry, layer::SubscriberExt};

fn recorded<T>(body: impl FnOnce() -> T) -> (RecordingLayer, T) {
    let layer = RecordingLayer::default();
    let subscriber = Registry::default().with(layer.clone());
    let value = tracing::subscriber::with_default(subscriber, body);
    (layer, value)
}

#[test]
fn generation_records_resolved_class_and_edge_count() {
    let (layer, generated) = recorded(|| {
        GraphGenerator::new(GeneratorConfig::new(12))
            .generate(EquivalenceClass::Mixed, GraphRequest::new(9))
            .expect("generation succeeds")
    });
    let span = layer.span("core.generate").expect("generate span closed");
    assert_eq!(span.field("nodes"), Some("9"));
    assert_eq!(span.field("resolved"), Some(generated.class.as_str()));
    let edges = generated.graph.edge_count().to_string();
    assert_eq!(span.field("edges"), Some(edges.as_str()));
}

#[test]
fn failed_generation_logs_an_error_event() {
    let (layer, result) = recorded(|| {
        GraphGenerator::new(GeneratorConfig::new(1))
            .generate(EquivalenceClass::NonNegative, GraphRequest::new(0))
    });
    assert!(result.is_err());
    assert!(
        layer
            .events_at(Level::ERROR)
            .iter()
            .any(|event| event.field("error").is_some_and(|text| text.contains("at least 1")))
    );
}

#[test]
fn oracle_span_counts_improvements() {
    let graph = pathwise_core::Graph::directed(3, [(0, 1, 1.0), (1, 2, 1.0)])
        .expect("graph must build");
    let (layer, matrix) = recorded(|| floyd_warshall(&graph).expect("weights present"));
    assert_eq!(matrix.get(0, 2), Some(2.0));
    let span = layer.span("core.oracle").expect("oracle span closed");
    assert_eq!(span.field("improvements"), Some("1"));
}
