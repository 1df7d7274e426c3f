use graphpipe::{GraphElement, Pipeline, PipelineError, PipelineOptions, Vertex};
use graphpipe_core::{ElementStream, GraphQuery, GraphStorage, StorageError, StorageErrorKind};
use graphpipe_storage_mock::MockGraph;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn modern() -> MockGraph {
    MockGraph::modern()
}

fn ids<G: GraphElement>(elements: &[G]) -> Vec<u64> {
    elements.iter().map(|element| element.id().as_u64()).collect()
}

fn name(vertex: &Vertex) -> String {
    vertex.property("name").and_then(|value| value.as_str()).unwrap_or_default().to_owned()
}

#[rstest]
fn three_vertices_in_storage_order() {
    let storage = MockGraph::new(
        vec![Vertex::new(1_u64, "v"), Vertex::new(2_u64, "v"), Vertex::new(3_u64, "v")],
        Vec::new(),
    );
    let mut pipeline = Pipeline::bound(Arc::new(storage)).vertices().unwrap();
    for expected in 1..=3 {
        assert_eq!(pipeline.next().unwrap().id().as_u64(), expected);
    }
    assert!(matches!(pipeline.next(), Err(PipelineError::Exhausted)));
}

#[rstest]
fn building_does_not_fetch(modern: MockGraph) {
    let stats = modern.stats();
    let mut pipeline = Pipeline::bound(Arc::new(modern)).vertices().and_then(|p| p.map(name)).unwrap();
    assert_eq!(stats.fetches(), 0);
    assert_eq!(pipeline.next().unwrap(), "marko");
    assert_eq!(stats.fetches(), 1);
    assert_eq!(stats.pulled(), 1);
}

#[rstest]
fn filter_and_map_over_modern_graph(modern: MockGraph) {
    let names = Pipeline::bound(Arc::new(modern))
        .vertices()
        .and_then(|p| p.filter(|v| v.property("age").and_then(|age| age.as_i64()).is_some_and(|age| age > 30)))
        .and_then(|p| p.map(name))
        .and_then(Pipeline::to_list)
        .unwrap();
    assert_eq!(names, ["josh", "peter"]);
}

#[rstest]
fn edges_stream_in_storage_order(modern: MockGraph) {
    let labels = Pipeline::bound(Arc::new(modern))
        .edges()
        .and_then(|p| p.map(|edge| edge.label().to_owned()))
        .and_then(Pipeline::to_list)
        .unwrap();
    assert_eq!(labels, ["knows", "knows", "created", "created", "created", "created"]);
}

#[rstest]
#[case(vec![4, 1], vec![1, 4])]
#[case(vec![6, 6, 2], vec![2, 6])]
#[case(vec![42], vec![])]
#[case(vec![], vec![])]
fn vertices_by_id_in_storage_order(modern: MockGraph, #[case] requested: Vec<u64>, #[case] expected: Vec<u64>) {
    let found = Pipeline::bound(Arc::new(modern)).vertices_by_id(requested).and_then(Pipeline::to_list).unwrap();
    assert_eq!(ids(&found), expected);
}

#[rstest]
fn edges_by_id_returns_requested_edges(modern: MockGraph) {
    let found = Pipeline::bound(Arc::new(modern)).edges_by_id([12_u64, 8]).and_then(Pipeline::to_list).unwrap();
    assert_eq!(ids(&found), [8, 12]);
    assert_eq!(found[0].out_vertex().as_u64(), 1);
    assert_eq!(found[0].in_vertex().as_u64(), 4);
}

#[rstest]
fn custom_query_source(modern: MockGraph) {
    let query = GraphQuery::new().has("lang", "java").limit(1);
    let found = Pipeline::bound(Arc::new(modern)).source::<Vertex>(query).and_then(Pipeline::to_list).unwrap();
    assert_eq!(ids(&found), [3]);
}

#[rstest]
fn identity_stages_are_fused_on_bound_pipelines(modern: MockGraph) {
    let pipeline = Pipeline::bound(Arc::new(modern))
        .vertices()
        .and_then(Pipeline::identity)
        .and_then(Pipeline::identity)
        .and_then(|p| p.map(name))
        .unwrap();
    assert_eq!(pipeline.to_string(), "[GraphQueryPipe, MapPipe]");
    assert_eq!(pipeline.to_list().unwrap(), ["marko", "vadas", "lop", "josh", "ripple", "peter"]);
}

#[rstest]
fn fusion_can_be_disabled(modern: MockGraph) {
    let options = PipelineOptions::default().with_default_optimizers(false);
    let pipeline = Pipeline::bound_with_options(Arc::new(modern), options)
        .vertices()
        .and_then(Pipeline::identity)
        .and_then(|p| p.map(name))
        .unwrap();
    assert_eq!(pipeline.to_string(), "[GraphQueryPipe, IdentityPipe, MapPipe]");
    assert_eq!(pipeline.to_list().unwrap().len(), 6);
}

#[rstest]
fn storage_errors_propagate_in_order(modern: MockGraph) {
    let mut pipeline = Pipeline::bound(Arc::new(modern.failing_after(2))).vertices().unwrap();
    assert_eq!(pipeline.next().unwrap().id().as_u64(), 1);
    assert_eq!(pipeline.next().unwrap().id().as_u64(), 2);
    assert!(pipeline.has_next().unwrap());
    assert!(matches!(
        pipeline.next(),
        Err(PipelineError::Storage(StorageError { kind: StorageErrorKind::CommunicationFailure, .. }))
    ));
    assert!(matches!(pipeline.next(), Err(PipelineError::Exhausted)));
}

#[rstest]
fn iteration_stops_at_first_storage_error(modern: MockGraph) {
    let pipeline = Pipeline::bound(Arc::new(modern.failing_after(3))).vertices().unwrap();
    let items: Vec<_> = pipeline.into_iter().collect();
    assert_eq!(items.len(), 4);
    assert!(items[..3].iter().all(Result::is_ok));
    assert!(items[3].is_err());
}

#[rstest]
fn inject_after_identity_tail_restarts_stream(modern: MockGraph) {
    let pipeline = Pipeline::bound(Arc::new(modern))
        .vertices()
        .and_then(Pipeline::identity)
        .and_then(|p| p.inject(vec![1_u32, 2]))
        .unwrap();
    assert_eq!(pipeline.to_string(), "[GraphQueryPipe, IdentityPipe, IdentityPipe]");
    assert_eq!(pipeline.to_list().unwrap(), [1, 2]);
}

#[rstest]
fn inject_after_injected_identity_chain(modern: MockGraph) {
    let values = Pipeline::bound(Arc::new(modern))
        .inject(vec![0_u8])
        .and_then(Pipeline::identity)
        .and_then(|p| p.inject(vec![5_u8]))
        .and_then(|p| p.map(|value| value + 1))
        .and_then(Pipeline::to_list)
        .unwrap();
    assert_eq!(values, [6]);
}

struct Offline;

impl GraphStorage for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    fn vertices(&self, _query: &GraphQuery) -> Result<ElementStream<Vertex>, StorageError> {
        Err(StorageError::new(StorageErrorKind::Unavailable, "storage offline"))
    }

    fn edges(&self, _query: &GraphQuery) -> Result<ElementStream<graphpipe::Edge>, StorageError> {
        Err(StorageError::simple(StorageErrorKind::Unavailable))
    }
}

#[rstest]
fn failed_fetch_surfaces_once() {
    let mut pipeline = Pipeline::bound(Arc::new(Offline)).vertices().unwrap();
    let err = pipeline.next().unwrap_err();
    assert_eq!(err.to_string(), "storage error: storage unavailable: storage offline");
    assert!(!pipeline.has_next().unwrap());
}

#[rstest]
fn source_after_stages_restarts_stream(modern: MockGraph) {
    let found = Pipeline::bound(Arc::new(modern))
        .inject(vec![100_u32, 200])
        .and_then(|p| p.vertices_by_id([5_u64]))
        .and_then(Pipeline::to_list)
        .unwrap();
    assert_eq!(ids(&found), [5]);
}
