use crate::{MockGraph, MockGraphLoadError, SyntheticGraph};
use graphpipe_core::{
    ElementId, GraphElement, GraphQuery, GraphStorage, PropertyValue, StorageErrorKind,
};
use rstest::{fixture, rstest};

#[fixture]
fn modern() -> MockGraph {
    MockGraph::modern()
}

fn vertex_ids(storage: &dyn GraphStorage, query: &GraphQuery) -> Vec<u64> {
    storage
        .vertices(query)
        .expect("fetch")
        .map(|vertex| vertex.expect("vertex").id().as_u64())
        .collect()
}

#[rstest]
fn embedded_fixture_loads(modern: MockGraph) {
    assert_eq!(modern.vertex_list().len(), 6);
    assert_eq!(modern.edge_list().len(), 6);
    let marko = &modern.vertex_list()[0];
    assert_eq!(marko.label(), "person");
    assert_eq!(marko.property("name"), Some(&PropertyValue::from("marko")));
    assert_eq!(marko.property("age"), Some(&PropertyValue::Integer(29)));
    let knows = &modern.edge_list()[0];
    assert_eq!(knows.out_vertex(), ElementId::new(1));
    assert_eq!(knows.property("weight"), Some(&PropertyValue::Number(0.5)));
}

#[rstest]
fn unconstrained_fetch_keeps_native_order(modern: MockGraph) {
    assert_eq!(vertex_ids(&modern, &GraphQuery::new()), vec![1, 2, 3, 4, 5, 6]);
}

#[rstest]
fn id_fetch_returns_matches_in_native_order(modern: MockGraph) {
    assert_eq!(vertex_ids(&modern, &GraphQuery::new().ids([6u64, 1, 42])), vec![1, 6]);
}

#[rstest]
fn property_filter_and_limit_apply(modern: MockGraph) {
    let query = GraphQuery::new().has("lang", "java");
    assert_eq!(vertex_ids(&modern, &query), vec![3, 5]);
    assert_eq!(vertex_ids(&modern, &GraphQuery::new().limit(2)), vec![1, 2]);
}

#[rstest]
fn streams_count_only_what_was_pulled(modern: MockGraph) {
    let stats = modern.stats();
    let mut stream = modern.vertices(&GraphQuery::new()).unwrap();
    assert_eq!(stats.fetches(), 1);
    assert_eq!(stats.pulled(), 0);
    stream.next();
    stream.next();
    assert_eq!(stats.pulled(), 2);
}

#[rstest]
fn failing_storage_reports_communication_failure(modern: MockGraph) {
    let graph = modern.failing_after(1);
    let mut stream = graph.edges(&GraphQuery::new()).unwrap();
    assert!(stream.next().unwrap().is_ok());
    let err = stream.next().unwrap().unwrap_err();
    assert_eq!(err.kind, StorageErrorKind::CommunicationFailure);
    assert!(stream.next().is_none());
}

#[rstest]
fn duplicate_ids_are_rejected() {
    let xml = r#"<graph><vertex id="1" label="a"/><vertex id="1" label="b"/></graph>"#;
    let err = MockGraph::from_xml(xml).unwrap_err();
    assert!(matches!(err, MockGraphLoadError::DuplicateId { kind: "vertex", id: 1 }));
}

#[rstest]
fn dangling_edges_are_rejected() {
    let xml = r#"<graph><vertex id="1" label="a"/><edge id="2" label="e" out="1" in="9"/></graph>"#;
    let err = MockGraph::from_xml(xml).unwrap_err();
    assert!(matches!(err, MockGraphLoadError::DanglingEdge { edge: 2, vertex: 9 }));
}

#[rstest]
fn synthetic_graph_is_generated_lazily() {
    let graph = SyntheticGraph::new(u64::MAX);
    let stats = graph.stats();
    let first: Vec<u64> = graph
        .vertices(&GraphQuery::new())
        .unwrap()
        .take(3)
        .map(|vertex| vertex.unwrap().id().as_u64())
        .collect();
    assert_eq!(first, vec![1, 2, 3]);
    assert_eq!(stats.pulled(), 3);
}

#[rstest]
fn synthetic_id_fetch_only_builds_requested_ids() {
    let graph = SyntheticGraph::new(u64::MAX);
    let stats = graph.stats();
    assert_eq!(vertex_ids(&graph, &GraphQuery::new().ids([7_u64, 3, 7, 0])), vec![3, 7]);
    assert_eq!(stats.pulled(), 2);

    let edges: Vec<u64> = graph
        .edges(&GraphQuery::new().ids([u64::MAX, 5]))
        .unwrap()
        .map(|edge| edge.unwrap().id().as_u64())
        .collect();
    assert_eq!(edges, vec![5]);
}
