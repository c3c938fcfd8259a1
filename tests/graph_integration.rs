use bna_rs::adapters::graph::{
    DegreeAdapter, DegreeIodAdapter, DensityDirectedAdapter, DensityUndirectedAdapter,
    GraphResult, JointDegreeAdapter, MatchingIndexAdapter, StrengthAdapter,
    StrengthIsosAdapter, StrengthWeightsAdapter,
};
use bna_rs::entities::{
    Connectivity, ConnectivityMeasure, Entity, MeasureData, ValueWrapper, WrappedValue,
};
use bna_rs::error::AdapterError;
use bna_rs::store::InMemoryStore;
use bna_rs::types::{Gid, GraphMetricRequest};
use ndarray::{array, Array2};

fn store_with(weights: Array2<f64>) -> (InMemoryStore, GraphMetricRequest) {
    let labels = (0..weights.nrows()).map(|i| format!("r{}", i)).collect();
    let mut store = InMemoryStore::new();
    let gid = store.insert(Entity::Connectivity(Connectivity {
        gid: Gid::new(),
        region_labels: labels,
        weights,
    }));
    (store, GraphMetricRequest { connectivity: gid })
}

fn undirected_ring() -> Array2<f64> {
    array![
        [0.0, 0.5, 0.0, 0.0, 2.0],
        [0.5, 0.0, 1.5, 0.0, 0.0],
        [0.0, 1.5, 0.0, 0.25, 0.0],
        [0.0, 0.0, 0.25, 0.0, 1.0],
        [2.0, 0.0, 0.0, 1.0, 0.0],
    ]
}

fn expect_vector(result: &GraphResult) -> &ndarray::Array1<f64> {
    match result {
        GraphResult::Measure(ConnectivityMeasure {
            data: MeasureData::Vector(v),
            ..
        }) => v,
        other => panic!("expected a vector measure, got {:?}", other),
    }
}

#[test]
fn test_degree_yields_one_vector_per_node() {
    let dir = tempfile::tempdir().unwrap();
    let (store, request) = store_with(undirected_ring());

    let results = DegreeAdapter::launch(&store, &request, dir.path()).unwrap();
    assert_eq!(results.len(), 1);
    let degree = expect_vector(&results[0]);
    assert_eq!(degree.len(), 5);
    assert_eq!(degree, &array![2.0, 2.0, 2.0, 2.0, 2.0]);
}

#[test]
fn test_directed_degree_sums_in_and_out() {
    let dir = tempfile::tempdir().unwrap();
    let weights = array![
        [0.0, 1.0, 1.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 0.0],
    ];
    let (store, request) = store_with(weights);

    let results = DegreeIodAdapter::launch(&store, &request, dir.path()).unwrap();
    assert_eq!(results.len(), 3);

    let indegree = expect_vector(&results[0]);
    let outdegree = expect_vector(&results[1]);
    let total = expect_vector(&results[2]);
    assert_eq!(indegree.len(), 4);
    for node in 0..4 {
        assert_eq!(total[node], indegree[node] + outdegree[node]);
    }
}

#[test]
fn test_strength_matches_weight_sums() {
    let dir = tempfile::tempdir().unwrap();
    let (store, request) = store_with(undirected_ring());

    let results = StrengthAdapter::launch(&store, &request, dir.path()).unwrap();
    let strength = expect_vector(&results[0]);
    assert_eq!(strength, &array![2.5, 2.0, 1.75, 1.25, 3.0]);
}

#[test]
fn test_strength_isos_totals() {
    let dir = tempfile::tempdir().unwrap();
    let weights = array![
        [0.0, 2.0],
        [0.5, 0.0],
    ];
    let (store, request) = store_with(weights);

    let results = StrengthIsosAdapter::launch(&store, &request, dir.path()).unwrap();
    let instrength = expect_vector(&results[0]);
    let outstrength = expect_vector(&results[1]);
    let total = expect_vector(&results[2]);
    assert_eq!(instrength, &array![0.5, 2.0]);
    assert_eq!(outstrength, &array![2.0, 0.5]);
    assert_eq!(total, &array![2.5, 2.5]);
}

#[test]
fn test_strength_weights_splits_signs() {
    let dir = tempfile::tempdir().unwrap();
    let weights = array![
        [0.0, 1.0, -2.0],
        [1.0, 0.0, 0.5],
        [-2.0, 0.5, 0.0],
    ];
    let (store, request) = store_with(weights);

    let results = StrengthWeightsAdapter::launch(&store, &request, dir.path()).unwrap();
    assert_eq!(results.len(), 4);
    let positive = expect_vector(&results[0]);
    let negative = expect_vector(&results[1]);
    assert_eq!(positive, &array![1.0, 1.5, 0.5]);
    assert_eq!(negative, &array![-2.0, 0.0, -2.0]);

    match (&results[2], &results[3]) {
        (GraphResult::Value(vpos), GraphResult::Value(vneg)) => {
            assert_eq!(vpos.value, WrappedValue::Float(3.0));
            assert_eq!(vneg.value, WrappedValue::Float(-4.0));
        }
        _ => panic!("expected scalar totals"),
    }
}

#[test]
fn test_joint_degree_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let weights = array![
        [0.0, 1.0, 1.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 0.0],
    ];
    let (store, request) = store_with(weights);

    let results = JointDegreeAdapter::launch(&store, &request, dir.path()).unwrap();
    assert_eq!(results.len(), 4);

    match &results[0] {
        GraphResult::Measure(ConnectivityMeasure {
            data: MeasureData::Matrix(histogram),
            title,
            ..
        }) => {
            assert_eq!(histogram.shape(), &[4, 4]);
            assert!(title.contains("JOD=1"));
        }
        other => panic!("expected the joint degree histogram, got {:?}", other),
    }
    match &results[1] {
        GraphResult::Value(ValueWrapper { value, .. }) => {
            assert_eq!(*value, WrappedValue::Int(1));
        }
        other => panic!("expected an integer wrapper, got {:?}", other),
    }
}

#[test]
fn test_matching_index_produces_three_matrices() {
    let dir = tempfile::tempdir().unwrap();
    let weights = array![
        [0.0, 0.0, 1.0, 1.0],
        [0.0, 0.0, 1.0, 1.0],
        [1.0, 1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0, 0.0],
    ];
    let (store, request) = store_with(weights);

    let results = MatchingIndexAdapter::launch(&store, &request, dir.path()).unwrap();
    assert_eq!(results.len(), 3);
    for result in &results {
        match result {
            GraphResult::Measure(ConnectivityMeasure {
                data: MeasureData::Matrix(m),
                ..
            }) => {
                assert_eq!(m.shape(), &[4, 4]);
                assert!((m[[0, 1]] - 1.0).abs() < 1e-12);
            }
            other => panic!("expected a matrix measure, got {:?}", other),
        }
    }
}

#[test]
fn test_density_adapters_report_scalars() {
    let dir = tempfile::tempdir().unwrap();
    let weights = array![
        [0.0, 1.0, 1.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
    ];

    let (store, request) = store_with(weights.clone());
    let directed = DensityDirectedAdapter::launch(&store, &request, dir.path()).unwrap();
    let values: Vec<&ValueWrapper> = directed
        .iter()
        .map(|r| match r {
            GraphResult::Value(v) => v,
            other => panic!("expected scalars, got {:?}", other),
        })
        .collect();
    assert_eq!(values[0].label, "Density");
    assert_eq!(values[1].value, WrappedValue::Int(3));
    assert_eq!(values[2].value, WrappedValue::Int(4));

    let (store, request) = store_with(weights);
    let undirected = DensityUndirectedAdapter::launch(&store, &request, dir.path()).unwrap();
    match &undirected[2] {
        GraphResult::Value(v) => assert_eq!(v.value, WrappedValue::Int(2)),
        other => panic!("expected an edge count, got {:?}", other),
    }
}

#[test]
fn test_results_reload_bit_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let (store, request) = store_with(undirected_ring());

    let results = StrengthAdapter::launch(&store, &request, dir.path()).unwrap();
    let stored = match &results[0] {
        GraphResult::Measure(m) => m,
        other => panic!("expected a measure, got {:?}", other),
    };

    let reloaded = ConnectivityMeasure::load(dir.path(), stored.gid).unwrap();
    assert_eq!(reloaded.title, stored.title);
    match (&reloaded.data, &stored.data) {
        (MeasureData::Vector(a), MeasureData::Vector(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
        _ => panic!("payload changed shape on reload"),
    }
}

#[test]
fn test_gate_rejects_non_square_weights() {
    let dir = tempfile::tempdir().unwrap();
    let (store, request) = store_with(Array2::zeros((3, 4)));
    let result = DegreeAdapter::launch(&store, &request, dir.path());
    assert!(matches!(result, Err(AdapterError::Validation(_))));
}

#[test]
fn test_gate_rejects_empty_weights() {
    let dir = tempfile::tempdir().unwrap();
    let (store, request) = store_with(Array2::zeros((0, 0)));
    let result = StrengthAdapter::launch(&store, &request, dir.path());
    match result {
        Err(AdapterError::Validation(message)) => {
            assert!(message.contains("empty"));
        }
        other => panic!("expected a validation failure, got {:?}", other),
    }
}

#[test]
fn test_unknown_connectivity_fails_before_compute() {
    let dir = tempfile::tempdir().unwrap();
    let store = InMemoryStore::new();
    let request = GraphMetricRequest {
        connectivity: Gid::new(),
    };
    let result = DegreeAdapter::launch(&store, &request, dir.path());
    assert!(matches!(result, Err(AdapterError::EntityNotFound(_))));
}
