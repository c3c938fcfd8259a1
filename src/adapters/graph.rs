//! Graph metric adapters over a connectivity weights matrix.
//!
//! Every adapter follows the same template: load the connectivity, run
//! the gate, compute one metric record, assemble and persist the declared
//! result entities, return them in order.

use std::path::Path;

use crate::entities::{Connectivity, ConnectivityMeasure, MeasureData, ValueWrapper};
use crate::error::{AdapterError, Result};
use crate::metrics;
use crate::profiling::LaunchTimer;
use crate::store::EntityStore;
use crate::types::{GraphMetricRequest, Gid, MetricRecord, MetricValue};
use crate::validation::require_square_weights;

/// One persisted result of a graph adapter, in launch order.
#[derive(Debug, Clone)]
pub enum GraphResult {
    Measure(ConnectivityMeasure),
    Value(ValueWrapper),
}

impl GraphResult {
    pub fn gid(&self) -> Gid {
        match self {
            GraphResult::Measure(m) => m.gid,
            GraphResult::Value(v) => v.gid,
        }
    }
}

fn load_connectivity(
    store: &impl EntityStore,
    request: &GraphMetricRequest,
) -> Result<Connectivity> {
    let connectivity = store.connectivity(request.connectivity)?;
    require_square_weights(&connectivity.weights)?;
    Ok(connectivity.clone())
}

/// Assemble one labelled measure from a record entry.
fn build_measure(
    record: &MetricRecord,
    key: &str,
    connectivity: &Connectivity,
    title: &str,
) -> Result<ConnectivityMeasure> {
    let data = match record.get(key) {
        Some(MetricValue::Vector(v)) => MeasureData::Vector(v.clone()),
        Some(MetricValue::Matrix(m)) => MeasureData::Matrix(m.clone()),
        _ => {
            return Err(AdapterError::Numeric(format!(
                "metric record is missing array result '{}'",
                key
            )))
        }
    };
    Ok(ConnectivityMeasure::new(connectivity.gid, title, data))
}

fn build_float_value(record: &MetricRecord, key: &str, label: &str) -> Result<ValueWrapper> {
    Ok(ValueWrapper::float(label, record.float(key)?))
}

fn build_int_value(record: &MetricRecord, key: &str, label: &str) -> Result<ValueWrapper> {
    Ok(ValueWrapper::int(label, record.int(key)?))
}

fn persist_all(results: &[GraphResult], storage_dir: &Path) -> Result<()> {
    for result in results {
        match result {
            GraphResult::Measure(m) => m.store(storage_dir)?,
            GraphResult::Value(v) => v.store(storage_dir)?,
        }
    }
    Ok(())
}

/// Node degree of an undirected network.
pub struct DegreeAdapter;

impl DegreeAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("degree");
        let connectivity = load_connectivity(store, request)?;

        let mut record = MetricRecord::new();
        record.insert(
            "deg",
            MetricValue::Vector(metrics::degrees_und(&connectivity.weights)),
        );

        let results = vec![GraphResult::Measure(build_measure(
            &record,
            "deg",
            &connectivity,
            "Node degree",
        )?)];
        persist_all(&results, storage_dir)?;
        Ok(results)
    }
}

/// Indegree, outdegree and total degree of a directed network.
pub struct DegreeIodAdapter;

impl DegreeIodAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("degree_iod");
        let connectivity = load_connectivity(store, request)?;

        let (indegree, outdegree, degree) = metrics::degrees_dir(&connectivity.weights);
        let mut record = MetricRecord::new();
        record.insert("id", MetricValue::Vector(indegree));
        record.insert("od", MetricValue::Vector(outdegree));
        record.insert("deg", MetricValue::Vector(degree));

        let results = vec![
            GraphResult::Measure(build_measure(&record, "id", &connectivity, "Node indegree")?),
            GraphResult::Measure(build_measure(&record, "od", &connectivity, "Node outdegree")?),
            GraphResult::Measure(build_measure(
                &record,
                "deg",
                &connectivity,
                "Node degree (indegree + outdegree)",
            )?),
        ];
        persist_all(&results, storage_dir)?;
        Ok(results)
    }
}

/// Joint indegree/outdegree distribution.
pub struct JointDegreeAdapter;

impl JointDegreeAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("joint_degree");
        let connectivity = load_connectivity(store, request)?;

        let (histogram, above, below, balanced) = metrics::jdegree(&connectivity.weights);
        let mut record = MetricRecord::new();
        record.insert("J", MetricValue::Matrix(histogram));
        record.insert("J_od", MetricValue::Int(above));
        record.insert("J_id", MetricValue::Int(below));
        record.insert("J_bl", MetricValue::Int(balanced));

        let title = format!(
            "Joint degree JOD={}, JID={}, JBL={}",
            above, below, balanced
        );
        let results = vec![
            GraphResult::Measure(build_measure(&record, "J", &connectivity, &title)?),
            GraphResult::Value(build_int_value(
                &record,
                "J_od",
                "Number of vertices with od > id",
            )?),
            GraphResult::Value(build_int_value(
                &record,
                "J_id",
                "Number of vertices with id > od",
            )?),
            GraphResult::Value(build_int_value(
                &record,
                "J_bl",
                "Number of vertices with id = od",
            )?),
        ];
        persist_all(&results, storage_dir)?;
        Ok(results)
    }
}

/// Matching index per node pair.
pub struct MatchingIndexAdapter;

impl MatchingIndexAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("matching_index");
        let connectivity = load_connectivity(store, request)?;

        let (incoming, outgoing, all) = metrics::matching_ind(&connectivity.weights);
        let mut record = MetricRecord::new();
        record.insert("Min", MetricValue::Matrix(incoming));
        record.insert("Mout", MetricValue::Matrix(outgoing));
        record.insert("Mall", MetricValue::Matrix(all));

        let results = vec![
            GraphResult::Measure(build_measure(
                &record,
                "Min",
                &connectivity,
                "Matching index for incoming connections",
            )?),
            GraphResult::Measure(build_measure(
                &record,
                "Mout",
                &connectivity,
                "Matching index for outgoing connections",
            )?),
            GraphResult::Measure(build_measure(
                &record,
                "Mall",
                &connectivity,
                "Matching index for all connections",
            )?),
        ];
        persist_all(&results, storage_dir)?;
        Ok(results)
    }
}

/// Node strength of an undirected weighted network.
pub struct StrengthAdapter;

impl StrengthAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("strength");
        let connectivity = load_connectivity(store, request)?;

        let mut record = MetricRecord::new();
        record.insert(
            "strength",
            MetricValue::Vector(metrics::strengths_und(&connectivity.weights)),
        );

        let results = vec![GraphResult::Measure(build_measure(
            &record,
            "strength",
            &connectivity,
            "Node strength",
        )?)];
        persist_all(&results, storage_dir)?;
        Ok(results)
    }
}

/// Instrength and outstrength of a directed weighted network.
pub struct StrengthIsosAdapter;

impl StrengthIsosAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("strength_isos");
        let connectivity = load_connectivity(store, request)?;

        let (instrength, outstrength, strength) = metrics::strengths_dir(&connectivity.weights);
        let mut record = MetricRecord::new();
        record.insert("is", MetricValue::Vector(instrength));
        record.insert("os", MetricValue::Vector(outstrength));
        record.insert("strength", MetricValue::Vector(strength));

        let results = vec![
            GraphResult::Measure(build_measure(&record, "is", &connectivity, "Node instrength")?),
            GraphResult::Measure(build_measure(
                &record,
                "os",
                &connectivity,
                "Node outstrength",
            )?),
            GraphResult::Measure(build_measure(
                &record,
                "strength",
                &connectivity,
                "Node strength (instrength + outstrength)",
            )?),
        ];
        persist_all(&results, storage_dir)?;
        Ok(results)
    }
}

/// Signed nodal strengths and total weights.
pub struct StrengthWeightsAdapter;

impl StrengthWeightsAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("strength_weights");
        let connectivity = load_connectivity(store, request)?;

        let (positive, negative, vpos, vneg) =
            metrics::strengths_und_sign(&connectivity.weights);
        let mut record = MetricRecord::new();
        record.insert("Spos", MetricValue::Vector(positive));
        record.insert("Sneg", MetricValue::Vector(negative));
        record.insert("vpos", MetricValue::Float(vpos));
        record.insert("vneg", MetricValue::Float(vneg));

        let results = vec![
            GraphResult::Measure(build_measure(
                &record,
                "Spos",
                &connectivity,
                "Nodal strength of positive weights",
            )?),
            GraphResult::Measure(build_measure(
                &record,
                "Sneg",
                &connectivity,
                "Nodal strength of negative weights",
            )?),
            GraphResult::Value(build_float_value(&record, "vpos", "Total positive weight")?),
            GraphResult::Value(build_float_value(&record, "vneg", "Total negative weight")?),
        ];
        persist_all(&results, storage_dir)?;
        Ok(results)
    }
}

/// Density of a directed network.
pub struct DensityDirectedAdapter;

impl DensityDirectedAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("density_directed");
        let connectivity = load_connectivity(store, request)?;
        let (density, vertices, edges) = metrics::density_dir(&connectivity.weights);
        density_results(density, vertices, edges, storage_dir)
    }
}

/// Density of an undirected network.
pub struct DensityUndirectedAdapter;

impl DensityUndirectedAdapter {
    pub fn launch(
        store: &impl EntityStore,
        request: &GraphMetricRequest,
        storage_dir: &Path,
    ) -> Result<Vec<GraphResult>> {
        let _timer = LaunchTimer::start("density_undirected");
        let connectivity = load_connectivity(store, request)?;
        let (density, vertices, edges) = metrics::density_und(&connectivity.weights);
        density_results(density, vertices, edges, storage_dir)
    }
}

fn density_results(
    density: f64,
    vertices: usize,
    edges: usize,
    storage_dir: &Path,
) -> Result<Vec<GraphResult>> {
    let mut record = MetricRecord::new();
    record.insert("kden", MetricValue::Float(density));
    record.insert("N", MetricValue::Int(vertices as i64));
    record.insert("K", MetricValue::Int(edges as i64));

    let results = vec![
        GraphResult::Value(build_float_value(&record, "kden", "Density")?),
        GraphResult::Value(build_int_value(&record, "N", "Number of vertices")?),
        GraphResult::Value(build_int_value(&record, "K", "Number of edges")?),
    ];
    persist_all(&results, storage_dir)?;
    Ok(results)
}
