//! Static registration table of every adapter in the crate.
//!
//! One row per adapter: identifier, display metadata, grouping, input and
//! output entity kinds, and the field schemas of its view-model. The field
//! schemas are the single source the validation gate and a host's
//! input-collection surface both read. No runtime registration.

use serde::Serialize;

/// UI grouping of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterGroup {
    Decomposition,
    DegreeAndSimilarity,
    Density,
    Upload,
}

/// Entity kind an adapter consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    TimeSeries4d,
    Connectivity,
    UploadFile,
}

/// Entity kind an adapter may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    IndependentComponents,
    ConnectivityMeasure,
    ValueWrapper,
    ProjectionMatrix,
}

/// Declared type of a view-model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    EntityGid,
    Integer,
    Text,
    FilePath,
}

/// Schema of one view-model field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
}

/// Complete registration record of one adapter.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub group: AdapterGroup,
    pub input: InputKind,
    pub outputs: &'static [OutputKind],
    pub fields: &'static [FieldSchema],
    pub documentation: &'static str,
}

impl AdapterMetadata {
    /// Look up an adapter by identifier.
    pub fn from_id(id: &str) -> Option<&'static AdapterMetadata> {
        ADAPTER_REGISTRY.iter().find(|a| a.id == id)
    }

    /// All adapters in one group, in registry order.
    pub fn in_group(group: AdapterGroup) -> impl Iterator<Item = &'static AdapterMetadata> {
        ADAPTER_REGISTRY.iter().filter(move |a| a.group == group)
    }

    /// Field schema by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const CONNECTIVITY_FIELDS: &[FieldSchema] = &[FieldSchema {
    name: "connectivity",
    kind: FieldKind::EntityGid,
    required: true,
    default: None,
}];

const ICA_FIELDS: &[FieldSchema] = &[
    FieldSchema {
        name: "time_series",
        kind: FieldKind::EntityGid,
        required: true,
        default: None,
    },
    FieldSchema {
        name: "n_components",
        kind: FieldKind::Integer,
        required: false,
        default: None,
    },
];

const PROJECTION_FIELDS: &[FieldSchema] = &[
    FieldSchema {
        name: "projection_file",
        kind: FieldKind::FilePath,
        required: true,
        default: None,
    },
    FieldSchema {
        name: "dataset_name",
        kind: FieldKind::Text,
        required: false,
        default: Some("ProjectionMatrix"),
    },
    FieldSchema {
        name: "surface",
        kind: FieldKind::EntityGid,
        required: true,
        default: None,
    },
    FieldSchema {
        name: "sensors",
        kind: FieldKind::EntityGid,
        required: true,
        default: None,
    },
];

pub const ICA: AdapterMetadata = AdapterMetadata {
    id: "ica",
    name: "Independent Component Analysis",
    group: AdapterGroup::Decomposition,
    input: InputKind::TimeSeries4d,
    outputs: &[OutputKind::IndependentComponents],
    fields: ICA_FIELDS,
    documentation: "Unmixes a 4-D time series into statistically independent components, one decomposition per state variable and mode.",
};

pub const DEGREE: AdapterMetadata = AdapterMetadata {
    id: "degree",
    name: "Degree: undirected connection matrix",
    group: AdapterGroup::DegreeAndSimilarity,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ConnectivityMeasure],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Number of connections incident on each node of an undirected network.",
};

pub const DEGREE_IOD: AdapterMetadata = AdapterMetadata {
    id: "degree_iod",
    name: "Indegree and outdegree: directed connection matrix",
    group: AdapterGroup::DegreeAndSimilarity,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ConnectivityMeasure],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Incoming, outgoing and total connection counts per node of a directed network.",
};

pub const JOINT_DEGREE: AdapterMetadata = AdapterMetadata {
    id: "joint_degree",
    name: "Joint degree",
    group: AdapterGroup::DegreeAndSimilarity,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ConnectivityMeasure, OutputKind::ValueWrapper],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Histogram of indegree/outdegree combinations, with counts of in-dominated, out-dominated and balanced nodes.",
};

pub const MATCHING_INDEX: AdapterMetadata = AdapterMetadata {
    id: "matching_index",
    name: "Matching index: connection matrix",
    group: AdapterGroup::DegreeAndSimilarity,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ConnectivityMeasure],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Fraction of shared neighbors for every node pair, for incoming, outgoing and all connections.",
};

pub const STRENGTH: AdapterMetadata = AdapterMetadata {
    id: "strength",
    name: "Strength: undirected weighted connection matrix",
    group: AdapterGroup::DegreeAndSimilarity,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ConnectivityMeasure],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Sum of incident connection weights per node.",
};

pub const STRENGTH_ISOS: AdapterMetadata = AdapterMetadata {
    id: "strength_isos",
    name: "Instrength and outstrength",
    group: AdapterGroup::DegreeAndSimilarity,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ConnectivityMeasure],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Incoming, outgoing and total connection weight per node of a directed network.",
};

pub const STRENGTH_WEIGHTS: AdapterMetadata = AdapterMetadata {
    id: "strength_weights",
    name: "Strength and weight",
    group: AdapterGroup::DegreeAndSimilarity,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ConnectivityMeasure, OutputKind::ValueWrapper],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Nodal strength split by weight sign, plus the total positive and negative weight of the network.",
};

pub const DENSITY_DIRECTED: AdapterMetadata = AdapterMetadata {
    id: "density_directed",
    name: "Density: directed connection matrix",
    group: AdapterGroup::Density,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ValueWrapper],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Fraction of present directed connections, with vertex and edge counts.",
};

pub const DENSITY_UNDIRECTED: AdapterMetadata = AdapterMetadata {
    id: "density_undirected",
    name: "Density: undirected connection matrix",
    group: AdapterGroup::Density,
    input: InputKind::Connectivity,
    outputs: &[OutputKind::ValueWrapper],
    fields: CONNECTIVITY_FIELDS,
    documentation: "Fraction of present undirected connections, with vertex and edge counts.",
};

pub const PROJECTION_IMPORT: AdapterMetadata = AdapterMetadata {
    id: "projection_import",
    name: "Gain matrix for sensors",
    group: AdapterGroup::Upload,
    input: InputKind::UploadFile,
    outputs: &[OutputKind::ProjectionMatrix],
    fields: PROJECTION_FIELDS,
    documentation: "Imports a projection matrix between a cortical surface and an EEG/MEG/SEEG sensor set.",
};

/// All adapters, grouped by family.
pub const ADAPTER_REGISTRY: &[AdapterMetadata] = &[
    ICA,
    DEGREE,
    DEGREE_IOD,
    JOINT_DEGREE,
    MATCHING_INDEX,
    STRENGTH,
    STRENGTH_ISOS,
    STRENGTH_WEIGHTS,
    DENSITY_DIRECTED,
    DENSITY_UNDIRECTED,
    PROJECTION_IMPORT,
];
