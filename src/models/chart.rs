// Chart specifications and the renderer-agnostic series they produce

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Scatter,
    /// Pie-style: one slice per group sized by post count
    #[serde(alias = "pie")]
    CategoricalShare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Count,
    #[default]
    Sum,
    #[serde(alias = "avg")]
    Average,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(alias = "xAxis")]
    pub group_field: String,
    #[serde(default = "default_value_field", alias = "yAxis")]
    pub value_field: String,
    #[serde(default, alias = "aggregation")]
    pub reducer: Reducer,
}

fn default_value_field() -> String {
    "engagement".to_string()
}

impl ChartSpec {
    pub fn share(group_field: &str) -> Self {
        Self {
            kind: ChartKind::CategoricalShare,
            group_field: group_field.to_string(),
            value_field: default_value_field(),
            reducer: Reducer::Count,
        }
    }

    pub fn grouped(kind: ChartKind, group_field: &str, value_field: &str, reducer: Reducer) -> Self {
        Self {
            kind,
            group_field: group_field.to_string(),
            value_field: value_field.to_string(),
            reducer,
        }
    }
}

/// Fixed palette, reused cyclically by group index
pub const CHART_PALETTE: [&str; 6] = [
    "hsl(217 91% 60%)",
    "hsl(142 76% 36%)",
    "hsl(45 93% 47%)",
    "hsl(0 84% 60%)",
    "hsl(271 76% 53%)",
    "hsl(24 70% 50%)",
];

pub fn palette_color(index: usize) -> &'static str {
    CHART_PALETTE[index % CHART_PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharePoint {
    pub name: String,
    pub value: u64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedPoint {
    pub key: String,
    pub value: i64,
}

/// Output of the series generator.
/// Grouped points serialize as `{<groupField>: key, <valueField>: value}` rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Share(Vec<SharePoint>),
    Grouped {
        group_field: String,
        value_field: String,
        points: Vec<GroupedPoint>,
    },
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Share(points) => points.len(),
            Series::Grouped { points, .. } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct GroupedRow<'a> {
    group_field: &'a str,
    value_field: &'a str,
    point: &'a GroupedPoint,
}

impl Serialize for GroupedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.group_field, &self.point.key)?;
        map.serialize_entry(self.value_field, &self.point.value)?;
        map.end()
    }
}

impl Serialize for Series {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Series::Share(points) => points.serialize(serializer),
            Series::Grouped {
                group_field,
                value_field,
                points,
            } => {
                let mut seq = serializer.serialize_seq(Some(points.len()))?;
                for point in points {
                    seq.serialize_element(&GroupedRow {
                        group_field,
                        value_field,
                        point,
                    })?;
                }
                seq.end()
            }
        }
    }
}
