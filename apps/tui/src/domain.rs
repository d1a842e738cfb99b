use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Label grouping nearby forecast points.
///
/// The backend emits integers, but nothing guarantees it, so free-form
/// labels are kept as well. Two ids are equal exactly when their text forms
/// are: `"7"` and `7` match, `"007"` and `" 7"` stay distinct labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClusterId {
    Number(i64),
    Label(String),
}

impl ClusterId {
    /// `Number` only for the canonical decimal form of an integer.
    pub fn parse(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(n) if n.to_string() == value => Self::Number(n),
            _ => Self::Label(value.to_string()),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn from_float(value: f64) -> Self {
        // 2^63; i64::MAX itself is not representable as f64
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value) {
            Self::Number(value as i64)
        } else {
            Self::Label(value.to_string())
        }
    }

    /// Position among array-index keys (`0..2^32 - 1`), if this id is one.
    pub fn array_index(&self) -> Option<u32> {
        match self {
            Self::Number(n) => u32::try_from(*n).ok().filter(|index| *index != u32::MAX),
            Self::Label(_) => None,
        }
    }
}

/// Orders entries the way a keyed JSON object is enumerated by the browser
/// dashboard: array-index ids ascending, then every other id in first-seen
/// order. The sort is stable, so callers pass entries in insertion order.
pub fn sort_by_key_order<T>(entries: &mut [(ClusterId, T)]) {
    entries.sort_by_key(|(id, _)| id.array_index().map_or((1, 0), |index| (0, index)));
}

impl Default for ClusterId {
    // Matches the backend's fallback when a row carries no cluster column
    fn default() -> Self {
        Self::Number(-1)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for ClusterId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ClusterId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for ClusterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawScalar::deserialize(deserializer)? {
            RawScalar::Int(n) => Self::Number(n),
            RawScalar::Float(x) => Self::from_float(x),
            RawScalar::Text(text) => Self::parse(&text),
        })
    }
}

impl Serialize for ClusterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_i64(*n),
            Self::Label(label) => serializer.serialize_str(label),
        }
    }
}

/// GeoJSON geometry. Only the shapes the backend produces are modelled;
/// positions may carry extra ordinates such as altitude.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Vec<f64> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeatureProperties {
    /// Milliseconds since the Unix epoch
    #[serde(deserialize_with = "timestamp_millis")]
    pub time: i64,
    pub volume: f64,
    #[serde(default)]
    pub cluster_id: ClusterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_volume: Option<f64>,
}

/// One forecast data point.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "lenient_geometry")]
    pub geometry: Option<Geometry>,
    pub properties: FeatureProperties,
}

impl Feature {
    pub const fn time(&self) -> i64 {
        self.properties.time
    }

    pub const fn volume(&self) -> f64 {
        self.properties.volume
    }

    pub const fn cluster_id(&self) -> &ClusterId {
        &self.properties.cluster_id
    }

    /// `(lon, lat)` when the feature is a point
    pub fn position(&self) -> Option<(f64, f64)> {
        match &self.geometry {
            Some(Geometry::Point { coordinates }) => match coordinates.as_slice() {
                [lon, lat, ..] => Some((*lon, *lat)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Features returned by one heatmap fetch, in response order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FeatureCollection {
    #[serde(default, deserialize_with = "list_or_keyed")]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct BoundaryProperties {
    #[serde(default)]
    cluster_id: ClusterId,
}

#[derive(Debug, Clone, Deserialize)]
struct BoundaryFeature {
    #[serde(default, deserialize_with = "lenient_geometry")]
    geometry: Option<Geometry>,
    properties: BoundaryProperties,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBoundaries {
    #[serde(default, deserialize_with = "list_or_keyed")]
    features: Vec<BoundaryFeature>,
}

/// Convex outline of one cluster, as `(lon, lat)` vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBoundary {
    pub cluster_id: ClusterId,
    pub outline: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterBoundaries {
    pub clusters: Vec<ClusterBoundary>,
}

impl<'de> Deserialize<'de> for ClusterBoundaries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawBoundaries::deserialize(deserializer)?;
        let clusters = raw
            .features
            .into_iter()
            .filter_map(|feature| match feature.geometry {
                // The hull is stored as [lat, lon] pairs, unlike the point features
                Some(Geometry::Polygon { coordinates }) => {
                    coordinates.into_iter().next().map(|ring| ClusterBoundary {
                        cluster_id: feature.properties.cluster_id,
                        outline: ring
                            .iter()
                            .filter_map(|pair| match pair.as_slice() {
                                [lat, lon, ..] => Some((*lon, *lat)),
                                _ => None,
                            })
                            .collect(),
                    })
                }
                _ => None,
            })
            .collect();
        Ok(Self { clusters })
    }
}

fn timestamp_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match RawScalar::deserialize(deserializer)? {
        RawScalar::Int(n) => Ok(n),
        #[allow(clippy::cast_possible_truncation)]
        RawScalar::Float(x) if x.is_finite() => Ok(x.round() as i64),
        RawScalar::Float(x) => Err(serde::de::Error::custom(format!(
            "timestamp is not finite: {x}"
        ))),
        RawScalar::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {text:?}: {e}"))),
    }
}

/// A geometry that does not fit the model only hides the feature from the map.
fn lenient_geometry<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Geometry>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.map(|value| {
        Geometry::deserialize(value).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "unsupported geometry");
            Geometry::Unsupported
        })
    }))
}

struct ListOrKeyed<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ListOrKeyed<T> {
    type Value = Vec<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array or a keyed object of features")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(items)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, T>()? {
            entries.push((ClusterId::parse(&key), value));
        }
        sort_by_key_order(&mut entries);
        Ok(entries.into_iter().map(|(_, value)| value).collect())
    }
}

/// Accepts a JSON array, or an object keyed by index/id.
fn list_or_keyed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    deserializer.deserialize_any(ListOrKeyed(PhantomData))
}
