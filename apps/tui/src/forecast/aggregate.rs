use crate::domain::{sort_by_key_order, ClusterId, Feature};
use serde::Serialize;
use std::collections::HashMap;

/// Summed forecast volume per cluster for one snapshot.
///
/// Rows list array-index ids ascending, then other ids in the order they
/// first appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterAggregate {
    volumes: Vec<(ClusterId, f64)>,
    total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterShare {
    pub cluster_id: ClusterId,
    pub volume: f64,
    /// `volume / total * 100`; NaN or infinite when the total is zero
    pub percentage: f64,
}

impl ClusterAggregate {
    pub fn from_features(features: &[Feature]) -> Self {
        let mut volumes: Vec<(ClusterId, f64)> = Vec::new();
        let mut slots: HashMap<&ClusterId, usize> = HashMap::new();
        for feature in features {
            let slot = *slots.entry(feature.cluster_id()).or_insert_with(|| {
                volumes.push((feature.cluster_id().clone(), 0.0));
                volumes.len() - 1
            });
            volumes[slot].1 += feature.volume();
        }
        sort_by_key_order(&mut volumes);
        let total = volumes.iter().map(|(_, volume)| volume).sum();
        Self { volumes, total }
    }

    pub const fn total(&self) -> f64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn volume(&self, cluster_id: &ClusterId) -> Option<f64> {
        self.volumes
            .iter()
            .find(|(id, _)| id == cluster_id)
            .map(|(_, volume)| *volume)
    }

    pub fn percentage(&self, cluster_id: &ClusterId) -> Option<f64> {
        self.volume(cluster_id).map(|volume| volume / self.total * 100.0)
    }

    pub fn shares(&self) -> impl Iterator<Item = ClusterShare> + '_ {
        self.volumes.iter().map(|(cluster_id, volume)| ClusterShare {
            cluster_id: cluster_id.clone(),
            volume: *volume,
            percentage: volume / self.total * 100.0,
        })
    }
}

/// Two decimals, `NaN%` for an empty total.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// Shortest text that reads back as the same value; whole volumes drop `.0`.
pub fn format_volume(volume: f64) -> String {
    volume.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureProperties;

    fn feature(cluster: &str, volume: f64) -> Feature {
        Feature {
            geometry: None,
            properties: FeatureProperties {
                time: 0,
                volume,
                cluster_id: ClusterId::from(cluster),
                cluster_volume: None,
            },
        }
    }

    #[test]
    fn sums_per_cluster_and_reports_shares() {
        let features = vec![feature("A", 10.0), feature("A", 5.0), feature("B", 5.0)];
        let aggregate = ClusterAggregate::from_features(&features);

        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.volume(&ClusterId::from("A")), Some(15.0));
        assert_eq!(aggregate.volume(&ClusterId::from("B")), Some(5.0));
        assert_eq!(aggregate.total(), 20.0);

        let rendered = aggregate
            .shares()
            .map(|share| (share.cluster_id.to_string(), format_percentage(share.percentage)))
            .collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec![
                ("A".to_string(), "75.00%".to_string()),
                ("B".to_string(), "25.00%".to_string()),
            ]
        );
    }

    #[test]
    fn parts_add_up_to_total() {
        let features = (0..50)
            .map(|i| feature(&(i % 7).to_string(), f64::from(i) * 0.25))
            .collect::<Vec<_>>();
        let aggregate = ClusterAggregate::from_features(&features);
        let parts: f64 = aggregate.shares().map(|share| share.volume).sum();
        assert!((parts - aggregate.total()).abs() < 1e-9);
        assert_eq!(aggregate.len(), 7);
    }

    #[test]
    fn single_cluster_has_single_entry() {
        let features = vec![feature("9", 1.5), feature("9", 2.5), feature("9", 4.0)];
        let aggregate = ClusterAggregate::from_features(&features);
        assert_eq!(aggregate.len(), 1);
        assert_eq!(aggregate.volume(&ClusterId::Number(9)), Some(8.0));
        assert_eq!(aggregate.percentage(&ClusterId::Number(9)), Some(100.0));
    }

    #[test]
    fn empty_collection_has_no_clusters() {
        let aggregate = ClusterAggregate::from_features(&[]);
        assert!(aggregate.is_empty());
        assert_eq!(aggregate.total(), 0.0);
        assert_eq!(aggregate.percentage(&ClusterId::Number(1)), None);
    }

    #[test]
    fn zero_total_percentage_is_not_finite() {
        let aggregate = ClusterAggregate::from_features(&[feature("1", 0.0)]);
        let share = aggregate.shares().next();
        assert!(share.is_some_and(|share| !share.percentage.is_finite()));
        assert_eq!(format_percentage(f64::NAN), "NaN%");
    }

    #[test]
    fn volumes_format_without_noise() {
        assert_eq!(format_volume(15.0), "15");
        assert_eq!(format_volume(2.125), "2.125");
        assert_eq!(format_volume(0.333_333_3), "0.3333333");
        assert_eq!(format_volume(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn distinct_labels_are_never_merged() -> Result<(), serde_json::Error> {
        let body = serde_json::json!({
            "features": [
                { "properties": { "time": 0, "volume": 1.0, "cluster_id": "7" } },
                { "properties": { "time": 0, "volume": 2.0, "cluster_id": "007" } },
                { "properties": { "time": 0, "volume": 4.0, "cluster_id": "+7" } },
                { "properties": { "time": 0, "volume": 8.0, "cluster_id": " 7 " } },
                { "properties": { "time": 0, "volume": 16.0, "cluster_id": 1e20 } },
                { "properties": { "time": 0, "volume": 32.0, "cluster_id": 2e20 } }
            ]
        });
        let collection: crate::domain::FeatureCollection = serde_json::from_value(body)?;
        let aggregate = ClusterAggregate::from_features(&collection.features);

        let rows = aggregate
            .shares()
            .map(|share| (share.cluster_id.to_string(), share.volume))
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                ("7".to_string(), 1.0),
                ("007".to_string(), 2.0),
                ("+7".to_string(), 4.0),
                (" 7 ".to_string(), 8.0),
                ("100000000000000000000".to_string(), 16.0),
                ("200000000000000000000".to_string(), 32.0),
            ]
        );
        assert_eq!(aggregate.total(), 63.0);
        Ok(())
    }

    #[test]
    fn rows_follow_object_key_order() {
        let features = vec![
            feature("b", 1.0),
            feature("-1", 1.0),
            feature("12", 1.0),
            feature("a", 1.0),
            feature("3", 1.0),
            feature("b", 1.0),
        ];
        let aggregate = ClusterAggregate::from_features(&features);
        let order = aggregate
            .shares()
            .map(|share| share.cluster_id.to_string())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["3", "12", "b", "-1", "a"]);
        assert_eq!(aggregate.volume(&ClusterId::from("b")), Some(2.0));
    }
}
