/*!
Presentation-ready shapes of a ranked table.

These helpers only filter and reshape rows that were already ranked; the map
and chart collaborators consume their output without touching the engine.
*/

use crate::config::*;

/// Decides which markers stand out on the map.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum MarkerHighlight {
    /// The first `n` rows of the (already sorted) table.
    TopN(usize),
    /// Rows whose overall score reaches the threshold.
    ScoreAtLeast(f64),
}

#[derive(PartialEq, Debug, Clone)]
pub struct MapMarker {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub ranking: f64,
    pub highlighted: bool,
}

/// One point of the radar chart: the score of one provider on one section.
#[derive(PartialEq, Debug, Clone)]
pub struct RadarPoint {
    pub provider: String,
    pub section: String,
    pub value: f64,
}

impl RankedTable {
    /// The distinct group keys, in order of first appearance.
    pub fn group_options(&self) -> Vec<String> {
        let mut res: Vec<String> = Vec::new();
        for r in self.rows.iter() {
            if let Some(g) = &r.provider.group {
                if !res.contains(g) {
                    res.push(g.clone());
                }
            }
        }
        res
    }

    /// Keeps the rows of one group. The order is unchanged.
    pub fn filter_group(&self, group: &str) -> RankedTable {
        RankedTable {
            indicators: self.indicators.clone(),
            sections: self.sections.clone(),
            weights: self.weights.clone(),
            rows: self
                .rows
                .iter()
                .filter(|r| r.provider.group.as_deref() == Some(group))
                .cloned()
                .collect(),
        }
    }

    /// The `n` best rows.
    pub fn head(&self, n: usize) -> &[RankedRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

pub fn radar_series(rows: &[RankedRow]) -> Vec<RadarPoint> {
    rows.iter()
        .flat_map(|r| {
            r.section_scores.iter().map(move |(section, value)| RadarPoint {
                provider: r.provider.name.clone(),
                section: section.clone(),
                value: *value,
            })
        })
        .collect()
}

pub fn map_markers(rows: &[RankedRow], highlight: MarkerHighlight) -> Vec<MapMarker> {
    rows.iter()
        .enumerate()
        .map(|(idx, r)| MapMarker {
            name: r.provider.name.clone(),
            longitude: r.provider.longitude,
            latitude: r.provider.latitude,
            ranking: r.ranking,
            highlighted: match highlight {
                MarkerHighlight::TopN(n) => idx < n,
                MarkerHighlight::ScoreAtLeast(x) => r.ranking >= x,
            },
        })
        .collect()
}

/// Mean (latitude, longitude) of the rows.
pub fn map_center(rows: &[RankedRow]) -> Option<(f64, f64)> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;
    let lat: f64 = rows.iter().map(|r| r.provider.latitude).sum();
    let lon: f64 = rows.iter().map(|r| r.provider.longitude).sum();
    Some((lat / n, lon / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;
    use crate::weights::WeightSnapshot;

    fn ranked() -> RankedTable {
        let cols = vec!["A".to_string()];
        let mut builder = TableBuilder::new(&cols).unwrap();
        builder
            .add_provider("Norte", -80.0, -6.0, Some("EPS Grau"), &[0.2])
            .unwrap();
        builder
            .add_provider("Sur", -79.0, -7.0, Some("EPSEL"), &[0.9])
            .unwrap();
        builder
            .add_provider("Centro", -78.0, -8.0, Some("EPS Grau"), &[0.5])
            .unwrap();
        builder.add_provider("Suelto", -77.0, -9.0, None, &[0.1]).unwrap();
        let sections =
            SectionSchema::new(vec![Section::new("S", &["A"])], SharedIndicatorPolicy::Reject)
                .unwrap();
        crate::run_ranking(
            &builder.build(),
            &WeightSnapshot::from_pairs(&[("A", 2)]),
            &sections,
        )
        .unwrap()
    }

    #[test]
    fn groups_follow_ranked_order() {
        let t = ranked();
        assert_eq!(t.group_options(), vec!["EPSEL", "EPS Grau"]);
        let grau = t.filter_group("EPS Grau");
        let names: Vec<&str> = grau.rows.iter().map(|r| r.provider.name.as_str()).collect();
        assert_eq!(names, vec!["Centro", "Norte"]);
        assert!(t.filter_group("unknown").rows.is_empty());
    }

    #[test]
    fn head_is_bounded() {
        let t = ranked();
        assert_eq!(t.head(2).len(), 2);
        assert_eq!(t.head(10).len(), 4);
        assert_eq!(t.head(0).len(), 0);
    }

    #[test]
    fn markers_and_center() {
        let t = ranked();
        let top: Vec<bool> = map_markers(&t.rows, MarkerHighlight::TopN(1))
            .iter()
            .map(|m| m.highlighted)
            .collect();
        assert_eq!(top, vec![true, false, false, false]);
        let above: Vec<bool> = map_markers(&t.rows, MarkerHighlight::ScoreAtLeast(0.5))
            .iter()
            .map(|m| m.highlighted)
            .collect();
        assert_eq!(above, vec![true, true, false, false]);
        assert_eq!(map_center(&t.rows), Some((-7.5, -78.5)));
        assert_eq!(map_center(&[]), None);
    }

    #[test]
    fn radar_is_long_form() {
        let t = ranked();
        let points = radar_series(t.head(2));
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].provider, "Sur");
        assert_eq!(points[0].section, "S");
        assert_eq!(points[0].value, 0.9);
    }
}
