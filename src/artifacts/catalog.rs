//! 预置文物目录，供界面一键加入 / 移除

use crate::artifacts::record::{ArtifactDetails, ArtifactRecord};
use serde_json::{Map, Value, json};

/// 全部预置文物（顺序固定）
pub fn predefined() -> Vec<ArtifactRecord> {
    vec![
        entry(
            "Laufen Lens",
            "A plano-convex lens ground from rock crystal, about four centimetres across.\n\
             Fine polishing striations run concentrically, and a bronze bezel \
             fragment is still bonded to one edge.",
            "Rock crystal lens with a fragment of its bronze bezel.",
            "Laufen river terrace, trench 2",
            json!({
                "material": "rock crystal, bronze",
                "estimated_age_years": 2400,
                "condition": "edge chipped, optically clear"
            }),
        ),
        entry(
            "Hohenfeld Basalt Slab",
            "A rectangular basalt slab with a shallow ground depression on its upper face.\n\
             Incised rows of dots along one margin may be tally marks.",
            "Worked basalt slab with incised dot rows.",
            "Hohenfeld plateau, hearth area C",
            json!({
                "material": "basalt",
                "estimated_age_years": 5200,
                "condition": "cracked in two, refitted"
            }),
        ),
        entry(
            "Altbrunn Prism",
            "A six-sided glass prism with faint green tint and worn facet edges.\n\
             Found wrapped in linen inside a lead box beneath the chapel floor.",
            "Green-tinted glass prism stored in a lead box.",
            "Altbrunn chapel, sub-floor cist",
            json!({
                "material": "glass, lead, linen",
                "estimated_age_years": 800,
                "condition": "facets worn, no fractures"
            }),
        ),
    ]
}

/// 按名称查找，忽略大小写和首尾空白
pub fn find(name: &str) -> Option<ArtifactRecord> {
    let wanted = name.trim();
    predefined()
        .into_iter()
        .find(|r| r.name.eq_ignore_ascii_case(wanted))
}

fn entry(
    name: &str,
    description: &str,
    summary: &str,
    location: &str,
    metadata: Value,
) -> ArtifactRecord {
    let metadata = match metadata {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    ArtifactRecord::new(name, description)
        .with_details(ArtifactDetails {
            summary: Some(summary.to_string()),
            location: Some(location.to_string()),
            ..Default::default()
        })
        .with_metadata(metadata)
}
