//! Human-readable dump and JSON snapshot of a compute-at map
//!
//! Domains are rendered through the fusion (`iS4{i0}`), so both take the
//! fusion the map was built from. Neither format has a parsing contract.

use super::compute_at_map::{ComputeAtMap, ComputeAtStats};
use crate::features::compute_at::domain::IdMappingMode;
use crate::features::compute_at::infrastructure::IterDomainGraph;
use crate::features::fusion::Fusion;
use crate::shared::models::IterDomainId;
use serde::Serialize;
use std::fmt;

/// `Display` adapter returned by [`ComputeAtMap::display`]
pub struct ComputeAtMapDisplay<'a> {
    map: &'a ComputeAtMap,
    fusion: &'a Fusion,
}

impl<'a> ComputeAtMapDisplay<'a> {
    fn render(&self, id: IterDomainId) -> String {
        self.fusion.iter_domain(id).to_string()
    }

    fn render_all(&self, ids: &[IterDomainId]) -> String {
        let rendered: Vec<String> = ids.iter().map(|id| self.render(*id)).collect();
        rendered.join(", ")
    }

    fn write_mode(&self, f: &mut fmt::Formatter<'_>, mode: IdMappingMode) -> fmt::Result {
        writeln!(f, "{} map:", mode_title(mode))?;
        for (_, members) in self.map.id_sets(mode).classes() {
            let concrete = members
                .first()
                .and_then(|id| self.map.get_concrete_mapped_id(*id, mode).ok());
            let rendered: Vec<String> = members
                .iter()
                .map(|id| {
                    let mut text = self.render(*id);
                    if Some(*id) == concrete {
                        text.push('*');
                    }
                    text
                })
                .collect();
            writeln!(f, "  {{ {} }}", rendered.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for ComputeAtMapDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.map.id_graph();
        writeln!(f, "Compute at map {{")?;
        for mode in IdMappingMode::RESOLUTION_ORDER {
            self.write_mode(f, mode)?;
        }

        writeln!(f, "Consumer maps:")?;
        for &id in graph.all_ids() {
            writeln!(f, "  {} :: {{ {} }}", self.render(id), self.render_all(graph.consumers_of(id)))?;
        }

        writeln!(f, "Producer maps:")?;
        for &id in graph.all_ids() {
            writeln!(f, "  {} :: {{ {} }}", self.render(id), self.render_all(graph.producers_of(id)))?;
        }

        writeln!(f, "Sibling map:")?;
        for (_, members) in graph.sibling_sets().classes() {
            if members.len() > 1 {
                writeln!(f, "  {{ {} }}", self.render_all(members))?;
            }
        }

        let mut wrote_header = false;
        for (_, members) in graph.loop_nodes().classes() {
            let Some(&first) = members.first() else {
                continue;
            };
            if let Ok(index) = self.map.loop_index(first) {
                if !wrote_header {
                    writeln!(f, "Index variables:")?;
                    wrote_header = true;
                }
                writeln!(f, "  {{ {} }} -> {}", self.render_all(members), index)?;
            }
        }
        write!(f, "}} compute at map")
    }
}

fn mode_title(mode: IdMappingMode) -> &'static str {
    match mode {
        IdMappingMode::Exact => "Exact",
        IdMappingMode::Permissive => "Permissive",
        IdMappingMode::Loop => "Loop",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassSnapshot {
    pub members: Vec<String>,
    pub concrete: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdjacencySnapshot {
    pub id: String,
    pub mapped: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoopIndexSnapshot {
    pub members: Vec<String>,
    pub index: String,
}

/// Serializable view of a compute-at map, for diagnostics tooling
#[derive(Debug, Clone, Serialize)]
pub struct ComputeAtSnapshot {
    pub permissive: Vec<ClassSnapshot>,
    pub exact: Vec<ClassSnapshot>,
    #[serde(rename = "loop")]
    pub loop_classes: Vec<ClassSnapshot>,
    pub consumers: Vec<AdjacencySnapshot>,
    pub producers: Vec<AdjacencySnapshot>,
    pub siblings: Vec<Vec<String>>,
    pub index_variables: Vec<LoopIndexSnapshot>,
    pub stats: ComputeAtStats,
}

impl ComputeAtMap {
    /// Dump adapter, e.g. `println!("{}", map.display(&fusion))`
    pub fn display<'a>(&'a self, fusion: &'a Fusion) -> ComputeAtMapDisplay<'a> {
        ComputeAtMapDisplay { map: self, fusion }
    }

    pub fn snapshot(&self, fusion: &Fusion) -> ComputeAtSnapshot {
        let render = |id: &IterDomainId| fusion.iter_domain(*id).to_string();
        let render_all = |ids: &[IterDomainId]| ids.iter().map(render).collect::<Vec<_>>();
        let graph = self.id_graph();

        let classes = |mode: IdMappingMode| {
            self.id_sets(mode)
                .classes()
                .map(|(_, members)| ClassSnapshot {
                    members: render_all(members),
                    concrete: members
                        .first()
                        .and_then(|id| self.get_concrete_mapped_id(*id, mode).ok())
                        .map(|id| render(&id)),
                })
                .collect::<Vec<_>>()
        };

        let adjacency = |lookup: fn(&IterDomainGraph, IterDomainId) -> &[IterDomainId]| {
            graph
                .all_ids()
                .iter()
                .map(|id| AdjacencySnapshot {
                    id: render(id),
                    mapped: render_all(lookup(graph, *id)),
                })
                .collect::<Vec<_>>()
        };

        let index_variables = graph
            .loop_nodes()
            .classes()
            .filter_map(|(_, members)| {
                let first = members.first()?;
                let index = self.loop_index(*first).ok()?;
                Some(LoopIndexSnapshot {
                    members: render_all(members),
                    index: index.to_string(),
                })
            })
            .collect();

        ComputeAtSnapshot {
            permissive: classes(IdMappingMode::Permissive),
            exact: classes(IdMappingMode::Exact),
            loop_classes: classes(IdMappingMode::Loop),
            consumers: adjacency(IterDomainGraph::consumers_of),
            producers: adjacency(IterDomainGraph::producers_of),
            siblings: graph
                .sibling_sets()
                .classes()
                .filter(|(_, members)| members.len() > 1)
                .map(|(_, members)| render_all(members))
                .collect(),
            index_variables,
            stats: self.stats().clone(),
        }
    }

    pub fn to_json(&self, fusion: &Fusion) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot(fusion))
    }
}
