use crate::pokemon::EvolutionNode;
use std::collections::HashMap;

/// Nodes sharing the same distance from the base form, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionStage<'a> {
    pub depth: usize,
    pub members: Vec<&'a EvolutionNode>,
}

fn depth_of(node: &EvolutionNode, by_id: &HashMap<u32, &EvolutionNode>) -> usize {
    let mut depth = 0;
    let mut parent = node.evolves_from_id;
    // a malformed chain could loop; never walk further than the family size
    while let Some(parent_id) = parent {
        match by_id.get(&parent_id) {
            Some(p) if depth < by_id.len() => {
                depth += 1;
                parent = p.evolves_from_id;
            }
            _ => break,
        }
    }
    depth
}

pub fn stages(nodes: &[EvolutionNode]) -> Vec<EvolutionStage<'_>> {
    let by_id: HashMap<u32, &EvolutionNode> = nodes.iter().map(|n| (n.id, n)).collect();
    let mut stages: Vec<EvolutionStage<'_>> = Vec::new();

    for node in nodes {
        let depth = depth_of(node, &by_id);
        match stages.iter_mut().find(|s| s.depth == depth) {
            Some(stage) => stage.members.push(node),
            None => stages.push(EvolutionStage {
                depth,
                members: vec![node],
            }),
        }
    }

    stages.sort_by_key(|s| s.depth);
    stages
}
