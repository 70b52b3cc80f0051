//! Group presentations and the fundamental group of a 3-triangulation
//!
//! Generators are the dual edges outside a spanning forest of the dual graph;
//! each interior edge of the triangulation contributes one relation, read off
//! by walking around the edge.

use super::triangulation::Triangulation;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single letter of a relation: generator index and exponent (±1)
pub type Letter = (usize, i32);

/// A finitely presented group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupPresentation {
    pub generators: usize,
    pub relations: Vec<Vec<Letter>>,
}

impl GroupPresentation {
    /// Free-reduce every relation and drop the empty ones
    pub fn reduce(&mut self) {
        for relation in &mut self.relations {
            let mut reduced: Vec<Letter> = Vec::with_capacity(relation.len());
            for &(gen, exp) in relation.iter() {
                match reduced.last() {
                    Some(&(prev, prev_exp)) if prev == gen && prev_exp == -exp => {
                        reduced.pop();
                    }
                    _ => reduced.push((gen, exp)),
                }
            }
            // Cyclic reduction
            while reduced.len() >= 2 {
                let first = reduced[0];
                let last = reduced[reduced.len() - 1];
                if first.0 == last.0 && first.1 == -last.1 {
                    reduced.pop();
                    reduced.remove(0);
                } else {
                    break;
                }
            }
            *relation = reduced;
        }
        self.relations.retain(|r| !r.is_empty());
    }

    /// Human-readable name of generator `index`: a, b, ..., z, g26, g27, ...
    pub fn generator_name(index: usize) -> String {
        if index < 26 {
            char::from(b'a' + index as u8).to_string()
        } else {
            format!("g{index}")
        }
    }

    pub fn relation_string(relation: &[Letter]) -> String {
        relation
            .iter()
            .map(|&(gen, exp)| {
                let name = Self::generator_name(gen);
                if exp == 1 {
                    name
                } else {
                    format!("{name}^{exp}")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for GroupPresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gens: Vec<String> = (0..self.generators)
            .map(Self::generator_name)
            .collect();
        write!(f, "< {}", gens.join(", "))?;
        if !self.relations.is_empty() {
            let rels: Vec<String> = self
                .relations
                .iter()
                .map(|r| Self::relation_string(r))
                .collect();
            write!(f, " | {}", rels.join(", "))?;
        }
        write!(f, " >")
    }
}

/// Position of edge {a, b} (a < b) among the six edges of a tetrahedron
fn edge_index(a: usize, b: usize) -> usize {
    let (a, b) = if a < b { (a, b) } else { (b, a) };
    match (a, b) {
        (0, 1) => 0,
        (0, 2) => 1,
        (0, 3) => 2,
        (1, 2) => 3,
        (1, 3) => 4,
        _ => 5,
    }
}

/// Fundamental group of a 3-dimensional triangulation
///
/// Returns None for other dimensions.
pub fn fundamental_group(tri: &Triangulation) -> Option<GroupPresentation> {
    if tri.dim() != 3 {
        return None;
    }
    let n = tri.size();

    // Spanning forest of the dual graph.
    let mut tree: HashSet<(usize, usize)> = HashSet::new();
    let mut seen = vec![false; n];
    for root in 0..n {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        let mut queue = std::collections::VecDeque::from([root]);
        while let Some(s) = queue.pop_front() {
            for facet in 0..4 {
                let Some(g) = tri.adjacent(s, facet) else { continue };
                if !seen[g.simplex] {
                    seen[g.simplex] = true;
                    tree.insert((s, facet));
                    tree.insert((g.simplex, g.perm.apply(facet)));
                    queue.push_back(g.simplex);
                }
            }
        }
    }

    // One generator per non-tree facet pair, oriented from the smaller side.
    let mut gens: HashMap<(usize, usize), Letter> = HashMap::new();
    let mut generators = 0;
    for s in 0..n {
        for facet in 0..4 {
            let Some(g) = tri.adjacent(s, facet) else { continue };
            let other = (g.simplex, g.perm.apply(facet));
            if tree.contains(&(s, facet)) || (s, facet) > other {
                continue;
            }
            gens.insert((s, facet), (generators, 1));
            gens.insert(other, (generators, -1));
            generators += 1;
        }
    }

    // Walk around every edge.
    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut relations = Vec::new();
    let limit = 6 * n + 6;
    for t in 0..n {
        for a in 0..4 {
            for b in (a + 1)..4 {
                if visited.contains(&(t, edge_index(a, b))) {
                    continue;
                }
                let others: Vec<usize> = (0..4).filter(|&v| v != a && v != b).collect();
                let start = (t, a, b, others[0], others[1]);

                let mut state = start;
                let mut word = Vec::new();
                let mut boundary = false;
                for _ in 0..limit {
                    let (tet, va, vb, vc, vd) = state;
                    visited.insert((tet, edge_index(va, vb)));
                    let Some(g) = tri.adjacent(tet, vd) else {
                        boundary = true;
                        break;
                    };
                    if let Some(&letter) = gens.get(&(tet, vd)) {
                        word.push(letter);
                    }
                    let p = g.perm;
                    state = (g.simplex, p.apply(va), p.apply(vb), p.apply(vd), p.apply(vc));

                    let (nt, na, nb, _, nd) = state;
                    let same_edge = (na == start.1 && nb == start.2)
                        || (na == start.2 && nb == start.1);
                    if nt == start.0 && same_edge && nd == start.4 {
                        break;
                    }
                }
                if !boundary {
                    relations.push(word);
                }
            }
        }
    }

    let mut presentation = GroupPresentation {
        generators,
        relations,
    };
    presentation.reduce();
    Some(presentation)
}
