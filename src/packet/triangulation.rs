//! Combinatorial triangulations in dimensions 2, 3 and 4
//!
//! This is the bookkeeping the viewers need to display and edit gluings:
//! simplices, facet gluings, and face-class counting via union-find. It is
//! not a topology engine; anything beyond counting lives elsewhere.

use super::perm::Perm;

/// One side of a facet gluing: the partner simplex and the vertex map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gluing {
    pub simplex: usize,
    pub perm: Perm,
}

/// A single top-dimensional simplex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simplex {
    pub description: String,
    adj: Vec<Option<Gluing>>,
}

impl Simplex {
    fn new(dim: usize, description: String) -> Self {
        Self {
            description,
            adj: vec![None; dim + 1],
        }
    }

    pub fn adjacent(&self, facet: usize) -> Option<Gluing> {
        self.adj[facet]
    }
}

/// A triangulation of dimension 2, 3 or 4
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangulation {
    dim: usize,
    simplices: Vec<Simplex>,
}

impl Triangulation {
    pub fn new(dim: usize) -> Self {
        assert!((2..=4).contains(&dim), "unsupported dimension {dim}");
        Self {
            dim,
            simplices: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of top-dimensional simplices
    pub fn size(&self) -> usize {
        self.simplices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    pub fn simplex(&self, index: usize) -> &Simplex {
        &self.simplices[index]
    }

    pub fn adjacent(&self, simplex: usize, facet: usize) -> Option<Gluing> {
        self.simplices[simplex].adj[facet]
    }

    /// Add a new unglued simplex, returning its index
    pub fn add_simplex(&mut self, description: impl Into<String>) -> usize {
        self.simplices
            .push(Simplex::new(self.dim, description.into()));
        self.simplices.len() - 1
    }

    /// Remove a simplex, ungluing it first and renumbering the rest
    pub fn remove_simplex(&mut self, index: usize) {
        for facet in 0..=self.dim {
            self.unjoin(index, facet);
        }
        self.simplices.remove(index);
        for simplex in &mut self.simplices {
            for gluing in simplex.adj.iter_mut().flatten() {
                if gluing.simplex > index {
                    gluing.simplex -= 1;
                }
            }
        }
    }

    pub fn set_description(&mut self, index: usize, description: impl Into<String>) {
        self.simplices[index].description = description.into();
    }

    /// Glue `facet` of `simplex` to facet `perm[facet]` of `partner`
    ///
    /// Both facets must currently be boundary.
    pub fn join(&mut self, simplex: usize, facet: usize, partner: usize, perm: Perm) {
        let partner_facet = perm.apply(facet);
        debug_assert!(self.simplices[simplex].adj[facet].is_none());
        debug_assert!(self.simplices[partner].adj[partner_facet].is_none());
        debug_assert!(simplex != partner || facet != partner_facet);

        self.simplices[simplex].adj[facet] = Some(Gluing {
            simplex: partner,
            perm,
        });
        self.simplices[partner].adj[partner_facet] = Some(Gluing {
            simplex,
            perm: perm.inverse(),
        });
    }

    /// Unglue `facet` of `simplex` (and its partner), returning the old gluing
    pub fn unjoin(&mut self, simplex: usize, facet: usize) -> Option<Gluing> {
        let old = self.simplices[simplex].adj[facet].take()?;
        let partner_facet = old.perm.apply(facet);
        self.simplices[old.simplex].adj[partner_facet] = None;
        Some(old)
    }

    /// Number of facets that are not glued to anything
    pub fn boundary_facets(&self) -> usize {
        self.simplices
            .iter()
            .map(|s| s.adj.iter().filter(|a| a.is_none()).count())
            .sum()
    }

    pub fn is_closed(&self) -> bool {
        self.boundary_facets() == 0
    }

    /// Number of connected components of the dual graph
    pub fn component_count(&self) -> usize {
        let mut uf = UnionFind::new(self.size());
        for (s, simplex) in self.simplices.iter().enumerate() {
            for gluing in simplex.adj.iter().flatten() {
                uf.union(s, gluing.simplex);
            }
        }
        uf.classes()
    }

    /// Number of distinct k-faces after identifications
    pub fn count_faces(&self, k: usize) -> usize {
        assert!(k <= self.dim);
        if k == self.dim {
            return self.size();
        }

        // Each k-face of a simplex is a (k+1)-subset of its vertices,
        // stored as a bitmask.
        let masks: Vec<u8> = (0u8..(1 << (self.dim + 1)))
            .filter(|m| m.count_ones() as usize == k + 1)
            .collect();
        let slot = |simplex: usize, mask: u8| -> usize {
            let pos = masks.iter().position(|&m| m == mask).unwrap_or(0);
            simplex * masks.len() + pos
        };

        let mut uf = UnionFind::new(self.size() * masks.len());
        for (s, simplex) in self.simplices.iter().enumerate() {
            for (facet, gluing) in simplex.adj.iter().enumerate() {
                let Some(gluing) = gluing else { continue };
                for &mask in &masks {
                    if mask & (1 << facet) != 0 {
                        continue;
                    }
                    let mut image = 0u8;
                    for v in 0..=self.dim {
                        if mask & (1 << v) != 0 {
                            image |= 1 << gluing.perm.apply(v);
                        }
                    }
                    uf.union(slot(s, mask), slot(gluing.simplex, image));
                }
            }
        }
        uf.classes()
    }

    /// Alternating sum of face counts over all dimensions
    pub fn euler_characteristic(&self) -> i64 {
        (0..=self.dim)
            .map(|k| {
                let count = self.count_faces(k) as i64;
                if k % 2 == 0 {
                    count
                } else {
                    -count
                }
            })
            .sum()
    }

    /// Whether the simplices can be oriented coherently across all gluings
    pub fn is_orientable(&self) -> bool {
        let mut orientation: Vec<i32> = vec![0; self.size()];
        for start in 0..self.size() {
            if orientation[start] != 0 {
                continue;
            }
            orientation[start] = 1;
            let mut stack = vec![start];
            while let Some(s) = stack.pop() {
                for gluing in self.simplices[s].adj.iter().flatten() {
                    let expected = -orientation[s] * gluing.perm.sign();
                    match orientation[gluing.simplex] {
                        0 => {
                            orientation[gluing.simplex] = expected;
                            stack.push(gluing.simplex);
                        }
                        o if o != expected => return false,
                        _ => {}
                    }
                }
            }
        }
        true
    }

    /// Graphviz description of the dual graph (face pairing graph)
    pub fn face_pairing_dot(&self, labels: bool) -> String {
        let mut out = String::from("graph G {\n");
        out.push_str("graph [bgcolor=white];\n");
        out.push_str("edge [color=black];\n");
        out.push_str(
            "node [shape=circle,style=filled,height=0.15,fixedsize=true,fillcolor=lightgrey,fontsize=10];\n",
        );
        for s in 0..self.size() {
            if labels {
                out.push_str(&format!("g_{s} [label=\"{s}\"];\n"));
            } else {
                out.push_str(&format!("g_{s} [label=\"\"];\n"));
            }
        }
        for (s, simplex) in self.simplices.iter().enumerate() {
            for (facet, gluing) in simplex.adj.iter().enumerate() {
                let Some(gluing) = gluing else { continue };
                let partner_facet = gluing.perm.apply(facet);
                if (gluing.simplex, partner_facet) > (s, facet) {
                    out.push_str(&format!("g_{s} -- g_{};\n", gluing.simplex));
                }
            }
        }
        out.push_str("}\n");
        out
    }
}

/// Disjoint-set forest with path halving
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }

    fn classes(&mut self) -> usize {
        (0..self.parent.len()).filter(|&x| self.find(x) == x).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two tetrahedra glued along all four faces by the identity: the
    /// standard two-tetrahedron 3-sphere.
    fn doubled_tetrahedron() -> Triangulation {
        let mut tri = Triangulation::new(3);
        tri.add_simplex("");
        tri.add_simplex("");
        for facet in 0..4 {
            tri.join(0, facet, 1, Perm::identity(4));
        }
        tri
    }

    #[test]
    fn test_join_sets_both_sides() {
        let mut tri = Triangulation::new(3);
        tri.add_simplex("a");
        tri.add_simplex("b");
        tri.join(0, 3, 1, Perm::identity(4));

        let back = tri.adjacent(1, 3).expect("reverse gluing");
        assert_eq!(back.simplex, 0);
        assert_eq!(back.perm, Perm::identity(4));
        assert_eq!(tri.boundary_facets(), 6);
    }

    #[test]
    fn test_unjoin_clears_partner() {
        let mut tri = doubled_tetrahedron();
        tri.unjoin(1, 2);
        assert!(tri.adjacent(0, 2).is_none());
        assert_eq!(tri.boundary_facets(), 2);
    }

    #[test]
    fn test_doubled_tetrahedron_skeleton() {
        let tri = doubled_tetrahedron();
        assert_eq!(tri.count_faces(0), 4);
        assert_eq!(tri.count_faces(1), 6);
        assert_eq!(tri.count_faces(2), 4);
        assert_eq!(tri.euler_characteristic(), 0);
        assert!(tri.is_closed());
        assert!(tri.is_orientable());
        assert_eq!(tri.component_count(), 1);
    }

    #[test]
    fn test_remove_simplex_renumbers() {
        let mut tri = Triangulation::new(3);
        for _ in 0..3 {
            tri.add_simplex("");
        }
        tri.join(0, 0, 2, Perm::identity(4));
        tri.remove_simplex(1);

        assert_eq!(tri.size(), 2);
        assert_eq!(tri.adjacent(0, 0).map(|g| g.simplex), Some(1));
        assert_eq!(tri.adjacent(1, 0).map(|g| g.simplex), Some(0));
    }

    #[test]
    fn test_single_triangle_mobius_band_is_non_orientable() {
        // Glue edge 01 to edge 12 of one triangle with a twist: 0→2, 1→1.
        // Edge 01 is facet 2 and edge 12 is facet 0.
        let mut tri = Triangulation::new(2);
        tri.add_simplex("");
        let perm = Perm::from_images(&[1, 2, 0]).unwrap();
        // perm maps facet 2 (edge 01) to facet 0 (edge 12): 0→1, 1→2.
        tri.join(0, 2, 0, perm);
        assert_eq!(tri.boundary_facets(), 1);
        assert_eq!(tri.component_count(), 1);
        assert!(!tri.is_orientable());
    }

    #[test]
    fn test_face_pairing_dot_lists_each_edge_once() {
        let dot = doubled_tetrahedron().face_pairing_dot(true);
        assert_eq!(dot.matches("g_0 -- g_1").count(), 4);
        assert!(dot.contains("g_0 [label=\"0\"]"));
    }
}
