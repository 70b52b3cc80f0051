// Demo document: a small packet tree that shows off every viewer
//
// The workspace does not read or write data files, so the binary opens this
// document unless `--no-demo` is given (in which case it gets an empty
// container to play with).

use crate::packet::content::{
    AngleStructureList, BoolSet, NormalSurface, PropertiesFilter, Script, ScriptVariable,
    SurfaceFilter, SurfaceList,
};
use crate::packet::perm::Perm;
use crate::packet::triangulation::Triangulation;
use crate::packet::{Packet, PacketContent, PacketRef};
use std::collections::BTreeSet;

/// Smallest well-formed PDF header and trailer; enough for the detail view
const DEMO_PDF: &[u8] = b"%PDF-1.4\n\
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n\
3 0 obj << /Type /Page /Parent 2 0 R >> endobj\n\
trailer << /Root 1 0 R >>\n%%EOF\n";

const README: &str = "\
Welcome to the sample document.

Open a packet with Enter, edit it, and commit with F2.
The ball below cannot be edited while its normal surface list exists.
";

/// Two simplices of dimension `dim` glued by the identity along every facet
fn double(dim: usize) -> Triangulation {
    let mut tri = Triangulation::new(dim);
    tri.add_simplex("");
    tri.add_simplex("");
    for facet in 0..=dim {
        tri.join(0, facet, 1, Perm::identity(dim + 1));
    }
    tri
}

/// Vertex links and quads of a single tetrahedron
fn one_tetrahedron_surfaces() -> SurfaceList {
    let triangle = |vertex: usize| {
        let mut coords = vec![0; 7];
        coords[vertex] = 1;
        NormalSurface {
            name: format!("Link of vertex {vertex}"),
            coords,
            euler: Some(1),
            orientable: Some(true),
            compact: true,
            has_boundary: true,
        }
    };
    let quad = |index: usize| {
        let mut coords = vec![0; 7];
        coords[4 + index] = 1;
        NormalSurface {
            name: String::new(),
            coords,
            euler: Some(1),
            orientable: Some(true),
            compact: true,
            has_boundary: true,
        }
    };
    SurfaceList {
        coords: "Standard normal (tri-quad)".to_string(),
        embedded_only: true,
        surfaces: (0..4).map(triangle).chain((0..3).map(quad)).collect(),
    }
}

pub fn sample_document() -> PacketRef {
    let root = Packet::new("Sample document", PacketContent::Container);
    root.insert_child_last(Packet::new("Read me", PacketContent::Text(README.to_string())));

    let sphere2 = Packet::new("2-sphere", PacketContent::Triangulation(double(2)));
    let sphere3 = Packet::new("3-sphere", PacketContent::Triangulation(double(3)));
    sphere3.add_tag("closed");
    let sphere4 = Packet::new("4-sphere", PacketContent::Triangulation(double(4)));

    let mut one = Triangulation::new(3);
    one.add_simplex("the only tetrahedron");
    let ball = Packet::new("Ball", PacketContent::Triangulation(one));
    ball.insert_child_last(Packet::new(
        "Vertex normal surfaces",
        PacketContent::NormalSurfaces(one_tetrahedron_surfaces()),
    ));
    ball.insert_child_last(Packet::new(
        "Angle structures",
        PacketContent::AngleStructures(AngleStructureList::default()),
    ));

    let script = Script {
        text: "print(tri.size())\nprint(ball.isValid())\n".to_string(),
        variables: vec![
            ScriptVariable {
                name: "tri".to_string(),
                value: Some(std::rc::Rc::downgrade(&sphere3)),
            },
            ScriptVariable {
                name: "ball".to_string(),
                value: Some(std::rc::Rc::downgrade(&ball)),
            },
        ],
    };

    let triangulations = Packet::new("Triangulations", PacketContent::Container);
    triangulations.insert_child_last(sphere2);
    triangulations.insert_child_last(sphere3);
    triangulations.insert_child_last(sphere4);
    triangulations.insert_child_last(ball);
    root.insert_child_last(triangulations);
    root.insert_child_last(Packet::new("Sizes", PacketContent::Script(script)));

    let filters = Packet::new("Filters", PacketContent::Container);
    filters.insert_child_last(Packet::new(
        "Everything",
        PacketContent::SurfaceFilter(SurfaceFilter::Trivial),
    ));
    let discs = Packet::new(
        "Discs",
        PacketContent::SurfaceFilter(SurfaceFilter::Properties(PropertiesFilter {
            orientability: BoolSet::Yes,
            compactness: BoolSet::Yes,
            boundary: BoolSet::Yes,
            euler: BTreeSet::from([1]),
        })),
    );
    let closed = Packet::new(
        "Closed",
        PacketContent::SurfaceFilter(SurfaceFilter::Properties(PropertiesFilter {
            boundary: BoolSet::No,
            ..PropertiesFilter::default()
        })),
    );
    let either = Packet::new(
        "Discs or closed",
        PacketContent::SurfaceFilter(SurfaceFilter::Combination { use_and: false }),
    );
    either.insert_child_last(discs);
    either.insert_child_last(closed);
    filters.insert_child_last(either);
    root.insert_child_last(filters);

    root.insert_child_last(Packet::new("Notes", PacketContent::Pdf(DEMO_PDF.to_vec())));

    tracing::debug!(
        "Built sample document with {} packets",
        root.descendant_count() + 1
    );
    root
}
