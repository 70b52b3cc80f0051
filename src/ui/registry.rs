//! Process-wide viewer registry
//!
//! Maps a packet type (and, for surface filters, the filter sub-type) to a
//! viewer factory. Lookup tries the exact `(type, subtype)` key, then the
//! type alone, then falls back to [`DefaultViewer`]. A factory error yields
//! an [`ErrorViewer`], so opening a packet always produces a usable pane.
//!
//! The registry is built once, eagerly, by [`init`] and is read-only
//! afterwards.

use crate::error::{Result, UiError};
use crate::packet::{FilterType, PacketRef, PacketType};
use std::collections::HashMap;
use std::sync::OnceLock;

use super::packets;
use super::viewer::{DefaultViewer, ErrorViewer, PacketViewer, PaneContext};

/// Builds a viewer for one packet inside one pane
pub type ViewerFactory = fn(&PacketRef, &PaneContext) -> Result<Box<dyn PacketViewer>>;

type Key = (PacketType, Option<FilterType>);

#[derive(Default)]
pub struct ViewerRegistry {
    factories: HashMap<Key, ViewerFactory>,
}

static REGISTRY: OnceLock<ViewerRegistry> = OnceLock::new();

/// Build the registry; call once during startup
pub fn init() -> &'static ViewerRegistry {
    REGISTRY.get_or_init(|| {
        let registry = ViewerRegistry::builtin();
        tracing::debug!(
            "Viewer registry ready: {} factories",
            registry.factories.len()
        );
        registry
    })
}

/// The process-wide registry, built on first use if [`init`] was skipped
pub fn registry() -> &'static ViewerRegistry {
    init()
}

impl ViewerRegistry {
    /// Every viewer this crate ships
    pub fn builtin() -> Self {
        let mut r = Self::default();
        r.register(PacketType::Container, packets::container::create);
        r.register(PacketType::Text, packets::text::create);
        r.register(PacketType::Script, packets::script::create);
        r.register(PacketType::Triangulation2, packets::triangulation::create);
        r.register(PacketType::Triangulation3, packets::triangulation::create);
        r.register(PacketType::Triangulation4, packets::triangulation::create);
        r.register(PacketType::NormalSurfaces, packets::surfaces::create);
        r.register(PacketType::Pdf, packets::pdf::create);
        r.register(PacketType::SurfaceFilter, packets::filter::create_plain);
        r.register_filter(FilterType::Properties, packets::filter::create_properties);
        r.register_filter(FilterType::Combination, packets::filter::create_combination);
        r
    }

    pub fn register(&mut self, packet_type: PacketType, factory: ViewerFactory) {
        self.factories.insert((packet_type, None), factory);
    }

    pub fn register_filter(&mut self, filter_type: FilterType, factory: ViewerFactory) {
        self.factories
            .insert((PacketType::SurfaceFilter, Some(filter_type)), factory);
    }

    /// Factory for this packet, most specific match first
    pub fn lookup(&self, packet_type: PacketType, filter: Option<FilterType>) -> Option<ViewerFactory> {
        filter
            .and_then(|f| self.factories.get(&(packet_type, Some(f))))
            .or_else(|| self.factories.get(&(packet_type, None)))
            .copied()
    }

    /// Packet types with a registered factory (excluding sub-type entries)
    pub fn registered_types(&self) -> Vec<PacketType> {
        let mut types: Vec<PacketType> = self
            .factories
            .keys()
            .filter(|(_, sub)| sub.is_none())
            .map(|(t, _)| *t)
            .collect();
        types.sort();
        types
    }

    /// Build the viewer for `packet`; never fails
    pub fn create_viewer(&self, packet: &PacketRef, ctx: &PaneContext) -> Box<dyn PacketViewer> {
        let Some(factory) = self.lookup(packet.packet_type(), packet.filter_type()) else {
            tracing::debug!("No viewer registered for {}", packet.full_name());
            return Box::new(DefaultViewer::new(packet));
        };
        match factory(packet, ctx) {
            Ok(viewer) => viewer,
            Err(err) => {
                tracing::warn!("Viewer for {} failed: {}", packet.full_name(), err);
                let message = match err {
                    UiError::ViewerConstruction { reason, .. } => reason,
                    other => other.to_string(),
                };
                Box::new(ErrorViewer::new(packet, message))
            }
        }
    }
}
