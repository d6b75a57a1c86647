//! Engine-owned data types.
//!
//! Everything here is defined by the native engine side of the boundary.
//! The bridge passes these values through opaquely: it never interprets a
//! definition's geometry or mutates a region's status.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Stable identity of an offline region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(pub u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Download activity of a region, owned entirely by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadState {
    /// No download in progress.
    #[default]
    Inactive,
    /// The engine is actively downloading resources for this region.
    Active,
}

/// Mutable status of a region.
///
/// The engine owns all mutation; the bridge only ever reads a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionStatus {
    /// Current download activity.
    pub download_state: DownloadState,
    /// Number of resources downloaded so far.
    pub completed_resource_count: u64,
    /// Total size in bytes of the downloaded resources.
    pub completed_resource_size: u64,
}

/// Geographic bounding box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    /// Southern latitude bound.
    pub south: f64,
    /// Western longitude bound.
    pub west: f64,
    /// Northern latitude bound.
    pub north: f64,
    /// Eastern longitude bound.
    pub east: f64,
}

impl LatLngBounds {
    /// Create bounds from south/west/north/east degrees.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Whether south ≤ north and west ≤ east.
    pub fn is_ordered(&self) -> bool {
        self.south <= self.north && self.west <= self.east
    }
}

/// The tile-pyramid region shape: everything within a bounding box across a
/// zoom range, for one style.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePyramidDefinition {
    /// URL of the style the region is downloaded for.
    pub style_url: String,
    /// Geographic extent of the region.
    pub bounds: LatLngBounds,
    /// Minimum zoom level to download.
    pub min_zoom: f64,
    /// Maximum zoom level to download.
    pub max_zoom: f64,
    /// Device pixel ratio the tiles are requested at.
    pub pixel_ratio: f32,
}

/// The download scope of a region.
///
/// A tagged union so additional shapes (for example geometry-bounded
/// regions) can be added without changing the bridge: the bridge forwards
/// definitions opaquely and never matches on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionDefinition {
    /// A bounding box + zoom range pyramid of tiles.
    TilePyramid(TilePyramidDefinition),
}

/// A persisted, independently downloadable offline map area.
///
/// Engine-owned. The bridge requests creation and listing, then wraps the
/// result; it never mutates a region's fields.
#[derive(Debug, Clone)]
pub struct Region {
    id: RegionId,
    definition: RegionDefinition,
    metadata: Bytes,
    status: RegionStatus,
}

impl Region {
    pub(crate) fn new(id: RegionId, definition: RegionDefinition, metadata: Bytes) -> Self {
        Self {
            id,
            definition,
            metadata,
            status: RegionStatus::default(),
        }
    }

    /// The region's stable identity.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The definition the region was created with.
    pub fn definition(&self) -> &RegionDefinition {
        &self.definition
    }

    /// The host-defined metadata blob. Empty when none was supplied.
    pub fn metadata(&self) -> &Bytes {
        &self.metadata
    }

    /// Snapshot of the region's mutable status.
    pub fn status(&self) -> RegionStatus {
        self.status
    }
}

/// What a cached resource is, as far as the engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Not classified; plain-URL seeds store as this.
    Unknown,
    /// A style document.
    Style,
    /// A source description.
    Source,
    /// A map tile.
    Tile,
    /// A glyph range.
    Glyphs,
    /// A sprite image.
    SpriteImage,
    /// A sprite index.
    SpriteJson,
}

/// How tile rows are numbered in a tile URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileScheme {
    /// Slippy-map numbering, row 0 at the north edge.
    Xyz,
    /// TMS numbering, row 0 at the south edge.
    Tms,
}

impl TileScheme {
    fn as_str(&self) -> &'static str {
        match self {
            TileScheme::Xyz => "xyz",
            TileScheme::Tms => "tms",
        }
    }
}

/// Addresses one resource in the engine's cache.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceKey {
    /// A resource addressed by plain URL.
    Url {
        /// Classification of the resource.
        kind: ResourceKind,
        /// The resource URL.
        url: String,
    },
    /// A tile addressed by URL template and grid coordinates.
    Tile {
        /// The tile URL template.
        url_template: String,
        /// Device pixel ratio.
        pixel_ratio: f32,
        /// Tile column.
        x: u32,
        /// Tile row.
        y: u32,
        /// Zoom level.
        z: u8,
        /// Row numbering scheme.
        scheme: TileScheme,
    },
}

impl ResourceKey {
    /// Key for a plain, unclassified URL resource.
    pub fn url(url: impl Into<String>) -> Self {
        ResourceKey::Url {
            kind: ResourceKind::Unknown,
            url: url.into(),
        }
    }

    /// Key for a tile resource.
    pub fn tile(
        url_template: impl Into<String>,
        pixel_ratio: f32,
        x: u32,
        y: u32,
        z: u8,
        scheme: TileScheme,
    ) -> Self {
        ResourceKey::Tile {
            url_template: url_template.into(),
            pixel_ratio,
            x,
            y,
            z,
            scheme,
        }
    }

    /// The kind of resource this key addresses.
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceKey::Url { kind, .. } => *kind,
            ResourceKey::Tile { .. } => ResourceKind::Tile,
        }
    }

    /// Whether this key addresses a tile.
    pub fn is_tile(&self) -> bool {
        matches!(self, ResourceKey::Tile { .. })
    }

    /// Storage key string.
    ///
    /// Human-readable for debugging: `url:{url}` for plain resources,
    /// `tile:{z}:{x}:{y}:{ratio}:{scheme}:{template}` for tiles.
    pub fn cache_key(&self) -> String {
        match self {
            ResourceKey::Url { url, .. } => format!("url:{url}"),
            ResourceKey::Tile {
                url_template,
                pixel_ratio,
                x,
                y,
                z,
                scheme,
            } => format!(
                "tile:{z}:{x}:{y}:{pixel_ratio}:{}:{url_template}",
                scheme.as_str()
            ),
        }
    }
}

/// A response stored in the engine's cache as if it had been fetched.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// The resource payload.
    pub data: Bytes,
    /// When the entry expires.
    pub expires: DateTime<Utc>,
    /// Validation tag. Seeded entries carry none.
    pub etag: Option<String>,
    /// Last-modified timestamp. Seeded entries carry none.
    pub modified: Option<DateTime<Utc>>,
}

impl CachedResponse {
    /// A response with payload and expiry but no validation metadata.
    pub fn new(data: Bytes, expires: DateTime<Utc>) -> Self {
        Self {
            data,
            expires,
            etag: None,
            modified: None,
        }
    }
}
