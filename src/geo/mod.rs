//! Geographic primitives: map origins and local-to-geographic projection.
//!
//! Map layers and scene logs store positions as planar metres relative to a
//! per-location origin. That origin is a point in a UTM zone, so turning a
//! local `(x, y)` into latitude/longitude is an offset followed by the
//! inverse transverse Mercator projection for the zone.

mod origin;
mod projection;

pub use origin::{MapOrigin, OriginTable, BUILTIN_LOCATIONS};
pub use projection::{utm_to_lat_lon, LatLon, Projector};
