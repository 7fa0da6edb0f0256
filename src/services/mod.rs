// External collaborator boundaries: blob storage and city resolution

pub mod blob;
pub mod geocode;

pub use blob::{ApiBlobStore, BlobStore, UploadError};
pub use geocode::{CityResolver, GeocodeError, NominatimResolver, UNKNOWN_CITY};
