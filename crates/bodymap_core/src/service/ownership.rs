//! Ownership resolution shared by scoring and query services.
//!
//! Ownership is checked before lifecycle state, so a foreign map or region
//! always reports `*NotOwned` and never leaks whether it is saved.

use crate::model::body_map::{BodyMap, MapId};
use crate::model::region::{Region, RegionId};
use crate::model::user::UserId;
use crate::repo::map_repo::{MapRepository, RepoError};
use crate::repo::region_repo::RegionRepository;
use crate::repo::store_set::StoreSet;
use crate::service::error::{BodyMapError, ServiceResult};

/// Loads a map that must exist and belong to `user`.
pub(crate) fn owned_map<S: StoreSet>(
    stores: &S,
    user: &UserId,
    map_id: MapId,
) -> ServiceResult<BodyMap> {
    let map = stores
        .maps()
        .get_map(map_id)?
        .ok_or(BodyMapError::MapNotFound(map_id))?;
    if !map.is_owned_by(user) {
        return Err(BodyMapError::MapNotOwned(map_id));
    }
    Ok(map)
}

/// Loads a region plus its map; the map must belong to `user`.
pub(crate) fn owned_region<S: StoreSet>(
    stores: &S,
    user: &UserId,
    region_id: RegionId,
) -> ServiceResult<(Region, BodyMap)> {
    let region = stores
        .regions()
        .get_region(region_id)?
        .ok_or(BodyMapError::RegionNotFound(region_id))?;
    let map = stores.maps().get_map(region.map_id)?.ok_or_else(|| {
        BodyMapError::Repo(RepoError::InvalidData(format!(
            "region {region_id} references missing map {}",
            region.map_id
        )))
    })?;
    if !map.is_owned_by(user) {
        return Err(BodyMapError::RegionNotOwned(region_id));
    }
    Ok((region, map))
}

/// Like [`owned_region`], and the region's map must still be current.
pub(crate) fn mutable_region<S: StoreSet>(
    stores: &S,
    user: &UserId,
    region_id: RegionId,
) -> ServiceResult<(Region, BodyMap)> {
    let (region, map) = owned_region(stores, user, region_id)?;
    if !map.is_current() {
        return Err(BodyMapError::MapNotCurrent(map.id));
    }
    Ok((region, map))
}
