//! Read-only projections over maps and regions.
//!
//! # Invariants
//! - Every call runs on one read snapshot; no partial writes are visible.
//! - Absence of a current map is `Ok(None)`, never an error.
//! - Id-based lookups fail with `*NotFound` or `*NotOwned`.

use crate::model::body_map::{BodyMap, MapId, MapWithRegions};
use crate::model::region::{Region, RegionId};
use crate::model::user::UserId;
use crate::repo::map_repo::MapRepository;
use crate::repo::region_repo::RegionRepository;
use crate::repo::store_set::StoreSet;
use crate::service::error::{BodyMapError, ServiceResult};
use crate::service::ownership::{owned_map, owned_region};

/// Query facade composed from the map and region stores.
pub struct QueryService<S: StoreSet> {
    stores: S,
}

impl<S: StoreSet> QueryService<S> {
    pub fn new(stores: S) -> Self {
        Self { stores }
    }

    /// Returns the user's current map with its regions, if any.
    pub fn get_current_map(&self, user: &UserId) -> ServiceResult<Option<MapWithRegions>> {
        self.stores.read_scope(|stores| {
            match stores.maps().find_current_map(user)? {
                Some(map) => Ok(Some(with_regions(stores, map)?)),
                None => Ok(None),
            }
        })
    }

    /// Returns the user's saved maps ordered by `saved_at` ascending.
    pub fn get_saved_maps(&self, user: &UserId) -> ServiceResult<Vec<MapWithRegions>> {
        self.stores.read_scope(|stores| {
            stores
                .maps()
                .list_saved_maps(user)?
                .into_iter()
                .map(|map| with_regions(stores, map))
                .collect()
        })
    }

    /// Returns one saved map of the user.
    ///
    /// A current map id is reported as `MapNotFound`: it is not history yet.
    pub fn get_saved_map(&self, user: &UserId, map_id: MapId) -> ServiceResult<MapWithRegions> {
        self.stores.read_scope(|stores| {
            let map = owned_map(stores, user, map_id)?;
            if map.is_current() {
                return Err(BodyMapError::MapNotFound(map_id));
            }
            with_regions(stores, map)
        })
    }

    pub fn get_region(&self, user: &UserId, region_id: RegionId) -> ServiceResult<Region> {
        self.stores
            .read_scope(|stores| owned_region(stores, user, region_id).map(|(region, _)| region))
    }

    /// Returns the regions of one owned map in creation order.
    pub fn get_regions_for_map(
        &self,
        user: &UserId,
        map_id: MapId,
    ) -> ServiceResult<Vec<Region>> {
        self.stores.read_scope(|stores| {
            let map = owned_map(stores, user, map_id)?;
            Ok(stores.regions().list_regions_for_map(map.id)?)
        })
    }
}

fn with_regions<S: StoreSet>(stores: &S, map: BodyMap) -> ServiceResult<MapWithRegions> {
    let regions = stores.regions().list_regions_for_map(map.id)?;
    Ok(MapWithRegions { map, regions })
}
