// Async pricing service: fetches a hotel's room types and calendar rows from
// the catalog, then runs the pure pricing, calendar and allocation components
// over one read snapshot.

use crate::allocation::{AllocationEngine, BookingTargets, TargetError};
use crate::calendar_store::{CalendarSnapshot, InMemoryCalendarStore};
use crate::config::EngineConfig;
use crate::model::{CalendarEntry, Hotel, PriceCalendar, RoomListEntry, RoomType};
use crate::price_calendar;
use crate::query::{CalendarQuery, QueryError, StayQuery};
use crate::room_list::{RoomListFilter, RoomListOrder, RoomTypeListBuilder};
use async_trait::async_trait;
use chrono::{Duration as DateDuration, NaiveDate};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Hotel not found: {0}")]
    HotelNotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("Invalid booking targets: {0}")]
    InvalidTargets(#[from] TargetError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Catalog request timeout after {0}ms")]
    Timeout(u64),
}

// Read side of the hotel catalog; implemented by the storage layer
#[async_trait]
pub trait HotelCatalog: Send + Sync + 'static {
    async fn hotel(&self, hotel_id: &str) -> Result<Option<Hotel>, CatalogError>;

    // All room types of the hotel, active or not, in catalog order
    async fn room_types(&self, hotel_id: &str) -> Result<Vec<RoomType>, CatalogError>;

    // Calendar rows of every room type of the hotel inside `[from, to)`
    async fn calendar_entries(
        &self,
        hotel_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEntry>, CatalogError>;
}

pub struct PricingService<C: HotelCatalog> {
    catalog: Arc<C>,
    config: EngineConfig,
}

impl<C: HotelCatalog> PricingService<C> {
    pub fn new(catalog: Arc<C>, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // Apply the configured per-fetch timeout to one catalog call
    async fn bounded<T>(
        &self,
        what: &'static str,
        fetch: impl Future<Output = Result<T, CatalogError>>,
    ) -> Result<T, ServiceError> {
        let limit_ms = self.config.fetch_timeout_ms;
        match tokio::time::timeout(Duration::from_millis(limit_ms), fetch).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(what, timeout_ms = limit_ms, "catalog fetch timed out");
                Err(ServiceError::Timeout(limit_ms))
            }
        }
    }

    // Hidden and unknown hotels never reach the engine
    async fn ensure_visible(&self, hotel_id: &str) -> Result<(), ServiceError> {
        match self.bounded("hotel", self.catalog.hotel(hotel_id)).await? {
            Some(hotel) if hotel.visible => Ok(()),
            _ => Err(ServiceError::HotelNotFound(hotel_id.to_string())),
        }
    }

    // Room types plus a calendar snapshot of `[from, to)`, fetched concurrently
    async fn load(
        &self,
        hotel_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(Vec<RoomType>, CalendarSnapshot), ServiceError> {
        let (room_types, entries) = futures::try_join!(
            self.bounded("room_types", self.catalog.room_types(hotel_id)),
            self.bounded("calendar", self.catalog.calendar_entries(hotel_id, from, to)),
        )?;
        Ok((room_types, entries.into_iter().collect()))
    }

    pub async fn room_list(
        &self,
        hotel_id: &str,
        query: &StayQuery,
        filter: &RoomListFilter,
    ) -> Result<Vec<RoomListEntry>, ServiceError> {
        let stay = query.stay_range()?;
        self.ensure_visible(hotel_id).await?;

        let (room_types, snapshot) = match &stay {
            Some(stay) => self.load(hotel_id, stay.check_in(), stay.check_out()).await?,
            None => (
                self.bounded("room_types", self.catalog.room_types(hotel_id)).await?,
                CalendarSnapshot::default(),
            ),
        };

        let rooms = RoomTypeListBuilder::new(&snapshot)
            .order(RoomListOrder::PriceAscending)
            .filter(filter.clone())
            .build(&room_types, stay.as_ref());

        info!(
            hotel_id,
            nights = stay.map_or(0, |s| s.nights()),
            room_types = room_types.len(),
            sellable = rooms.len(),
            "room list resolved"
        );
        Ok(rooms)
    }

    pub async fn price_calendar(
        &self,
        hotel_id: &str,
        query: &CalendarQuery,
        today: NaiveDate,
    ) -> Result<PriceCalendar, ServiceError> {
        let window = query.window(today, &self.config)?;
        self.ensure_visible(hotel_id).await?;

        let window_end = window.start + DateDuration::days(window.days);
        let (room_types, snapshot) = self.load(hotel_id, window.start, window_end).await?;

        let calendar = price_calendar::build_calendar(
            window.start,
            window.days,
            &room_types,
            &snapshot,
            self.config.low_price_threshold,
        );

        info!(
            hotel_id,
            start = %calendar.start_date,
            days = window.days,
            sellable_days = calendar.list.iter().filter(|day| day.has_stock).count(),
            "price calendar built"
        );
        Ok(calendar)
    }

    // Start a booking screen: sellable rooms for the stay plus validated targets
    pub async fn allocation_session(
        &self,
        hotel_id: &str,
        query: &StayQuery,
        room_target: u32,
    ) -> Result<AllocationEngine, ServiceError> {
        let targets = BookingTargets::from_stay_query(room_target, query)?;
        let nights = query.stay_range()?.map_or(0, |stay| stay.nights());
        let rooms = self
            .room_list(hotel_id, query, &RoomListFilter::default())
            .await?;
        Ok(AllocationEngine::new(rooms, targets, nights, &self.config))
    }
}

struct HotelRecord {
    hotel: Hotel,
    room_types: Vec<RoomType>,
}

// Catalog held entirely in memory; backs tests, benches and local demos
#[derive(Default)]
pub struct InMemoryCatalog {
    hotels: RwLock<HashMap<String, HotelRecord>>,
    calendar: InMemoryCalendarStore,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hotel(&self, hotel: Hotel, room_types: Vec<RoomType>) {
        self.hotels
            .write()
            .insert(hotel.id.clone(), HotelRecord { hotel, room_types });
    }

    pub fn set_visible(&self, hotel_id: &str, visible: bool) -> bool {
        match self.hotels.write().get_mut(hotel_id) {
            Some(record) => {
                record.hotel.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn calendar(&self) -> &InMemoryCalendarStore {
        &self.calendar
    }
}

#[async_trait]
impl HotelCatalog for InMemoryCatalog {
    async fn hotel(&self, hotel_id: &str) -> Result<Option<Hotel>, CatalogError> {
        Ok(self
            .hotels
            .read()
            .get(hotel_id)
            .map(|record| record.hotel.clone()))
    }

    async fn room_types(&self, hotel_id: &str) -> Result<Vec<RoomType>, CatalogError> {
        Ok(self
            .hotels
            .read()
            .get(hotel_id)
            .map(|record| record.room_types.clone())
            .unwrap_or_default())
    }

    async fn calendar_entries(
        &self,
        hotel_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEntry>, CatalogError> {
        let ids: Vec<String> = self
            .hotels
            .read()
            .get(hotel_id)
            .map(|record| record.room_types.iter().map(|rt| rt.id.clone()).collect())
            .unwrap_or_default();
        Ok(self.calendar.entries_between(&ids, from, to))
    }
}
