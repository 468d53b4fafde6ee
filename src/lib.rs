// Stay-range pricing, low-price calendar and multi-room-type allocation for
// hotel bookings

// Engine modules, in dependency order
pub mod model;
pub mod config;
pub mod calendar_store;
pub mod stay_pricing;
pub mod room_list;
pub mod price_calendar;
pub mod query;
pub mod allocation;
pub mod service;

// Re-export key types for convenience
pub use allocation::{
    AllocationEngine, AllocationSummary, BookingLine, BookingTargets, Selection, SelectionState,
    TargetError,
};
pub use calendar_store::{CalendarLookup, CalendarSnapshot, InMemoryCalendarStore};
pub use config::{EngineConfig, LOW_PRICE_THRESHOLD, MAX_SELECTABLE_PER_TYPE};
pub use model::{
    CalendarEntry, DayPriceEntry, DayRate, Hotel, PriceCalendar, PricingResult, RoomListEntry,
    RoomType, StayRange,
};
pub use query::{CalendarQuery, QueryError, StayQuery};
pub use room_list::{RoomListFilter, RoomListOrder, RoomTypeListBuilder};
pub use service::{CatalogError, HotelCatalog, InMemoryCatalog, PricingService, ServiceError};
