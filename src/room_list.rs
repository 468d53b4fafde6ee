// Sellable room list for one hotel and one stay

use crate::calendar_store::CalendarLookup;
use crate::model::{RoomListEntry, RoomType, StayRange};
use crate::stay_pricing;
use serde::Deserialize;
use tracing::debug;

// How the caller wants the sellable list ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomListOrder {
    // Catalog order
    #[default]
    AsListed,
    // Nightly price, cheapest first; ties by room type id
    PriceAscending,
}

// Optional post-pricing filters for the room list
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomListFilter {
    pub min_guests: Option<u32>,
    pub max_nightly_price: Option<i64>,
    pub breakfast_only: bool,
    pub refundable_only: bool,
}

impl RoomListFilter {
    pub fn matches(&self, room: &RoomListEntry) -> bool {
        if !self.min_guests.map_or(true, |min| room.max_guests >= min) {
            return false;
        }

        if !self
            .max_nightly_price
            .map_or(true, |max| room.nightly_price <= max)
        {
            return false;
        }

        if self.breakfast_only && !room.breakfast {
            return false;
        }

        if self.refundable_only && !room.refundable {
            return false;
        }

        true
    }
}

pub struct RoomTypeListBuilder<'a, L: CalendarLookup> {
    calendar: &'a L,
    order: RoomListOrder,
    filter: RoomListFilter,
}

impl<'a, L: CalendarLookup> RoomTypeListBuilder<'a, L> {
    pub fn new(calendar: &'a L) -> Self {
        Self {
            calendar,
            order: RoomListOrder::default(),
            filter: RoomListFilter::default(),
        }
    }

    pub fn order(mut self, order: RoomListOrder) -> Self {
        self.order = order;
        self
    }

    pub fn filter(mut self, filter: RoomListFilter) -> Self {
        self.filter = filter;
        self
    }

    // Price every active room type for the stay and keep the sellable ones
    pub fn build(&self, room_types: &[RoomType], stay: Option<&StayRange>) -> Vec<RoomListEntry> {
        let mut rooms = Vec::new();

        for room_type in room_types.iter().filter(|room_type| room_type.active) {
            let pricing = stay_pricing::resolve(room_type, stay, self.calendar);
            if !pricing.has_stock {
                debug!(room_type = %room_type.id, "dropping sold-out room type");
                continue;
            }

            let entry = RoomListEntry::from_pricing(room_type, &pricing);
            if self.filter.matches(&entry) {
                rooms.push(entry);
            }
        }

        if self.order == RoomListOrder::PriceAscending {
            rooms.sort_by(|a, b| {
                a.nightly_price
                    .cmp(&b.nightly_price)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        rooms
    }
}
