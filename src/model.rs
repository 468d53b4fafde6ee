// Core data model shared by pricing, the price calendar and allocation

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

// Room type as stored by the hotel catalog
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub id: String,
    pub name: String,
    pub base_price: i64,
    pub currency: String,
    pub max_guests: u32,
    pub breakfast: bool,
    pub refundable: bool,
    #[serde(default, rename = "areaM2")]
    pub area_m2: Option<u32>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub active: bool,
}

// One (price, stock) row of the per-day calendar
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub room_type_id: String,
    pub date: NaiveDate,
    pub price: i64,
    pub stock: i32,
}

impl CalendarEntry {
    pub fn day_rate(&self) -> DayRate {
        DayRate {
            price: self.price,
            stock: self.stock,
        }
    }
}

// The value half of a calendar entry, as returned by lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRate {
    pub price: i64,
    pub stock: i32,
}

impl DayRate {
    pub fn is_sold_out(&self) -> bool {
        self.stock <= 0
    }
}

/// Half-open stay interval `[check_in, check_out)`.
///
/// Only constructible with at least one night; anything else is "no stay
/// range" and is represented by `Option::<StayRange>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Option<Self> {
        if check_out > check_in {
            Some(Self {
                check_in,
                check_out,
            })
        } else {
            None
        }
    }

    // Missing either end means no stay range at all
    pub fn from_optional(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> Option<Self> {
        match (check_in, check_out) {
            (Some(check_in), Some(check_out)) => Self::new(check_in, check_out),
            _ => None,
        }
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    // Every occupied night, check-out day excluded
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.check_in;
        (0..self.nights()).map(move |offset| start + Duration::days(offset))
    }
}

// Resolved price for one room type over one stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub nightly_price: i64,
    pub total_price: Option<i64>,
    pub binding_stock: Option<i32>,
    pub has_stock: bool,
}

// Sellable room type as it crosses the transport boundary
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "basePrice")]
    pub nightly_price: i64,
    pub currency: String,
    pub max_guests: u32,
    pub breakfast: bool,
    pub refundable: bool,
    #[serde(rename = "areaM2")]
    pub area_m2: Option<u32>,
    pub cover_image: Option<String>,
    #[serde(rename = "stock")]
    pub binding_stock: Option<i32>,
    pub total_price: Option<i64>,
}

impl RoomListEntry {
    pub fn from_pricing(room_type: &RoomType, pricing: &PricingResult) -> Self {
        Self {
            id: room_type.id.clone(),
            name: room_type.name.clone(),
            nightly_price: pricing.nightly_price,
            currency: room_type.currency.clone(),
            max_guests: room_type.max_guests,
            breakfast: room_type.breakfast,
            refundable: room_type.refundable,
            area_m2: room_type.area_m2,
            cover_image: room_type.cover_image.clone(),
            binding_stock: pricing.binding_stock,
            total_price: pricing.total_price,
        }
    }
}

// One day of the aggregated price calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPriceEntry {
    pub date: NaiveDate,
    pub min_price: Option<i64>,
    pub has_stock: bool,
    pub low: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCalendar {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub list: Vec<DayPriceEntry>,
}

// Hotel header as seen by the catalog; only visible hotels are served
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub visible: bool,
}
