// Stay-range price resolution for a single room type

use crate::calendar_store::CalendarLookup;
use crate::model::{PricingResult, RoomType, StayRange};
use tracing::debug;

/// Resolve the nightly price, total price and binding stock of `room_type`
/// for `stay`.
///
/// - No stay range: base price, no total, unconstrained stock.
/// - Any covered night with zero stock: the whole stay is unavailable.
/// - Some nights without a calendar row: still sellable at base price, but the
///   total is unknown.
/// - Every night priced: the total is the sum of nightly prices and the
///   nightly price is the rounded average.
pub fn resolve(room_type: &RoomType, stay: Option<&StayRange>, calendar: &impl CalendarLookup) -> PricingResult {
    let Some(stay) = stay else {
        return unconstrained(room_type);
    };

    let nights = stay.nights();
    let mut total_price: i64 = 0;
    let mut priced_days: i64 = 0;
    let mut binding_stock: Option<i32> = None;
    let mut missing_calendar = false;

    for date in stay.dates() {
        let Some(rate) = calendar.day_rate(&room_type.id, date) else {
            missing_calendar = true;
            continue;
        };

        if rate.is_sold_out() {
            debug!(room_type = %room_type.id, %date, "night sold out, stay unavailable");
            return PricingResult {
                nightly_price: room_type.base_price,
                total_price: None,
                binding_stock: Some(0),
                has_stock: false,
            };
        }

        total_price += rate.price;
        priced_days += 1;
        binding_stock = Some(binding_stock.map_or(rate.stock, |stock| stock.min(rate.stock)));
    }

    if missing_calendar || priced_days != nights {
        debug!(
            room_type = %room_type.id,
            priced_days,
            nights,
            "calendar coverage incomplete, falling back to base price"
        );
        return unconstrained(room_type);
    }

    PricingResult {
        nightly_price: rounded_average(total_price, nights),
        total_price: Some(total_price),
        binding_stock,
        has_stock: true,
    }
}

fn unconstrained(room_type: &RoomType) -> PricingResult {
    PricingResult {
        nightly_price: room_type.base_price,
        total_price: None,
        binding_stock: None,
        has_stock: true,
    }
}

// Round half up; callers guarantee nights >= 1 and a non-negative total
fn rounded_average(total: i64, nights: i64) -> i64 {
    (total + nights / 2) / nights
}
