// Day-by-day "lowest price" calendar for a hotel

use crate::calendar_store::CalendarLookup;
use crate::model::{DayPriceEntry, PriceCalendar, RoomType};
use chrono::{Duration, NaiveDate};
use tracing::debug;

/// Build one entry per day of `[window_start, window_start + day_count)`.
///
/// A room type without a calendar row for a day is offered at its base price;
/// a row with no stock removes it from that day. After the whole window is
/// known, every day whose minimum is within `low_price_threshold` of the
/// window-wide minimum is flagged `low`.
pub fn build(
    window_start: NaiveDate,
    day_count: i64,
    room_types: &[RoomType],
    calendar: &impl CalendarLookup,
    low_price_threshold: i64,
) -> Vec<DayPriceEntry> {
    if day_count <= 0 {
        return Vec::new();
    }

    let active: Vec<&RoomType> = room_types.iter().filter(|room_type| room_type.active).collect();

    let mut days: Vec<DayPriceEntry> = (0..day_count)
        .map(|offset| {
            let date = window_start + Duration::days(offset);
            let min_price = active
                .iter()
                .filter_map(|room_type| match calendar.day_rate(&room_type.id, date) {
                    Some(rate) if rate.is_sold_out() => None,
                    Some(rate) => Some(rate.price),
                    None => Some(room_type.base_price),
                })
                .min();
            DayPriceEntry {
                date,
                min_price,
                has_stock: min_price.is_some(),
                low: false,
            }
        })
        .collect();

    let Some(global_min) = days.iter().filter_map(|day| day.min_price).min() else {
        debug!(%window_start, day_count, "no sellable day in window");
        return days;
    };

    for day in &mut days {
        day.low = day
            .min_price
            .map_or(false, |price| price <= global_min + low_price_threshold);
    }

    days
}

// Wrap `build` with the window bounds the caller reports back
pub fn build_calendar(
    window_start: NaiveDate,
    day_count: i64,
    room_types: &[RoomType],
    calendar: &impl CalendarLookup,
    low_price_threshold: i64,
) -> PriceCalendar {
    let list = build(window_start, day_count, room_types, calendar, low_price_threshold);
    let end_date = list.last().map_or(window_start, |day| day.date);
    PriceCalendar {
        start_date: window_start,
        end_date,
        list,
    }
}
