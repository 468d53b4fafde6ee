use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{thread_rng, Rng};
use std::sync::Arc;
use std::thread;
use stay_pricing_engine::{
    price_calendar, CalendarEntry, InMemoryCalendarStore, RoomType, RoomTypeListBuilder, StayRange,
    LOW_PRICE_THRESHOLD,
};

fn room_types(count: usize) -> Vec<RoomType> {
    (0..count)
        .map(|i| RoomType {
            id: format!("rt{}", i),
            name: format!("Room {}", i),
            base_price: 200 + (i as i64 % 7) * 40,
            currency: "CNY".to_string(),
            max_guests: 1 + (i as u32 % 4),
            breakfast: i % 2 == 0,
            refundable: i % 3 != 0,
            area_m2: Some(20 + i as u32),
            cover_image: None,
            active: true,
        })
        .collect()
}

// Roughly 90% calendar coverage with the occasional sold-out night
fn seeded_store(rooms: &[RoomType], start: NaiveDate, days: i64) -> InMemoryCalendarStore {
    let mut rng = thread_rng();
    let store = InMemoryCalendarStore::new();
    for room in rooms {
        for offset in 0..days {
            if rng.gen_bool(0.1) {
                continue;
            }
            store.upsert(CalendarEntry {
                room_type_id: room.id.clone(),
                date: start + Duration::days(offset),
                price: room.base_price + rng.gen_range(-30..60),
                stock: if rng.gen_bool(0.05) { 0 } else { rng.gen_range(1..10) },
            });
        }
    }
    store
}

// Room lists for random stays, priced concurrently against one shared store
pub fn room_list_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stay_room_list");
    let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    for room_count in [5usize, 20, 80].iter() {
        let rooms = Arc::new(room_types(*room_count));
        let store = Arc::new(seeded_store(&rooms, start, 120));

        group.bench_with_input(
            BenchmarkId::from_parameter(room_count),
            room_count,
            |b, _| {
                b.iter(|| {
                    let mut handles = vec![];
                    for _ in 0..4 {
                        let rooms = Arc::clone(&rooms);
                        let store = Arc::clone(&store);
                        handles.push(thread::spawn(move || {
                            let mut rng = thread_rng();
                            let mut sellable = 0;
                            for _ in 0..50 {
                                let check_in = start + Duration::days(rng.gen_range(0..100));
                                let check_out = check_in + Duration::days(rng.gen_range(1..14));
                                let stay = StayRange::new(check_in, check_out);
                                sellable += RoomTypeListBuilder::new(store.as_ref())
                                    .build(&rooms, stay.as_ref())
                                    .len();
                            }
                            sellable
                        }));
                    }
                    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
                    black_box(total)
                });
            },
        );
    }

    group.finish();
}

pub fn price_calendar_benchmark(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let rooms = room_types(20);
    let store = seeded_store(&rooms, start, 365);

    c.bench_function("price_calendar_365_days", |b| {
        b.iter(|| {
            black_box(price_calendar::build(
                start,
                365,
                &rooms,
                &store,
                LOW_PRICE_THRESHOLD,
            ))
        })
    });
}

criterion_group!(benches, room_list_benchmark, price_calendar_benchmark);
criterion_main!(benches);
