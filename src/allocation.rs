// Multi-room-type allocation: a guest builds a quantity per room type that has
// to meet both a room-count target and a guest-capacity target.
//
// Everything here is a total function over clamped inputs. The host calls
// `normalize` whenever the room list or the room target changes; the
// `AllocationEngine` session object does that on its own setters.

use crate::config::EngineConfig;
use crate::model::RoomListEntry;
use crate::query::StayQuery;
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    #[error("Room target must be positive, got {0}")]
    InvalidRoomTarget(u32),

    #[error("Guest target must be positive, got {0}")]
    InvalidGuestTarget(u32),
}

// Validated room-count and guest-capacity targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTargets {
    rooms: u32,
    guests: u32,
}

impl BookingTargets {
    pub fn new(rooms: u32, guests: u32) -> Result<Self, TargetError> {
        if rooms == 0 {
            return Err(TargetError::InvalidRoomTarget(rooms));
        }
        if guests == 0 {
            return Err(TargetError::InvalidGuestTarget(guests));
        }
        Ok(Self { rooms, guests })
    }

    // Guest target is everyone in the party, children included
    pub fn from_stay_query(rooms: u32, query: &StayQuery) -> Result<Self, TargetError> {
        Self::new(rooms, query.guests())
    }

    pub fn rooms(&self) -> u32 {
        self.rooms
    }

    pub fn guests(&self) -> u32 {
        self.guests
    }
}

/// Quantity per room type, in insertion order.
///
/// Insertion order is the tie-break when overflow is removed, so this is a
/// vector of pairs rather than a hash map. Zero quantities are never stored.
/// Quantities are not clamped here; `normalize` does that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Vec<(String, u32)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self, room_type_id: &str) -> u32 {
        self.items
            .iter()
            .find(|(id, _)| id == room_type_id)
            .map_or(0, |(_, quantity)| *quantity)
    }

    pub fn total(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, (_, quantity)| total.saturating_add(*quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(id, quantity)| (id.as_str(), *quantity))
    }

    // Setting zero removes the entry; a new id goes to the end
    pub fn set(&mut self, room_type_id: &str, quantity: u32) {
        match self.items.iter().position(|(id, _)| id == room_type_id) {
            Some(pos) if quantity == 0 => {
                self.items.remove(pos);
            }
            Some(pos) => self.items[pos].1 = quantity,
            None if quantity > 0 => self.items.push((room_type_id.to_string(), quantity)),
            None => {}
        }
    }
}

impl<S: AsRef<str>> FromIterator<(S, u32)> for Selection {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for (id, quantity) in iter {
            selection.set(id.as_ref(), quantity);
        }
        selection
    }
}

// Where the guest stands relative to the targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionState {
    Empty,
    PartiallyFilled,
    Satisfied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub selected_room_count: u32,
    pub selected_guest_capacity: u32,
    pub room_gap: u32,
    pub capacity_gap: u32,
    pub selected_total_price: i64,
    pub can_submit: bool,
    pub state: SelectionState,
}

// One line handed to the external booking confirmation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingLine {
    pub room_type_id: String,
    pub quantity: u32,
    pub line_total: i64,
}

fn find<'a>(room_types: &'a [RoomListEntry], room_type_id: &str) -> Option<&'a RoomListEntry> {
    room_types.iter().find(|room| room.id == room_type_id)
}

/// Largest quantity the guest may pick for `room`: the UI ceiling, further
/// capped by binding stock when the stay has one.
pub fn max_selectable(room: &RoomListEntry, ceiling: u32) -> u32 {
    room.binding_stock
        .map_or(ceiling, |stock| ceiling.min(stock.max(0) as u32))
}

// Price of one unit of `room` for the whole stay
fn unit_price(room: &RoomListEntry, night_count: i64) -> i64 {
    let night_factor = night_count.max(1);
    room.total_price
        .unwrap_or_else(|| room.nightly_price.saturating_mul(night_factor))
}

/// Bring `selection` back inside its constraints.
///
/// Quantities are clamped to `max_selectable` and entries for room types no
/// longer listed are dropped. If the total still exceeds `room_target`, the
/// overflow is removed one unit at a time, always from the room type with
/// the largest current quantity. Among equal quantities the one added last
/// gives way, so `{A:2, B:1}` trimmed to one room keeps `{A:1}` and a single
/// room of a type is only dropped once nothing larger is left.
pub fn normalize(selection: &Selection, room_types: &[RoomListEntry], room_target: u32, ceiling: u32) -> Selection {
    let mut items: Vec<(String, u32)> = selection
        .iter()
        .filter_map(|(id, quantity)| {
            let room = find(room_types, id)?;
            let clamped = quantity.min(max_selectable(room, ceiling));
            (clamped > 0).then(|| (id.to_string(), clamped))
        })
        .collect();

    let total: u32 = items.iter().map(|(_, quantity)| *quantity).sum();
    let mut overflow = total.saturating_sub(room_target);

    while overflow > 0 {
        // `max_by_key` returns the last of equal maxima
        let Some(idx) = (0..items.len()).max_by_key(|&i| items[i].1) else {
            break;
        };
        items[idx].1 -= 1;
        overflow -= 1;
    }

    items.retain(|(_, quantity)| *quantity > 0);
    Selection { items }
}

/// Add one room of `room_type_id` if the room target and the per-type
/// ceiling allow it. Returns whether the selection changed.
pub fn increment(
    selection: &mut Selection,
    room_types: &[RoomListEntry],
    room_target: u32,
    ceiling: u32,
    room_type_id: &str,
) -> bool {
    let total = selection.total();
    if total >= room_target {
        return false;
    }
    let Some(room) = find(room_types, room_type_id) else {
        return false;
    };

    let current = selection.quantity(room_type_id);
    let step = 1.min(room_target - total);
    let next = current.saturating_add(step).min(max_selectable(room, ceiling));
    if next <= current {
        return false;
    }
    selection.set(room_type_id, next);
    true
}

// Remove one room of `room_type_id`, dropping the entry at zero
pub fn decrement(selection: &mut Selection, room_type_id: &str) -> bool {
    let current = selection.quantity(room_type_id);
    if current == 0 {
        return false;
    }
    selection.set(room_type_id, current - 1);
    true
}

pub fn derive(
    selection: &Selection,
    room_types: &[RoomListEntry],
    room_target: u32,
    guest_target: u32,
    night_count: i64,
) -> AllocationSummary {
    let mut selected_room_count = 0u32;
    let mut selected_guest_capacity = 0u32;
    let mut selected_total_price = 0i64;

    for (id, quantity) in selection.iter() {
        let Some(room) = find(room_types, id) else {
            continue;
        };
        // Selection may not be normalized
        selected_room_count = selected_room_count.saturating_add(quantity);
        selected_guest_capacity = selected_guest_capacity.saturating_add(quantity.saturating_mul(room.max_guests));
        selected_total_price =
            selected_total_price.saturating_add(i64::from(quantity).saturating_mul(unit_price(room, night_count)));
    }

    let room_gap = room_target.saturating_sub(selected_room_count);
    let capacity_gap = guest_target.saturating_sub(selected_guest_capacity);

    let can_submit = !room_types.is_empty()
        && selected_room_count > 0
        && room_gap == 0
        && capacity_gap == 0
        && selected_total_price > 0;

    let state = if selected_room_count == 0 {
        SelectionState::Empty
    } else if room_gap == 0 && capacity_gap == 0 {
        SelectionState::Satisfied
    } else {
        SelectionState::PartiallyFilled
    };

    AllocationSummary {
        selected_room_count,
        selected_guest_capacity,
        room_gap,
        capacity_gap,
        selected_total_price,
        can_submit,
        state,
    }
}

/// Client-session allocation state for one booking screen.
///
/// Owns the selection together with its inputs so every mutation leaves the
/// selection normalized.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    selection: Selection,
    room_types: Vec<RoomListEntry>,
    targets: BookingTargets,
    night_count: i64,
    ceiling: u32,
}

impl AllocationEngine {
    pub fn new(room_types: Vec<RoomListEntry>, targets: BookingTargets, night_count: i64, config: &EngineConfig) -> Self {
        Self {
            selection: Selection::new(),
            room_types,
            targets,
            night_count,
            ceiling: config.max_selectable_per_type,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn room_types(&self) -> &[RoomListEntry] {
        &self.room_types
    }

    pub fn targets(&self) -> BookingTargets {
        self.targets
    }

    pub fn increment(&mut self, room_type_id: &str) -> bool {
        let changed = increment(
            &mut self.selection,
            &self.room_types,
            self.targets.rooms,
            self.ceiling,
            room_type_id,
        );
        trace!(room_type = room_type_id, changed, total = self.selection.total(), "increment");
        changed
    }

    pub fn decrement(&mut self, room_type_id: &str) -> bool {
        let changed = decrement(&mut self.selection, room_type_id);
        trace!(room_type = room_type_id, changed, total = self.selection.total(), "decrement");
        changed
    }

    // Refreshed room list, e.g. after a re-search; stock ceilings may move
    pub fn set_room_types(&mut self, room_types: Vec<RoomListEntry>) {
        self.room_types = room_types;
        self.renormalize();
    }

    pub fn set_targets(&mut self, targets: BookingTargets) {
        self.targets = targets;
        self.renormalize();
    }

    pub fn set_night_count(&mut self, night_count: i64) {
        self.night_count = night_count;
    }

    fn renormalize(&mut self) {
        let before = self.selection.total();
        self.selection = normalize(&self.selection, &self.room_types, self.targets.rooms, self.ceiling);
        trace!(before, after = self.selection.total(), "selection normalized");
    }

    pub fn max_selectable(&self, room_type_id: &str) -> u32 {
        find(&self.room_types, room_type_id).map_or(0, |room| max_selectable(room, self.ceiling))
    }

    // Whether an increment would change anything; for enabling UI controls
    pub fn can_increment(&self, room_type_id: &str) -> bool {
        self.selection.total() < self.targets.rooms
            && self.selection.quantity(room_type_id) < self.max_selectable(room_type_id)
    }

    pub fn can_decrement(&self, room_type_id: &str) -> bool {
        self.selection.quantity(room_type_id) > 0
    }

    pub fn summary(&self) -> AllocationSummary {
        derive(
            &self.selection,
            &self.room_types,
            self.targets.rooms,
            self.targets.guests,
            self.night_count,
        )
    }

    pub fn state(&self) -> SelectionState {
        self.summary().state
    }

    // Lines to submit; empty until the selection can be submitted
    pub fn booking_lines(&self) -> Vec<BookingLine> {
        if !self.summary().can_submit {
            return Vec::new();
        }
        self.selection
            .iter()
            .filter_map(|(id, quantity)| {
                let room = find(&self.room_types, id)?;
                Some(BookingLine {
                    room_type_id: id.to_string(),
                    quantity,
                    line_total: i64::from(quantity).saturating_mul(unit_price(room, self.night_count)),
                })
            })
            .collect()
    }
}
