//! Meal-plan placement rules.
//!
//! The one-item-per-(date, slot) invariant for exclusive slots is enforced
//! here, by the write path, not by the stores: the stores persist whatever
//! collection they are handed.

use crate::models::MealPlanItem;

/// Place `item` into `plan`.
///
/// For an exclusive slot (breakfast, lunch, dinner) every other item on
/// the same (date, slot) is removed first, so re-planning a slot replaces
/// it. Snack placements never displace anything; any number of snacks may
/// share a date.
pub fn place(plan: &mut Vec<MealPlanItem>, item: MealPlanItem) {
    if item.slot.is_exclusive() {
        plan.retain(|existing| !(existing.date == item.date && existing.slot == item.slot));
    }
    plan.push(item);
}
