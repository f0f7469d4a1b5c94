use crate::models::{ItemKind, NewPlan, PlanDetail, SavedItemsSnapshot};
use gramstay_core::{validation, Clock, CoreError, CoreResult};
use gramstay_shared::StateEvent;
use gramstay_store::PersistentMirror;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

pub const STORAGE_KEY: &str = "savedItems";

/// Saved listings, experiences and trip plans.
///
/// Membership in a set is the only record that something is saved; payloads
/// are resolved by consumers against their own catalog. Plans are the
/// exception and may carry a `PlanDetail`.
pub struct SavedItemsManager {
    listing_ids: HashSet<String>,
    experience_ids: HashSet<String>,
    plan_ids: HashSet<String>,
    plan_details: HashMap<String, PlanDetail>,
    mirror: PersistentMirror,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<StateEvent>,
}

impl SavedItemsManager {
    /// Hydrate from the mirror; unreadable state starts empty
    pub fn new(mirror: PersistentMirror, clock: Arc<dyn Clock>, channel_capacity: usize) -> Self {
        let snapshot: SavedItemsSnapshot = mirror.load_or_default(STORAGE_KEY);
        let (events, _) = broadcast::channel(channel_capacity.max(1));

        let manager = Self {
            listing_ids: snapshot.listings.into_iter().collect(),
            experience_ids: snapshot.experiences.into_iter().collect(),
            plan_ids: snapshot.plans.into_iter().collect(),
            plan_details: snapshot.plan_details.into_iter().collect(),
            mirror,
            clock,
            events,
        };
        debug!("Hydrated saved items: {} total", manager.total_saved());
        manager
    }

    /// Publish change events on a channel shared with other containers
    pub fn with_events(mut self, events: broadcast::Sender<StateEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Flip a listing's membership and return the new value
    pub fn toggle_listing(&mut self, id: &str) -> bool {
        self.toggle(ItemKind::Listing, id)
    }

    pub fn toggle_experience(&mut self, id: &str) -> bool {
        self.toggle(ItemKind::Experience, id)
    }

    /// Flip a plan's membership without attaching details
    pub fn toggle_plan(&mut self, id: &str) -> bool {
        self.toggle(ItemKind::Plan, id)
    }

    pub fn is_listing_saved(&self, id: &str) -> bool {
        self.listing_ids.contains(id)
    }

    pub fn is_experience_saved(&self, id: &str) -> bool {
        self.experience_ids.contains(id)
    }

    pub fn is_plan_saved(&self, id: &str) -> bool {
        self.plan_ids.contains(id)
    }

    pub fn is_saved(&self, kind: ItemKind, id: &str) -> bool {
        self.set(kind).contains(id)
    }

    /// Save a plan with its details, replacing details already stored under the id
    pub fn save_plan(&mut self, plan: NewPlan) -> CoreResult<PlanDetail> {
        validation::check(&plan)?;
        validation::require_non_blank("id", &plan.id)?;
        validation::require_non_blank("title", &plan.title)?;

        let detail = PlanDetail {
            id: plan.id,
            title: plan.title,
            destination: plan.destination,
            days: plan.days,
            notes: plan.notes,
            saved_at: self.clock.now(),
        };

        self.plan_ids.insert(detail.id.clone());
        self.plan_details.insert(detail.id.clone(), detail.clone());
        info!("Saved plan {}", detail.id);
        self.commit();
        Ok(detail)
    }

    pub fn remove_plan(&mut self, id: &str) -> CoreResult<()> {
        if !self.plan_ids.remove(id) {
            return Err(CoreError::NotFound(format!("saved plan {}", id)));
        }
        self.plan_details.remove(id);
        info!("Removed plan {}", id);
        self.commit();
        Ok(())
    }

    pub fn plan(&self, id: &str) -> Option<&PlanDetail> {
        self.plan_details.get(id)
    }

    /// Plans that carry details, most recently saved first
    pub fn saved_plans(&self) -> Vec<PlanDetail> {
        let mut plans: Vec<PlanDetail> = self.plan_details.values().cloned().collect();
        plans.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.id.cmp(&b.id)));
        plans
    }

    pub fn saved_listing_ids(&self) -> Vec<String> {
        sorted(&self.listing_ids)
    }

    pub fn saved_experience_ids(&self) -> Vec<String> {
        sorted(&self.experience_ids)
    }

    pub fn saved_plan_ids(&self) -> Vec<String> {
        sorted(&self.plan_ids)
    }

    /// Derived from the set sizes on every call
    pub fn total_saved(&self) -> usize {
        self.listing_ids.len() + self.experience_ids.len() + self.plan_ids.len()
    }

    pub fn clear_all(&mut self) {
        if self.total_saved() == 0 {
            return;
        }
        self.listing_ids.clear();
        self.experience_ids.clear();
        self.plan_ids.clear();
        self.plan_details.clear();
        info!("Cleared all saved items");
        self.commit();
    }

    pub fn snapshot(&self) -> SavedItemsSnapshot {
        SavedItemsSnapshot {
            listings: self.saved_listing_ids(),
            experiences: self.saved_experience_ids(),
            plans: self.saved_plan_ids(),
            plan_details: self
                .plan_details
                .iter()
                .map(|(id, detail)| (id.clone(), detail.clone()))
                .collect(),
        }
    }

    fn toggle(&mut self, kind: ItemKind, id: &str) -> bool {
        if id.trim().is_empty() {
            debug!("Ignoring {} toggle with empty id", kind);
            return false;
        }

        let set = self.set_mut(kind);
        let saved = if set.remove(id) {
            false
        } else {
            set.insert(id.to_string());
            true
        };

        if kind == ItemKind::Plan && !saved {
            self.plan_details.remove(id);
        }

        info!("Toggled {} {}: saved={}", kind, id, saved);
        self.commit();
        saved
    }

    fn set(&self, kind: ItemKind) -> &HashSet<String> {
        match kind {
            ItemKind::Listing => &self.listing_ids,
            ItemKind::Experience => &self.experience_ids,
            ItemKind::Plan => &self.plan_ids,
        }
    }

    fn set_mut(&mut self, kind: ItemKind) -> &mut HashSet<String> {
        match kind {
            ItemKind::Listing => &mut self.listing_ids,
            ItemKind::Experience => &mut self.experience_ids,
            ItemKind::Plan => &mut self.plan_ids,
        }
    }

    /// Write the full snapshot, then notify subscribers
    fn commit(&self) {
        self.mirror.save(STORAGE_KEY, &self.snapshot());
        let _ = self.events.send(StateEvent::SavedItemsChanged {
            total_saved: self.total_saved(),
            timestamp: self.clock.now().timestamp(),
        });
    }
}

fn sorted(ids: &HashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().cloned().collect();
    ids.sort();
    ids
}
