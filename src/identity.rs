use tracing::{info, warn};

use crate::planner::PlacedItem;
use crate::progress::GameProgress;
use crate::rng::Rng;
use crate::types::{GamePhase, ItemId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakeAssignment {
    pub requested: usize,
    pub fakes: Vec<ItemId>,
    pub registered: bool,
}

/// Marks `fake_count` (clamped to the item count) randomly chosen items as
/// fake and the rest real, then registers totals with `progress`.
/// Identities are fixed once registered; later calls change nothing.
pub fn assign_fakes(
    items: &mut [PlacedItem],
    fake_count: usize,
    rng: &mut Rng,
    progress: &mut GameProgress,
) -> FakeAssignment {
    if progress.phase() != GamePhase::Idle {
        warn!("fake identities already registered, keeping them");
        return FakeAssignment {
            requested: fake_count,
            fakes: items.iter().filter(|i| i.is_fake).map(|i| i.id).collect(),
            registered: false,
        };
    }

    let fakes_to_assign = fake_count.min(items.len());
    let mut order: Vec<usize> = (0..items.len()).collect();
    rng.shuffle(&mut order);

    for item in items.iter_mut() {
        item.is_fake = false;
    }
    let mut fakes: Vec<ItemId> = order[..fakes_to_assign]
        .iter()
        .map(|idx| {
            items[*idx].is_fake = true;
            items[*idx].id
        })
        .collect();
    fakes.sort_unstable();

    let registered = progress.register(items.len(), fakes_to_assign);
    info!(
        total = items.len(),
        fake = fakes_to_assign,
        real = items.len() - fakes_to_assign,
        "fake identities assigned"
    );
    FakeAssignment {
        requested: fake_count,
        fakes,
        registered,
    }
}
