//! Async driver running the scroll stabilizer against a live document.

use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::ScrollConfig;
use crate::dom::Document;

use super::{ScrollOutcome, ScrollStabilizer, Step};

/// Scroll `doc` until the feed stops loading new content.
///
/// Never fails: capability errors end the loop in
/// [`ScrollState::Errored`](super::ScrollState::Errored), which callers treat
/// as "skip extraction this run".
pub async fn stabilize(
    doc: &dyn Document,
    config: &ScrollConfig,
    control_selector: &str,
) -> ScrollOutcome {
    let mut machine = ScrollStabilizer::new(config);
    let mut scrolls = 0u32;

    loop {
        let height = match doc.scroll_height().await {
            Ok(height) => height,
            Err(e) => {
                error!("Failed to read scroll height: {}", e);
                machine.abort();
                break;
            }
        };
        machine.begin_cycle(height);

        if let Err(e) = doc.scroll_to_bottom().await {
            error!("Failed to scroll: {}", e);
            machine.abort();
            break;
        }
        scrolls += 1;
        sleep(config.settle_interval()).await;

        sleep(config.control_check_delay()).await;
        let count = match doc.count(control_selector).await {
            Ok(count) => Some(count),
            Err(e) => {
                error!("Failed to count {:?}: {}", control_selector, e);
                None
            }
        };

        match machine.observe_control_count(count) {
            Step::Continue => {}
            Step::Settle { scroll } => {
                if settle(doc, config, scroll).await {
                    scrolls += u32::from(scroll);
                } else {
                    machine.abort();
                }
                break;
            }
            Step::Done => break,
        }

        let height = match doc.scroll_height().await {
            Ok(height) => height,
            Err(e) => {
                error!("Failed to read scroll height: {}", e);
                machine.abort();
                break;
            }
        };

        match machine.observe_height(height) {
            Step::Continue => {}
            Step::Settle { scroll } => {
                if settle(doc, config, scroll).await {
                    scrolls += u32::from(scroll);
                } else {
                    machine.abort();
                }
                break;
            }
            Step::Done => break,
        }
    }

    let outcome = ScrollOutcome {
        state: machine.state(),
        cycles: machine.cycles(),
        scrolls,
        last_control_count: machine.last_control_count(),
    };
    debug!("Scroll finished: {:?}", outcome);
    outcome
}

/// Final settling step: optionally scroll once more, then wait longer.
async fn settle(doc: &dyn Document, config: &ScrollConfig, scroll: bool) -> bool {
    if scroll {
        if let Err(e) = doc.scroll_to_bottom().await {
            warn!("Final scroll failed: {}", e);
            return false;
        }
    }
    sleep(config.final_settle_interval()).await;
    true
}
