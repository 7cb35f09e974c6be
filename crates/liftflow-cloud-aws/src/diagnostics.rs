//! Fleet failure diagnostics
//!
//! The create call never reports why a fleet failed to activate; the
//! reasons only show up in the fleet's event log.

use crate::api::GameLiftApi;
use crate::error::Result;
use crate::model::FleetEvent;

/// Collect the failure events recorded for a fleet.
///
/// Walks every page of `DescribeFleetEvents`, following the continuation
/// token until the service stops returning one. Events come back in the
/// order the service returned them, with non-failure events dropped.
pub async fn fleet_failures(api: &dyn GameLiftApi, fleet_id: &str) -> Result<Vec<FleetEvent>> {
    let mut failures = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = api
            .describe_fleet_events(fleet_id, next_token.as_deref())
            .await?;
        pages += 1;

        failures.extend(
            page.events
                .into_iter()
                .filter(|event| event.event_code.is_failure()),
        );

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    tracing::debug!(
        "Found {} failure event(s) for fleet {} across {} page(s)",
        failures.len(),
        fleet_id,
        pages
    );
    Ok(failures)
}
