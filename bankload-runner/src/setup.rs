//! One-time setup before any user starts

use crate::state::SharedState;
use bankload_config::{ScenarioConfig, Variant};
use bankload_http::{AccountId, BankApi};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What global setup managed to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    pub simulation_started: bool,
    pub shared_account: Option<AccountId>,
}

/// Start the remote simulation clock and, for the shared-account variant,
/// create the account every transfer goes to.
///
/// Nothing here is fatal or retried. A failed simulation start is logged and
/// the run continues. A failed shared account leaves
/// [`SharedState::shared_account`] unset, which turns every transfer of the
/// run into a skip.
pub async fn global_setup(
    api: &dyn BankApi,
    state: &SharedState,
    scenario: &ScenarioConfig,
    epoch_start_time: u64,
) -> SetupReport {
    let mut report = SetupReport::default();

    if scenario.start_simulation {
        match api.start_simulation(epoch_start_time).await {
            Ok(response) if response.is_success() => {
                info!(epoch_start_time, status = response.status, "Simulation started");
                report.simulation_started = true;
            }
            Ok(response) => {
                warn!(
                    epoch_start_time,
                    status = response.status,
                    "Simulation start rejected, continuing"
                );
            }
            Err(e) => {
                warn!(epoch_start_time, error = %e, "Simulation start failed, continuing");
            }
        }
    } else {
        debug!("Simulation start disabled");
    }

    if scenario.variant == Variant::SharedAccount {
        match api.create_account(scenario.salary_cents).await {
            Ok(response) => match AccountId::from_response(&response) {
                Some(account_id) => {
                    state.set_shared_account(account_id);
                    info!(account_id = %account_id, "Shared account created");
                    report.shared_account = Some(account_id);
                }
                None => {
                    warn!(
                        status = response.status,
                        "Shared account not created, transfers will be skipped"
                    );
                }
            },
            Err(e) => {
                warn!(error = %e, "Shared account request failed, transfers will be skipped");
            }
        }
    }

    report
}
