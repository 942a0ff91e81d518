use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;
use time::{Date, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::care::{CareKind, CareState};
use crate::plants::repo::Plant;
use crate::push::channel::PushChannel;
use crate::push::repo::PushSubscription;
use crate::state::AppState;
use crate::sweep::message::compose_summary;
use crate::{auth, plants, push};

/// A composed reminder waiting for delivery.
#[derive(Debug, Clone)]
pub struct PlannedPush {
    pub subscription: PushSubscription,
    pub message: String,
}

/// Who got a message, whose endpoint is gone, and whose delivery failed
/// transiently. The sweep never reports a single pass/fail.
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub notified: Vec<Uuid>,
    pub pruned: Vec<Uuid>,
    pub failed: Vec<Uuid>,
}

/// Hour component of a "HH:MM" preference; falls back to the 09:00 default
/// on anything malformed.
pub fn notification_hour(pref: &str) -> u8 {
    pref.split(':')
        .next()
        .and_then(|h| h.parse::<u8>().ok())
        .filter(|h| *h < 24)
        .unwrap_or(9)
}

/// Pure planning pass: for every subscription, classify all four care
/// tracks of the owner's plants against `today` and compose a summary.
/// Users with nothing due produce no entry. When `hour` is set, only users
/// whose preferred notification hour matches are considered.
pub fn plan_sweep(
    subscriptions: &[PushSubscription],
    plants: &[Plant],
    preferences: &HashMap<Uuid, String>,
    hour: Option<u8>,
    today: Date,
) -> Vec<PlannedPush> {
    let mut planned = Vec::new();

    for sub in subscriptions {
        if let Some(hour) = hour {
            let preferred = preferences
                .get(&sub.user_id)
                .map(|p| notification_hour(p))
                .unwrap_or(9);
            if preferred != hour {
                continue;
            }
        }

        let groups: Vec<(CareKind, Vec<String>)> = CareKind::ALL
            .into_iter()
            .map(|kind| {
                let names = plants
                    .iter()
                    .filter(|p| p.user_id == sub.user_id)
                    .filter(|p| {
                        p.care_status(kind, today).is_some_and(|s| {
                            matches!(s.state, CareState::Overdue | CareState::DueToday)
                        })
                    })
                    .map(|p| p.name.clone())
                    .collect();
                (kind, names)
            })
            .collect();

        if let Some(message) = compose_summary(&groups) {
            planned.push(PlannedPush {
                subscription: sub.clone(),
                message,
            });
        }
    }

    planned
}

/// Delivers every planned reminder, isolating failures per subscription:
/// a gone endpoint is marked for pruning, anything else is logged and the
/// loop moves on. No retries within a sweep.
pub async fn dispatch(channel: &dyn PushChannel, planned: &[PlannedPush]) -> SweepReport {
    let mut report = SweepReport::default();

    for p in planned {
        let user_id = p.subscription.user_id;
        let payload = json!({ "title": "Plantling", "body": p.message }).to_string();
        match channel.deliver(&p.subscription, &payload).await {
            Ok(()) => {
                info!(user_id = %user_id, "care reminder delivered");
                report.notified.push(user_id);
            }
            Err(e) if e.is_permanent() => {
                warn!(user_id = %user_id, error = %e, "push endpoint gone, pruning subscription");
                report.pruned.push(user_id);
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "push delivery failed, will try next sweep");
                report.failed.push(user_id);
            }
        }
    }

    report
}

/// One full pass over all subscriptions. Safe to re-run from an external
/// scheduler; the only repeated side effect is another reminder.
#[instrument(skip(state))]
pub async fn run_sweep(
    state: &AppState,
    now: OffsetDateTime,
    force: bool,
) -> anyhow::Result<SweepReport> {
    let subscriptions = push::repo::list_all(&state.db).await?;
    let all_plants = plants::repo::list_all(&state.db).await?;
    let preferences = auth::repo::notification_times(&state.db).await?;

    let hour = if force { None } else { Some(now.hour()) };
    let planned = plan_sweep(&subscriptions, &all_plants, &preferences, hour, now.date());
    info!(
        subscriptions = subscriptions.len(),
        planned = planned.len(),
        "sweep planned"
    );

    let report = dispatch(state.push.as_ref(), &planned).await;

    for p in planned
        .iter()
        .filter(|p| report.pruned.contains(&p.subscription.user_id))
    {
        if let Err(e) =
            push::repo::delete_endpoint(&state.db, p.subscription.user_id, &p.subscription.endpoint)
                .await
        {
            warn!(user_id = %p.subscription.user_id, error = %e, "failed to prune subscription");
        }
    }

    info!(
        notified = report.notified.len(),
        pruned = report.pruned.len(),
        failed = report.failed.len(),
        "sweep finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plants::repo::test_support::plant;
    use crate::push::channel::PushDeliveryError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use time::macros::{date, datetime};

    const TODAY: Date = date!(2024 - 06 - 10);

    fn subscription(user_id: Uuid, endpoint: &str) -> PushSubscription {
        PushSubscription {
            user_id,
            endpoint: endpoint.to_string(),
            p256dh: "p256dh-key".into(),
            auth: "auth-key".into(),
            created_at: datetime!(2024-01-01 00:00 UTC),
        }
    }

    fn no_gate_plan(subs: &[PushSubscription], plants: &[Plant]) -> Vec<PlannedPush> {
        plan_sweep(subs, plants, &HashMap::new(), None, TODAY)
    }

    /// Channel that records every contacted endpoint and answers from a
    /// scripted queue of outcomes.
    struct ScriptedChannel {
        contacted: Mutex<Vec<String>>,
        outcomes: Mutex<HashMap<String, &'static str>>,
    }

    impl ScriptedChannel {
        fn new() -> Self {
            Self {
                contacted: Mutex::new(Vec::new()),
                outcomes: Mutex::new(HashMap::new()),
            }
        }

        fn fail(self, endpoint: &str, mode: &'static str) -> Self {
            self.outcomes.lock().unwrap().insert(endpoint.into(), mode);
            self
        }

        fn contacted(&self) -> Vec<String> {
            self.contacted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PushChannel for ScriptedChannel {
        async fn deliver(
            &self,
            subscription: &PushSubscription,
            _payload: &str,
        ) -> Result<(), PushDeliveryError> {
            self.contacted
                .lock()
                .unwrap()
                .push(subscription.endpoint.clone());
            match self.outcomes.lock().unwrap().get(&subscription.endpoint) {
                Some(&"gone") => Err(PushDeliveryError::EndpointGone("410 Gone".into())),
                Some(&"transient") => Err(PushDeliveryError::Transient("timeout".into())),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn one_overdue_plant_names_the_plant() {
        let user = Uuid::new_v4();
        let subs = vec![subscription(user, "https://push.example/a")];
        let plants = vec![plant(user, "Monstera", 7, date!(2024 - 05 - 25))];
        let planned = no_gate_plan(&subs, &plants);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].message, "Water: Monstera");
    }

    #[test]
    fn two_overdue_plants_become_a_count() {
        let user = Uuid::new_v4();
        let subs = vec![subscription(user, "https://push.example/a")];
        let plants = vec![
            plant(user, "Monstera", 7, date!(2024 - 05 - 25)),
            plant(user, "Ficus", 3, date!(2024 - 06 - 01)),
        ];
        let planned = no_gate_plan(&subs, &plants);
        assert_eq!(planned[0].message, "Water 2 plants");
    }

    #[test]
    fn caught_up_user_is_skipped() {
        let user = Uuid::new_v4();
        let subs = vec![subscription(user, "https://push.example/a")];
        let plants = vec![plant(user, "Monstera", 30, date!(2024 - 06 - 01))];
        assert!(no_gate_plan(&subs, &plants).is_empty());
    }

    #[test]
    fn plants_are_scoped_to_the_subscriber() {
        let subscriber = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let subs = vec![subscription(subscriber, "https://push.example/a")];
        let plants = vec![plant(stranger, "NotYours", 7, date!(2024 - 05 - 01))];
        assert!(no_gate_plan(&subs, &plants).is_empty());
    }

    #[test]
    fn inert_fertilize_track_never_contributes() {
        let user = Uuid::new_v4();
        let subs = vec![subscription(user, "https://push.example/a")];
        let mut p = plant(user, "Monstera", 30, date!(2024 - 06 - 01));
        p.fertilizing_frequency_days = Some(1);
        // No last_fertilized_date, so the track is inert whatever today is.
        assert!(no_gate_plan(&subs, &[p]).is_empty());
    }

    #[test]
    fn due_months_track_contributes_its_own_group() {
        let user = Uuid::new_v4();
        let subs = vec![subscription(user, "https://push.example/a")];
        let mut p = plant(user, "Ficus", 30, date!(2024 - 06 - 01));
        p.repotting_frequency_months = Some(6);
        p.last_repotted_date = Some(date!(2023 - 11 - 10));
        let planned = no_gate_plan(&subs, &[p]);
        assert_eq!(planned[0].message, "Repot: Ficus");
    }

    #[test]
    fn hour_gate_filters_users() {
        let at_nine = Uuid::new_v4();
        let at_twenty = Uuid::new_v4();
        let subs = vec![
            subscription(at_nine, "https://push.example/a"),
            subscription(at_twenty, "https://push.example/b"),
        ];
        let plants = vec![
            plant(at_nine, "A", 7, date!(2024 - 05 - 25)),
            plant(at_twenty, "B", 7, date!(2024 - 05 - 25)),
        ];
        let mut prefs = HashMap::new();
        prefs.insert(at_twenty, "20:30".to_string());
        // at_nine has no stored preference and falls back to 09:00.

        let at_nine_run = plan_sweep(&subs, &plants, &prefs, Some(9), TODAY);
        assert_eq!(at_nine_run.len(), 1);
        assert_eq!(at_nine_run[0].subscription.user_id, at_nine);

        let at_twenty_run = plan_sweep(&subs, &plants, &prefs, Some(20), TODAY);
        assert_eq!(at_twenty_run.len(), 1);
        assert_eq!(at_twenty_run[0].subscription.user_id, at_twenty);

        let forced = plan_sweep(&subs, &plants, &prefs, None, TODAY);
        assert_eq!(forced.len(), 2);
    }

    #[test]
    fn notification_hour_parses_and_defaults() {
        assert_eq!(notification_hour("09:00"), 9);
        assert_eq!(notification_hour("20:45"), 20);
        assert_eq!(notification_hour("garbage"), 9);
        assert_eq!(notification_hour("99:00"), 9);
    }

    #[tokio::test]
    async fn gone_endpoint_is_pruned_and_not_contacted_again() {
        let user_ok = Uuid::new_v4();
        let user_gone = Uuid::new_v4();
        let mut subs = vec![
            subscription(user_ok, "https://push.example/ok"),
            subscription(user_gone, "https://push.example/gone"),
        ];
        let plants = vec![
            plant(user_ok, "A", 7, date!(2024 - 05 - 25)),
            plant(user_gone, "B", 7, date!(2024 - 05 - 25)),
        ];
        let channel = ScriptedChannel::new().fail("https://push.example/gone", "gone");

        let report = dispatch(&channel, &no_gate_plan(&subs, &plants)).await;
        assert_eq!(report.notified, vec![user_ok]);
        assert_eq!(report.pruned, vec![user_gone]);
        assert!(report.failed.is_empty());

        // The store drops pruned subscriptions; the next sweep plans without them.
        subs.retain(|s| !report.pruned.contains(&s.user_id));
        dispatch(&channel, &no_gate_plan(&subs, &plants)).await;
        let contacted = channel.contacted();
        assert_eq!(
            contacted
                .iter()
                .filter(|e| *e == "https://push.example/gone")
                .count(),
            1,
            "gone endpoint contacted once, never again"
        );
    }

    #[tokio::test]
    async fn transient_failure_does_not_abort_the_sweep() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let subs = vec![
            subscription(first, "https://push.example/flaky"),
            subscription(second, "https://push.example/ok"),
        ];
        let plants = vec![
            plant(first, "A", 7, date!(2024 - 05 - 25)),
            plant(second, "B", 7, date!(2024 - 05 - 25)),
        ];
        let channel = ScriptedChannel::new().fail("https://push.example/flaky", "transient");

        let report = dispatch(&channel, &no_gate_plan(&subs, &plants)).await;
        assert_eq!(report.failed, vec![first]);
        assert_eq!(report.notified, vec![second]);
        assert!(report.pruned.is_empty(), "transient failures are not pruned");
    }
}
