//! End-to-end flow: raw import payload → normalizer → store commit →
//! allocation edits → summaries → persistence sync.

use budget_allocation::summary;
use budget_core::types::{Campaign, MediaChannel};
use budget_core::week::WeekKey;
use budget_import::{parse_csv, parse_json, parse_rows};
use budget_store::{CampaignStore, MemoryBackend};

const SAMPLE_CSV: &str = "\
Levier Média;Nom Campagne;Objectif Marketing;Cible/Audience;Date Début;Budget Total;Durée (jours);S1;S2;S3
META;Lancement Printemps;CONVERSION;Familles CSP+;15/03/2025;60000;45;50%;30%;20%
GOOGLE;Search Ski;CONSIDERATION;Skieurs 25-45;2025-01-10;40000;60;40%;40%;20%
YOUTUBE;Branding Été;AWARENESS;18-35 urbains;2025-06-01;90000;30;45000;30000;15000";

fn week(n: u8) -> WeekKey {
    WeekKey::new(n).unwrap()
}

fn by_name(store: &CampaignStore, name: &str) -> Campaign {
    store
        .list_campaigns()
        .into_iter()
        .find(|c| c.campaign_name == name)
        .unwrap()
}

#[test]
fn test_csv_import_lands_in_store_with_invariants_held() {
    let report = parse_csv(SAMPLE_CSV).unwrap();
    assert_eq!(report.imported(), 3);
    assert!(report.failures.is_empty());
    // Row percentages sum to 100 in every row, amounts included.
    assert_eq!(report.adjusted_rows, 0);

    let store = CampaignStore::new();
    let merged = store.replace_with_import(report.campaigns);
    assert_eq!(merged.added, 3);
    assert_eq!(store.count(), 3);

    // Day-first date reordered, percentages turned into planned amounts.
    let printemps = by_name(&store, "Lancement Printemps");
    assert_eq!(printemps.start_date.to_string(), "2025-03-15");
    assert!((printemps.weekly_budgets[&week(1)] - 30_000.0).abs() < 1e-9);

    // Amount cells classified and converted into percentages.
    let branding = by_name(&store, "Branding Été");
    assert_eq!(branding.media_channel, MediaChannel::Youtube);
    assert!((branding.weekly_budget_percentages[&week(1)] - 50.0).abs() < 1e-9);
    assert!((branding.weekly_budgets[&week(1)] - 45_000.0).abs() < 1e-9);

    // The percentage→amount invariant holds on every imported campaign.
    for campaign in store.list_campaigns() {
        for (w, pct) in &campaign.weekly_budget_percentages {
            let expected = pct / 100.0 * campaign.total_budget;
            assert!((campaign.weekly_budgets[w] - expected).abs() < 1e-6);
        }
    }

    let overall = summary::budget_summary(&store.list_campaigns());
    assert!((overall.total_budget - 190_000.0).abs() < 1e-9);
    assert!((overall.total_planned - 190_000.0).abs() < 1e-6);
    assert_eq!(overall.total_actual, 0.0);
    assert_eq!(overall.campaign_count, 3);
}

#[test]
fn test_reimporting_the_same_file_adds_nothing() {
    let store = CampaignStore::new();
    store.replace_with_import(parse_csv(SAMPLE_CSV).unwrap().campaigns);

    let merged = store.merge_import(parse_csv(SAMPLE_CSV).unwrap().campaigns);
    assert_eq!(merged.added, 0);
    assert_eq!(merged.skipped_duplicates, 3);
    assert_eq!(store.count(), 3);
}

#[test]
fn test_edits_after_import_flow_into_summaries_and_sync() {
    let store = CampaignStore::new();
    store.replace_with_import(parse_csv(SAMPLE_CSV).unwrap().campaigns);
    let id = by_name(&store, "Lancement Printemps").id;

    // Lower S1 from 50% to 30%: within the cap, planned amount follows.
    let edited = store.set_week_percentage(id, week(1), 30.0).unwrap();
    assert!((edited.weekly_budgets[&week(1)] - 18_000.0).abs() < 1e-9);

    store.set_week_actual(id, week(1), 20_000.0).unwrap();
    let overall = summary::budget_summary(&store.list_campaigns());
    assert!((overall.total_actual - 20_000.0).abs() < 1e-9);

    let backend = MemoryBackend::new();
    let sync = store.sync(&backend).unwrap();
    assert!(sync.performed);
    assert_eq!(sync.synced_campaigns, 3);

    let snapshot = backend.last_snapshot();
    let persisted = snapshot
        .iter()
        .find(|c| c.campaign_name == "Lancement Printemps")
        .unwrap();
    assert!((persisted.weekly_budgets[&week(1)] - 18_000.0).abs() < 1e-9);

    // Nothing changed since: the next pass is a no-op.
    let sync = store.sync(&backend).unwrap();
    assert!(!sync.performed);
    assert_eq!(backend.write_count(), 1);
}

#[test]
fn test_remote_rows_merge_into_an_existing_collection() {
    let store = CampaignStore::new();
    store.replace_with_import(parse_csv(SAMPLE_CSV).unwrap().campaigns);

    // A sheet fetch hands the pipeline pre-split rows, header first.
    let rows: Vec<Vec<String>> = vec![
        vec![
            "Levier", "Nom Campagne", "Objectif", "Cible", "Date Début", "Budget Total", "Durée",
            "S1",
        ],
        vec![
            "META", "Depuis Sheets", "CONVERSION", "Tous", "2025-02-01", "5000", "30", "100",
        ],
        vec![
            "GOOGLE", "Search Ski", "CONSIDERATION", "Tous", "2025-02-01", "9999", "30", "100",
        ],
    ]
    .into_iter()
    .map(|row| row.into_iter().map(str::to_string).collect())
    .collect();

    let report = parse_rows(rows).unwrap();
    assert_eq!(report.imported(), 2);

    let merged = store.merge_import(report.campaigns);
    assert_eq!(merged.added, 1);
    assert_eq!(merged.skipped_duplicates, 1);
    assert_eq!(store.count(), 4);

    // The duplicate kept its original budget; the import copy was dropped.
    assert!((by_name(&store, "Search Ski").total_budget - 40_000.0).abs() < 1e-9);
    let fetched = by_name(&store, "Depuis Sheets");
    assert!((fetched.weekly_budgets[&week(1)] - 5_000.0).abs() < 1e-9);
}

#[test]
fn test_json_document_flow_derives_budgets() {
    let payload = r#"[{
        "mediaChannel": "EMAIL",
        "campaignName": "Relance Abonnés",
        "marketingObjective": "LOYALTY",
        "startDate": "2025-02-01",
        "totalBudget": 12000,
        "weeklyBudgetPercentages": {"S5": 75, "S6": 25}
    }]"#;

    let report = parse_json(payload).unwrap();
    let store = CampaignStore::new();
    store.replace_with_import(report.campaigns);

    let relance = by_name(&store, "Relance Abonnés");
    assert!((relance.weekly_budgets[&week(5)] - 9_000.0).abs() < 1e-9);
    assert!((relance.weekly_budgets[&week(6)] - 3_000.0).abs() < 1e-9);

    let overall = summary::budget_summary(&store.list_campaigns());
    assert!((overall.total_planned - 12_000.0).abs() < 1e-9);
}
