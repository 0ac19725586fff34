use clap::Parser;
use prop_hunt::config::{
    ArchetypeConfig, ContainerConfig, InteractableConfig, LevelConfig, SlotConfig,
};
use prop_hunt::constants::TICK_MS;
use prop_hunt::interaction::{InteractableKind, InteractionOutcome};
use prop_hunt::rng::Rng;
use prop_hunt::session::GameSession;
use prop_hunt::types::{
    ContainerId, GameOverReason, GamePhase, InteractableId, RoomId, RuntimeEvent, SlotId,
    Snapshot, Vec3,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const BOT_THINK_TICKS: u64 = 45;
const SAFETY_MARGIN_MS: u64 = 10_000;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Level file (JSON). A built-in demo level is used when absent.
    #[arg(long)]
    level: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 1)]
    runs: u32,
    #[arg(long, default_value_t = TICK_MS)]
    dt_ms: u64,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    seed: u32,
    phase: GamePhase,
    reason: Option<GameOverReason>,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    placed: usize,
    #[serde(rename = "inContainers")]
    in_containers: usize,
    #[serde(rename = "totalFake")]
    total_fake: usize,
    #[serde(rename = "fakeCollected")]
    fake_collected: usize,
    #[serde(rename = "wrongGuesses")]
    wrong_guesses: u32,
    #[serde(rename = "chancesRemaining")]
    chances_remaining: u32,
    picks: u32,
    #[serde(rename = "containersOpened")]
    containers_opened: u32,
    warnings: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "winCount")]
    win_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    runs: Vec<RunResultLine>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let level = match cli.level.as_deref() {
        Some(path) => match LevelConfig::from_path(path) {
            Ok(level) => level,
            Err(err) => {
                error!(%err, "level load failed");
                std::process::exit(2);
            }
        },
        None => demo_level(),
    };

    let base_seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let started_at = chrono::Utc::now();
    let run_id = default_run_id(base_seed, started_at.timestamp_millis());
    let dt_ms = cli.dt_ms.max(1);
    info!(%run_id, base_seed, runs = cli.runs, dt_ms, "simulation started");

    let mut results = Vec::new();
    let mut has_anomaly = false;
    for run in 0..cli.runs {
        let seed = base_seed.wrapping_add(run);
        let result = run_session(level.clone(), seed, dt_ms);
        for anomaly in &result.anomalies {
            warn!(seed, anomaly = anomaly.as_str(), "anomaly detected");
        }
        has_anomaly |= !result.anomalies.is_empty();
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(err) => error!(%err, "result line failed to serialize"),
        }
        results.push(result);
    }

    let summary = build_run_summary(
        run_id,
        started_at.to_rfc3339(),
        chrono::Utc::now().to_rfc3339(),
        results,
    );
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(err) = write_summary(path, &summary) {
            error!(path = %path.display(), %err, "summary write failed");
            std::process::exit(2);
        }
    }
    info!(
        runs = summary.run_count,
        wins = summary.win_count,
        average_duration_ms = summary.average_duration_ms,
        "simulation finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run_session(level: LevelConfig, seed: u32, dt_ms: u64) -> RunResultLine {
    let mut session = GameSession::new(level, seed);
    let mut bot = Rng::new(seed ^ 0x9e37_79b9);
    let mut anomalies = Vec::new();
    let mut picks = 0u32;
    let mut containers_opened = 0u32;

    for interactable in session.interactables().to_vec() {
        if let InteractableKind::Door(door) = &interactable.kind {
            if door.locked {
                session.unlock_door(interactable.id);
            }
            if door.starts_timer {
                session.interact(interactable.id);
                break;
            }
        }
    }
    // Levels without a timer door still need a running clock.
    session.start_timer();

    let think_every = (BOT_THINK_TICKS * TICK_MS / dt_ms).max(1);
    let tick_limit = (session.timer().total_ms() + SAFETY_MARGIN_MS) / dt_ms + 1;
    let mut ticks = 0u64;

    while !session.is_ended() {
        session.step(dt_ms);
        ticks += 1;

        if ticks % think_every == 0 && session.progress().accepts_input() {
            if bot.bool(0.25) {
                if let Some(container) = pick_locked_container(&session, &mut bot) {
                    if let InteractionOutcome::TaskRequired { container } =
                        open_container_task(&mut session, container)
                    {
                        if session.unlock_container(container).is_some() {
                            containers_opened += 1;
                        }
                    }
                }
            } else if let Some(target) = pick_visible_item(&session, &mut bot) {
                session.interact(target);
                picks += 1;
            }
        }

        let snapshot = session.snapshot(true);
        anomalies.extend(collect_snapshot_anomalies(&snapshot));
        if ticks > tick_limit {
            anomalies.push(format!("tick safety limit exceeded at {}", snapshot.tick));
            break;
        }
    }
    anomalies.dedup();

    let summary = session.summary();
    RunResultLine {
        seed,
        phase: summary.phase,
        reason: summary.reason,
        duration_ms: summary.duration_ms,
        placed: summary.placed,
        in_containers: summary.in_containers,
        total_fake: summary.total_fake,
        fake_collected: summary.fake_collected,
        wrong_guesses: summary.wrong_guesses,
        chances_remaining: summary.chances_remaining,
        picks,
        containers_opened,
        warnings: summary.warnings.len(),
        anomalies,
    }
}

fn pick_visible_item(session: &GameSession, bot: &mut Rng) -> Option<InteractableId> {
    let visible: Vec<_> = session
        .items()
        .iter()
        .filter(|item| item.is_pickable())
        .filter_map(|item| session.interactable_for_item(item.id))
        .collect();
    if visible.is_empty() {
        return None;
    }
    Some(visible[bot.pick_index(visible.len())])
}

fn pick_locked_container(session: &GameSession, bot: &mut Rng) -> Option<ContainerId> {
    let locked: Vec<ContainerId> = session
        .containers()
        .all()
        .iter()
        .filter(|c| c.locked)
        .map(|c| c.id)
        .collect();
    if locked.is_empty() {
        return None;
    }
    Some(locked[bot.pick_index(locked.len())])
}

fn open_container_task(session: &mut GameSession, container: ContainerId) -> InteractionOutcome {
    let target = session.interactables().iter().find_map(|i| match i.kind {
        InteractableKind::Container { container: c } if c == container => Some(i.id),
        _ => None,
    });
    match target {
        Some(id) => session.interact(id),
        // No interactable wired to it; treat the task as offered directly.
        None => InteractionOutcome::TaskRequired { container },
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.collected > snapshot.total_to_collect {
        anomalies.push(format!(
            "collected exceeds total: {}/{}",
            snapshot.collected, snapshot.total_to_collect
        ));
    }
    if snapshot.fake_collected > snapshot.total_fake
        || snapshot.total_fake > snapshot.total_to_collect
    {
        anomalies.push(format!(
            "fake counters out of range: {}/{} of {}",
            snapshot.fake_collected, snapshot.total_fake, snapshot.total_to_collect
        ));
    }
    let won = snapshot
        .events
        .iter()
        .filter(|event| matches!(event, RuntimeEvent::Won { .. }))
        .count();
    let lost = snapshot
        .events
        .iter()
        .filter(|event| matches!(event, RuntimeEvent::Lost { .. }))
        .count();
    if won + lost > 1 {
        anomalies.push("more than one terminal transition in a tick".to_string());
    }
    if snapshot.phase.is_terminal() && snapshot.timer_running {
        anomalies.push("timer still running after game end".to_string());
    }
    anomalies
}

fn demo_level() -> LevelConfig {
    let mut level = LevelConfig {
        slots: (0..24)
            .map(|i| SlotConfig {
                position: Vec3::new((i % 6) as f32 * 3.5, 0.0, (i / 6) as f32 * 3.5),
                orientation: Vec3::ZERO,
            })
            .collect(),
        archetypes: ["vase", "lamp", "book", "clock"]
            .into_iter()
            .map(ArchetypeConfig::named)
            .collect(),
        containers: (0..3)
            .map(|i| ContainerConfig {
                position: Vec3::new(i as f32 * 5.0, 0.0, -4.0),
                orientation: Vec3::ZERO,
            })
            .collect(),
        ..LevelConfig::default()
    };
    level.session.chance_to_use_container = 0.15;
    level.session.pool_size_per_archetype = 15;
    level.interactables = vec![
        InteractableConfig::Door {
            room: Some(RoomId::new("study")),
            starts_timer: true,
            locked: false,
            watched_slots: Vec::new(),
            disable_if_all_filled: false,
        },
        InteractableConfig::Drawer {
            watched_slots: vec![SlotId(0), SlotId(1)],
            disable_if_all_filled: true,
        },
    ];
    level.interactables.extend(
        (0..3).map(|i| InteractableConfig::Container {
            container: ContainerId(i),
        }),
    );
    level
}

fn default_run_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at: String,
    finished_at: String,
    runs: Vec<RunResultLine>,
) -> RunSummary {
    let run_count = runs.len();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    for run in &runs {
        let key = match run.reason {
            Some(GameOverReason::AllCollected) => "all_collected",
            Some(GameOverReason::AllFakesFound) => "all_fakes_found",
            Some(GameOverReason::OutOfChances) => "out_of_chances",
            Some(GameOverReason::Timeout) => "timeout",
            None => "unfinished",
        };
        *reason_counts.entry(key.to_string()).or_insert(0) += 1;
    }
    let total_duration_ms: u64 = runs.iter().map(|run| run.duration_ms).sum();
    let average_duration_ms = if run_count == 0 {
        0
    } else {
        total_duration_ms / run_count as u64
    };
    RunSummary {
        run_id,
        started_at,
        finished_at,
        run_count,
        win_count: runs.iter().filter(|run| run.phase == GamePhase::Won).count(),
        average_duration_ms,
        reason_counts,
        runs,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(
        phase: GamePhase,
        reason: Option<GameOverReason>,
        duration_ms: u64,
    ) -> RunResultLine {
        RunResultLine {
            seed: 42,
            phase,
            reason,
            duration_ms,
            placed: 15,
            in_containers: 0,
            total_fake: 5,
            fake_collected: 0,
            wrong_guesses: 0,
            chances_remaining: 3,
            picks: 0,
            containers_opened: 0,
            warnings: 0,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_counts_reasons_and_averages() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            "a".to_string(),
            "b".to_string(),
            vec![
                make_result(GamePhase::Lost, Some(GameOverReason::Timeout), 180_000),
                make_result(GamePhase::Won, Some(GameOverReason::AllFakesFound), 60_000),
            ],
        );
        assert_eq!(summary.average_duration_ms, 120_000);
        assert_eq!(summary.run_count, 2);
        assert_eq!(summary.win_count, 1);
        assert_eq!(summary.reason_counts.get("timeout"), Some(&1));
        assert_eq!(summary.reason_counts.get("all_fakes_found"), Some(&1));
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("missing").join("summary.json");
        let summary = build_run_summary("sim-1-1".into(), "a".into(), "b".into(), Vec::new());
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn write_summary_writes_pretty_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("summary.json");
        let summary = build_run_summary("sim-1-1".into(), "a".into(), "b".into(), Vec::new());
        write_summary(&target, &summary).expect("write");
        let text = std::fs::read_to_string(&target).expect("read");
        assert!(text.contains("\"runId\": \"sim-1-1\""));
    }

    #[test]
    fn demo_runs_finish_without_anomalies() {
        for seed in 1..6 {
            let result = run_session(demo_level(), seed, TICK_MS);
            assert!(result.anomalies.is_empty(), "{:?}", result.anomalies);
            assert!(result.phase.is_terminal());
            assert_eq!(result.placed, 15);
        }
    }
}
