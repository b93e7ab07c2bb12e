//! SchoolNav Headless Navigation Harness
//!
//! Loads the bundled sample building from `data/` through the same file
//! providers a deployment uses and checks the engine end to end.
//! Runs entirely in-process: no backend, no rendering.
//!
//! Usage:
//!   cargo run -p schoolnav-simtest
//!   cargo run -p schoolnav-simtest -- --verbose
//!   cargo run -p schoolnav-simtest -- --data path/to/building --seed 7

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use schoolnav_engine::cache::{CachedPointRepository, PointCache};
use schoolnav_engine::config::load_config;
use schoolnav_engine::fs::{FileGridProvider, FilePointRepository};
use schoolnav_engine::{NavigationSession, Navigator, PointRepository};
use schoolnav_logic::validation::Severity;
use schoolnav_logic::{Instruction, NavError, Navigation, Point};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

struct Args {
    verbose: bool,
    data: PathBuf,
    seed: u64,
}

fn parse_args() -> Args {
    let mut args = Args {
        verbose: false,
        data: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../data")),
        seed: 42,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--data" => {
                if let Some(dir) = iter.next() {
                    args.data = PathBuf::from(dir);
                }
            }
            "--seed" => {
                if let Some(seed) = iter.next().and_then(|s| s.parse().ok()) {
                    args.seed = seed;
                }
            }
            other => eprintln!("ignoring unknown argument {}", other),
        }
    }
    args
}

type FileNavigator = Navigator<FileGridProvider>;

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = parse_args();
    log::info!("[Harness] building data from {}", args.data.display());
    println!("=== SchoolNav Navigation Harness ===\n");

    let mut results = Vec::new();

    // 1. Load building data
    if let Some(navigator) = load_building(&args, &mut results).await {
        // 2. Data validation
        results.extend(validate_building(&navigator).await);

        // 3. Same-floor routes
        results.extend(validate_same_floor(&navigator).await);

        // 4. Multi-floor routes
        results.extend(validate_multi_floor(&navigator).await);

        // 5. Failure modes
        results.extend(validate_failures(&navigator).await);

        // 6. Random pair sweep
        results.extend(validate_random_pairs(&navigator, args.seed, args.verbose).await);

        // 7. Session stepping
        results.extend(validate_session(&navigator).await);
    }

    // 8. Point cache
    results.extend(validate_point_cache(&args).await);

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn room<'a>(navigator: &'a FileNavigator, number: &str) -> Option<&'a Point> {
    navigator.inventory().room(number)
}

fn kinds(maneuvers: &[schoolnav_logic::Maneuver]) -> Vec<Instruction> {
    maneuvers.iter().map(|m| m.instruction).collect()
}

async fn route(navigator: &FileNavigator, from: &str, to: &str) -> Result<Navigation, String> {
    let (Some(a), Some(b)) = (room(navigator, from), room(navigator, to)) else {
        return Err(format!("room {} or {} missing", from, to));
    };
    navigator.try_navigate(a, b).await.map_err(|e| e.to_string())
}

// ── 1. Building data ────────────────────────────────────────────────────

async fn load_building(args: &Args, results: &mut Vec<TestResult>) -> Option<FileNavigator> {
    println!("--- Building Data ---");

    let config = match load_config(args.data.join("engine.json")).await {
        Ok(config) => {
            results.push(TestResult::new(
                "config_load",
                true,
                format!(
                    "scale {}, floors {}..={}",
                    config.grid_scale, config.min_floor, config.max_floor
                ),
            ));
            config
        }
        Err(e) => {
            results.push(TestResult::new("config_load", false, e.to_string()));
            return None;
        }
    };

    let points = FilePointRepository::new(args.data.join("points.json"));
    let grids = FileGridProvider::new(args.data.join("grids"));
    match Navigator::from_repository(grids, &points, config).await {
        Ok(navigator) => {
            let inventory = navigator.inventory();
            results.push(TestResult::new(
                "points_load",
                inventory.len() > 30,
                format!(
                    "{} points, {} connectors, floors {:?}",
                    inventory.len(),
                    navigator.graph().connector_count(),
                    inventory.floors()
                ),
            ));
            Some(navigator)
        }
        Err(e) => {
            results.push(TestResult::new("points_load", false, e.to_string()));
            None
        }
    }
}

// ── 2. Validation ───────────────────────────────────────────────────────

async fn validate_building(navigator: &FileNavigator) -> Vec<TestResult> {
    println!("--- Data Validation ---");
    let findings = navigator.validate().await;
    let errors: Vec<_> = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .collect();
    let warnings = findings.len() - errors.len();

    vec![
        TestResult::new(
            "validation_no_errors",
            errors.is_empty(),
            if errors.is_empty() {
                format!("clean ({} warnings)", warnings)
            } else {
                format!("{} errors, first: {}", errors.len(), errors[0].message)
            },
        ),
        TestResult::new(
            "validation_no_warnings",
            warnings == 0,
            format!("{} warnings", warnings),
        ),
    ]
}

// ── 3. Same floor ───────────────────────────────────────────────────────

async fn validate_same_floor(navigator: &FileNavigator) -> Vec<TestResult> {
    println!("--- Same-Floor Routes ---");
    let mut results = Vec::new();

    match route(navigator, "G01", "G10").await {
        Ok(nav) => {
            let ground = nav.floor(0);
            results.push(TestResult::new(
                "same_floor_single_order",
                nav.order == vec![0],
                format!("order {:?}", nav.order),
            ));
            results.push(TestResult::new(
                "same_floor_no_floor_change",
                nav.floor_changes() == 0,
                format!("{:?}", kinds(ground)),
            ));
            let ends_at_target = ground
                .last()
                .map(|m| m.point.display_name() == "G10")
                .unwrap_or(false);
            results.push(TestResult::new(
                "same_floor_ends_at_destination",
                ends_at_target,
                "last maneuver anchored at G10",
            ));
        }
        Err(e) => results.push(TestResult::new("same_floor_route", false, e)),
    }

    // Rooms facing each other across the corridor: out, across, in.
    match route(navigator, "G03", "G08").await {
        Ok(nav) => {
            let ground = kinds(nav.floor(0));
            results.push(TestResult::new(
                "same_floor_straight_across",
                ground == vec![Instruction::Straight],
                format!("{:?}, {:.2}", ground, nav.straight_distance()),
            ));
        }
        Err(e) => results.push(TestResult::new("same_floor_straight_across", false, e)),
    }

    match route(navigator, "G04", "G04").await {
        Ok(nav) => results.push(TestResult::new(
            "same_room_empty",
            nav.step_count() == 0,
            format!("{} maneuvers", nav.step_count()),
        )),
        Err(e) => results.push(TestResult::new("same_room_empty", false, e)),
    }

    results
}

// ── 4. Multi floor ──────────────────────────────────────────────────────

async fn validate_multi_floor(navigator: &FileNavigator) -> Vec<TestResult> {
    println!("--- Multi-Floor Routes ---");
    let mut results = Vec::new();

    match route(navigator, "G01", "205").await {
        Ok(nav) => {
            results.push(TestResult::new(
                "up_two_floors_order",
                nav.order == vec![0, 1, 2],
                format!("order {:?}", nav.order),
            ));
            let ups = nav
                .steps()
                .filter(|m| m.instruction == Instruction::Up)
                .count();
            results.push(TestResult::new(
                "up_two_floors_changes",
                ups == 2 && nav.floor_changes() == 2,
                format!("{} up maneuvers", ups),
            ));
        }
        Err(e) => results.push(TestResult::new("up_two_floors", false, e)),
    }

    // The elevator stops at the ground floor; the basement is stairs only.
    match route(navigator, "B06", "210").await {
        Ok(nav) => {
            let departures: Vec<String> = nav
                .steps()
                .filter(|m| m.instruction.is_floor_change())
                .map(|m| m.point.display_name())
                .collect();
            results.push(TestResult::new(
                "basement_uses_stairs",
                nav.order == vec![-1, 0, 1, 2]
                    && departures.iter().all(|d| d == "West stairs"),
                format!("order {:?}, via {:?}", nav.order, departures),
            ));
        }
        Err(e) => results.push(TestResult::new("basement_uses_stairs", false, e)),
    }

    match route(navigator, "110", "B10").await {
        Ok(nav) => {
            let downs = nav
                .steps()
                .filter(|m| m.instruction == Instruction::Down)
                .count();
            results.push(TestResult::new(
                "down_to_basement",
                downs == 2 && nav.order == vec![1, 0, -1],
                format!("order {:?}, {} down", nav.order, downs),
            ));
        }
        Err(e) => results.push(TestResult::new("down_to_basement", false, e)),
    }

    results
}

// ── 5. Failures ─────────────────────────────────────────────────────────

async fn validate_failures(navigator: &FileNavigator) -> Vec<TestResult> {
    println!("--- Failure Modes ---");
    let mut results = Vec::new();

    // Floor 3 is in range but has no connectors reaching it.
    let attic = Point::room(9_999, 12.0, 37.0, 3, "301");
    let Some(start) = room(navigator, "G01") else {
        results.push(TestResult::new("failure_setup", false, "G01 missing"));
        return results;
    };
    let outcome = navigator.try_navigate(start, &attic).await;
    results.push(TestResult::new(
        "unlinked_floor_no_chain",
        matches!(outcome, Err(NavError::NoConnectorChain { from: 0, to: 3 })),
        format!("{:?}", outcome.err()),
    ));
    results.push(TestResult::new(
        "navigate_collapses_to_none",
        navigator.navigate(start, &attic).await.is_none(),
        "navigate() returns None",
    ));

    let outside = Point::room(9_998, 12.0, 37.0, 7, "701");
    let outcome = navigator.try_navigate(start, &outside).await;
    results.push(TestResult::new(
        "floor_out_of_range",
        matches!(outcome, Err(NavError::FloorOutOfRange { floor: 7, .. })),
        format!("{:?}", outcome.err()),
    ));

    // A point inside a wall still routes from the nearest walkable cell.
    let in_wall = Point::room(9_997, 27.0, 27.0, 0, "wall");
    let outcome = navigator.try_navigate(&in_wall, start).await;
    results.push(TestResult::new(
        "blocked_start_falls_back",
        outcome.is_ok(),
        format!("{:?}", outcome.map(|n| n.step_count())),
    ));

    results
}

// ── 6. Random pairs ─────────────────────────────────────────────────────

async fn validate_random_pairs(navigator: &FileNavigator, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Random Pair Sweep (seed {}) ---", seed);
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<&Point> = navigator.inventory().iter().collect();

    let started = Instant::now();
    let mut failures = Vec::new();
    let mut bad_order = 0usize;
    let mut bad_ends = 0usize;
    let pairs = 200;
    for _ in 0..pairs {
        let (Some(a), Some(b)) = (points.choose(&mut rng), points.choose(&mut rng)) else {
            break;
        };
        match navigator.try_navigate(a, b).await {
            Ok(nav) => {
                let unique: HashSet<i32> = nav.order.iter().copied().collect();
                if unique.len() != nav.order.len() {
                    bad_order += 1;
                }
                if nav.start_floor() != Some(a.floor) || nav.end_floor() != Some(b.floor) {
                    bad_ends += 1;
                }
            }
            Err(e) => failures.push(format!("{} -> {}: {}", a, b, e)),
        }
    }
    let elapsed = started.elapsed();
    if verbose {
        println!("  {} routes in {:.1?}", pairs, elapsed);
    }

    results.push(TestResult::new(
        "random_pairs_all_routed",
        failures.is_empty(),
        match failures.first() {
            None => format!("{} routes in {:.1?}", pairs, elapsed),
            Some(first) => format!("{} failures, first: {}", failures.len(), first),
        },
    ));
    results.push(TestResult::new(
        "random_pairs_floor_order_unique",
        bad_order == 0,
        format!("{} routes repeat a floor", bad_order),
    ));
    results.push(TestResult::new(
        "random_pairs_start_end_floors",
        bad_ends == 0,
        format!("{} routes start or end on the wrong floor", bad_ends),
    ));

    // Same-floor trips are as long one way as the other.
    let mut asymmetric = Vec::new();
    for _ in 0..50 {
        let Some(a) = points.choose(&mut rng) else {
            break;
        };
        let same_floor: Vec<&&Point> = points.iter().filter(|p| p.floor == a.floor).collect();
        let Some(b) = same_floor.choose(&mut rng) else {
            continue;
        };
        let there = navigator.try_navigate(a, b).await;
        let back = navigator.try_navigate(b, a).await;
        match (there, back) {
            (Ok(there), Ok(back)) => {
                if (there.straight_distance() - back.straight_distance()).abs() > 1e-9 {
                    asymmetric.push(format!(
                        "{} <-> {}: {:.2} vs {:.2}",
                        a,
                        b,
                        there.straight_distance(),
                        back.straight_distance()
                    ));
                }
            }
            _ => asymmetric.push(format!("{} <-> {}: no route", a, b)),
        }
    }
    results.push(TestResult::new(
        "round_trip_symmetric",
        asymmetric.is_empty(),
        asymmetric
            .first()
            .cloned()
            .unwrap_or_else(|| "50 same-floor round trips match".into()),
    ));

    results
}

// ── 7. Session ──────────────────────────────────────────────────────────

async fn validate_session(navigator: &FileNavigator) -> Vec<TestResult> {
    println!("--- Session Stepping ---");
    let mut results = Vec::new();

    let nav = match route(navigator, "B07", "103").await {
        Ok(nav) => nav,
        Err(e) => {
            results.push(TestResult::new("session_route", false, e));
            return results;
        }
    };
    let total = nav.step_count();
    let mut session = NavigationSession::new(nav);

    let mut floors_seen = Vec::new();
    let mut steps = 1;
    if let Some(floor) = session.current_floor() {
        floors_seen.push(floor);
    }
    while session.has_next() {
        session.next_step();
        steps += 1;
        if let Some(floor) = session.current_floor() {
            if floors_seen.last() != Some(&floor) {
                floors_seen.push(floor);
            }
        }
    }
    results.push(TestResult::new(
        "session_visits_every_step",
        steps == total && session.len() == total,
        format!("{} of {} steps", steps, total),
    ));
    results.push(TestResult::new(
        "session_floors_in_order",
        floors_seen == session.navigation().order,
        format!("{:?}", floors_seen),
    ));

    session.next_step();
    let clamped_end = session.position() == total.saturating_sub(1);
    for _ in 0..total + 5 {
        session.previous_step();
    }
    results.push(TestResult::new(
        "session_cursor_clamps",
        clamped_end && session.position() == 0 && !session.has_previous(),
        "cursor stays within 0..len",
    ));
    results.push(TestResult::new(
        "session_upcoming_three",
        session.upcoming(3).len() == 3.min(total),
        format!("{} upcoming", session.upcoming(3).len()),
    ));

    results
}

// ── 8. Point cache ──────────────────────────────────────────────────────

async fn validate_point_cache(args: &Args) -> Vec<TestResult> {
    println!("--- Point Cache ---");
    let mut results = Vec::new();

    let cache_path = std::env::temp_dir().join(format!(
        "schoolnav-simtest-{}.bin",
        std::process::id()
    ));
    let cache = PointCache::new(&cache_path);
    let source = FilePointRepository::new(args.data.join("points.json"));
    let repo = CachedPointRepository::new(source.clone(), cache.clone());

    let fresh = source.load_points().await;
    let first = repo.load_points().await;
    let second = cache.load().await;

    match (fresh, first, second) {
        (Ok(fresh), Ok(first), Ok(Some(cached))) => {
            results.push(TestResult::new(
                "cache_round_trip",
                fresh == first && first == cached,
                format!("{} points cached", cached.len()),
            ));
        }
        (fresh, first, second) => results.push(TestResult::new(
            "cache_round_trip",
            false,
            format!(
                "source ok={}, repo ok={}, cache {:?}",
                fresh.is_ok(),
                first.is_ok(),
                second.map(|c| c.map(|i| i.len()))
            ),
        )),
    }

    if let Err(e) = cache.clear().await {
        results.push(TestResult::new("cache_cleanup", false, e.to_string()));
    }
    results
}
