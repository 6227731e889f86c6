use std::env;
use std::time::Instant;

use dtw_digits::{
    align, classify, frame_cost, segment, Digit, DistanceScore, FeatureSequence, TemplateStore,
};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

const ARITY: usize = 13;

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("scale_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    eprintln!("\n{}", "=".repeat(80));
    eprintln!("DTW digit recognition scaling probe");
    eprintln!("{}", "=".repeat(80));
    eprintln!("  wall_s: wall-clock seconds");
    eprintln!("  rss_delta_kib: resident set growth during the run");
    eprintln!(
        "  status: 'passed' = matches reference, 'not_checked' = above --verify-limit ({})",
        options.verify_limit
    );
    eprintln!();

    let store = synthetic_store(options.templates_per_digit);
    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/3] Banded alignment against a full-table reference...");
    measurements.extend(run_align(&options, &mut sys));
    eprintln!();

    eprintln!("[2/3] Nearest-template classification...");
    measurements.extend(run_classify(&options, &store, &mut sys));
    eprintln!();

    eprintln!("[3/3] Segmentation of synthetic digit strings...");
    measurements.extend(run_segment(&options, &store, &mut sys));
    eprintln!();

    print_summary(&measurements);

    if let Err(err) = options.format.write(&measurements) {
        eprintln!("scale_probe output error: {err}");
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
    templates_per_digit: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 512usize;
        let mut templates_per_digit = 3usize;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = next_value(&mut args, "--format")?;
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = parse_count(value, "verify limit")?;
            } else if arg == "--verify-limit" {
                let value = next_value(&mut args, "--verify-limit")?;
                verify_limit = parse_count(&value, "verify limit")?;
            } else if let Some(value) = arg.strip_prefix("--templates=") {
                templates_per_digit = parse_count(value, "template count")?;
            } else if arg == "--templates" {
                let value = next_value(&mut args, "--templates")?;
                templates_per_digit = parse_count(&value, "template count")?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self {
            format,
            verify_limit,
            templates_per_digit: templates_per_digit.max(1),
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --release --features probe --bin scale_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --verify-limit <N>            Largest input (frames) checked against a reference (default: 512)
  --templates <N>               Templates per digit in the synthetic store (default: 3)
  -h, --help                    Print this help message
"
        );
    }
}

fn next_value<I, T>(args: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item = T>,
    T: Into<String>,
{
    args.next()
        .map(Into::into)
        .ok_or_else(|| format!("missing value after {flag}"))
}

fn parse_count(value: &str, what: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("{what} must be a positive integer"))
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => write_json(measurements),
        }
    }
}

struct Measurement {
    scenario: &'static str,
    size_desc: String,
    wall_s: f64,
    rss_delta_kib: u64,
    verification_status: VerificationStatus,
    verification_detail: Option<String>,
}

#[derive(Clone, Copy)]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            VerificationStatus::Passed => "✓",
            VerificationStatus::Failed => "✗",
            VerificationStatus::NotChecked => "○",
        }
    }
}

fn run_align(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const SIZES: &[usize] = &[64, 128, 256, 512, 1024, 2048, 4096];
    let total = SIZES.len();
    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            let locality = (len / 8).max(4);
            eprint!(
                "      [{}/{}] len={len}, locality={locality}... ",
                idx + 1,
                total
            );
            let desc = format!("len={len},locality={locality}");
            let mut score = DistanceScore::Infeasible;
            let m = measure("align", desc, sys, || {
                let a = warped_sequence(len, 0);
                let b = warped_sequence(len + locality / 2, 1);
                score = match align(&a, &b, locality) {
                    Ok(s) => s,
                    Err(err) => return (VerificationStatus::Failed, Some(err.to_string())),
                };
                if len > options.verify_limit {
                    return (VerificationStatus::NotChecked, None);
                }
                let baseline = full_table_dtw(&a, &b, locality);
                if baseline == score {
                    (VerificationStatus::Passed, None)
                } else {
                    (
                        VerificationStatus::Failed,
                        Some(format!("expected {baseline}, got {score}")),
                    )
                }
            });
            eprintln!(
                "{} score={score}, time={:.3}s, status={}",
                m.verification_status.icon(),
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn run_classify(options: &Options, store: &TemplateStore, sys: &mut System) -> Vec<Measurement> {
    let total = Digit::ALL.len();
    Digit::ALL
        .iter()
        .enumerate()
        .map(|(idx, &digit)| {
            eprint!("      [{}/{}] digit {digit}... ", idx + 1, total);
            let input = spoken_digits(&[digit], 7);
            let locality = 6;
            let m = measure("classify", format!("digit={digit}"), sys, || {
                let label = match classify(&input, store, locality) {
                    Ok(l) => l,
                    Err(err) => return (VerificationStatus::Failed, Some(err.to_string())),
                };
                if input.len() > options.verify_limit {
                    (VerificationStatus::NotChecked, None)
                } else if label.digit == Some(digit) {
                    (VerificationStatus::Passed, None)
                } else {
                    (
                        VerificationStatus::Failed,
                        Some(format!("expected {digit}, got {:?}", label.digit)),
                    )
                }
            });
            eprintln!(
                "{} time={:.3}s, status={}",
                m.verification_status.icon(),
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn run_segment(options: &Options, store: &TemplateStore, sys: &mut System) -> Vec<Measurement> {
    const DIGIT_COUNTS: &[usize] = &[2, 4, 8, 16, 32];
    let total = DIGIT_COUNTS.len();
    DIGIT_COUNTS
        .iter()
        .enumerate()
        .map(|(idx, &count)| {
            let digits: Vec<Digit> = (0..count).map(|i| Digit::ALL[(i * 7 + 3) % 10]).collect();
            let expected: String = digits.iter().map(ToString::to_string).collect();
            let input = spoken_digits(&digits, 11);
            let (l_min, l_max) = (TEMPLATE_MIN_LEN, TEMPLATE_MAX_LEN + 2);
            let locality = l_max - l_min;
            eprint!(
                "      [{}/{}] {count} digits, {} frames... ",
                idx + 1,
                total,
                input.len()
            );
            let m = measure(
                "segment",
                format!("digits={count},frames={}", input.len()),
                sys,
                || {
                    let result = match segment(&input, store, locality, l_min, l_max) {
                        Ok(r) => r,
                        Err(err) => return (VerificationStatus::Failed, Some(err.to_string())),
                    };
                    if input.len() > options.verify_limit {
                        (VerificationStatus::NotChecked, None)
                    } else if result.to_string() == expected {
                        (VerificationStatus::Passed, None)
                    } else {
                        (
                            VerificationStatus::Failed,
                            Some(format!("expected {expected}, got {result}")),
                        )
                    }
                },
            );
            eprintln!(
                "{} time={:.3}s, status={}",
                m.verification_status.icon(),
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn print_summary(measurements: &[Measurement]) {
    let mut passed = 0;
    let mut failed = 0;
    let mut not_checked = 0;
    for m in measurements {
        match m.verification_status {
            VerificationStatus::Passed => passed += 1,
            VerificationStatus::Failed => failed += 1,
            VerificationStatus::NotChecked => not_checked += 1,
        }
    }

    eprintln!("{}", "=".repeat(80));
    eprintln!(
        "Total: {}  passed: {passed}  failed: {failed}  not checked: {not_checked}",
        measurements.len()
    );
    for m in measurements {
        if let (VerificationStatus::Failed, Some(detail)) =
            (m.verification_status, &m.verification_detail)
        {
            eprintln!("  ✗ {} ({}): {detail}", m.scenario, m.size_desc);
        }
    }
    eprintln!("{}", "=".repeat(80));
    eprintln!();
}

fn measure<F>(
    scenario: &'static str,
    size_desc: String,
    sys: &mut System,
    compute: F,
) -> Measurement
where
    F: FnOnce() -> (VerificationStatus, Option<String>),
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let (status, detail) = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    Measurement {
        scenario,
        size_desc,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        verification_status: status,
        verification_detail: detail,
    }
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("scenario,size_desc,wall_s,rss_delta_kib,verification_status,verification_detail");
    for m in measurements {
        let detail = m
            .verification_detail
            .as_ref()
            .map(|s| s.replace('"', "'"))
            .unwrap_or_default();
        println!(
            "{},{},{:.3},{},{},\"{}\"",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            detail
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    let col1 = measurements
        .iter()
        .map(|m| m.scenario.len())
        .fold("scenario".len(), usize::max);
    let col2 = measurements
        .iter()
        .map(|m| m.size_desc.len())
        .fold("size".len(), usize::max);

    println!(
        "{:<col1$}  {:<col2$}  {:>10}  {:>14}  {:>12}",
        "scenario", "size", "wall_s", "rss_delta_kib", "status"
    );
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:>10.3}  {:>14}  {:>12}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label()
        );
    }
    Ok(())
}

fn write_json(measurements: &[Measurement]) -> Result<(), String> {
    println!("[");
    for (idx, m) in measurements.iter().enumerate() {
        let detail = m.verification_detail.as_ref().map(|s| s.replace('"', "'"));
        println!(
            "  {{\"scenario\":\"{}\",\"size\":\"{}\",\"wall_s\":{:.3},\"rss_delta_kib\":{},\"verification\":{{\"status\":\"{}\",\"detail\":{}}}}}{}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            match detail {
                Some(ref d) => format!("\"{d}\""),
                None => "null".to_string(),
            },
            if idx + 1 == measurements.len() { "" } else { "," }
        );
    }
    println!("]");
    Ok(())
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}

const TEMPLATE_MIN_LEN: usize = 12;
const TEMPLATE_MAX_LEN: usize = 14;

/// Frame `t` of the clean rendition of `digit`, coefficient `c`.
fn digit_value(digit: Digit, c: usize, t: usize) -> f64 {
    let d = digit.index();
    ((d * 7 + c * 3) % 11) as f64 + 0.25 * ((t + d) % 3) as f64
}

fn digit_len(digit: Digit, variant: usize) -> usize {
    TEMPLATE_MIN_LEN + (digit.index() + variant) % (TEMPLATE_MAX_LEN - TEMPLATE_MIN_LEN + 1)
}

fn synthetic_store(per_digit: usize) -> TemplateStore {
    let mut store = TemplateStore::new();
    for digit in Digit::ALL {
        for variant in 0..per_digit {
            let len = digit_len(digit, variant);
            let rows: Vec<Vec<f64>> = (0..ARITY)
                .map(|c| (0..len).map(|t| digit_value(digit, c, t)).collect())
                .collect();
            if let Ok(seq) = FeatureSequence::from_coefficients(&rows) {
                let _ = store.insert(digit, seq);
            }
        }
    }
    store
}

/// Concatenated renditions of `digits` with a small deterministic jitter.
fn spoken_digits(digits: &[Digit], seed: usize) -> FeatureSequence {
    let mut frames: Vec<Vec<f64>> = Vec::new();
    for (i, &digit) in digits.iter().enumerate() {
        let len = digit_len(digit, seed + i);
        for t in 0..len {
            let frame = (0..ARITY)
                .map(|c| digit_value(digit, c, t) + 0.01 * ((seed + t * 31 + c) % 5) as f64)
                .collect();
            frames.push(frame);
        }
    }
    FeatureSequence::from_frames(&frames).unwrap_or_else(|err| panic!("synthetic input: {err}"))
}

fn warped_sequence(len: usize, phase: usize) -> FeatureSequence {
    let rows: Vec<Vec<f64>> = (0..ARITY)
        .map(|c| {
            (0..len)
                .map(|t| (((t + phase) * (c + 1)) % 17) as f64 * 0.5)
                .collect()
        })
        .collect();
    FeatureSequence::from_coefficients(&rows).unwrap_or_else(|err| panic!("synthetic input: {err}"))
}

/// Plain `(n+1) × (m+1)` table with an `f64::INFINITY` border.
fn full_table_dtw(a: &FeatureSequence, b: &FeatureSequence, locality: usize) -> DistanceScore {
    let n = a.len();
    let m = b.len();
    let (va, vb) = (a.as_view(), b.as_view());
    let mut dp = vec![vec![f64::INFINITY; m + 1]; n + 1];
    dp[0][0] = 0.0;
    for i in 1..=n {
        for j in 1..=m {
            if i.abs_diff(j) > locality {
                continue;
            }
            let prev = dp[i - 1][j].min(dp[i][j - 1]).min(dp[i - 1][j - 1]);
            if prev.is_finite() {
                dp[i][j] = prev + frame_cost(&va, i - 1, &vb, j - 1);
            }
        }
    }
    DistanceScore::new(dp[n][m])
}
