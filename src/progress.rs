//! Progress display module
//!
//! Styled console output for the scan plus the shared counters a run
//! updates while it works and prints once at the end.

use bytesize::ByteSize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Print the application banner
pub fn print_banner() {
    let art = r#"
   ███╗   ██╗ █████╗ ███╗   ███╗███████╗███╗   ███╗ █████╗ ███████╗██╗  ██╗
   ████╗  ██║██╔══██╗████╗ ████║██╔════╝████╗ ████║██╔══██╗██╔════╝██║ ██╔╝
   ██╔██╗ ██║███████║██╔████╔██║█████╗  ██╔████╔██║███████║███████╗█████╔╝
   ██║╚██╗██║██╔══██║██║╚██╔╝██║██╔══╝  ██║╚██╔╝██║██╔══██║╚════██║██╔═██╗
   ██║ ╚████║██║  ██║██║ ╚═╝ ██║███████╗██║ ╚═╝ ██║██║  ██║███████║██║  ██╗
   ╚═╝  ╚═══╝╚═╝  ╚═╝╚═╝     ╚═╝╚══════╝╚═╝     ╚═╝╚═╝  ╚═╝╚══════╝╚═╝  ╚═╝
"#;
    println!("{}", art.green());
    println!(
        "   {}  {}",
        "Person-Name Masking For Password Research".green().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!();
}

/// Print a section header
pub fn print_header(text: &str) {
    println!("\n{} {}", "▶".green(), text.green().bold());
}

/// Print an info message
pub fn print_info(text: &str) {
    println!("  {} {}", "ℹ".cyan(), text);
}

/// Print a success message
pub fn print_success(text: &str) {
    println!("  {} {}", "✔".green(), text.green());
}

/// Print a warning message
pub fn print_warning(text: &str) {
    println!("  {} {}", "⚠".yellow(), text.yellow());
}

/// Print an error message
pub fn print_error(text: &str) {
    eprintln!("  {} {}", "✖".red(), text.red());
}

/// Create a bytes-based progress bar
pub fn create_bytes_progress_bar(total_bytes: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_bytes);

    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/dim}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
            .unwrap()
            .progress_chars("█▓░")
    );

    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Counters for one scan run. Shared behind an `Arc` so a caller can
/// watch a scan from another thread while it runs.
#[derive(Debug)]
pub struct ScanStats {
    pub total_bytes: AtomicU64,
    pub processed_bytes: AtomicU64,
    pub lines_scanned: AtomicU64,
    pub lines_skipped: AtomicU64,
    pub lines_damaged: AtomicU64,
    pub hits: AtomicU64,
    pub distinct_names: AtomicU64,
    pub start_time: Instant,
}

impl ScanStats {
    pub fn new() -> Self {
        Self {
            total_bytes: AtomicU64::new(0),
            processed_bytes: AtomicU64::new(0),
            lines_scanned: AtomicU64::new(0),
            lines_skipped: AtomicU64::new(0),
            lines_damaged: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            distinct_names: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn set_total_bytes(&self, bytes: u64) {
        self.total_bytes.store(bytes, Ordering::Relaxed);
    }

    pub fn add_processed_bytes(&self, bytes: u64) {
        self.processed_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_lines(&self, count: u64) {
        self.lines_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_skipped(&self, count: u64) {
        self.lines_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_damaged(&self, count: u64) {
        self.lines_damaged.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_hits(&self, count: u64) {
        self.hits.fetch_add(count, Ordering::Relaxed);
    }

    pub fn set_distinct_names(&self, count: u64) {
        self.distinct_names.store(count, Ordering::Relaxed);
    }

    pub fn get_total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    pub fn get_processed_bytes(&self) -> u64 {
        self.processed_bytes.load(Ordering::Relaxed)
    }

    pub fn get_lines_scanned(&self) -> u64 {
        self.lines_scanned.load(Ordering::Relaxed)
    }

    pub fn get_lines_skipped(&self) -> u64 {
        self.lines_skipped.load(Ordering::Relaxed)
    }

    pub fn get_lines_damaged(&self) -> u64 {
        self.lines_damaged.load(Ordering::Relaxed)
    }

    pub fn get_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn get_distinct_names(&self) -> u64 {
        self.distinct_names.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn lines_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get_lines_scanned() as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn bytes_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get_processed_bytes() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print final statistics
    pub fn print_summary(&self) {
        let elapsed = self.elapsed();

        println!();
        println!("{}", "═".repeat(60).green());
        println!("{}", "                       SCAN COMPLETE".green().bold());
        println!("{}", "═".repeat(60).green());
        println!();

        println!("  {} {}", "Data processed: ".green(),
            format!("{} / {}",
                ByteSize(self.get_processed_bytes()),
                ByteSize(self.get_total_bytes())));
        println!("  {} {}", "Lines scanned:  ".green(),
            format_number(self.get_lines_scanned()));
        println!("  {} {}", "Masked input:   ".yellow(),
            format_number(self.get_lines_skipped()));

        if self.get_lines_damaged() > 0 {
            println!("  {} {}", "Damaged lines:  ".red(),
                format_number(self.get_lines_damaged()).red());
        }

        println!();
        println!("  {} {}", "Name matches:   ".green().bold(),
            format_number(self.get_hits()).green().bold());
        println!("  {} {}", "Distinct names: ".green(),
            format_number(self.get_distinct_names()));

        println!();
        println!("  {} {}", "Duration:       ".green(), format_duration(elapsed));
        println!("  {} {:.2} lines/sec", "Throughput:     ".green(),
            self.lines_per_second());
        println!("  {} {}/sec", "Speed:          ".green(),
            ByteSize(self.bytes_per_second() as u64));
        println!();
        println!("{}", "═".repeat(60).green());
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}
