//! Progress reporting for the scraper
//!
//! Worker progress lines go through a [`ProgressReporter`], which either
//! prints them directly, routes them above an indicatif progress bar, or
//! captures them in memory.

use console::{style, Style};
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Clone)]
enum Output {
    Stdout,
    Bar(ProgressBar),
    Capture(Arc<Mutex<Vec<String>>>),
}

/// Shared sink for worker progress lines
#[derive(Clone)]
pub struct ProgressReporter {
    output: Output,
}

impl ProgressReporter {
    /// Print worker lines straight to stdout
    pub fn stdout() -> Self {
        Self {
            output: Output::Stdout,
        }
    }

    /// Show an overall progress bar over `total` jobs
    pub fn with_bar(total: u64) -> Self {
        let bar = ProgressBar::new(total);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs ({per_sec})")
                .expect("Invalid progress template")
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            output: Output::Bar(bar),
        }
    }

    /// Keep worker lines in memory, uncolored
    pub fn capture() -> Self {
        Self {
            output: Output::Capture(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Emit a line tagged with the worker ordinal
    pub fn worker_line(&self, style: &Style, ordinal: usize, message: &str) {
        let line = format!("Process {}: \t{}", ordinal, message);
        match &self.output {
            Output::Stdout => println!("{}", style.apply_to(line)),
            Output::Bar(bar) => bar.println(style.apply_to(line).to_string()),
            Output::Capture(lines) => lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(line),
        }
    }

    /// Mark one job finished
    pub fn inc(&self) {
        if let Output::Bar(bar) = &self.output {
            bar.inc(1);
        }
    }

    /// Lines captured so far (empty unless created with [`capture`](Self::capture))
    pub fn captured(&self) -> Vec<String> {
        match &self.output {
            Output::Capture(lines) => lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            _ => Vec::new(),
        }
    }

    /// Finish the progress display
    pub fn finish(&self) {
        if let Output::Bar(bar) = &self.output {
            bar.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Average seconds per job, `n/a` when nothing was processed
pub fn format_average(avg: Option<Duration>) -> String {
    match avg {
        Some(d) => format!("{:.2}s", d.as_secs_f64()),
        None => "n/a".to_string(),
    }
}

/// Print a summary of the run
pub fn print_summary(
    jobs: usize,
    failed: u64,
    workers: usize,
    abnormal_exits: usize,
    duration: Duration,
    avg: Option<Duration>,
) {
    println!();
    println!("{}", style("Done!").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {:.2} seconds to go through {} journalists",
        style("Took:").bold(),
        duration.as_secs_f64(),
        jobs
    );
    println!("  {} {}", style("Workers:").bold(), workers);
    println!(
        "  {} {} per journalist",
        style("Avg Time:").bold(),
        format_average(avg)
    );
    if failed > 0 {
        println!("  {} {}", style("Failed:").yellow().bold(), failed);
    }
    if abnormal_exits > 0 {
        println!(
            "  {} {}",
            style("Abnormal exits:").red().bold(),
            abnormal_exits
        );
    }
    println!();
}

/// Print a header at the start of the run
pub fn print_header(input: &str, input_size: Option<u64>, workers: usize, range: &str) {
    println!();
    println!(
        "{} {}",
        style("xbio-scraper").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    match input_size {
        Some(size) => println!(
            "  {} {} ({})",
            style("Input:").bold(),
            input,
            format_size(size, BINARY)
        ),
        None => println!("  {} {}", style("Input:").bold(), input),
    }
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Range:").bold(), range);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(None), "n/a");
        assert_eq!(format_average(Some(Duration::from_millis(1250))), "1.25s");
        assert_eq!(format_average(Some(Duration::ZERO)), "0.00s");
    }

    #[test]
    fn test_capture_lines() {
        let reporter = ProgressReporter::capture();
        let clone = reporter.clone();
        clone.worker_line(&Style::new().green(), 3, "(1/2) Processing Ada...");
        reporter.inc();

        assert_eq!(
            reporter.captured(),
            vec!["Process 3: \t(1/2) Processing Ada...".to_string()]
        );
    }

    #[test]
    fn test_stdout_captures_nothing() {
        assert!(ProgressReporter::stdout().captured().is_empty());
    }
}
