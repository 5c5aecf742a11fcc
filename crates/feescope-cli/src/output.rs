//! Report files: ranked peaks as JSON, window complexity and fees as CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use feescope_core::dimension::Dimension;

use crate::pipeline::AnalysisReport;

pub const PEAKS_FILE: &str = "peaks.json";
pub const COMPLEXITY_FILE: &str = "complexity.csv";
pub const FEES_FILE: &str = "fees.csv";

/// Paths of the files written by [`write_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub peaks: PathBuf,
    pub complexity: PathBuf,
    pub fees: PathBuf,
}

/// Ranked peaks of every dimension, strongest first.
pub fn write_peaks<W: Write>(report: &AnalysisReport, out: W) -> io::Result<()> {
    serde_json::to_writer_pretty(out, &report.peaks)?;
    Ok(())
}

/// `height,consumed,target` for the replayed dimension over the window.
pub fn write_complexity<W: Write>(report: &AnalysisReport, mut out: W) -> io::Result<()> {
    writeln!(out, "height,consumed,target")?;
    for (sample, target) in report.window_samples.iter().zip(&report.window_targets) {
        writeln!(
            out,
            "{},{},{}",
            sample.height, sample.complexity[report.dimension], target
        )?;
    }
    Ok(())
}

/// `height,time,fee,rate_<dimension>...` for every replayed block.
pub fn write_fees<W: Write>(report: &AnalysisReport, mut out: W) -> io::Result<()> {
    write!(out, "height,time,fee")?;
    for d in Dimension::ALL {
        write!(out, ",rate_{}", d.name())?;
    }
    writeln!(out)?;
    for fee in &report.fees {
        write!(out, "{},{},{}", fee.height, fee.time, fee.fee)?;
        for (_, rate) in fee.rates.iter() {
            write!(out, ",{rate}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn create(path: &Path) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write all report files into `dir`, creating it if needed.
pub fn write_report(report: &AnalysisReport, dir: &Path) -> io::Result<OutputFiles> {
    std::fs::create_dir_all(dir)?;
    let files = OutputFiles {
        peaks: dir.join(PEAKS_FILE),
        complexity: dir.join(COMPLEXITY_FILE),
        fees: dir.join(FEES_FILE),
    };

    let mut peaks = create(&files.peaks)?;
    write_peaks(report, &mut peaks)?;
    peaks.flush()?;

    let mut complexity = create(&files.complexity)?;
    write_complexity(report, &mut complexity)?;
    complexity.flush()?;

    let mut fees = create(&files.fees)?;
    write_fees(report, &mut fees)?;
    fees.flush()?;

    info!(dir = %dir.display(), "wrote report files");
    Ok(files)
}
