use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dealscore_lib::output::DEALSCORE_OUTPUT_VERSION;
use dealscore_lib::{
    DealScoreError, DealScoreOutput, ErrorOutput, LayerKey, MetricKey, WeightKey, WeightProfile,
    WeightSet,
};

use crate::cli::OutputFormat;

pub fn write_output(
    body: &DealScoreOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref()),
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref()),
    }
}

const FALLBACK_ERROR: &str = "{\"mode\":\"error\"}";

/// Report `err` in the requested format and return the error exit code.
///
/// Exit code 2 means the command could not run; 1 is kept for a preview that
/// ran but scored below `--min-score`.
pub fn render_error(
    err: DealScoreError,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    tracing::debug!(error = ?err, "command failed");
    let error = err.to_payload();
    let body = DealScoreOutput::Error(ErrorOutput {
        version: DEALSCORE_OUTPUT_VERSION.to_string(),
        message: Some(error.message.clone()),
        error,
    });

    let written = match format {
        OutputFormat::Json => write_json_output(&body, output.as_deref()),
        OutputFormat::Pretty => write_pretty_output(&body, output.as_deref()),
    };
    if let Err(write_err) = written {
        // Fall back to stdout when the output file cannot be written.
        eprintln!("could not write error report: {write_err}");
        if output.is_some() {
            let fallback = serde_json::to_string(&body).unwrap_or_else(|_| FALLBACK_ERROR.into());
            println!("{fallback}");
        }
    }

    ExitCode::from(2)
}

/// Print `content` to stdout, or write it to `output` when a path was given.
fn emit(content: &str, output: Option<&Path>) -> io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

fn write_json_output(body: &DealScoreOutput, output: Option<&Path>) -> io::Result<()> {
    let content = serde_json::to_string(body)?;
    emit(&content, output)
}

/// Human-readable text only when a person is reading a terminal; files and
/// pipes get indented JSON with the same shape as `--format json`.
fn write_pretty_output(body: &DealScoreOutput, output: Option<&Path>) -> io::Result<()> {
    if output.is_none() && io::stdout().is_terminal() {
        return emit(&format_pretty(body, true), None);
    }
    let content = serde_json::to_string_pretty(body)?;
    emit(&content, output)
}

pub fn format_pretty(body: &DealScoreOutput, colorize: bool) -> String {
    let preset_label = |preset: Option<&str>| preset.unwrap_or("custom").to_string();

    match body {
        DealScoreOutput::Preview(out) => {
            let mut buf = String::new();
            let status = if out.passed { "PASS" } else { "FAIL" };
            let status_colored = color(status, if out.passed { "32" } else { "31" }, colorize);
            let score = color(
                &out.breakdown.score.to_string(),
                score_color_code(out.breakdown.score),
                colorize,
            );
            writeln!(buf, "{} Deal score preview", status_colored).ok();
            writeln!(buf, "Score: {} (min {})", score, out.min_score).ok();
            writeln!(buf, "Preset: {}", preset_label(out.preset.as_deref())).ok();
            writeln!(buf, "Layers:").ok();
            for c in &out.breakdown.layers {
                writeln!(
                    buf,
                    "- {:24} {:>3}% x {:>5.1} = {:>6.2}",
                    c.layer.label(),
                    c.weight,
                    c.raw_score,
                    c.contribution
                )
                .ok();
            }
            writeln!(
                buf,
                "Weighted total {:.2}, metric bias {:+.2}",
                out.breakdown.weighted_total, out.breakdown.bias
            )
            .ok();
            write_group(&mut buf, "Metrics", &out.weights.metrics);
            buf
        }
        DealScoreOutput::Adjust(out) => {
            let mut buf = String::new();
            let header = color("[ADJUST]", "36", colorize);
            writeln!(buf, "{} {} {} -> {}", header, out.group, out.key, out.value).ok();
            write_profile_diff(&mut buf, &out.previous, &out.weights);
            writeln!(buf, "Preset: {}", preset_label(out.preset.as_deref())).ok();
            writeln!(buf, "Preview score: {}", out.score).ok();
            if out.has_changes {
                writeln!(buf, "{}", color("Unsaved changes", "33", colorize)).ok();
            }
            buf
        }
        DealScoreOutput::Presets(out) => {
            let mut buf = String::new();
            let header = color("[PRESETS]", "34", colorize);
            writeln!(buf, "{} {} available", header, out.presets.len()).ok();
            for preset in &out.presets {
                let marker = if out.active.as_deref() == Some(preset.name.as_str()) {
                    color("*", "32", colorize)
                } else {
                    " ".to_string()
                };
                writeln!(buf, "{} {:14} {}", marker, preset.name, preset.label).ok();
                if let Some(desc) = &preset.description {
                    writeln!(buf, "    {}", desc).ok();
                }
            }
            writeln!(buf, "Active: {}", preset_label(out.active.as_deref())).ok();
            buf
        }
        DealScoreOutput::Sync(out) => {
            let mut buf = String::new();
            let header = color("[SYNC]", "35", colorize);
            let target = out.endpoint.as_deref().unwrap_or("local");
            writeln!(buf, "{} {:?} ({})", header, out.action, target).ok();
            write_group(&mut buf, "Layers", &out.weights.layers);
            write_group(&mut buf, "Metrics", &out.weights.metrics);
            writeln!(buf, "Preset: {}", preset_label(out.preset.as_deref())).ok();
            buf
        }
        DealScoreOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            if out.error.retryable {
                writeln!(buf, "This failure is transient; retry the command.").ok();
            }
            buf
        }
    }
}

fn write_group<K: WeightKey>(buf: &mut String, title: &str, set: &WeightSet<K>) {
    writeln!(buf, "{title}:").ok();
    for (key, value) in set.iter() {
        writeln!(buf, "- {:24} {:>3}%", key.label(), value).ok();
    }
}

fn write_profile_diff(buf: &mut String, before: &WeightProfile, after: &WeightProfile) {
    let mut rows: Vec<(&str, u8, u8)> = Vec::new();
    for &key in LayerKey::ALL {
        rows.push((key.label(), before.layers.get(key), after.layers.get(key)));
    }
    for &key in MetricKey::ALL {
        rows.push((key.label(), before.metrics.get(key), after.metrics.get(key)));
    }
    for (label, old, new) in rows {
        if old == new {
            writeln!(buf, "  {:24} {:>3}%", label, new).ok();
        } else {
            writeln!(buf, "  {:24} {:>3}% -> {:>3}%", label, old, new).ok();
        }
    }
}

fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

fn score_color_code(score: u8) -> &'static str {
    if score >= 75 {
        "32" // green
    } else if score >= 60 {
        "33" // yellow
    } else {
        "31" // red
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealscore_lib::output::{AdjustOutput, PresetsOutput, PreviewOutput};
    use dealscore_lib::{preview_breakdown, ErrorCategory, ErrorPayload, PresetTable};

    #[test]
    fn render_error_always_returns_fatal_exit_code() {
        let code = render_error(
            DealScoreError::Config("boom".to_string()),
            OutputFormat::Json,
            None,
        );
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn error_report_is_written_to_output_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("error.json");
        let code = render_error(
            DealScoreError::Config("bad layers".to_string()),
            OutputFormat::Pretty,
            Some(path.clone()),
        );
        assert_eq!(code, ExitCode::from(2));
        let written: DealScoreOutput =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(matches!(written, DealScoreOutput::Error(ref e) if e.error.message == "bad layers"));
    }

    #[test]
    fn format_pretty_preview_shows_status_layers_and_preset() {
        let weights = WeightProfile::default();
        let output = DealScoreOutput::Preview(PreviewOutput {
            version: DEALSCORE_OUTPUT_VERSION.to_string(),
            breakdown: preview_breakdown(&weights.layers, &weights.metrics),
            weights,
            preset: Some("value_add".into()),
            min_score: 70,
            passed: true,
        });

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("PASS Deal score preview"));
        assert!(pretty.contains("Score: 76 (min 70)"));
        assert!(pretty.contains("Preset: value_add"));
        assert!(pretty.contains("Deal Comp Analysis"));
        assert!(pretty.contains("metric bias +0.75"));
    }

    #[test]
    fn format_pretty_adjust_marks_changed_rows() {
        let previous = WeightProfile::default();
        let mut weights = previous.clone();
        weights.layers = WeightSet::from_ordered(&[60, 11, 29]).unwrap();
        let output = DealScoreOutput::Adjust(AdjustOutput {
            version: DEALSCORE_OUTPUT_VERSION.to_string(),
            group: "layer".into(),
            key: "property_fundamentals".into(),
            value: 60,
            previous,
            weights,
            preset: None,
            has_changes: true,
            score: 77,
        });

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[ADJUST] layer property_fundamentals -> 60"));
        assert!(pretty.contains(" 30% ->  60%"));
        assert!(pretty.contains("Preset: custom"));
        assert!(pretty.contains("Unsaved changes"));
    }

    #[test]
    fn format_pretty_presets_marks_active() {
        let table = PresetTable::builtin();
        let output = DealScoreOutput::Presets(PresetsOutput {
            version: DEALSCORE_OUTPUT_VERSION.to_string(),
            presets: table.iter().cloned().collect(),
            active: Some("core".into()),
            weights: WeightProfile::default(),
        });
        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("4 available"));
        assert!(pretty.contains("* core"));
        assert!(pretty.contains("Active: core"));
    }

    #[test]
    fn format_pretty_handles_errors() {
        let output = DealScoreOutput::Error(ErrorOutput {
            version: DEALSCORE_OUTPUT_VERSION.to_string(),
            message: Some("service unavailable".to_string()),
            error: ErrorPayload {
                category: ErrorCategory::Network,
                message: "service unavailable".to_string(),
                remediation: Some("retry later".to_string()),
                retryable: true,
            },
        });

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[ERROR] service unavailable"));
        assert!(pretty.contains("Hint: retry later"));
        assert!(pretty.contains("transient"));
    }
}
