use crate::identity::frames::FramedReport;
use crate::identity::pass::PassReport;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Summarize a pass (and its frame passes) for the terminal.
///
/// Produces output like:
/// ```text
/// === Identity pass (flat) ===
///
///   document: 42 elements, 1 collision, 0 fallbacks, 3 hidden
///   frame -a1b2c3: 7 elements, 0 collisions, 0 fallbacks, 0 hidden
///
/// === 49 elements in 2 documents, digest 3f2a... ===
/// ```
pub fn format_pass_summary(report: &FramedReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Identity pass ({}) ===\n\n",
        mode_name(&report.top)
    ));
    out.push_str(&format!("  document: {}\n", counts(&report.top)));
    for frame in &report.frames {
        out.push_str(&format!("  frame {}: {}\n", frame.frame_path, counts(&frame.report)));
    }

    let fallbacks = report.fallback_count();
    if fallbacks > 0 {
        out.push_str(&format!(
            "\n  [WARN] {} element(s) received fallback ids\n",
            fallbacks
        ));
    }

    out.push_str(&format!(
        "\n=== {} elements in {} documents, digest {} ===\n",
        report.element_count(),
        report.frames.len() + 1,
        report.top.digest()
    ));

    out
}

/// One row per element: d-id, hidden marker, fingerprint and structural path.
///
/// Paths only show up when the pass ran with `record_paths`.
pub fn format_inspect_table(report: &PassReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<14} {:<6} {:>12}  {}\n",
        "D-ID", "HIDDEN", "FINGERPRINT", "PATH"
    ));

    for a in &report.assignments {
        let fingerprint = a
            .fingerprint
            .map(|f| f.to_string())
            .unwrap_or_else(|| "-".to_string());
        let path = match (&a.path, a.fallback) {
            (_, true) => "(fallback)",
            (Some(path), false) => path.as_str(),
            (None, false) => "-",
        };
        out.push_str(&format!(
            "{:<14} {:<6} {:>12}  {}\n",
            a.d_id,
            if a.hidden { "yes" } else { "" },
            fingerprint,
            path
        ));
    }

    out
}

fn mode_name(report: &PassReport) -> String {
    format!("{:?}", report.mode).to_lowercase()
}

fn counts(report: &PassReport) -> String {
    format!(
        "{} elements, {} {}, {} fallbacks, {} hidden",
        report.len(),
        report.collisions,
        if report.collisions == 1 { "collision" } else { "collisions" },
        report.fallback_count(),
        report.hidden_count()
    )
}
