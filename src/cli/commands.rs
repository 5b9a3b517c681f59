use crate::browser::session::{BrowserSession, assign_live};
use crate::cli::config::AppConfig;
use crate::dom::snapshot::DomSnapshot;
use crate::dom::strip::mild_strip;
use crate::identity::fingerprint::{hash_code, to_base36};
use crate::identity::frames::run_pass_with_frames;
use crate::identity::lookup::invisible_ids;
use crate::identity::pass::{PassOptions, TraversalMode};
use crate::report::console::{format_inspect_table, format_pass_summary};
use crate::trace::logger::TraceLogger;

// ============================================================================
// assign subcommand
// ============================================================================

pub fn cmd_assign(
    input: &str,
    mode: TraversalMode,
    output: Option<&str>,
    tracer: &TraceLogger,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = DomSnapshot::load(input)?;
    let (annotated, report) = crate::assign_snapshot(&snapshot, &PassOptions::new(mode))?;
    tracer.log_framed(&report, snapshot.url.as_deref());

    write_snapshot(&annotated, output)?;
    // Keep stdout clean for the snapshot when no output file was given.
    match output {
        Some(_) => print!("{}", format_pass_summary(&report)),
        None => eprint!("{}", format_pass_summary(&report)),
    }
    Ok(())
}

// ============================================================================
// inspect subcommand
// ============================================================================

pub fn cmd_inspect(input: &str, mode: TraversalMode) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = DomSnapshot::load(input)?;
    let mut doc = snapshot.to_document()?;
    let report = run_pass_with_frames(&mut doc, &PassOptions::new(mode).with_paths())?;

    print!("{}", format_inspect_table(&report.top));
    for frame in &report.frames {
        println!("\n--- frame {} ---", frame.frame_path);
        print!("{}", format_inspect_table(&frame.report));
    }
    Ok(())
}

// ============================================================================
// hash subcommand
// ============================================================================

pub fn cmd_hash(text: &str) {
    let fingerprint = hash_code(text);
    println!("{}\t{}", fingerprint, to_base36(fingerprint));
}

// ============================================================================
// strip subcommand
// ============================================================================

pub fn cmd_strip(
    input: &str,
    drop_ids: bool,
    output: Option<&str>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = DomSnapshot::load(input)?;
    let doc = snapshot.to_document()?;

    let mut options = config.strip.clone();
    if drop_ids {
        options.keep_ids = false;
    }
    let stripped = mild_strip(&doc, &options);
    write_snapshot(&DomSnapshot::from_document(&stripped), output)?;
    Ok(())
}

// ============================================================================
// live subcommand
// ============================================================================

pub fn cmd_live(
    url: &str,
    mode: TraversalMode,
    script: &str,
    output: Option<&str>,
    config: &AppConfig,
    tracer: &TraceLogger,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = BrowserSession::launch(script)?;
    session.navigate(url)?;

    let (doc, report) = assign_live(&mut session, &PassOptions::new(mode), config.browser.retries)?;
    session.quit()?;
    tracer.log_framed(&report, Some(url));

    print!("{}", format_pass_summary(&report));

    let hidden = invisible_ids(&doc);
    if !hidden.is_empty() {
        println!("Hidden elements ({}):", hidden.len());
        for id in &hidden {
            println!("  - {}", id);
        }
    }

    if let Some(path) = output {
        DomSnapshot::from_document(&doc).save(path)?;
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn write_snapshot(snapshot: &DomSnapshot, output: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => snapshot.save(path)?,
        None => println!("{}", snapshot.to_json_pretty()?),
    }
    Ok(())
}
