//! reportforge – command-line event-report builder.
//!
//! Usage:
//!   reportforge <request.json> [output.pdf] [--uploads-dir DIR] [--mirror-dir DIR] [--title "My Report"]
//!
//! The request file is a JSON `ReportRequest`: the form's text fields plus
//! optional `invitation` and `photos` uploads, each `{ "name": ...,
//! "path": ... }` or an inline `data:` URI under `"data"`. If `output.pdf`
//! is omitted the PDF is written to the artifact name (`{title}_{date}.pdf`)
//! in the current directory.

use std::{env, fs, path::PathBuf, process};

use report_forge::pipeline::{build_report, PipelineConfig};
use report_forge::record::ReportRequest;
use report_forge::remote::{DirMirror, RemoteStore};
use report_forge::storage::RequestStore;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut uploads_dir: Option<PathBuf> = None;
    let mut mirror_dir: Option<PathBuf> = None;
    let mut font: Option<PathBuf> = None;
    let mut title: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--uploads-dir" => {
                uploads_dir = Some(PathBuf::from(required_value(&mut iter, arg, &args[0])));
            }
            "--mirror-dir" => {
                mirror_dir = Some(PathBuf::from(required_value(&mut iter, arg, &args[0])));
            }
            "--font" => font = Some(PathBuf::from(required_value(&mut iter, arg, &args[0]))),
            "--title" | "-t" => title = Some(required_value(&mut iter, arg, &args[0])),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no request file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };
    let request = match ReportRequest::from_json(&json) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", input.display());
            process::exit(1);
        }
    };

    // A named uploads dir keeps staged and canonical files around for
    // inspection; otherwise they live in a temp dir for the build only.
    let store = match &uploads_dir {
        Some(dir) => RequestStore::at(dir),
        None => RequestStore::temporary(),
    };
    let store = match store {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error opening uploads dir: {e}");
            process::exit(1);
        }
    };

    let mirror = mirror_dir.map(DirMirror::new);
    let remote = mirror.as_ref().map(|m| m as &dyn RemoteStore);

    let config = PipelineConfig {
        title,
        font,
        ..PipelineConfig::default()
    };

    match build_report(&request, &store, remote, &config) {
        Ok(out) => {
            let output = output_path.unwrap_or_else(|| PathBuf::from(&out.artifact));
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &out.pdf) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            let pages = out.layout.pages.len();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                output.display(),
                out.pdf.len(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error building report: {e}");
            process::exit(1);
        }
    }
}

/// Next argument after a value-taking flag, or exit with usage.
fn required_value(
    iter: &mut std::iter::Peekable<std::iter::Skip<std::slice::Iter<String>>>,
    flag: &str,
    prog: &str,
) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Flag {flag} needs a value");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("reportforge – event report PDF builder (report-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  {prog} <request.json> [output.pdf] [--uploads-dir DIR] [--mirror-dir DIR] [--font FILE] [--title \"My Report\"]"
    );
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <request.json>  Report request: form fields plus invitation/photo uploads");
    eprintln!("  [output.pdf]    Output path  (default: '{{title}}_{{date}}.pdf' in the current dir)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --uploads-dir   Keep staged uploads and canonical images in DIR (default: temp dir)");
    eprintln!("  --mirror-dir    Best-effort copy of images and the PDF into DIR");
    eprintln!("  --font          TTF/OTF used for text measurement (rendering stays Helvetica)");
    eprintln!("  --title, -t     Document title in PDF metadata (default: the event title)");
    eprintln!("  --help          Print this message");
}
