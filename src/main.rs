//! battcert – command-line battery-health certificate generator.
//!
//! Usage:
//!   battcert <record.json> [output.pdf] [--publish] [--background <image>]
//!
//! Without `--publish` the certificate is rendered locally (UI-only mode).
//! With it, the two-pass upload workflow runs against Cloudinary using the
//! `CLOUDINARY_CLOUD_NAME` / `CLOUDINARY_API_KEY` / `CLOUDINARY_API_SECRET`
//! environment variables, resolved once at startup.

use std::{env, fs, path::PathBuf, process};

use battcert::catalog::VehicleCatalog;
use battcert::publish::publish;
use battcert::record::CertificateRecord;
use battcert::render::{render_certificate, RenderAssets};
use battcert::store::{CloudinaryStore, StoreConfig};

const DEFAULT_BACKGROUND: &str = "certificate_bg.jpg";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut record_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut background: Option<PathBuf> = None;
    let mut do_publish = false;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--publish" | "-p" => do_publish = true,
            "--background" | "-b" => match iter.next() {
                Some(v) => background = Some(PathBuf::from(v)),
                None => {
                    eprintln!("--background requires a path");
                    process::exit(1);
                }
            },
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
                    record_path = Some(PathBuf::from(path));
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

    let record_path = match record_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no record file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    // Publication credentials are resolved before any rendering work.
    let store = if do_publish {
        match StoreConfig::from_env() {
            Ok(config) => Some(CloudinaryStore::new(config)),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    let json = match fs::read_to_string(&record_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", record_path.display());
            process::exit(1);
        }
    };
    let record = match CertificateRecord::from_json(&json) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", record_path.display());
            process::exit(1);
        }
    };

    // Advisory only: the renderer accepts arbitrary make/model strings.
    let catalog = VehicleCatalog::default();
    if !catalog.contains(&record.make, &record.model) {
        log::warn!(
            "'{} {}' is not in the vehicle catalog; rendering anyway",
            record.make,
            record.model
        );
    }

    let assets = RenderAssets::from_background_path(
        background
            .as_deref()
            .unwrap_or_else(|| std::path::Path::new(DEFAULT_BACKGROUND)),
    );

    match store {
        Some(store) => match publish(&record, &store, &assets) {
            Ok(published) => {
                let output =
                    output_path.unwrap_or_else(|| PathBuf::from(&published.suggested_filename));
                if let Err(e) = fs::write(&output, &published.bytes) {
                    eprintln!("Error writing '{}': {e}", output.display());
                    process::exit(1);
                }
                println!("{}", published.url);
                eprintln!(
                    "Wrote '{}' ({} bytes), hosted at {}",
                    output.display(),
                    published.bytes.len(),
                    published.url
                );
            }
            Err(e) => {
                eprintln!("Error publishing certificate: {e}");
                process::exit(1);
            }
        },
        None => {
            let output = output_path.unwrap_or_else(|| PathBuf::from("certificate.pdf"));
            match render_certificate(&record, None, &assets) {
                Ok(bytes) => {
                    if let Err(e) = fs::write(&output, &bytes) {
                        eprintln!("Error writing '{}': {e}", output.display());
                        process::exit(1);
                    }
                    eprintln!("Wrote '{}' ({} bytes)", output.display(), bytes.len());
                }
                Err(e) => {
                    eprintln!("Error rendering certificate: {e}");
                    process::exit(1);
                }
            }
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("battcert – battery-health certificate generator");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <record.json> [output.pdf] [--publish] [--background <image>]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <record.json>  Certificate record (see CertificateRecord fields)");
    eprintln!("  [output.pdf]   Output path (default: certificate.pdf, or the");
    eprintln!("                 id-derived name when publishing)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --publish, -p     Upload via Cloudinary and embed a QR link");
    eprintln!("  --background, -b  Background template image (default: {DEFAULT_BACKGROUND})");
    eprintln!("  --help            Print this message");
}
