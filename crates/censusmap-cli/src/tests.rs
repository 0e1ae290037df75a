use clap::Parser;

use super::*;

#[test]
fn parses_zip_command() {
    let cli = Cli::try_parse_from(["censusmap", "zip", "29201"]).expect("expected valid cli args");

    assert!(matches!(cli.command, Commands::Zip { ref zip } if zip == "29201"));
    assert_eq!(cli.layers.layer, ActiveLayer::Population);
    assert!(!cli.layers.boundaries);
    assert!(!cli.layers.districts);
}

#[test]
fn parses_city_with_layer_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "censusmap",
        "city",
        "Columbia",
        "--layer",
        "income",
        "--boundaries",
    ])
    .expect("expected valid cli args");

    assert!(matches!(cli.command, Commands::City { ref name } if name == "Columbia"));
    assert_eq!(cli.layers.layer, ActiveLayer::Income);
    assert!(cli.layers.boundaries);
}

#[test]
fn parses_address_with_districts() {
    let cli = Cli::try_parse_from([
        "censusmap",
        "--districts",
        "address",
        "123 Main St, Columbia, SC 29201",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Address { ref address } if address == "123 Main St, Columbia, SC 29201"
    ));
    assert!(cli.layers.districts);
}

#[test]
fn rejects_unknown_layer() {
    let result = Cli::try_parse_from(["censusmap", "zip", "29201", "--layer", "density"]);
    assert!(result.is_err());
}

#[test]
fn parses_refresh_command() {
    let cli = Cli::try_parse_from(["censusmap", "refresh"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Refresh));
}

#[test]
fn export_defaults_to_docx() {
    let cli = Cli::try_parse_from([
        "censusmap",
        "export",
        "--out",
        "report.docx",
        "--zip",
        "29201",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Export {
            format,
            out,
            target,
        } => {
            assert_eq!(format, ReportFormat::Docx);
            assert_eq!(out, PathBuf::from("report.docx"));
            assert_eq!(target.zip.as_deref(), Some("29201"));
            assert!(target.address.is_none());
        }
        other => panic!("expected export command, got {other:?}"),
    }
}

#[test]
fn export_accepts_pdf_for_address() {
    let cli = Cli::try_parse_from([
        "censusmap",
        "export",
        "--format",
        "pdf",
        "--out",
        "r.pdf",
        "--address",
        "1200 Main St",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Export {
            format: ReportFormat::Pdf,
            ..
        }
    ));
}

#[test]
fn export_requires_exactly_one_target() {
    assert!(Cli::try_parse_from(["censusmap", "export", "--out", "r.docx"]).is_err());
    assert!(Cli::try_parse_from([
        "censusmap",
        "export",
        "--out",
        "r.docx",
        "--zip",
        "29201",
        "--address",
        "1200 Main St",
    ])
    .is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["censusmap"]).is_err());
}
