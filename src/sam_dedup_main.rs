use std::process;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use env_logger::Env;

use umidedup::sam_dedup::classifier::BoundaryMode;
use umidedup::sam_dedup::dedup_key::ClipMode;
use umidedup::sam_dedup::*;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = wrapper() {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}

fn wrapper() -> Result<()> {
    let cli = get_cli()?;
    let config = Config::new(&cli)?;
    sam_dedup(config)
}

fn get_cli() -> Result<CLI> {
    Ok(cli_from_matches(&cli_command().get_matches()))
}

fn cli_command() -> Command {
    Command::new("sam-dedup")
        .version(env!("CARGO_PKG_VERSION"))
        .about(
            "Remove PCR duplicates from a chromosome-sorted, single-end SAM file \
             using UMIs embedded in read names",
        )
        .arg(
            Arg::new("sam_file")
                .short('f')
                .long("sam-file")
                .value_name("INPUT.SAM")
                .help("SAM file sorted by reference sequence, plain or gzipped, or - for stdin")
                .required(true),
        )
        .arg(
            Arg::new("umi_file")
                .short('u')
                .long("umi-file")
                .value_name("UMIS.TXT")
                .help("List of UMIs used in the sequencing run, one per line")
                .required(true),
        )
        .arg(
            Arg::new("directory")
                .short('d')
                .long("directory")
                .value_name("OUTPUT-DIR")
                .help("Directory for the deduplicated, duplicate and error files")
                .required(true),
        )
        .arg(
            Arg::new("which_end")
                .short('e')
                .long("which-end")
                .value_name("1|2")
                .help("1 for single-end reads; paired-end (2) is not supported")
                .value_parser(value_parser!(u8).range(1..=2))
                .default_value("1"),
        )
        .arg(
            Arg::new("stats")
                .short('s')
                .long("stats")
                .value_name("STATS.TXT")
                .help("Output file with duplicate statistics [default: OUTPUT-DIR/outputs.txt]"),
        )
        .arg(
            Arg::new("boundary")
                .long("boundary")
                .value_name("MODE")
                .help("First read on each reference: drop it, or classify it like any other")
                .value_parser(|s: &str| s.parse::<BoundaryMode>())
                .default_value("drop"),
        )
        .arg(
            Arg::new("clip")
                .long("clip")
                .value_name("MODE")
                .help("Soft-clip position correction: leading clip only, or legacy first-number rule")
                .value_parser(|s: &str| s.parse::<ClipMode>())
                .default_value("leading"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Abort on the first malformed record instead of skipping it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("progress")
                .long("progress")
                .value_name("NREADS")
                .help("Report progress every NREADS reads")
                .value_parser(value_parser!(usize))
                .default_value("0"),
        )
}

fn cli_from_matches(matches: &ArgMatches) -> CLI {
    let string_arg = |name: &str| matches.get_one::<String>(name).cloned().unwrap_or_default();

    CLI {
        sam_file: string_arg("sam_file"),
        umi_file: string_arg("umi_file"),
        directory: string_arg("directory"),
        which_end: *matches.get_one::<u8>("which_end").unwrap_or(&1),
        stats: matches.get_one::<String>("stats").cloned(),
        boundary: matches
            .get_one::<BoundaryMode>("boundary")
            .copied()
            .unwrap_or_default(),
        clip: matches.get_one::<ClipMode>("clip").copied().unwrap_or_default(),
        strict: matches.get_flag("strict"),
        progress: *matches.get_one::<usize>("progress").unwrap_or(&0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CLI, clap::Error> {
        let mut argv = vec!["sam-dedup", "-f", "in.sam", "-u", "umis.txt", "-d", "out"];
        argv.extend_from_slice(args);
        cli_command()
            .try_get_matches_from(argv)
            .map(|m| cli_from_matches(&m))
    }

    #[test]
    fn default_modes() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.boundary, BoundaryMode::Drop);
        assert_eq!(cli.clip, ClipMode::Leading);
        assert_eq!(cli.which_end, 1);
        assert!(!cli.strict);
        assert_eq!(cli.stats, None);
    }

    #[test]
    fn mode_arguments() {
        let cli = parse(&["--boundary", "classify", "--clip", "legacy", "--strict"]).unwrap();
        assert_eq!(cli.boundary, BoundaryMode::Classify);
        assert_eq!(cli.clip, ClipMode::Legacy);
        assert!(cli.strict);

        assert!(parse(&["--boundary", "keep"]).is_err());
        assert!(parse(&["--clip", "trailing"]).is_err());
        assert!(parse(&["-e", "3"]).is_err());
    }
}
